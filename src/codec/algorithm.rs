//! Codec names and results.

use serde::{Deserialize, Serialize};

use crate::tokenizer::{byte_len, SavingsStats, TokenCounter};

/// Known codecs, plus `Off` for "nothing served"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecName {
    /// Passthrough baseline
    Identity,
    /// UTF-8 bytes as hex pairs
    Hex,
    /// Whitespace / punctuation run markers
    Bracket,
    /// Self-describing word dictionary (a.k.a. codex)
    #[serde(alias = "codex")]
    Dictionary,
    /// Best-of selection over the others
    Hybrid,
    /// No codec served
    Off,
}

impl CodecName {
    /// Get codec name as string
    pub fn name(&self) -> &'static str {
        match self {
            CodecName::Identity => "identity",
            CodecName::Hex => "hex",
            CodecName::Bracket => "bracket",
            CodecName::Dictionary => "dictionary",
            CodecName::Hybrid => "hybrid",
            CodecName::Off => "off",
        }
    }

    /// All codec names, including `Off`
    pub fn all() -> &'static [CodecName] {
        &[
            CodecName::Identity,
            CodecName::Hex,
            CodecName::Bracket,
            CodecName::Dictionary,
            CodecName::Hybrid,
            CodecName::Off,
        ]
    }
}

impl std::fmt::Display for CodecName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for CodecName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identity" | "none" => Ok(Self::Identity),
            "hex" => Ok(Self::Hex),
            "bracket" => Ok(Self::Bracket),
            "dictionary" | "dict" | "codex" => Ok(Self::Dictionary),
            "hybrid" => Ok(Self::Hybrid),
            "off" => Ok(Self::Off),
            _ => Err(format!("Unknown codec: {s}")),
        }
    }
}

/// Outcome of one codec invocation
///
/// `pre_*` counts are always measured on the caller's original input, so
/// results from different codecs are directly comparable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecResult {
    /// Codec that produced `text`
    pub codec: CodecName,
    /// Transformed text
    pub text: String,
    /// Tokens in the original input
    pub pre_tokens: usize,
    /// Tokens in `text`
    pub post_tokens: usize,
    /// UTF-8 bytes in the original input
    pub pre_bytes: usize,
    /// UTF-8 bytes in `text`
    pub post_bytes: usize,
}

impl CodecResult {
    /// Measure a transform against its original input
    pub fn measure(
        codec: CodecName,
        original: &str,
        text: String,
        counter: &TokenCounter,
    ) -> Self {
        Self {
            codec,
            pre_tokens: counter.count(original),
            post_tokens: counter.count(&text),
            pre_bytes: byte_len(original),
            post_bytes: byte_len(&text),
            text,
        }
    }

    /// pre - post tokens (negative on expansion)
    pub fn tokens_saved(&self) -> i64 {
        self.pre_tokens as i64 - self.post_tokens as i64
    }

    /// pre - post bytes (negative on expansion)
    pub fn bytes_saved(&self) -> i64 {
        self.pre_bytes as i64 - self.post_bytes as i64
    }

    /// Token savings summary
    pub fn savings(&self) -> SavingsStats {
        SavingsStats::from_counts(self.pre_tokens, self.post_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_name_roundtrip() {
        for name in CodecName::all() {
            assert_eq!(name.name().parse::<CodecName>(), Ok(*name));
        }
        assert_eq!("codex".parse::<CodecName>(), Ok(CodecName::Dictionary));
        assert!("brotli".parse::<CodecName>().is_err());
    }

    #[test]
    fn test_codec_name_serde_alias() {
        let name: CodecName = serde_json::from_str(r#""codex""#).unwrap();
        assert_eq!(name, CodecName::Dictionary);
        assert_eq!(serde_json::to_string(&CodecName::Off).unwrap(), r#""off""#);
    }

    #[test]
    fn test_measure() {
        let counter = TokenCounter::default();
        let result = CodecResult::measure(
            CodecName::Bracket,
            "one  two   three",
            "one[s2]two[s3]three".to_string(),
            &counter,
        );
        assert_eq!(result.pre_tokens, 3);
        assert_eq!(result.post_tokens, 1);
        assert_eq!(result.pre_bytes, 16);
        assert_eq!(result.post_bytes, 19);
        assert_eq!(result.tokens_saved(), 2);
        assert_eq!(result.bytes_saved(), -3);
    }
}
