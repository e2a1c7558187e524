//! Codec engine: runs a named codec and measures the result.
//!
//! The engine owns one instance of each codec, configured once from
//! [`Config`], plus the token counter used for every measurement. Callers
//! pick a codec by [`CodecName`]; `Hybrid` evaluates several and keeps the
//! cheapest.

use std::time::Duration;

use tracing::{debug, warn};

use super::hybrid::select_best;
use super::transform::{run_transform, TransformContext};
use super::{BracketCodec, CodecName, CodecResult, DictionaryCodec, HexCodec, IdentityCodec};
use crate::config::Config;
use crate::error::{CruxError, Result};
use crate::patterns::{COMMAND_ARRAY, FENCED_CODE, FUNCTION_DECL};
use crate::tokenizer::{byte_len, TokenCounter};

/// Content characteristics used for codec selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentAnalysis {
    /// UTF-8 length in bytes
    pub bytes: usize,
    /// Token count under the engine's metric
    pub tokens: usize,
    /// Contains a fenced code block
    pub has_code_block: bool,
    /// Contains a command-array assignment (`cmd = [`, `argv = [`, ...)
    pub has_command_array: bool,
    /// Contains a function declaration (`fn x(`, `def x(`, ...)
    pub has_function_decl: bool,
}

impl ContentAnalysis {
    /// Analyze content
    pub fn analyze(content: &str, counter: &TokenCounter) -> Self {
        Self {
            bytes: byte_len(content),
            tokens: counter.count(content),
            has_code_block: FENCED_CODE.is_match(content),
            has_command_array: COMMAND_ARRAY.is_match(content),
            has_function_decl: FUNCTION_DECL.is_match(content),
        }
    }

    /// Code-like content benefits from dictionary substitution
    pub fn is_code_heavy(&self) -> bool {
        self.has_code_block || self.has_command_array || self.has_function_decl
    }
}

/// Codec engine
#[derive(Debug, Clone)]
pub struct CodecEngine {
    counter: TokenCounter,
    identity: IdentityCodec,
    hex: HexCodec,
    bracket: BracketCodec,
    dictionary: DictionaryCodec,
    /// Time budget for an external transformer
    pub transform_timeout: Duration,
}

impl Default for CodecEngine {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CodecEngine {
    /// Create engine with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create engine from configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            counter: TokenCounter::new(config.compression.token_metric),
            identity: IdentityCodec,
            hex: HexCodec,
            bracket: BracketCodec::new(config.bracket.mode),
            dictionary: DictionaryCodec::from_config(&config.dictionary),
            transform_timeout: Duration::from_millis(config.compression.transform_timeout_ms),
        }
    }

    /// Set transformer time budget
    pub fn with_transform_timeout(mut self, timeout: Duration) -> Self {
        self.transform_timeout = timeout;
        self
    }

    /// Token counter used for all measurements
    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    /// Analyze content with the engine's counter
    pub fn analyze(&self, content: &str) -> ContentAnalysis {
        ContentAnalysis::analyze(content, &self.counter)
    }

    fn measure(&self, codec: CodecName, original: &str, text: String) -> CodecResult {
        CodecResult::measure(codec, original, text, &self.counter)
    }

    /// Passthrough
    pub fn identity(&self, text: &str) -> CodecResult {
        self.measure(CodecName::Identity, text, self.identity.encode(text))
    }

    /// Hex-encode
    pub fn hex(&self, text: &str) -> CodecResult {
        self.measure(CodecName::Hex, text, self.hex.encode(text))
    }

    /// Bracket-encode
    pub fn bracket(&self, text: &str) -> CodecResult {
        self.measure(CodecName::Bracket, text, self.bracket.encode(text))
    }

    /// Dictionary-encode.
    ///
    /// With an external transformer in `ctx`, its output is used instead of
    /// the built-in substitution. If the transformer fails, times out, is
    /// cancelled or returns empty text for non-empty input, the result is
    /// the unchanged input, still labelled `dictionary`.
    pub async fn dictionary(&self, text: &str, ctx: &TransformContext<'_>) -> CodecResult {
        let Some(transformer) = ctx.transformer else {
            return self.measure(CodecName::Dictionary, text, self.dictionary.encode(text));
        };

        let output = match run_transform(transformer, text, self.transform_timeout, ctx.cancel).await
        {
            Ok(out) if out.is_empty() && !text.is_empty() => {
                warn!("External transformer returned empty output, using identity");
                text.to_string()
            },
            Ok(out) => out,
            Err(e) => {
                warn!(error = %e, "External transformer failed, using identity");
                text.to_string()
            },
        };

        self.measure(CodecName::Dictionary, text, output)
    }

    /// Evaluate hex, bracket and (for code-heavy input) dictionary, keep the cheapest.
    ///
    /// The result carries the winning codec's name.
    pub async fn hybrid(&self, text: &str, ctx: &TransformContext<'_>) -> CodecResult {
        let mut candidates = vec![self.hex(text), self.bracket(text)];
        if self.analyze(text).is_code_heavy() {
            candidates.push(self.dictionary(text, ctx).await);
        }

        for c in &candidates {
            debug!(codec = %c.codec, post_tokens = c.post_tokens, "Hybrid candidate");
        }

        match select_best(candidates) {
            Some(best) => best,
            None => self.identity(text),
        }
    }

    /// Run a codec by name
    pub async fn run(&self, codec: CodecName, text: &str, ctx: &TransformContext<'_>) -> CodecResult {
        match codec {
            CodecName::Identity => self.identity(text),
            CodecName::Hex => self.hex(text),
            CodecName::Bracket => self.bracket(text),
            CodecName::Dictionary => self.dictionary(text, ctx).await,
            CodecName::Hybrid => self.hybrid(text, ctx).await,
            CodecName::Off => self.measure(CodecName::Off, text, text.to_string()),
        }
    }

    /// Reverse a codec's output.
    ///
    /// Output of an external transformer cannot be restored and is returned
    /// as-is (it carries no dictionary header).
    pub fn restore(&self, codec: CodecName, text: &str) -> Result<String> {
        match codec {
            CodecName::Identity | CodecName::Off => Ok(text.to_string()),
            CodecName::Hex => self.hex.decode(text),
            CodecName::Bracket => self.bracket.expand(text),
            CodecName::Dictionary => self.dictionary.decode(text),
            CodecName::Hybrid => Err(CruxError::Decode(
                "hybrid is a selection, restore with the winning codec".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CancelToken, TextTransformer};

    const PROSE: &str = "The   quick brown fox...   jumps over\n\n\nthe lazy dog!!!";
    const CODE: &str = "fn render(item) { render(item); render(item); render(item); }";

    #[test]
    fn test_analysis() {
        let engine = CodecEngine::new();
        let prose = engine.analyze(PROSE);
        assert!(!prose.is_code_heavy());
        assert_eq!(prose.bytes, PROSE.len());

        assert!(engine.analyze(CODE).has_function_decl);
        assert!(engine.analyze("cmd = [\"ls\", \"-la\"]").is_code_heavy());
        assert!(engine.analyze("```\nx\n```").has_code_block);
    }

    #[test]
    fn test_measurements_use_original_as_pre() {
        let engine = CodecEngine::new();
        let hex = engine.hex("Hi!");
        assert_eq!(hex.text, "48 69 21");
        assert_eq!(hex.pre_tokens, 1);
        assert_eq!(hex.post_tokens, 3);
    }

    #[tokio::test]
    async fn test_hybrid_prose_prefers_bracket() {
        let engine = CodecEngine::new();
        let result = engine.hybrid(PROSE, &TransformContext::default()).await;
        assert_eq!(result.codec, CodecName::Bracket);
        assert!(result.post_tokens < result.pre_tokens);
    }

    #[tokio::test]
    async fn test_hybrid_code_picks_dictionary() {
        let mut config = Config::default();
        config.compression.token_metric = crate::tokenizer::TokenMetric::Heuristic;
        let engine = CodecEngine::from_config(&config);

        let code = format!("cmd = [{}]", "\"deploy_service\", ".repeat(20));
        let result = engine.hybrid(&code, &TransformContext::default()).await;

        assert_eq!(result.codec, CodecName::Dictionary);
        assert_eq!(result.pre_tokens, 92);
        assert_eq!(result.post_tokens, 66);
        assert_eq!(engine.bracket(&code).post_tokens, 92);
    }

    #[tokio::test]
    async fn test_hybrid_tie_keeps_first_registered() {
        let engine = CodecEngine::new();
        let code = "def handle(request):\n    handle(request)\n    handle(request)\n    return request";
        let ctx = TransformContext::default();

        // Bracket and dictionary both leave six words
        assert_eq!(engine.bracket(code).post_tokens, 6);
        assert_eq!(engine.dictionary(code, &ctx).await.post_tokens, 6);
        assert_eq!(engine.hybrid(code, &ctx).await.codec, CodecName::Bracket);
    }

    #[tokio::test]
    async fn test_dictionary_with_transformer() {
        let engine = CodecEngine::new();
        let hook = |_: &str| -> Result<String> { Ok("short".to_string()) };
        let ctx = TransformContext {
            transformer: Some(&hook),
            cancel: None,
        };
        let result = engine.dictionary("one two three", &ctx).await;
        assert_eq!(result.codec, CodecName::Dictionary);
        assert_eq!(result.text, "short");
    }

    #[tokio::test]
    async fn test_dictionary_transformer_failure_falls_back() {
        let engine = CodecEngine::new();
        let failing = |_: &str| -> Result<String> { Err(CruxError::Transform("down".into())) };
        let empty = |_: &str| -> Result<String> { Ok(String::new()) };

        let hooks: [&dyn TextTransformer; 2] = [&failing, &empty];
        for hook in hooks {
            let ctx = TransformContext {
                transformer: Some(hook),
                cancel: None,
            };
            let result = engine.dictionary("keep me", &ctx).await;
            assert_eq!(result.codec, CodecName::Dictionary);
            assert_eq!(result.text, "keep me");
            assert_eq!(result.tokens_saved(), 0);
        }
    }

    #[tokio::test]
    async fn test_dictionary_cancelled_falls_back() {
        let engine = CodecEngine::new();
        let hook = |_: &str| -> Result<String> { Ok("x".to_string()) };
        let token = CancelToken::new();
        token.cancel();
        let ctx = TransformContext {
            transformer: Some(&hook),
            cancel: Some(&token),
        };
        assert_eq!(engine.dictionary("original", &ctx).await.text, "original");
    }

    #[tokio::test]
    async fn test_restore() {
        let engine = CodecEngine::new();
        let ctx = TransformContext::default();
        for codec in [
            CodecName::Identity,
            CodecName::Hex,
            CodecName::Bracket,
            CodecName::Dictionary,
        ] {
            let result = engine.run(codec, CODE, &ctx).await;
            assert_eq!(engine.restore(codec, &result.text).unwrap(), CODE);
        }
        assert!(engine.restore(CodecName::Hybrid, CODE).is_err());
    }
}
