//! Dictionary codec (a.k.a. codex).
//!
//! Finds words (`[A-Za-z0-9_]+`) of at least `min_token_len` characters that
//! occur at least `min_occurrences` times, gives each a short index marker in
//! first-occurrence order, and prepends a recovery header:
//!
//! ```text
//! ⟦dict:⟦0⟧:compress|⟦1⟧:message⟧⟦0⟧ the ⟦1⟧, ⟦0⟧ every ⟦1⟧ ...
//! ```
//!
//! The output is self-describing: [`DictionaryCodec::decode`] needs nothing
//! but the encoded text. Inputs that already contain `⟦` or `⟧` are left
//! unchanged, as are inputs with no repeated words.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::config::DictionaryConfig;
use crate::error::{CruxError, Result};
use crate::patterns::WORD;

/// Recovery header prefix
pub const DICT_HEADER_PREFIX: &str = "⟦dict:";

const OPEN: char = '⟦';
const CLOSE: char = '⟧';

lazy_static! {
    static ref INDEX_MARKER: Regex = Regex::new(r"⟦(\d+)⟧").expect("index marker regex");
}

/// Dictionary codec
#[derive(Debug, Clone)]
pub struct DictionaryCodec {
    /// Minimum word length eligible for substitution
    pub min_token_len: usize,
    /// Minimum occurrences before a word gets an index
    pub min_occurrences: usize,
}

impl Default for DictionaryCodec {
    fn default() -> Self {
        Self::from_config(&DictionaryConfig::default())
    }
}

impl DictionaryCodec {
    /// Create new dictionary codec with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create codec from config thresholds
    pub fn from_config(config: &DictionaryConfig) -> Self {
        Self {
            min_token_len: config.min_token_len,
            min_occurrences: config.min_occurrences,
        }
    }

    /// Words that would receive an index, in first-occurrence order
    pub fn build_dictionary(&self, text: &str) -> Vec<String> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for m in WORD.find_iter(text) {
            let word = m.as_str();
            if word.chars().count() < self.min_token_len {
                continue;
            }
            let count = counts.entry(word).or_insert(0);
            if *count == 0 {
                order.push(word);
            }
            *count += 1;
        }

        order
            .into_iter()
            .filter(|w| counts.get(w).copied().unwrap_or(0) >= self.min_occurrences)
            .map(str::to_string)
            .collect()
    }

    /// Encode text, or return it unchanged when nothing repeats
    ///
    /// # Example
    /// ```
    /// use crux::codec::DictionaryCodec;
    ///
    /// let codec = DictionaryCodec::new();
    /// let text = "token token token and more token";
    /// let encoded = codec.encode(text);
    /// assert_eq!(encoded, "⟦dict:⟦0⟧:token⟧⟦0⟧ ⟦0⟧ ⟦0⟧ and more ⟦0⟧");
    /// assert_eq!(codec.decode(&encoded).unwrap(), text);
    /// ```
    pub fn encode(&self, text: &str) -> String {
        if text.contains(OPEN) || text.contains(CLOSE) {
            return text.to_string();
        }

        let dictionary = self.build_dictionary(text);
        if dictionary.is_empty() {
            return text.to_string();
        }

        let index: HashMap<&str, usize> = dictionary
            .iter()
            .enumerate()
            .map(|(i, w)| (w.as_str(), i))
            .collect();

        let body = WORD.replace_all(text, |caps: &Captures| match index.get(&caps[0]) {
            Some(i) => format!("{OPEN}{i}{CLOSE}"),
            None => caps[0].to_string(),
        });

        let header = dictionary
            .iter()
            .enumerate()
            .map(|(i, w)| format!("{OPEN}{i}{CLOSE}:{w}"))
            .collect::<Vec<_>>()
            .join("|");

        format!("{DICT_HEADER_PREFIX}{header}{CLOSE}{body}")
    }

    /// Check whether text carries a recovery header
    pub fn is_encoded(text: &str) -> bool {
        text.starts_with(DICT_HEADER_PREFIX)
    }

    /// Reverse [`encode`](Self::encode). Text without a header is returned as-is.
    pub fn decode(&self, encoded: &str) -> Result<String> {
        let Some(rest) = encoded.strip_prefix(DICT_HEADER_PREFIX) else {
            return Ok(encoded.to_string());
        };

        let (entries, body) = parse_header(rest)?;

        let mut missing = None;
        let decoded = INDEX_MARKER.replace_all(body, |caps: &Captures| {
            let value = caps[1].parse::<usize>().ok().and_then(|i| entries.get(i));
            match value {
                Some(word) => word.clone(),
                None => {
                    missing.get_or_insert_with(|| caps[0].to_string());
                    caps[0].to_string()
                },
            }
        });

        match missing {
            Some(marker) => Err(CruxError::Decode(format!(
                "Unknown dictionary index {marker}"
            ))),
            None => Ok(decoded.into_owned()),
        }
    }
}

/// Parse `⟦0⟧:word|⟦1⟧:word⟧` from the start of `rest`.
///
/// Returns the entries indexed by position and the remaining body.
fn parse_header(rest: &str) -> Result<(Vec<String>, &str)> {
    let malformed = |why: &str| CruxError::Decode(format!("Malformed dictionary header: {why}"));
    let mut entries = Vec::new();
    let mut cursor = rest;

    loop {
        cursor = cursor
            .strip_prefix(OPEN)
            .ok_or_else(|| malformed("expected index marker"))?;
        let close = cursor
            .find(CLOSE)
            .ok_or_else(|| malformed("unterminated index"))?;
        let idx: usize = cursor[..close]
            .parse()
            .map_err(|_| malformed("non-numeric index"))?;
        if idx != entries.len() {
            return Err(malformed("indices out of order"));
        }
        cursor = cursor[close + CLOSE.len_utf8()..]
            .strip_prefix(':')
            .ok_or_else(|| malformed("expected ':'"))?;

        let word_len = cursor
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(cursor.len());
        if word_len == 0 {
            return Err(malformed("empty value"));
        }
        entries.push(cursor[..word_len].to_string());
        cursor = &cursor[word_len..];

        if let Some(next) = cursor.strip_prefix('|') {
            cursor = next;
        } else if let Some(body) = cursor.strip_prefix(CLOSE) {
            return Ok((entries, body));
        } else {
            return Err(malformed("expected '|' or end of header"));
        }
    }
}
