//! Bracket codec.
//!
//! Two variants:
//!
//! | Mode        | Transform                                            | Reversible |
//! |-------------|------------------------------------------------------|------------|
//! | `markers`   | `␠␠␠` → `[s3]`, `\n\n` → `[n2]`, `!!!` → `[p!3]`     | yes        |
//! | `normalize` | collapse whitespace, tighten punctuation spacing     | no         |
//!
//! Bytes inside words are never touched.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{CruxError, Result};

/// Expanded runs longer than this are left as literal markers
const MAX_RUN: usize = 1 << 20;

lazy_static! {
    static ref MARKER: Regex =
        Regex::new(r"\[s(\d+)\]|\[n(\d+)\]|\[p([.!?])(\d+)\]").expect("bracket marker regex");
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("whitespace regex");
    static ref SPACE_BEFORE_PUNCT: Regex =
        Regex::new(r" +([,.;:!?])").expect("punctuation spacing regex");
}

/// Bracket codec variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BracketMode {
    /// Reversible run markers
    #[default]
    Markers,
    /// Whitespace normalization (lossy)
    Normalize,
}

/// Bracket codec
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketCodec {
    /// Variant
    pub mode: BracketMode,
}

impl BracketCodec {
    /// Create a bracket codec with the given mode
    pub fn new(mode: BracketMode) -> Self {
        Self { mode }
    }

    /// Encode text
    ///
    /// # Example
    /// ```
    /// use crux::codec::{BracketCodec, BracketMode};
    ///
    /// let codec = BracketCodec::new(BracketMode::Markers);
    /// assert_eq!(codec.encode("wait...  what?!\n\n\nok"), "wait[p.3][s2]what?![n3]ok");
    ///
    /// let codec = BracketCodec::new(BracketMode::Normalize);
    /// assert_eq!(codec.encode("  a   b ,  c  "), "a b, c");
    /// ```
    pub fn encode(&self, text: &str) -> String {
        match self.mode {
            BracketMode::Markers => encode_markers(text),
            BracketMode::Normalize => normalize(text),
        }
    }

    /// Expand run markers back to the original text
    pub fn expand(&self, encoded: &str) -> Result<String> {
        if self.mode == BracketMode::Normalize {
            return Err(CruxError::Decode(
                "normalize mode is not reversible".to_string(),
            ));
        }

        Ok(MARKER
            .replace_all(encoded, |caps: &Captures| expand_marker(caps))
            .into_owned())
    }
}

fn encode_markers(text: &str) -> String {
    // Literal marker text in the input would make expansion ambiguous
    if MARKER.is_match(text) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }

        match c {
            ' ' if run >= 2 => out.push_str(&format!("[s{run}]")),
            '\n' if run >= 2 => out.push_str(&format!("[n{run}]")),
            '.' | '!' | '?' if run >= 2 => out.push_str(&format!("[p{c}{run}]")),
            _ => out.extend(std::iter::repeat(c).take(run)),
        }
    }

    out
}

fn expand_marker(caps: &Captures) -> String {
    let (unit, count) = if let Some(n) = caps.get(1) {
        (' ', n.as_str())
    } else if let Some(n) = caps.get(2) {
        ('\n', n.as_str())
    } else {
        let punct = caps
            .get(3)
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or('.');
        (punct, caps.get(4).map_or("", |m| m.as_str()))
    };

    match count.parse::<usize>() {
        Ok(n) if n <= MAX_RUN => std::iter::repeat(unit).take(n).collect(),
        _ => caps[0].to_string(),
    }
}

fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text.trim(), " ");
    SPACE_BEFORE_PUNCT
        .replace_all(&collapsed, "$1")
        .into_owned()
}
