//! Token counting implementation.
//!
//! The default metric is a whitespace word count, which is cheap and stable
//! across model families. Exact BPE counts via tiktoken-rs are opt-in.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

// Lazy-loaded tokenizer instances (thread-safe singletons).
// `None` records a load failure so we fall back to the heuristic once.
static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static O200K: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn get_cl100k() -> Option<&'static CoreBPE> {
    CL100K
        .get_or_init(|| match cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                tracing::warn!("Failed to load cl100k_base tokenizer: {e}, using heuristic");
                None
            },
        })
        .as_ref()
}

fn get_o200k() -> Option<&'static CoreBPE> {
    O200K
        .get_or_init(|| match o200k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                tracing::warn!("Failed to load o200k_base tokenizer: {e}, using heuristic");
                None
            },
        })
        .as_ref()
}

/// Token counting metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenMetric {
    /// Whitespace-delimited words
    #[default]
    Words,
    /// ~4 bytes per token
    Heuristic,
    /// OpenAI cl100k_base (GPT-3.5, GPT-4)
    Cl100kBase,
    /// OpenAI o200k_base (GPT-4o, o1, o3)
    O200kBase,
}

impl TokenMetric {
    /// Get metric name as string
    pub fn name(&self) -> &'static str {
        match self {
            TokenMetric::Words => "words",
            TokenMetric::Heuristic => "heuristic",
            TokenMetric::Cl100kBase => "cl100k_base",
            TokenMetric::O200kBase => "o200k_base",
        }
    }
}

impl std::str::FromStr for TokenMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "words" | "word" => Ok(Self::Words),
            "heuristic" => Ok(Self::Heuristic),
            "cl100k" | "cl100k_base" => Ok(Self::Cl100kBase),
            "o200k" | "o200k_base" => Ok(Self::O200kBase),
            _ => Err(format!("Unknown token metric: {s}")),
        }
    }
}

/// Count tokens using the default metric (whitespace words)
///
/// # Example
/// ```
/// use crux::tokenizer::count_tokens;
///
/// assert_eq!(count_tokens("Hello,   world!\n"), 2);
/// assert_eq!(count_tokens("   "), 0);
/// ```
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count tokens with a specific metric
pub fn count_tokens_with(text: &str, metric: TokenMetric) -> usize {
    match metric {
        TokenMetric::Words => count_tokens(text),
        TokenMetric::Heuristic => heuristic_count(text),
        TokenMetric::Cl100kBase => get_cl100k()
            .map(|bpe| bpe.encode_with_special_tokens(text).len())
            .unwrap_or_else(|| heuristic_count(text)),
        TokenMetric::O200kBase => get_o200k()
            .map(|bpe| bpe.encode_with_special_tokens(text).len())
            .unwrap_or_else(|| heuristic_count(text)),
    }
}

/// UTF-8 byte length
pub fn byte_len(text: &str) -> usize {
    text.len()
}

/// Heuristic token count (~4 bytes per token, rounded up)
fn heuristic_count(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Token counter bound to one metric
///
/// # Example
/// ```
/// use crux::tokenizer::{TokenCounter, TokenMetric};
///
/// let counter = TokenCounter::new(TokenMetric::Words);
/// assert_eq!(counter.count("one two three"), 3);
/// assert_eq!(counter.count_many(&["a b", "c"]), 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCounter {
    metric: TokenMetric,
}

impl TokenCounter {
    /// Create a counter with the specified metric
    pub fn new(metric: TokenMetric) -> Self {
        Self { metric }
    }

    /// Count tokens in text
    pub fn count(&self, text: &str) -> usize {
        count_tokens_with(text, self.metric)
    }

    /// Count tokens in multiple texts
    pub fn count_many(&self, texts: &[&str]) -> usize {
        texts.iter().map(|t| self.count(t)).sum()
    }

    /// Get the metric used by this counter
    pub fn metric(&self) -> TokenMetric {
        self.metric
    }
}

/// Savings derived from a pre/post token pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingsStats {
    /// pre - post (negative on expansion)
    pub tokens_saved: i64,
    /// Saved tokens as percent of pre (0 when pre is 0)
    pub saved_pct: f64,
    /// pre / post (1 when either side is 0)
    pub ratio: f64,
}

impl SavingsStats {
    /// Compute savings for a pre/post token pair
    pub fn from_counts(pre: usize, post: usize) -> Self {
        let tokens_saved = pre as i64 - post as i64;
        let saved_pct = if pre == 0 {
            0.0
        } else {
            tokens_saved as f64 / pre as f64 * 100.0
        };
        let ratio = if pre == 0 || post == 0 {
            1.0
        } else {
            pre as f64 / post as f64
        };

        Self {
            tokens_saved,
            saved_pct,
            ratio,
        }
    }
}
