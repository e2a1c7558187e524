//! Token counting utilities.
//!
//! Token counts in this crate are approximate proxies, not a tokenizer
//! contract. Every codec measures its input and output with the same
//! [`TokenMetric`], so results stay comparable.
//!
//! # Metrics
//!
//! - **words** (default): whitespace-delimited words
//! - **heuristic**: ~4 bytes per token
//! - **cl100k_base** / **o200k_base**: exact BPE counts via tiktoken-rs
//!
//! # Example
//!
//! ```
//! use crux::tokenizer::{count_tokens, count_tokens_with, TokenMetric};
//!
//! assert_eq!(count_tokens("lorem ipsum dolor"), 3);
//! let bpe = count_tokens_with("lorem ipsum dolor", TokenMetric::Cl100kBase);
//! assert!(bpe > 0);
//! ```

mod counter;

pub use counter::{
    byte_len, count_tokens, count_tokens_with, SavingsStats, TokenCounter, TokenMetric,
};
