//! Input prequalification.
//!
//! Decides from the raw text alone whether compression should even be
//! attempted. Checks run in a fixed order and the first failing check
//! names the reason:
//!
//! 1. `empty` - empty or whitespace-only
//! 2. `too_short` - fewer bytes than the configured floor (default 256)
//! 3. `contains_code_block` - a fenced ```` ``` ```` block
//! 4. `contains_url` - an `http://` or `https://` URL
//! 5. `contains_null_byte` - a NUL character
//!
//! Model class plays no part here.

use serde::{Deserialize, Serialize};

use crate::patterns::{FENCED_CODE, URL};
use crate::tokenizer::byte_len;

/// Default byte floor
pub const DEFAULT_BYTE_FLOOR: usize = 256;

/// Why an input was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrequalReason {
    /// Empty or whitespace-only
    Empty,
    /// Below the byte floor
    TooShort,
    /// Fenced code block present
    ContainsCodeBlock,
    /// URL present
    ContainsUrl,
    /// NUL byte present
    ContainsNullByte,
}

impl PrequalReason {
    /// Reason string as it appears in decisions and telemetry
    pub fn as_str(&self) -> &'static str {
        match self {
            PrequalReason::Empty => "empty",
            PrequalReason::TooShort => "too_short",
            PrequalReason::ContainsCodeBlock => "contains_code_block",
            PrequalReason::ContainsUrl => "contains_url",
            PrequalReason::ContainsNullByte => "contains_null_byte",
        }
    }
}

impl std::fmt::Display for PrequalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prequalification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Compression may be attempted
    Eligible,
    /// Compression must not be attempted
    Ineligible(PrequalReason),
}

impl Verdict {
    /// Whether compression may be attempted
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible)
    }

    /// Rejection reason, if any
    pub fn reason(&self) -> Option<PrequalReason> {
        match self {
            Verdict::Eligible => None,
            Verdict::Ineligible(reason) => Some(*reason),
        }
    }
}

/// Prequalifier with a configurable byte floor
#[derive(Debug, Clone, Copy)]
pub struct Prequalifier {
    /// Minimum UTF-8 byte length for eligibility
    pub byte_floor: usize,
}

impl Default for Prequalifier {
    fn default() -> Self {
        Self {
            byte_floor: DEFAULT_BYTE_FLOOR,
        }
    }
}

impl Prequalifier {
    /// Create prequalifier with the given byte floor
    pub fn new(byte_floor: usize) -> Self {
        Self { byte_floor }
    }

    /// Check input eligibility
    pub fn check(&self, text: &str) -> Verdict {
        if text.trim().is_empty() {
            return Verdict::Ineligible(PrequalReason::Empty);
        }
        if byte_len(text) < self.byte_floor {
            return Verdict::Ineligible(PrequalReason::TooShort);
        }
        if FENCED_CODE.is_match(text) {
            return Verdict::Ineligible(PrequalReason::ContainsCodeBlock);
        }
        if URL.is_match(text) {
            return Verdict::Ineligible(PrequalReason::ContainsUrl);
        }
        if text.contains('\0') {
            return Verdict::Ineligible(PrequalReason::ContainsNullByte);
        }
        Verdict::Eligible
    }
}

/// Check input eligibility with the default byte floor
pub fn prequalify(text: &str) -> Verdict {
    Prequalifier::default().check(text)
}
