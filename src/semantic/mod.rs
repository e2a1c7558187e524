//! Semantic guard.
//!
//! Cheap signals for spotting a compression that may have changed meaning.
//! This is a tripwire for external review, not an equivalence check, and
//! the pipeline never consults it when deciding to serve.

use serde::Serialize;

use crate::config::SemanticConfig;
use crate::patterns::{FENCED_CODE, MATH, URL};
use crate::tokenizer::count_tokens;

/// Default relative density change that flags a pair
pub const DEFAULT_DENSITY_SHIFT_THRESHOLD: f64 = 0.5;

/// Reason reported for a density shift
pub const REASON_DENSITY_SHIFT: &str = "density_shift";

/// Signals computed from one text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SemanticContext {
    /// Digits or arithmetic operators present
    pub has_math: bool,
    /// Fenced code block present
    pub has_code: bool,
    /// `http(s)://` URL present
    pub has_urls: bool,
    /// Characters per word (words floored at 1)
    pub density: f64,
}

/// Outcome of comparing two contexts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticVerdict {
    /// No shift detected
    pub safe: bool,
    /// Why the pair was flagged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Compute signals for a text
pub fn analyze(text: &str) -> SemanticContext {
    let words = count_tokens(text).max(1);
    SemanticContext {
        has_math: MATH.is_match(text),
        has_code: FENCED_CODE.is_match(text),
        has_urls: URL.is_match(text),
        density: text.chars().count() as f64 / words as f64,
    }
}

/// Semantic guard with a configurable threshold
#[derive(Debug, Clone, Copy)]
pub struct SemanticGuard {
    /// Relative density change above which a pair is unsafe
    pub density_shift_threshold: f64,
}

impl Default for SemanticGuard {
    fn default() -> Self {
        Self {
            density_shift_threshold: DEFAULT_DENSITY_SHIFT_THRESHOLD,
        }
    }
}

impl SemanticGuard {
    /// Build from configuration
    pub fn from_config(config: &SemanticConfig) -> Self {
        Self {
            density_shift_threshold: config.density_shift_threshold,
        }
    }

    /// Compute signals for a text
    pub fn analyze(&self, text: &str) -> SemanticContext {
        analyze(text)
    }

    /// Compare a text's signals before and after transformation
    ///
    /// # Example
    /// ```
    /// use crux::semantic::{analyze, SemanticGuard};
    ///
    /// let guard = SemanticGuard::default();
    /// let before = analyze(&"a ".repeat(200));
    /// let after = analyze(&"x".repeat(35).repeat(10));
    /// let verdict = guard.compare(&before, &after);
    /// assert!(!verdict.safe);
    /// assert_eq!(verdict.reason.as_deref(), Some("density_shift"));
    /// ```
    pub fn compare(&self, before: &SemanticContext, after: &SemanticContext) -> SemanticVerdict {
        let shift = if before.density == 0.0 {
            if after.density == 0.0 {
                0.0
            } else {
                f64::INFINITY
            }
        } else {
            (after.density - before.density).abs() / before.density
        };

        if shift > self.density_shift_threshold {
            SemanticVerdict {
                safe: false,
                reason: Some(REASON_DENSITY_SHIFT.to_string()),
            }
        } else {
            SemanticVerdict {
                safe: true,
                reason: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_signals() {
        let ctx = analyze("see https://x.io and ```code``` for 2+2");
        assert!(ctx.has_math);
        assert!(ctx.has_code);
        assert!(ctx.has_urls);

        let plain = analyze("just words here");
        assert!(!plain.has_math && !plain.has_code && !plain.has_urls);
        assert!((plain.density - 15.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_density() {
        assert_eq!(analyze("").density, 0.0);
        let guard = SemanticGuard::default();
        assert!(guard.compare(&analyze(""), &analyze("")).safe);
        assert!(!guard.compare(&analyze(""), &analyze("word")).safe);
    }

    #[test]
    fn test_small_shift_is_safe() {
        let guard = SemanticGuard::default();
        let before = analyze("the cat sat on the mat today");
        let after = analyze("the cat sat on mat today");
        assert!(guard.compare(&before, &after).safe);
    }

    #[test]
    fn test_threshold_from_config() {
        let guard = SemanticGuard::from_config(&SemanticConfig {
            density_shift_threshold: 1000.0,
        });
        let before = analyze(&"a ".repeat(200));
        let after = analyze(&"x".repeat(35).repeat(10));
        assert!(guard.compare(&before, &after).safe);
    }
}
