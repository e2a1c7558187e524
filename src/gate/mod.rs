//! Benefit gate.
//!
//! Serves a compressed text only when it strictly reduces tokens by at
//! least the efficiency floor (default 10%).

use serde::{Deserialize, Serialize};

/// Default efficiency floor (fraction of pre tokens)
pub const DEFAULT_EFFICIENCY_FLOOR: f64 = 0.10;

/// Reason for zero-token input
pub const REASON_NO_INPUT_TOKENS: &str = "no_input_tokens";
/// Reason for expansion or equal token count
pub const REASON_EXPANSION: &str = "expansion_or_no_gain";
/// Reason for a served result
pub const REASON_BENEFICIAL: &str = "beneficial";

/// Gate outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitVerdict {
    /// Serve the compressed text
    pub should_serve: bool,
    /// (pre - post) / pre * 100, 0 when pre is 0
    pub efficiency_percent: f64,
    /// Human-readable reason
    pub reason: String,
}

/// Benefit gate
#[derive(Debug, Clone, Copy)]
pub struct BenefitGate {
    /// Minimum fractional token reduction
    pub efficiency_floor: f64,
}

impl Default for BenefitGate {
    fn default() -> Self {
        Self {
            efficiency_floor: DEFAULT_EFFICIENCY_FLOOR,
        }
    }
}

impl BenefitGate {
    /// Create gate with the given floor (fraction, e.g. 0.10)
    pub fn new(efficiency_floor: f64) -> Self {
        Self { efficiency_floor }
    }

    /// Decide from pre/post token counts
    ///
    /// # Example
    /// ```
    /// use crux::gate::BenefitGate;
    ///
    /// let gate = BenefitGate::default();
    /// assert!(gate.decide(100, 80).should_serve);
    /// assert_eq!(gate.decide(100, 95).reason, "Efficiency too low (5.0% < 10.0%)");
    /// assert_eq!(gate.decide(100, 100).reason, "expansion_or_no_gain");
    /// ```
    pub fn decide(&self, pre_tokens: usize, post_tokens: usize) -> BenefitVerdict {
        if pre_tokens == 0 {
            return BenefitVerdict {
                should_serve: false,
                efficiency_percent: 0.0,
                reason: REASON_NO_INPUT_TOKENS.to_string(),
            };
        }

        let efficiency = (pre_tokens as f64 - post_tokens as f64) / pre_tokens as f64;
        let efficiency_percent = efficiency * 100.0;

        if post_tokens >= pre_tokens {
            return BenefitVerdict {
                should_serve: false,
                efficiency_percent,
                reason: REASON_EXPANSION.to_string(),
            };
        }

        if efficiency < self.efficiency_floor {
            return BenefitVerdict {
                should_serve: false,
                efficiency_percent,
                reason: format!(
                    "Efficiency too low ({:.1}% < {:.1}%)",
                    efficiency_percent,
                    self.efficiency_floor * 100.0
                ),
            };
        }

        BenefitVerdict {
            should_serve: true,
            efficiency_percent,
            reason: REASON_BENEFICIAL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_tokens() {
        let v = BenefitGate::default().decide(0, 0);
        assert!(!v.should_serve);
        assert_eq!(v.reason, REASON_NO_INPUT_TOKENS);
        assert_eq!(v.efficiency_percent, 0.0);
    }

    #[test]
    fn test_expansion() {
        let gate = BenefitGate::default();
        assert_eq!(gate.decide(10, 10).reason, REASON_EXPANSION);
        let v = gate.decide(10, 30);
        assert!(!v.should_serve);
        assert_eq!(v.reason, REASON_EXPANSION);
        assert!(v.efficiency_percent < 0.0);
    }

    #[test]
    fn test_floor_boundary() {
        let gate = BenefitGate::default();
        assert!(gate.decide(10, 9).should_serve); // exactly 10%
        let v = gate.decide(11, 10);
        assert!(!v.should_serve);
        assert_eq!(v.reason, "Efficiency too low (9.1% < 10.0%)");
    }

    #[test]
    fn test_beneficial() {
        let v = BenefitGate::default().decide(200, 100);
        assert!(v.should_serve);
        assert_eq!(v.reason, REASON_BENEFICIAL);
        assert!((v.efficiency_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_floor() {
        let gate = BenefitGate::new(0.5);
        assert!(!gate.decide(100, 60).should_serve);
        assert!(gate.decide(100, 50).should_serve);
    }
}
