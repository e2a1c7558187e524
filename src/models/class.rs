//! Efficiency classes and the model classifier.
//!
//! Classification is a total, case-insensitive substring match of the model
//! id against known family markers. Rules are checked in a fixed order:
//!
//! 1. resistant markers (privacy / explicit opt-out)
//! 2. efficient families
//! 3. balanced families
//!
//! Anything that matches none of them is [`EfficiencyClass::Resistant`], so
//! an unknown target is never rewritten.

use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;

/// Families known to tolerate aggressive rewriting
const EFFICIENT_FAMILIES: &[&str] = &["gpt-3.5", "grok-2"];

/// General capable chat models
const BALANCED_FAMILIES: &[&str] = &["gpt-4o", "gpt-4", "code"];

/// Explicit opt-out markers
const RESISTANT_MARKERS: &[&str] = &["private", "privacy", "resistant", "local-only", "no-compress"];

/// How well a target model tolerates compressed input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyClass {
    /// Tolerates aggressive rewriting
    #[serde(alias = "e")]
    Efficient,
    /// Tolerates light rewriting
    #[serde(alias = "b")]
    Balanced,
    /// Never rewrite input for this model
    #[serde(alias = "r")]
    Resistant,
}

impl EfficiencyClass {
    /// Get class name as string
    pub fn name(&self) -> &'static str {
        match self {
            EfficiencyClass::Efficient => "efficient",
            EfficiencyClass::Balanced => "balanced",
            EfficiencyClass::Resistant => "resistant",
        }
    }

    /// Single-letter code used in compact logs
    pub fn code(&self) -> char {
        match self {
            EfficiencyClass::Efficient => 'e',
            EfficiencyClass::Balanced => 'b',
            EfficiencyClass::Resistant => 'r',
        }
    }

    /// All classes
    pub fn all() -> &'static [EfficiencyClass] {
        &[
            EfficiencyClass::Efficient,
            EfficiencyClass::Balanced,
            EfficiencyClass::Resistant,
        ]
    }
}

impl std::fmt::Display for EfficiencyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for EfficiencyClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "efficient" | "e" => Ok(Self::Efficient),
            "balanced" | "b" => Ok(Self::Balanced),
            "resistant" | "r" => Ok(Self::Resistant),
            _ => Err(format!("Unknown efficiency class: {s}")),
        }
    }
}

/// Model id → efficiency class
///
/// # Example
/// ```
/// use crux::models::{EfficiencyClass, ModelClassifier};
///
/// let classifier = ModelClassifier::new();
/// assert_eq!(classifier.classify("gpt-3.5-turbo"), EfficiencyClass::Efficient);
/// assert_eq!(classifier.classify("openai/gpt-4o-mini"), EfficiencyClass::Balanced);
/// assert_eq!(classifier.classify("my-special"), EfficiencyClass::Resistant);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelClassifier {
    extra_efficient: Vec<String>,
    extra_balanced: Vec<String>,
    extra_resistant: Vec<String>,
}

impl ModelClassifier {
    /// Classifier with the built-in rules only
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier with built-in rules plus configured markers
    pub fn from_config(config: &ClassifierConfig) -> Self {
        let lower = |v: &[String]| v.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>();
        Self {
            extra_efficient: lower(&config.efficient),
            extra_balanced: lower(&config.balanced),
            extra_resistant: lower(&config.resistant),
        }
    }

    /// Classify a model id. Total: every string maps to exactly one class.
    pub fn classify(&self, model_id: &str) -> EfficiencyClass {
        let id = model_id.to_lowercase();
        let hit = |builtin: &[&str], extra: &[String]| {
            builtin.iter().any(|m| id.contains(m)) || extra.iter().any(|m| id.contains(m.as_str()))
        };

        if hit(RESISTANT_MARKERS, &self.extra_resistant) {
            EfficiencyClass::Resistant
        } else if hit(EFFICIENT_FAMILIES, &self.extra_efficient) {
            EfficiencyClass::Efficient
        } else if hit(BALANCED_FAMILIES, &self.extra_balanced) {
            EfficiencyClass::Balanced
        } else {
            EfficiencyClass::Resistant
        }
    }
}

/// Classify with the built-in rules
pub fn classify(model_id: &str) -> EfficiencyClass {
    ModelClassifier::new().classify(model_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_families() {
        assert_eq!(classify("gpt-3.5-turbo"), EfficiencyClass::Efficient);
        assert_eq!(classify("x-ai/grok-2-1212"), EfficiencyClass::Efficient);
        assert_eq!(classify("gpt-4o-mini"), EfficiencyClass::Balanced);
        assert_eq!(classify("openai/gpt-4-turbo"), EfficiencyClass::Balanced);
        assert_eq!(classify("qwen-2.5-coder-32b"), EfficiencyClass::Balanced);
        assert_eq!(classify("unknown-model"), EfficiencyClass::Resistant);
        assert_eq!(classify(""), EfficiencyClass::Resistant);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("GPT-3.5-TURBO"), EfficiencyClass::Efficient);
        assert_eq!(classify("OpenAI/GPT-4o"), EfficiencyClass::Balanced);
    }

    #[test]
    fn test_resistant_markers_win() {
        assert_eq!(classify("gpt-4o-private"), EfficiencyClass::Resistant);
        assert_eq!(classify("gpt-3.5-no-compress"), EfficiencyClass::Resistant);
    }

    #[test]
    fn test_configured_markers() {
        let config = ClassifierConfig {
            efficient: vec!["Mistral".to_string()],
            balanced: vec!["claude".to_string()],
            resistant: vec!["gpt-4o-audit".to_string()],
        };
        let classifier = ModelClassifier::from_config(&config);

        assert_eq!(classifier.classify("mistral-small"), EfficiencyClass::Efficient);
        assert_eq!(classifier.classify("claude-3-5-sonnet"), EfficiencyClass::Balanced);
        assert_eq!(classifier.classify("gpt-4o-audit"), EfficiencyClass::Resistant);
        // built-ins still apply
        assert_eq!(classifier.classify("gpt-3.5"), EfficiencyClass::Efficient);
    }

    #[test]
    fn test_class_from_str() {
        assert_eq!("e".parse::<EfficiencyClass>(), Ok(EfficiencyClass::Efficient));
        assert_eq!("Balanced".parse::<EfficiencyClass>(), Ok(EfficiencyClass::Balanced));
        assert!("fast".parse::<EfficiencyClass>().is_err());
    }

    #[test]
    fn test_class_serde_aliases() {
        let class: EfficiencyClass = serde_json::from_str(r#""r""#).unwrap();
        assert_eq!(class, EfficiencyClass::Resistant);
        assert_eq!(
            serde_json::to_string(&EfficiencyClass::Efficient).unwrap(),
            r#""efficient""#
        );
    }
}
