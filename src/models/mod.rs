//! Target model metadata.
//!
//! This module answers two questions about the model a payload is headed to:
//! - How well does it tolerate compressed input? ([`EfficiencyClass`])
//! - Who serves it? ([`Provider`], used to fill telemetry)
//!
//! # Example
//!
//! ```
//! use crux::models::{classify, EfficiencyClass, Provider};
//!
//! assert_eq!(classify("gpt-3.5-turbo"), EfficiencyClass::Efficient);
//! assert_eq!(classify("gpt-4o"), EfficiencyClass::Balanced);
//! assert_eq!(classify("some-new-model"), EfficiencyClass::Resistant);
//! assert_eq!(Provider::from_model_id("gpt-4o"), Provider::OpenAI);
//! ```

mod class;
mod provider;

pub use class::{classify, EfficiencyClass, ModelClassifier};
pub use provider::Provider;
