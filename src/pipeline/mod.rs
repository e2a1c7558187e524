//! Compression decision pipeline.
//!
//! ```text
//! model ─► classify ─► prequalify ─┬─► bypass (resistant / ineligible)
//!                                  └─► codec ─► gate ─► serve | bypass
//!                                                          │
//!                                                  telemetry validate ─► sink
//! ```
//!
//! # Example
//!
//! ```
//! use crux::pipeline::{CompressOptions, Orchestrator};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let orchestrator = Orchestrator::default();
//! let decision = orchestrator
//!     .compress("short", &CompressOptions::new("gpt-4o"))
//!     .await
//!     .unwrap();
//! assert!(decision.is_bypass());
//! assert_eq!(decision.reason, "too_short");
//! assert_eq!(decision.final_text, "short");
//! # });
//! ```

mod decision;
mod options;
mod orchestrator;

pub use decision::CompressionDecision;
pub use options::CompressOptions;
pub use orchestrator::{Orchestrator, REASON_RESISTANT_OR_NOOP};
pub use crate::telemetry::Decision;
