//! # Crux - Token-Efficient Prompt Compression
//!
//! Decides, for text headed to a language model, whether and how to shrink
//! it before sending, and records an auditable account of every decision.
//!
//! ## Features
//!
//! - **Model classes**: efficient / balanced / resistant, from the model id
//! - **Prequalification**: cheap rejection of short, code, URL or NUL input
//! - **Multi-codec compression**: hex, bracket, dictionary and best-of hybrid
//! - **Benefit gate**: only strictly smaller output, at least 10% fewer tokens
//! - **Validated telemetry**: saved counts always equal pre minus post
//! - **Response protocol**: acronym-compact replies with explicit bypass
//!
//! ## Pipeline
//!
//! ```text
//!   text, model
//!       │
//!       v
//!  [Classify] ──> [Prequalify] ──┬── resistant / ineligible ──> bypass (codec off)
//!                                │
//!                                v
//!                          [Codec suite] ──> [Benefit gate] ──> serve | bypass
//!                                                                   │
//!                                                                   v
//!                                                     [Telemetry validate] ──> sink
//! ```
//!
//! ### Codecs
//!
//! | Codec        | Output                                  | Picked for                    |
//! |--------------|-----------------------------------------|-------------------------------|
//! | `hex`        | `48 69 21`                              | hybrid candidate only         |
//! | `bracket`    | `[s3]` / `[n2]` / `[p.3]` run markers   | balanced prose                |
//! | `dictionary` | `⟦dict:⟦0⟧:word⟧⟦0⟧ ...`                | code-heavy content            |
//! | `hybrid`     | fewest tokens of the above              | efficient models              |
//!
//! ### Gate reasons
//!
//! | Reason                              | Meaning                          |
//! |-------------------------------------|----------------------------------|
//! | `beneficial`                        | served                           |
//! | `expansion_or_no_gain`              | post tokens >= pre tokens        |
//! | `Efficiency too low (X% < 10.0%)`   | below the efficiency floor       |
//! | `no_input_tokens`                   | nothing to compress              |
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use crux::{CompressOptions, Orchestrator};
//! use crux::telemetry::MemorySink;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let sink = Arc::new(MemorySink::default());
//! let orchestrator = Orchestrator::default().with_sink(sink.clone());
//!
//! let text = "Status:   all   systems   nominal...   ".repeat(12);
//! let decision = orchestrator
//!     .compress(&text, &CompressOptions::new("gpt-4o"))
//!     .await
//!     .unwrap();
//!
//! assert!(decision.used);
//! assert_eq!(decision.reason, "beneficial");
//! assert_eq!(sink.len(), 1);
//! # });
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: Orchestrator, call options, decisions
//! - [`codec`]: Codecs, engine, external transform hook
//! - [`prequal`]: Input prequalification
//! - [`gate`]: Benefit gate
//! - [`telemetry`]: Records, validation, sinks, aggregate stats
//! - [`models`]: Efficiency classes and provider inference
//! - [`tokenizer`]: Token proxy and exact BPE counting
//! - [`protocol`]: Response compaction directive and reply handling
//! - [`semantic`]: Density-shift tripwire
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod codec;
pub mod config;
pub mod error;
pub mod gate;
pub mod models;
mod patterns;
pub mod pipeline;
pub mod prequal;
pub mod protocol;
pub mod semantic;
pub mod telemetry;
pub mod tokenizer;

// Re-exports for convenience
pub use codec::{CodecEngine, CodecName, CodecResult, TextTransformer};
pub use config::Config;
pub use error::{CruxError, Result};
pub use models::{classify, EfficiencyClass, Provider};
pub use pipeline::{CompressOptions, CompressionDecision, Decision, Orchestrator};
pub use protocol::{ResponseProtocol, ResponseStyle};
pub use telemetry::{TelemetryRecord, TelemetrySink, TelemetryViolation};
pub use tokenizer::{count_tokens, TokenCounter, TokenMetric};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
