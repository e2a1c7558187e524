//! Compression telemetry.
//!
//! Every decision produces one [`TelemetryRecord`]. Records are validated
//! before any sink sees them; a record whose saved counts disagree with its
//! pre/post counts is rejected with a named [`TelemetryViolation`].
//!
//! Sinks:
//!
//! - [`MemorySink`]: bounded ring of recent records
//! - [`TelemetryStats`]: atomic aggregate counters and latency percentiles
//! - [`TracingSink`]: structured `tracing` events
//! - [`FanoutSink`]: forwards to several sinks

mod record;
mod sink;
mod stats;
mod validator;

pub use record::{Decision, TelemetryRecord};
pub use sink::{FanoutSink, MemorySink, NullSink, TelemetrySink, TracingSink};
pub use stats::{StatsSummary, TelemetryStats};
pub use validator::{validate, validate_record, TelemetryViolation};
