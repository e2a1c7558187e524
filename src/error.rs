//! Crux error types.
//!
//! # Error Classification
//!
//! Most outcomes of the compression pipeline are *not* errors:
//!
//! - **Input-shape rejection** (prequalification) and **gate rejection** are
//!   expected and surface as a `bypass` decision with a reason string.
//! - **External transformer failure** is recovered locally by degrading the
//!   dictionary codec to identity; it is logged, never returned.
//!
//! What remains here are contract violations by the caller (malformed
//! options, bad configuration) and the single fatal pipeline condition:
//! a telemetry record whose numbers do not add up.
//!
//! The `Telemetry` variant preserves the violated invariant via `#[source]`
//! so that tools like `anyhow` can display the full chain.

use thiserror::Error;

use crate::telemetry::TelemetryViolation;

/// Crux errors.
#[derive(Error, Debug)]
pub enum CruxError {
    /// Call options are malformed (e.g. empty model id).
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A telemetry candidate violated a structural or arithmetic invariant.
    #[error("Telemetry rejected: {0}")]
    Telemetry(#[source] TelemetryViolation),

    /// External text transformer reported a failure.
    #[error("Transform error: {0}")]
    Transform(String),

    /// External text transformer exceeded its time budget.
    #[error("Transform timed out after {0} ms")]
    TransformTimeout(u64),

    /// External text transformer was cancelled by the caller.
    #[error("Transform cancelled")]
    TransformCancelled,

    /// Reversing a codec output failed.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Crux operations
pub type Result<T> = std::result::Result<T, CruxError>;

impl From<TelemetryViolation> for CruxError {
    fn from(err: TelemetryViolation) -> Self {
        CruxError::Telemetry(err)
    }
}

impl From<toml::de::Error> for CruxError {
    fn from(err: toml::de::Error) -> Self {
        CruxError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_telemetry_error_keeps_source() {
        let err = CruxError::from(TelemetryViolation::TokensSavedMismatch {
            expected: 5,
            actual: 0,
        });
        assert!(err.to_string().starts_with("Telemetry rejected"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let err: CruxError = toml::from_str::<toml::Value>("= broken")
            .unwrap_err()
            .into();
        assert!(matches!(err, CruxError::Config(_)));
    }
}
