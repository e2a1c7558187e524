//! Telemetry validation.
//!
//! Two entry points share the arithmetic checks:
//!
//! - [`validate`] takes an untyped JSON candidate (e.g. from an external
//!   producer) and checks field presence, types and enumerations first.
//! - [`validate_record`] checks an already-typed record.
//!
//! A record that passes is self-consistent: `tokens_saved` and
//! `bytes_saved` equal pre minus post.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use super::record::{Decision, TelemetryRecord};
use crate::codec::CodecName;
use crate::models::EfficiencyClass;

/// Named telemetry invariant violation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryViolation {
    /// Candidate is not a JSON object
    #[error("telemetry must be an object")]
    NotAnObject,

    /// Required field absent
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Field has the wrong JSON type
    #[error("{field} must be {expected}")]
    WrongType {
        /// Field name
        field: &'static str,
        /// Expected type description
        expected: &'static str,
    },

    /// Enumerated field has an unknown value
    #[error("{field} has unknown value '{value}'")]
    UnknownValue {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Model id is empty
    #[error("model must be non-empty")]
    EmptyModel,

    /// Timestamp does not parse
    #[error("ts must be an RFC 3339 timestamp, got '{0}'")]
    BadTimestamp(String),

    /// Count or amount below zero
    #[error("{0} must be non-negative")]
    NegativeCount(&'static str),

    /// Count too large for signed savings arithmetic
    #[error("{0} is out of range")]
    CountOutOfRange(&'static str),

    /// tokens_saved != native_tokens_pre - native_tokens_post
    #[error("tokens_saved mismatch: expected {expected}, got {actual}")]
    TokensSavedMismatch {
        /// pre - post
        expected: i64,
        /// Reported value
        actual: i64,
    },

    /// bytes_saved != bytes_pre - bytes_post
    #[error("bytes_saved mismatch: expected {expected}, got {actual}")]
    BytesSavedMismatch {
        /// pre - post
        expected: i64,
        /// Reported value
        actual: i64,
    },
}

type Check<T> = std::result::Result<T, TelemetryViolation>;

/// Validate an untyped candidate and build the record
pub fn validate(candidate: &Value) -> Check<TelemetryRecord> {
    let obj = candidate.as_object().ok_or(TelemetryViolation::NotAnObject)?;

    let event_id = optional_string(obj, "event_id")?;
    let ts = match optional_string(obj, "ts")? {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(&raw)
                .map_err(|_| TelemetryViolation::BadTimestamp(raw.clone()))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    let model = required_string(obj, "model")?;
    if model.is_empty() {
        return Err(TelemetryViolation::EmptyModel);
    }
    let provider = optional_string(obj, "provider")?;

    let efficiency_class: EfficiencyClass = if obj.contains_key("efficiency_class") {
        enumerated(obj, "efficiency_class")?
    } else {
        enumerated(obj, "mu_class")
            .map_err(|e| match e {
                TelemetryViolation::MissingField(_) => {
                    TelemetryViolation::MissingField("efficiency_class")
                },
                other => other,
            })?
    };
    let codec_attempted: CodecName = enumerated(obj, "codec_attempted")?;
    let codec_decided: CodecName = enumerated(obj, "codec_decided")?;

    let native_tokens_pre = count(obj, "native_tokens_pre")?;
    let native_tokens_post = count(obj, "native_tokens_post")?;
    let tokens_saved = signed_count(obj, "tokens_saved")?;
    let saved_pct = finite(obj, "saved_pct")?;
    let bytes_pre = count(obj, "bytes_pre")?;
    let bytes_post = count(obj, "bytes_post")?;
    let bytes_saved = signed_count(obj, "bytes_saved")?;
    let attempted_tokens_post = optional_count(obj, "attempted_tokens_post")?;
    let attempted_bytes_post = optional_count(obj, "attempted_bytes_post")?;

    let decision: Decision = enumerated(obj, "decision")?;
    let reason = required_string(obj, "reason")?;
    let latency_ms = count(obj, "latency_ms")?;
    let cost_usd = finite(obj, "cost_usd")?;

    let record = TelemetryRecord {
        event_id,
        ts,
        model,
        provider,
        efficiency_class,
        codec_attempted,
        codec_decided,
        native_tokens_pre,
        native_tokens_post,
        tokens_saved,
        saved_pct,
        bytes_pre,
        bytes_post,
        bytes_saved,
        attempted_tokens_post,
        attempted_bytes_post,
        decision,
        reason,
        latency_ms,
        cost_usd,
    };

    validate_record(&record)?;
    Ok(record)
}

/// Check the invariants of a typed record
///
/// # Example
/// ```
/// use crux::telemetry::{validate, validate_record, TelemetryViolation};
/// use serde_json::json;
///
/// let mut record = validate(&json!({
///     "model": "gpt-4o", "mu_class": "b",
///     "codec_attempted": "bracket", "codec_decided": "bracket",
///     "native_tokens_pre": 100, "native_tokens_post": 80,
///     "tokens_saved": 20, "saved_pct": 20.0,
///     "bytes_pre": 600, "bytes_post": 500, "bytes_saved": 100,
///     "decision": "serve", "reason": "beneficial",
///     "latency_ms": 3, "cost_usd": 0.0
/// })).unwrap();
///
/// record.tokens_saved = 21;
/// assert_eq!(
///     validate_record(&record),
///     Err(TelemetryViolation::TokensSavedMismatch { expected: 20, actual: 21 })
/// );
/// ```
pub fn validate_record(record: &TelemetryRecord) -> Check<()> {
    if record.model.is_empty() {
        return Err(TelemetryViolation::EmptyModel);
    }
    if !record.saved_pct.is_finite() {
        return Err(TelemetryViolation::WrongType {
            field: "saved_pct",
            expected: "a finite number",
        });
    }
    if !record.cost_usd.is_finite() {
        return Err(TelemetryViolation::WrongType {
            field: "cost_usd",
            expected: "a finite number",
        });
    }
    if record.cost_usd < 0.0 {
        return Err(TelemetryViolation::NegativeCount("cost_usd"));
    }
    if record.tokens_saved < 0 {
        return Err(TelemetryViolation::NegativeCount("tokens_saved"));
    }
    if record.bytes_saved < 0 {
        return Err(TelemetryViolation::NegativeCount("bytes_saved"));
    }

    let expected = difference(
        record.native_tokens_pre,
        record.native_tokens_post,
        "native_tokens_pre",
        "native_tokens_post",
    )?;
    if record.tokens_saved != expected {
        return Err(TelemetryViolation::TokensSavedMismatch {
            expected,
            actual: record.tokens_saved,
        });
    }

    let expected = difference(record.bytes_pre, record.bytes_post, "bytes_pre", "bytes_post")?;
    if record.bytes_saved != expected {
        return Err(TelemetryViolation::BytesSavedMismatch {
            expected,
            actual: record.bytes_saved,
        });
    }

    Ok(())
}

/// `pre - post` as a signed count, rejecting values past `i64::MAX`
fn difference(pre: u64, post: u64, pre_field: &'static str, post_field: &'static str) -> Check<i64> {
    let pre = i64::try_from(pre).map_err(|_| TelemetryViolation::CountOutOfRange(pre_field))?;
    let post = i64::try_from(post).map_err(|_| TelemetryViolation::CountOutOfRange(post_field))?;
    pre.checked_sub(post)
        .ok_or(TelemetryViolation::CountOutOfRange(pre_field))
}

fn present<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn required<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Check<&'a Value> {
    present(obj, field).ok_or(TelemetryViolation::MissingField(field))
}

fn required_string(obj: &Map<String, Value>, field: &'static str) -> Check<String> {
    required(obj, field)?
        .as_str()
        .map(str::to_string)
        .ok_or(TelemetryViolation::WrongType {
            field,
            expected: "a string",
        })
}

fn optional_string(obj: &Map<String, Value>, field: &'static str) -> Check<Option<String>> {
    match present(obj, field) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or(TelemetryViolation::WrongType {
                field,
                expected: "a string",
            }),
    }
}

// Exact wire names (and serde aliases) only, not the lenient `FromStr` forms
fn enumerated<T: DeserializeOwned>(obj: &Map<String, Value>, field: &'static str) -> Check<T> {
    let raw = required_string(obj, field)?;
    serde_json::from_value(Value::String(raw.clone()))
        .map_err(|_| TelemetryViolation::UnknownValue { field, value: raw })
}

fn signed_count(obj: &Map<String, Value>, field: &'static str) -> Check<i64> {
    let value = required(obj, field)?;
    match value.as_i64() {
        Some(n) if n < 0 => Err(TelemetryViolation::NegativeCount(field)),
        Some(n) => Ok(n),
        None if value.as_f64().is_some_and(|f| f < 0.0) => {
            Err(TelemetryViolation::NegativeCount(field))
        },
        None => Err(TelemetryViolation::WrongType {
            field,
            expected: "an integer",
        }),
    }
}

fn count(obj: &Map<String, Value>, field: &'static str) -> Check<u64> {
    let n = signed_count(obj, field)?;
    Ok(n as u64)
}

fn optional_count(obj: &Map<String, Value>, field: &'static str) -> Check<Option<u64>> {
    match present(obj, field) {
        None => Ok(None),
        Some(_) => count(obj, field).map(Some),
    }
}

fn finite(obj: &Map<String, Value>, field: &'static str) -> Check<f64> {
    required(obj, field)?
        .as_f64()
        .filter(|f| f.is_finite())
        .ok_or(TelemetryViolation::WrongType {
            field,
            expected: "a finite number",
        })
}
