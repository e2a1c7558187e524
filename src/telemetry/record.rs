//! Telemetry record: one auditable snapshot per compression decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::CodecName;
use crate::models::EfficiencyClass;

/// Serve or bypass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Compressed text is sent
    Serve,
    /// Original text is sent
    Bypass,
}

impl Decision {
    /// Decision as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Serve => "serve",
            Decision::Bypass => "bypass",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "serve" => Ok(Self::Serve),
            "bypass" => Ok(Self::Bypass),
            _ => Err(format!("Unknown decision: {s}")),
        }
    }
}

/// Validated telemetry record.
///
/// `native_tokens_post` / `bytes_post` describe the text actually sent, so
/// on bypass they equal the pre counts and the saved fields are zero. The
/// codec's own measurement is kept in `attempted_tokens_post` /
/// `attempted_bytes_post` when a codec ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Unique event id (UUID v4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Event time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<DateTime<Utc>>,
    /// Target model id
    pub model: String,
    /// Provider id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Model efficiency class
    #[serde(alias = "mu_class")]
    pub efficiency_class: EfficiencyClass,
    /// Codec that ran (`off` when none did)
    pub codec_attempted: CodecName,
    /// Codec served (`off` whenever bypassed)
    pub codec_decided: CodecName,
    /// Tokens in the original text
    pub native_tokens_pre: u64,
    /// Tokens in the text sent
    pub native_tokens_post: u64,
    /// native_tokens_pre - native_tokens_post
    pub tokens_saved: i64,
    /// tokens_saved as a percentage of native_tokens_pre
    pub saved_pct: f64,
    /// Bytes in the original text
    pub bytes_pre: u64,
    /// Bytes in the text sent
    pub bytes_post: u64,
    /// bytes_pre - bytes_post
    pub bytes_saved: i64,
    /// Tokens the attempted codec produced, if one ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempted_tokens_post: Option<u64>,
    /// Bytes the attempted codec produced, if one ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempted_bytes_post: Option<u64>,
    /// Serve or bypass
    pub decision: Decision,
    /// Human-readable reason
    pub reason: String,
    /// Wall time of the decision
    pub latency_ms: u64,
    /// Estimated request cost
    pub cost_usd: f64,
}

impl TelemetryRecord {
    /// Whether the record describes a served compression
    pub fn is_served(&self) -> bool {
        self.decision == Decision::Serve
    }
}
