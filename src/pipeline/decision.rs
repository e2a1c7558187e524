//! Compression decision returned to the caller.

use serde::Serialize;

use crate::codec::CodecName;
use crate::telemetry::{Decision, TelemetryRecord};

/// Final outcome of one compression call
#[derive(Debug, Clone, Serialize)]
pub struct CompressionDecision {
    /// Compressed text was served
    pub used: bool,
    /// Serve or bypass
    pub decision: Decision,
    /// Human-readable reason
    pub reason: String,
    /// Gate-measured efficiency of the attempted codec (0 when none ran)
    pub efficiency_percent: f64,
    /// Tokens saved by the served text (0 when bypassed)
    pub tokens_saved: i64,
    /// Bytes saved by the served text (0 when bypassed)
    pub bytes_saved: i64,
    /// Served codec (`off` when bypassed)
    pub codec: CodecName,
    /// Text to send
    pub final_text: String,
    /// Validated telemetry for this call
    pub telemetry: TelemetryRecord,
}

impl CompressionDecision {
    /// Whether the original text is sent unchanged
    pub fn is_bypass(&self) -> bool {
        self.decision == Decision::Bypass
    }
}
