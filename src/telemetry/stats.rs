//! Aggregate telemetry statistics.
//!
//! Tracks decision counts, savings and latencies across calls.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use super::{TelemetryRecord, TelemetrySink};
use crate::gate::REASON_EXPANSION;

/// Latency samples kept for percentile calculation
const LATENCY_WINDOW: usize = 1000;

/// Thread-safe aggregate statistics
#[derive(Debug, Default)]
pub struct TelemetryStats {
    /// Total decisions
    decisions: AtomicU64,
    /// Decisions that served compressed text
    serves: AtomicU64,
    /// Decisions that bypassed
    bypasses: AtomicU64,
    /// Bypasses because the codec expanded or did not shrink
    expansion_blocks: AtomicU64,
    /// Total tokens before compression
    tokens_pre: AtomicU64,
    /// Total tokens saved by served compressions
    tokens_saved: AtomicU64,
    /// Total bytes saved by served compressions
    bytes_saved: AtomicU64,
    /// Recent latencies in milliseconds
    latencies: RwLock<Vec<u64>>,
}

impl TelemetryStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Total decisions
    pub fn total_decisions(&self) -> u64 {
        self.decisions.load(Ordering::Relaxed)
    }

    /// Served decisions
    pub fn serves(&self) -> u64 {
        self.serves.load(Ordering::Relaxed)
    }

    /// Bypassed decisions
    pub fn bypasses(&self) -> u64 {
        self.bypasses.load(Ordering::Relaxed)
    }

    /// Bypasses caused by expansion
    pub fn expansion_blocks(&self) -> u64 {
        self.expansion_blocks.load(Ordering::Relaxed)
    }

    /// Total tokens saved
    pub fn total_tokens_saved(&self) -> u64 {
        self.tokens_saved.load(Ordering::Relaxed)
    }

    /// Total bytes saved
    pub fn total_bytes_saved(&self) -> u64 {
        self.bytes_saved.load(Ordering::Relaxed)
    }

    /// Fraction of decisions served (0.0-1.0)
    pub fn serve_rate(&self) -> f64 {
        let total = self.total_decisions();
        if total == 0 {
            0.0
        } else {
            self.serves() as f64 / total as f64
        }
    }

    /// Tokens saved as a percentage of all tokens seen
    pub fn savings_percent(&self) -> f64 {
        let pre = self.tokens_pre.load(Ordering::Relaxed);
        if pre == 0 {
            0.0
        } else {
            self.total_tokens_saved() as f64 / pre as f64 * 100.0
        }
    }

    /// Latency percentile in milliseconds
    pub fn percentile_latency(&self, percentile: usize) -> Option<u64> {
        let latencies = self.latencies.read().ok()?;
        if latencies.is_empty() {
            return None;
        }

        let mut sorted = latencies.clone();
        sorted.sort_unstable();

        let idx = (sorted.len() * percentile / 100).min(sorted.len() - 1);
        Some(sorted[idx])
    }

    /// Summary as a serializable struct
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            total_decisions: self.total_decisions(),
            serves: self.serves(),
            bypasses: self.bypasses(),
            expansion_blocks: self.expansion_blocks(),
            tokens_saved: self.total_tokens_saved(),
            bytes_saved: self.total_bytes_saved(),
            serve_rate: self.serve_rate(),
            savings_percent: self.savings_percent(),
            p50_latency_ms: self.percentile_latency(50),
            p95_latency_ms: self.percentile_latency(95),
            p99_latency_ms: self.percentile_latency(99),
        }
    }

    /// Reset all statistics
    pub fn reset(&self) {
        for counter in [
            &self.decisions,
            &self.serves,
            &self.bypasses,
            &self.expansion_blocks,
            &self.tokens_pre,
            &self.tokens_saved,
            &self.bytes_saved,
        ] {
            counter.store(0, Ordering::Relaxed);
        }

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.clear();
        }
    }
}

impl TelemetrySink for TelemetryStats {
    fn record(&self, record: &TelemetryRecord) {
        self.decisions.fetch_add(1, Ordering::Relaxed);
        self.tokens_pre
            .fetch_add(record.native_tokens_pre, Ordering::Relaxed);

        if record.is_served() {
            self.serves.fetch_add(1, Ordering::Relaxed);
            // Validated records never carry negative savings
            self.tokens_saved
                .fetch_add(record.tokens_saved.max(0) as u64, Ordering::Relaxed);
            self.bytes_saved
                .fetch_add(record.bytes_saved.max(0) as u64, Ordering::Relaxed);
        } else {
            self.bypasses.fetch_add(1, Ordering::Relaxed);
            if record.reason == REASON_EXPANSION {
                self.expansion_blocks.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push(record.latency_ms);
            if latencies.len() > LATENCY_WINDOW {
                latencies.remove(0);
            }
        }
    }
}

/// Statistics summary for serialization.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatsSummary {
    /// Total decisions recorded.
    pub total_decisions: u64,
    /// Decisions that served compressed text.
    pub serves: u64,
    /// Decisions that bypassed.
    pub bypasses: u64,
    /// Bypasses caused by expansion or no gain.
    pub expansion_blocks: u64,
    /// Tokens saved by served compressions.
    pub tokens_saved: u64,
    /// Bytes saved by served compressions.
    pub bytes_saved: u64,
    /// Fraction of decisions served.
    pub serve_rate: f64,
    /// Tokens saved as a percentage of tokens seen.
    pub savings_percent: f64,
    /// 50th percentile latency in milliseconds.
    pub p50_latency_ms: Option<u64>,
    /// 95th percentile latency in milliseconds.
    pub p95_latency_ms: Option<u64>,
    /// 99th percentile latency in milliseconds.
    pub p99_latency_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecName;
    use crate::telemetry::sink::tests::sample;
    use crate::telemetry::Decision;

    fn bypass(reason: &str, latency_ms: u64) -> TelemetryRecord {
        TelemetryRecord {
            codec_decided: CodecName::Off,
            native_tokens_post: 10,
            tokens_saved: 0,
            saved_pct: 0.0,
            bytes_post: 50,
            bytes_saved: 0,
            decision: Decision::Bypass,
            reason: reason.to_string(),
            latency_ms,
            ..sample("m")
        }
    }

    #[test]
    fn test_stats_recording() {
        let stats = TelemetryStats::new();

        stats.record(&sample("m"));
        stats.record(&bypass(REASON_EXPANSION, 5));
        stats.record(&bypass("too_short", 9));

        assert_eq!(stats.total_decisions(), 3);
        assert_eq!(stats.serves(), 1);
        assert_eq!(stats.bypasses(), 2);
        assert_eq!(stats.expansion_blocks(), 1);
        assert_eq!(stats.total_tokens_saved(), 2);
        assert_eq!(stats.total_bytes_saved(), 5);
        assert!((stats.serve_rate() - 1.0 / 3.0).abs() < 1e-9);
        assert!((stats.savings_percent() - 2.0 / 30.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentiles() {
        let stats = TelemetryStats::new();
        assert_eq!(stats.percentile_latency(50), None);
        for ms in 1..=100 {
            stats.record(&bypass("empty", ms));
        }
        assert_eq!(stats.percentile_latency(50), Some(51));
        assert_eq!(stats.percentile_latency(99), Some(100));
    }

    #[test]
    fn test_summary_and_reset() {
        let stats = TelemetryStats::new();
        stats.record(&sample("m"));
        let summary = stats.summary();
        assert_eq!(summary.total_decisions, 1);
        assert_eq!(summary.p50_latency_ms, Some(1));

        stats.reset();
        assert_eq!(stats.total_decisions(), 0);
        assert_eq!(stats.summary().p50_latency_ms, None);
    }
}
