//! Telemetry sinks.
//!
//! The orchestrator hands every validated record to one sink. Sinks are
//! shared across concurrent calls, so they use interior mutability.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use tracing::info;

use super::TelemetryRecord;

/// Receives validated telemetry records
pub trait TelemetrySink: Send + Sync {
    /// Record one validated event
    fn record(&self, record: &TelemetryRecord);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&self, _record: &TelemetryRecord) {}
}

/// Emits each record as a structured `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, r: &TelemetryRecord) {
        info!(
            target: "crux::telemetry",
            event_id = r.event_id.as_deref().unwrap_or(""),
            model = %r.model,
            provider = r.provider.as_deref().unwrap_or("unknown"),
            class = %r.efficiency_class,
            codec_attempted = %r.codec_attempted,
            codec_decided = %r.codec_decided,
            tokens_pre = r.native_tokens_pre,
            tokens_post = r.native_tokens_post,
            tokens_saved = r.tokens_saved,
            bytes_saved = r.bytes_saved,
            decision = %r.decision,
            reason = %r.reason,
            latency_ms = r.latency_ms,
            "compression decision"
        );
    }
}

/// Bounded in-memory ring of recent records
#[derive(Debug)]
pub struct MemorySink {
    capacity: usize,
    records: RwLock<VecDeque<TelemetryRecord>>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl MemorySink {
    /// Create sink keeping at most `capacity` records
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: RwLock::new(VecDeque::new()),
        }
    }

    /// Snapshot of stored records, oldest first
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records
            .read()
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Most recent record
    pub fn last(&self) -> Option<TelemetryRecord> {
        self.records.read().ok()?.back().cloned()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether no records are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all stored records
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.write() {
            records.clear();
        }
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, record: &TelemetryRecord) {
        if let Ok(mut records) = self.records.write() {
            if records.len() == self.capacity {
                records.pop_front();
            }
            records.push_back(record.clone());
        }
    }
}

/// Forwards each record to several sinks in order
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl FanoutSink {
    /// Create empty fanout
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    pub fn with(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of attached sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sinks are attached
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl TelemetrySink for FanoutSink {
    fn record(&self, record: &TelemetryRecord) {
        for sink in &self.sinks {
            sink.record(record);
        }
    }
}
