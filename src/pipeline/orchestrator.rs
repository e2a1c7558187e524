//! Compression orchestrator.
//!
//! One call runs Start → Classified → Prequalified → (bypass | codec) →
//! Gated → Decided. Resistant models and disqualified inputs short-circuit
//! to a bypass before any codec runs. Every call emits exactly one
//! validated telemetry record to the configured sink.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error};
use uuid::Uuid;

use super::{CompressOptions, CompressionDecision};
use crate::codec::{CodecEngine, CodecName, CodecResult, TransformContext};
use crate::config::{CodecStrategy, Config};
use crate::error::{CruxError, Result};
use crate::gate::BenefitGate;
use crate::models::{EfficiencyClass, ModelClassifier, Provider};
use crate::prequal::Prequalifier;
use crate::telemetry::{
    validate_record, Decision, NullSink, TelemetryRecord, TelemetrySink,
};
use crate::tokenizer::{byte_len, SavingsStats};

/// Reason for resistant models and `off` strategies
pub const REASON_RESISTANT_OR_NOOP: &str = "resistant_or_noop";

/// Compression orchestrator
#[derive(Clone)]
pub struct Orchestrator {
    config: Config,
    classifier: ModelClassifier,
    prequalifier: Prequalifier,
    engine: CodecEngine,
    gate: BenefitGate,
    sink: Arc<dyn TelemetrySink>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

/// What the codec stage produced, before the decision is assembled
struct Attempt {
    requested: CodecName,
    result: CodecResult,
}

impl Orchestrator {
    /// Create orchestrator from configuration, discarding telemetry.
    ///
    /// The configuration is trusted as-is; use [`try_new`](Self::try_new)
    /// for values built outside [`Config::load`].
    pub fn new(config: Config) -> Self {
        Self {
            classifier: ModelClassifier::from_config(&config.classifier),
            prequalifier: Prequalifier::new(config.compression.byte_floor),
            engine: CodecEngine::from_config(&config),
            gate: BenefitGate::new(config.compression.efficiency_floor),
            sink: Arc::new(NullSink),
            config,
        }
    }

    /// Create orchestrator from a configuration that is checked first
    pub fn try_new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Send validated telemetry to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Codec engine
    pub fn engine(&self) -> &CodecEngine {
        &self.engine
    }

    /// Classify a model id
    pub fn classify(&self, model: &str) -> EfficiencyClass {
        self.classifier.classify(model)
    }

    /// Decide whether and how to compress `text` for `options.model`.
    ///
    /// Benign input never errors: rejection is a bypass with a reason.
    /// Errors are limited to malformed options and a telemetry record that
    /// fails validation.
    pub async fn compress(
        &self,
        text: &str,
        options: &CompressOptions,
    ) -> Result<CompressionDecision> {
        options.validate()?;
        let started = Instant::now();

        let class = self.classifier.classify(&options.model);
        debug!(model = %options.model, class = %class, "Classified");

        let verdict = self.prequalifier.check(text);
        debug!(eligible = verdict.is_eligible(), reason = ?verdict.reason(), "Prequalified");

        let short_circuit = match verdict.reason() {
            Some(reason) => Some(reason.as_str()),
            None if class == EfficiencyClass::Resistant => Some(REASON_RESISTANT_OR_NOOP),
            None => None,
        };

        let codec = match short_circuit {
            Some(_) => None,
            None => self.select_codec(class, text, options.codec),
        };

        let Some(codec) = codec else {
            let reason = short_circuit.unwrap_or(REASON_RESISTANT_OR_NOOP);
            debug!(reason, "Short-circuit bypass");
            let decision =
                self.assemble(text, options, class, None, false, reason.to_string(), 0.0, started);
            return self.emit(decision);
        };

        let ctx = TransformContext {
            transformer: options.transformer.as_deref(),
            cancel: options.cancel.as_ref(),
        };
        let result = self.engine.run(codec, text, &ctx).await;
        debug!(
            requested = %codec,
            produced = %result.codec,
            pre_tokens = result.pre_tokens,
            post_tokens = result.post_tokens,
            "Codec selected"
        );

        let gated = self.gate.decide(result.pre_tokens, result.post_tokens);
        debug!(
            serve = gated.should_serve,
            efficiency = gated.efficiency_percent,
            reason = %gated.reason,
            "Gated"
        );

        let attempt = Attempt {
            requested: codec,
            result,
        };
        let decision = self.assemble(
            text,
            options,
            class,
            Some(&attempt),
            gated.should_serve,
            gated.reason,
            gated.efficiency_percent,
            started,
        );
        self.emit(decision)
    }

    /// Codec for a prequalified input, `None` when the strategy is off
    fn select_codec(
        &self,
        class: EfficiencyClass,
        text: &str,
        forced: Option<CodecName>,
    ) -> Option<CodecName> {
        if let Some(codec) = forced {
            return (codec != CodecName::Off).then_some(codec);
        }

        let strategy = match class {
            EfficiencyClass::Efficient => self.config.compression.efficient_strategy,
            EfficiencyClass::Balanced => self.config.compression.balanced_strategy,
            EfficiencyClass::Resistant => CodecStrategy::Off,
        };

        match strategy {
            CodecStrategy::Hybrid => Some(CodecName::Hybrid),
            CodecStrategy::Adaptive => {
                if self.engine.analyze(text).is_code_heavy() {
                    Some(CodecName::Dictionary)
                } else {
                    Some(CodecName::Bracket)
                }
            },
            CodecStrategy::Fixed(CodecName::Off) | CodecStrategy::Off => None,
            CodecStrategy::Fixed(codec) => Some(codec),
        }
    }

    /// Build decision and telemetry.
    ///
    /// With `serve`, the attempt's text is sent; otherwise the original text
    /// is sent and the record's post counts equal its pre counts.
    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        text: &str,
        options: &CompressOptions,
        class: EfficiencyClass,
        attempt: Option<&Attempt>,
        serve: bool,
        reason: String,
        efficiency_percent: f64,
        started: Instant,
    ) -> CompressionDecision {
        let counter = self.engine.counter();
        let pre_tokens = counter.count(text);
        let pre_bytes = byte_len(text);

        let (decision, codec, final_text, post_tokens, post_bytes) = match attempt {
            Some(a) if serve => (
                Decision::Serve,
                a.result.codec,
                a.result.text.clone(),
                a.result.post_tokens,
                a.result.post_bytes,
            ),
            _ => (Decision::Bypass, CodecName::Off, text.to_string(), pre_tokens, pre_bytes),
        };

        let savings = SavingsStats::from_counts(pre_tokens, post_tokens);
        let bytes_saved = pre_bytes as i64 - post_bytes as i64;

        let provider = options
            .provider
            .clone()
            .unwrap_or_else(|| Provider::from_model_id(&options.model).id().to_string());

        let telemetry = TelemetryRecord {
            event_id: Some(Uuid::new_v4().to_string()),
            ts: Some(Utc::now()),
            model: options.model.clone(),
            provider: Some(provider),
            efficiency_class: class,
            codec_attempted: attempt.map_or(CodecName::Off, |a| a.requested),
            codec_decided: codec,
            native_tokens_pre: pre_tokens as u64,
            native_tokens_post: post_tokens as u64,
            tokens_saved: savings.tokens_saved,
            saved_pct: savings.saved_pct,
            bytes_pre: pre_bytes as u64,
            bytes_post: post_bytes as u64,
            bytes_saved,
            attempted_tokens_post: attempt.map(|a| a.result.post_tokens as u64),
            attempted_bytes_post: attempt.map(|a| a.result.post_bytes as u64),
            decision,
            reason: reason.clone(),
            latency_ms: started.elapsed().as_millis() as u64,
            cost_usd: options.estimated_cost_usd.unwrap_or(0.0),
        };

        CompressionDecision {
            used: decision == Decision::Serve,
            decision,
            reason,
            efficiency_percent,
            tokens_saved: savings.tokens_saved,
            bytes_saved,
            codec,
            final_text,
            telemetry,
        }
    }

    /// Validate telemetry and hand it to the sink
    fn emit(&self, decision: CompressionDecision) -> Result<CompressionDecision> {
        if let Err(violation) = validate_record(&decision.telemetry) {
            error!(%violation, model = %decision.telemetry.model, "Telemetry rejected");
            return Err(CruxError::Telemetry(violation));
        }
        self.sink.record(&decision.telemetry);
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_bad_floor() {
        for floor in [f64::NAN, 1.5, -0.1] {
            let mut config = Config::default();
            config.compression.efficiency_floor = floor;
            assert!(matches!(Orchestrator::try_new(config), Err(CruxError::Config(_))));
        }
        assert!(Orchestrator::try_new(Config::default()).is_ok());
    }
}
