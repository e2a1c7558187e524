//! End-to-end compression pipeline tests.

use std::sync::Arc;
use std::time::Duration;

use crux::codec::{CancelToken, CodecName, TextTransformer, TransformFuture};
use crux::config::Config;
use crux::pipeline::{CompressOptions, Decision, Orchestrator};
use crux::telemetry::{validate, FanoutSink, MemorySink, TelemetryStats};
use crux::tokenizer::TokenMetric;
use crux::{CruxError, EfficiencyClass};

const LOREM: &str = "lorem ipsum dolor sit amet, consectetur adipiscing elit. ";

fn lorem() -> String {
    LOREM.repeat(8)
}

/// Prose with long whitespace runs; bracket markers fold it into few words
fn spaced_prose() -> String {
    "Status:   all   systems   nominal...   ".repeat(12)
}

fn with_sink() -> (Orchestrator, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::default());
    (Orchestrator::default().with_sink(sink.clone()), sink)
}

#[tokio::test]
async fn test_short_input_bypasses() {
    let (orchestrator, sink) = with_sink();
    let decision = orchestrator
        .compress("short", &CompressOptions::new("gpt-4o"))
        .await
        .unwrap();

    assert!(!decision.used);
    assert_eq!(decision.decision, Decision::Bypass);
    assert_eq!(decision.reason, "too_short");
    assert_eq!(decision.codec, CodecName::Off);
    assert_eq!(decision.final_text, "short");
    assert_eq!(decision.tokens_saved, 0);
    assert_eq!(decision.bytes_saved, 0);

    let record = sink.last().unwrap();
    assert_eq!(record.codec_attempted, CodecName::Off);
    assert_eq!(record.codec_decided, CodecName::Off);
    assert_eq!(record.native_tokens_pre, 1);
    assert_eq!(record.native_tokens_post, 1);
    assert_eq!(record.attempted_tokens_post, None);
}

#[tokio::test]
async fn test_unknown_model_is_resistant() {
    let (orchestrator, sink) = with_sink();
    let text = lorem();
    assert!(text.len() >= 256);

    let decision = orchestrator
        .compress(&text, &CompressOptions::new("mystery-model-x"))
        .await
        .unwrap();

    assert_eq!(decision.decision, Decision::Bypass);
    assert_eq!(decision.reason, "resistant_or_noop");
    assert_eq!(decision.codec, CodecName::Off);
    assert_eq!(decision.final_text, text);

    let record = sink.last().unwrap();
    assert_eq!(record.efficiency_class, EfficiencyClass::Resistant);
    assert_eq!(record.tokens_saved, 0);
    assert_eq!(record.bytes_saved, 0);
    assert_eq!(record.provider.as_deref(), Some("unknown"));
}

#[tokio::test]
async fn test_prequal_reasons_surface() {
    let orchestrator = Orchestrator::default();
    let opts = CompressOptions::new("gpt-4o");

    let cases = [
        ("   \n ".to_string(), "empty"),
        (format!("```\nlet x = 1;\n```\n{}", lorem()), "contains_code_block"),
        (format!("see https://example.com {}", lorem()), "contains_url"),
        (format!("{}\0", lorem()), "contains_null_byte"),
    ];

    for (text, reason) in cases {
        let decision = orchestrator.compress(&text, &opts).await.unwrap();
        assert_eq!(decision.reason, reason);
        assert_eq!(decision.codec, CodecName::Off);
        assert_eq!(decision.final_text, text);
    }
}

#[tokio::test]
async fn test_balanced_serves_bracket() {
    let (orchestrator, sink) = with_sink();
    let text = spaced_prose();

    let decision = orchestrator
        .compress(&text, &CompressOptions::new("gpt-4o"))
        .await
        .unwrap();

    assert!(decision.used);
    assert_eq!(decision.reason, "beneficial");
    assert_eq!(decision.codec, CodecName::Bracket);
    assert_ne!(decision.final_text, text);
    assert!(decision.efficiency_percent >= 10.0);

    let restored = orchestrator
        .engine()
        .restore(decision.codec, &decision.final_text)
        .unwrap();
    assert_eq!(restored, text);

    let record = sink.last().unwrap();
    assert_eq!(record.codec_attempted, CodecName::Bracket);
    assert_eq!(record.codec_decided, CodecName::Bracket);
    assert_eq!(
        record.tokens_saved,
        record.native_tokens_pre as i64 - record.native_tokens_post as i64
    );
    assert_eq!(decision.tokens_saved, record.tokens_saved);
    assert_eq!(record.provider.as_deref(), Some("openai"));
}

#[tokio::test]
async fn test_efficient_runs_hybrid() {
    let (orchestrator, sink) = with_sink();
    let decision = orchestrator
        .compress(&spaced_prose(), &CompressOptions::new("openai/gpt-3.5-turbo"))
        .await
        .unwrap();

    assert!(decision.used);
    // Hybrid reports the winning candidate
    assert_eq!(decision.codec, CodecName::Bracket);

    let record = sink.last().unwrap();
    assert_eq!(record.efficiency_class, EfficiencyClass::Efficient);
    assert_eq!(record.codec_attempted, CodecName::Hybrid);
    assert_eq!(record.codec_decided, CodecName::Bracket);
}

#[tokio::test]
async fn test_no_gain_bypasses_with_attempt_recorded() {
    let (orchestrator, sink) = with_sink();
    let text = lorem();

    let decision = orchestrator
        .compress(&text, &CompressOptions::new("gpt-4o"))
        .await
        .unwrap();

    assert_eq!(decision.decision, Decision::Bypass);
    assert_eq!(decision.reason, "expansion_or_no_gain");
    assert_eq!(decision.codec, CodecName::Off);
    assert_eq!(decision.final_text, text);

    let record = sink.last().unwrap();
    assert_eq!(record.codec_attempted, CodecName::Bracket);
    assert_eq!(record.codec_decided, CodecName::Off);
    assert_eq!(record.native_tokens_post, record.native_tokens_pre);
    assert_eq!(record.attempted_tokens_post, Some(record.native_tokens_pre));
}

#[tokio::test]
async fn test_low_efficiency_reports_percentage() {
    let orchestrator = Orchestrator::default();
    let text = format!("{}tail  end", lorem());

    let decision = orchestrator
        .compress(&text, &CompressOptions::new("gpt-4o"))
        .await
        .unwrap();

    assert_eq!(decision.decision, Decision::Bypass);
    assert_eq!(decision.reason, "Efficiency too low (1.5% < 10.0%)");
    assert!(decision.efficiency_percent > 0.0 && decision.efficiency_percent < 10.0);
}

#[tokio::test]
async fn test_adaptive_picks_dictionary_for_code() {
    let mut config = Config::default();
    config.compression.token_metric = TokenMetric::Heuristic;
    let sink = Arc::new(MemorySink::default());
    let orchestrator = Orchestrator::new(config).with_sink(sink.clone());

    let text = format!("cmd = [{}]", "\"deploy_service\", ".repeat(20));
    let decision = orchestrator
        .compress(&text, &CompressOptions::new("gpt-4o"))
        .await
        .unwrap();

    assert!(decision.used);
    assert_eq!(decision.codec, CodecName::Dictionary);
    assert!(decision.final_text.starts_with("⟦dict:"));
    assert_eq!(
        orchestrator.engine().restore(CodecName::Dictionary, &decision.final_text).unwrap(),
        text
    );
    assert_eq!(sink.last().unwrap().codec_attempted, CodecName::Dictionary);
}

#[tokio::test]
async fn test_codec_override() {
    let orchestrator = Orchestrator::default();
    let decision = orchestrator
        .compress(
            &spaced_prose(),
            &CompressOptions::new("gpt-4o").with_codec(CodecName::Hex),
        )
        .await
        .unwrap();

    // Hex expands under the word proxy
    assert_eq!(decision.reason, "expansion_or_no_gain");
    assert_eq!(decision.telemetry.codec_attempted, CodecName::Hex);

    let off = orchestrator
        .compress(
            &spaced_prose(),
            &CompressOptions::new("gpt-4o").with_codec(CodecName::Off),
        )
        .await
        .unwrap();
    assert_eq!(off.reason, "resistant_or_noop");
}

#[tokio::test]
async fn test_external_transformer_served() {
    let orchestrator = Orchestrator::default();
    let hook = |_: &str| -> crux::Result<String> { Ok("lorem summary".to_string()) };
    let opts = CompressOptions::new("gpt-4o")
        .with_codec(CodecName::Dictionary)
        .with_transformer(Arc::new(hook));

    let decision = orchestrator.compress(&lorem(), &opts).await.unwrap();
    assert!(decision.used);
    assert_eq!(decision.codec, CodecName::Dictionary);
    assert_eq!(decision.final_text, "lorem summary");
    assert_eq!(decision.tokens_saved, 64 - 2);
}

#[tokio::test]
async fn test_external_transformer_failure_degrades() {
    let orchestrator = Orchestrator::default();
    let hook =
        |_: &str| -> crux::Result<String> { Err(CruxError::Transform("upstream 503".into())) };
    let opts = CompressOptions::new("gpt-4o")
        .with_codec(CodecName::Dictionary)
        .with_transformer(Arc::new(hook));

    let decision = orchestrator.compress(&lorem(), &opts).await.unwrap();
    assert_eq!(decision.decision, Decision::Bypass);
    assert_eq!(decision.reason, "expansion_or_no_gain");
    assert_eq!(decision.final_text, lorem());
    assert_eq!(decision.telemetry.codec_attempted, CodecName::Dictionary);
}

struct Stalled;

impl TextTransformer for Stalled {
    fn transform<'a>(&'a self, input: &'a str) -> TransformFuture<'a> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(input[..1].to_string())
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_external_transformer_timeout_degrades() {
    let mut config = Config::default();
    config.compression.transform_timeout_ms = 50;
    let orchestrator = Orchestrator::new(config);
    let opts = CompressOptions::new("gpt-4o")
        .with_codec(CodecName::Dictionary)
        .with_transformer(Arc::new(Stalled));

    let decision = orchestrator.compress(&lorem(), &opts).await.unwrap();
    assert_eq!(decision.decision, Decision::Bypass);
    assert_eq!(decision.final_text, lorem());
}

#[tokio::test]
async fn test_external_transformer_cancel_degrades() {
    let orchestrator = Orchestrator::default();
    let cancel = CancelToken::new();
    let opts = CompressOptions::new("gpt-4o")
        .with_codec(CodecName::Dictionary)
        .with_transformer(Arc::new(Stalled))
        .with_cancel(cancel.clone());

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
    });

    let decision = orchestrator.compress(&lorem(), &opts).await.unwrap();
    trigger.await.unwrap();
    assert_eq!(decision.decision, Decision::Bypass);
    assert_eq!(decision.final_text, lorem());
}

#[tokio::test]
async fn test_invalid_options() {
    let orchestrator = Orchestrator::default();
    let empty = orchestrator.compress(&lorem(), &CompressOptions::new("")).await;
    assert!(matches!(empty, Err(CruxError::InvalidOptions(_))));

    let negative = orchestrator
        .compress(&lorem(), &CompressOptions::new("gpt-4o").with_cost(-0.1))
        .await;
    assert!(matches!(negative, Err(CruxError::InvalidOptions(_))));
}

#[tokio::test]
async fn test_explicit_provider_and_cost() {
    let (orchestrator, sink) = with_sink();
    orchestrator
        .compress(
            &lorem(),
            &CompressOptions::new("gpt-4o")
                .with_provider("azure")
                .with_cost(0.25),
        )
        .await
        .unwrap();

    let record = sink.last().unwrap();
    assert_eq!(record.provider.as_deref(), Some("azure"));
    assert_eq!(record.cost_usd, 0.25);
}

#[tokio::test]
async fn test_emitted_telemetry_revalidates() {
    let (orchestrator, sink) = with_sink();
    for (text, model) in [
        (spaced_prose(), "gpt-4o"),
        (lorem(), "gpt-4o"),
        ("short".to_string(), "claude-3-opus"),
    ] {
        orchestrator
            .compress(&text, &CompressOptions::new(model))
            .await
            .unwrap();
    }

    let records = sink.records();
    assert_eq!(records.len(), 3);
    for record in records {
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(validate(&json).unwrap(), record);
        assert!(record.event_id.is_some());
    }
}

#[tokio::test]
async fn test_concurrent_calls_aggregate() {
    let stats = Arc::new(TelemetryStats::new());
    let memory = Arc::new(MemorySink::new(100));
    let fanout = FanoutSink::new().with(stats.clone()).with(memory.clone());
    let orchestrator = Arc::new(Orchestrator::default().with_sink(Arc::new(fanout)));

    let mut handles = Vec::new();
    for i in 0..8 {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(async move {
            let text = if i % 2 == 0 { spaced_prose() } else { lorem() };
            orchestrator
                .compress(&text, &CompressOptions::new("gpt-4o"))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(stats.total_decisions(), 8);
    assert_eq!(stats.serves(), 4);
    assert_eq!(stats.bypasses(), 4);
    assert_eq!(stats.expansion_blocks(), 4);
    assert_eq!(memory.len(), 8);
}
