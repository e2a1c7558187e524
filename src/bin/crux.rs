//! Crux CLI binary.
//!
//! Token-efficient prompt compression.
//!
//! # Commands
//!
//! - `compress` - Decide whether and how to compress text for a model
//! - `restore` - Reverse a codec's output
//! - `prompt` - Build a response-protocol system prompt
//! - `reply` - Interpret a model reply
//! - `analyze` - Semantic signals of one text, or a before/after comparison
//! - `classify` - Efficiency class of model ids

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crux::{
    codec::CodecName,
    pipeline::{CompressOptions, Orchestrator},
    protocol::{ResponseProtocol, ResponseStyle},
    semantic::SemanticGuard,
    telemetry::TracingSink,
    Config, Provider, VERSION,
};

#[derive(Parser)]
#[command(name = "crux")]
#[command(version = VERSION)]
#[command(about = "Crux - token-efficient prompt compression", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/crux/config.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether and how to compress text for a model
    Compress {
        /// Text input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target model id
        #[arg(short, long)]
        model: String,

        /// Provider id (inferred from the model when omitted)
        #[arg(long)]
        provider: Option<String>,

        /// Force a codec (identity, hex, bracket, dictionary, hybrid)
        #[arg(long)]
        codec: Option<String>,

        /// Estimated request cost in USD
        #[arg(long)]
        cost: Option<f64>,

        /// Print the full decision as JSON
        #[arg(long)]
        json: bool,

        /// Show decision statistics on stderr
        #[arg(short, long)]
        stats: bool,
    },

    /// Reverse a codec's output
    Restore {
        /// Encoded input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Codec that produced the input
        #[arg(long)]
        codec: String,
    },

    /// Build a response-protocol system prompt
    Prompt {
        /// Target model id
        #[arg(short, long)]
        model: String,

        /// STRICT or FIRST_MENTION (default from config)
        #[arg(long)]
        style: Option<String>,

        /// Dictionary version (default from config)
        #[arg(long)]
        dict: Option<String>,
    },

    /// Interpret a model reply
    Reply {
        /// Reply text (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// STRICT or FIRST_MENTION (default from config)
        #[arg(long)]
        style: Option<String>,

        /// Print mode and header status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Semantic signals of a text, or a before/after comparison
    Analyze {
        /// Text to analyze (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Transformed text to compare against
        #[arg(long)]
        after: Option<String>,

        /// File holding the transformed text
        #[arg(long)]
        after_file: Option<PathBuf>,
    },

    /// Efficiency class of model ids
    Classify {
        /// Model ids
        #[arg(required = true)]
        models: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let config = match &cli.config {
        Some(path) => {
            let config = Config::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?
                .with_env_overrides(|k| std::env::var(k).ok());
            config.validate()?;
            config
        },
        None => Config::load()?,
    };

    match cli.command {
        Commands::Compress {
            input,
            file,
            output,
            model,
            provider,
            codec,
            cost,
            json,
            stats,
        } => cmd_compress(
            &config,
            read_input(input, file)?,
            output,
            model,
            provider,
            codec,
            cost,
            json,
            stats,
        ),
        Commands::Restore { input, file, codec } => {
            cmd_restore(&config, read_input(input, file)?, &codec)
        },
        Commands::Prompt { model, style, dict } => cmd_prompt(&config, &model, style, dict),
        Commands::Reply {
            input,
            file,
            style,
            json,
        } => cmd_reply(&config, read_input(input, file)?, style, json),
        Commands::Analyze {
            input,
            file,
            after,
            after_file,
        } => {
            let before = read_input(input, file)?;
            let after = match (after, after_file) {
                (_, Some(path)) => Some(std::fs::read_to_string(path)?),
                (text, None) => text,
            };
            cmd_analyze(&config, &before, after.as_deref())
        },
        Commands::Classify { models } => cmd_classify(&config, &models),
    }
}

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_compress(
    config: &Config,
    content: String,
    output: Option<PathBuf>,
    model: String,
    provider: Option<String>,
    codec: Option<String>,
    cost: Option<f64>,
    json: bool,
    stats: bool,
) -> anyhow::Result<()> {
    let mut options = CompressOptions::new(model);
    options.provider = provider;
    options.estimated_cost_usd = cost;
    if let Some(name) = codec {
        let codec: CodecName = name.parse().map_err(anyhow::Error::msg)?;
        options = options.with_codec(codec);
    }

    let orchestrator = Orchestrator::try_new(config.clone())?.with_sink(Arc::new(TracingSink));
    let runtime = tokio::runtime::Runtime::new()?;
    let decision = runtime.block_on(orchestrator.compress(&content, &options))?;

    if json {
        write_output(output, &serde_json::to_string_pretty(&decision)?)?;
    } else {
        write_output(output, &decision.final_text)?;
    }

    if stats {
        let t = &decision.telemetry;
        eprintln!("Decision:   {} ({})", decision.decision, decision.reason);
        eprintln!("Codec:      {} (attempted {})", decision.codec, t.codec_attempted);
        eprintln!("Class:      {}", t.efficiency_class);
        eprintln!(
            "Tokens:     {} -> {} ({} saved, {:.1}%)",
            t.native_tokens_pre, t.native_tokens_post, t.tokens_saved, t.saved_pct
        );
        eprintln!(
            "Bytes:      {} -> {} ({} saved)",
            t.bytes_pre, t.bytes_post, t.bytes_saved
        );
        eprintln!("Efficiency: {:.1}%", decision.efficiency_percent);
        eprintln!("Latency:    {} ms", t.latency_ms);
    }

    Ok(())
}

fn cmd_restore(config: &Config, content: String, codec: &str) -> anyhow::Result<()> {
    let codec: CodecName = codec.parse().map_err(anyhow::Error::msg)?;
    let orchestrator = Orchestrator::try_new(config.clone())?;
    let restored = orchestrator.engine().restore(codec, strip_line_ending(&content))?;
    println!("{restored}");
    Ok(())
}

fn protocol_for(config: &Config, style: Option<String>) -> anyhow::Result<ResponseProtocol> {
    let protocol = ResponseProtocol::from_config(&config.protocol);
    Ok(match style {
        Some(s) => {
            let style: ResponseStyle = s.parse().map_err(anyhow::Error::msg)?;
            protocol.with_style(style)
        },
        None => protocol,
    })
}

fn cmd_prompt(
    config: &Config,
    model: &str,
    style: Option<String>,
    dict: Option<String>,
) -> anyhow::Result<()> {
    let mut protocol = protocol_for(config, style)?;
    if let Some(dict) = dict {
        protocol.dict_version = dict;
    }
    println!("{}", protocol.system_prompt(model));
    Ok(())
}

fn cmd_reply(
    config: &Config,
    content: String,
    style: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let protocol = protocol_for(config, style)?;
    let reply = protocol.process(&content);

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        println!("{}", reply.text);
    }
    Ok(())
}

fn cmd_analyze(config: &Config, before: &str, after: Option<&str>) -> anyhow::Result<()> {
    let guard = SemanticGuard::from_config(&config.semantic);
    let orchestrator = Orchestrator::try_new(config.clone())?;

    let ctx = guard.analyze(before);
    let content = orchestrator.engine().analyze(before);

    println!("Content Analysis:");
    println!("  Length:        {} bytes", content.bytes);
    println!("  Tokens:        {}", content.tokens);
    println!("  Code-heavy:    {}", content.is_code_heavy());
    println!("  Math:          {}", ctx.has_math);
    println!("  Code block:    {}", ctx.has_code);
    println!("  URLs:          {}", ctx.has_urls);
    println!("  Density:       {:.2} chars/token", ctx.density);

    if let Some(after) = after {
        let after_ctx = guard.analyze(after);
        let verdict = guard.compare(&ctx, &after_ctx);
        println!();
        println!("Comparison:");
        println!("  Density after: {:.2} chars/token", after_ctx.density);
        println!("  Safe:          {}", verdict.safe);
        if let Some(reason) = verdict.reason {
            println!("  Reason:        {reason}");
        }
    }

    Ok(())
}

fn cmd_classify(config: &Config, models: &[String]) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::try_new(config.clone())?;
    for model in models {
        println!(
            "{:<40} {:<10} {}",
            model,
            orchestrator.classify(model),
            Provider::from_model_id(model)
        );
    }
    Ok(())
}

/// Drop the single line ending a shell or `println!` appends
fn strip_line_ending(content: &str) -> &str {
    content
        .strip_suffix("\r\n")
        .or_else(|| content.strip_suffix('\n'))
        .unwrap_or(content)
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

fn write_output(output: Option<PathBuf>, content: &str) -> anyhow::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_ending_removes_one() {
        assert_eq!(strip_line_ending("a[s3]b\n"), "a[s3]b");
        assert_eq!(strip_line_ending("tail\n\n"), "tail\n");
        assert_eq!(strip_line_ending("crlf\r\n"), "crlf");
        assert_eq!(strip_line_ending("none"), "none");
    }

    #[test]
    fn test_restore_keeps_original_trailing_newline() {
        let config = Config::default();
        let engine = Orchestrator::try_new(config).unwrap().engine().clone();
        let original = "done.\n";
        let piped = format!("{}\n", engine.bracket(original).text);
        assert_eq!(
            engine.restore(CodecName::Bracket, strip_line_ending(&piped)).unwrap(),
            original
        );
    }
}
