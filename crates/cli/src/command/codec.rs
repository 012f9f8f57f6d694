use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use troublecode_codec::BundleCodec;
use troublecode_report::{BundleBuilder, LogEntry, LogSink, SharedLogRing};

use super::decode_from;
use crate::config::AppConfig;
use crate::input::{read_json, read_text, TokenSource};

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// JSON file to encode (`-` or omitted for stdin)
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub source: TokenSource,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// What went wrong, in the user's words
    #[arg(short, long, default_value = "")]
    pub error: String,

    /// JSON object whose entries become report sections
    #[arg(long)]
    pub facts: Option<PathBuf>,

    /// Captured log lines, one JSON object per line
    #[arg(long)]
    pub logs: Option<PathBuf>,

    /// Print the assembled bundle JSON instead of its token
    #[arg(long)]
    pub json: bool,
}

pub async fn run_encode(args: EncodeArgs, codec: &BundleCodec) -> Result<()> {
    let value = read_json(&args.input, "bundle")?;
    let token = encode(&value, codec).await?;
    println!("{token}");
    Ok(())
}

pub async fn run_decode(args: DecodeArgs, codec: &BundleCodec) -> Result<()> {
    let bundle = decode_from(&args.source, codec).await?;
    let out = if args.compact {
        serde_json::to_string(&bundle)?
    } else {
        serde_json::to_string_pretty(&bundle)?
    };
    println!("{out}");
    Ok(())
}

pub async fn run_capture(args: CaptureArgs, config: &AppConfig, codec: &BundleCodec) -> Result<()> {
    let sink = SharedLogRing::new(config.log_capacity);
    if let Some(path) = &args.logs {
        for entry in parse_log_lines(&read_text(path, "logs")?)? {
            sink.record(entry);
        }
        if sink.dropped() > 0 {
            log::info!(
                "kept the newest {} log entries, dropped {}",
                sink.len(),
                sink.dropped()
            );
        }
    }

    let mut builder = BundleBuilder::new().user_error(args.error);
    if let Some(path) = &args.facts {
        builder = builder
            .facts(read_json(path, "facts")?)
            .context("Failed to add facts")?;
    }
    let bundle = builder
        .logs_from(&sink)
        .build()
        .context("Failed to assemble bundle")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        println!("{}", encode(&bundle, codec).await?);
    }
    Ok(())
}

async fn encode(value: &Value, codec: &BundleCodec) -> Result<String> {
    let encoded = codec
        .encode(value)
        .await
        .context("Failed to encode bundle")?;
    log::info!(
        "encoded {} bytes of JSON into a {}-char token ({})",
        encoded.json_bytes,
        encoded.token.len(),
        if encoded.compressed { "gzip" } else { "raw" }
    );
    Ok(encoded.token)
}

/// Parse JSON Lines log input. Blank lines are skipped.
fn parse_log_lines(raw: &str) -> Result<Vec<LogEntry>> {
    let mut entries = Vec::new();
    for (n, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: LogEntry = serde_json::from_str(line)
            .with_context(|| format!("Invalid log entry on line {}", n + 1))?;
        entries.push(entry);
    }
    Ok(entries)
}
