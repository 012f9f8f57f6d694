use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use troublecode_codec::BundleCodec;
use troublecode_render::{to_html, to_text, Renderer};
use troublecode_report::{build_prompt, PromptMode};
use troublecode_tree::build_path_index;

use super::decode_from;
use crate::config::AppConfig;
use crate::input::{read_text, TokenSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Html,
    Json,
    Text,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Commentary text to render (`-` for stdin)
    #[arg(short, long)]
    pub commentary: PathBuf,

    #[command(flatten)]
    pub source: TokenSource,

    #[arg(short, long, value_enum, default_value_t = RenderFormat::Html)]
    pub format: RenderFormat,

    /// Fail when a reference names a path the report does not have
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct PromptArgs {
    #[command(flatten)]
    pub source: TokenSource,

    /// Prompt mode: triage or troubleshoot
    #[arg(short, long, default_value_t = PromptMode::Triage, value_parser = PromptMode::from_str)]
    pub mode: PromptMode,

    /// What the user is struggling with (required for troubleshoot)
    #[arg(long)]
    pub issue: Option<String>,
}

pub async fn run_render(args: RenderArgs, config: &AppConfig, codec: &BundleCodec) -> Result<()> {
    if args.commentary.as_os_str() == "-" && args.source.uses_stdin() {
        bail!("Commentary and token cannot both come from stdin; pass --token or --input.");
    }
    let renderer = Renderer::new(config.render_options())?;
    let commentary = read_text(&args.commentary, "commentary")?;
    let bundle = decode_from(&args.source, codec).await?;
    let index = build_path_index(&bundle);

    let document = renderer.render(&commentary, &index);
    let unresolved = document.unresolved(&index);
    for path in &unresolved {
        log::warn!("reference [[ref:{path}]] does not match any report field");
    }
    if args.strict && !unresolved.is_empty() {
        bail!("{} unresolved reference(s)", unresolved.len());
    }

    let out = match args.format {
        RenderFormat::Html => to_html(&document, &config.html_options()),
        RenderFormat::Json => serde_json::to_string_pretty(&document)?,
        RenderFormat::Text => to_text(&document),
    };
    println!("{out}");
    Ok(())
}

pub async fn run_prompt(args: PromptArgs, codec: &BundleCodec) -> Result<()> {
    let bundle = decode_from(&args.source, codec).await?;
    let prompt = build_prompt(args.mode, &bundle, args.issue.as_deref())
        .context("Failed to build prompt")?;
    println!("{prompt}");
    Ok(())
}
