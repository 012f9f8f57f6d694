use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use command::{
    run_capture, run_decode, run_encode, run_lookup, run_prompt, run_render, run_tree,
    CaptureArgs, DecodeArgs, EncodeArgs, LookupArgs, PromptArgs, RenderArgs, TreeArgs,
};
use config::AppConfig;

mod command;
mod config;
mod input;

#[derive(Parser)]
#[command(name = "troublecode")]
#[command(
    about = "Pack environment reports into portable tokens and read them back",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (default: $TROUBLECODE_CONFIG or ./troublecode.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Never compress tokens, as if the build had no compression transform
    #[arg(long, global = true)]
    no_compress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON bundle into a token
    Encode(EncodeArgs),

    /// Assemble a report from facts, logs and an error description, then encode it
    Capture(CaptureArgs),

    /// Decode a token back into JSON
    Decode(DecodeArgs),

    /// List every node of a token's report with its path
    Tree(TreeArgs),

    /// Show one node and the containers that lead to it
    Lookup(LookupArgs),

    /// Render commentary with [[ref:path]] bindings against a token's report
    Render(RenderArgs),

    /// Build a text-generation prompt for a token's report
    Prompt(PromptArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = AppConfig::load(cli.config.as_deref())?;
    let codec = config.codec(cli.no_compress);

    match cli.command {
        Commands::Encode(args) => run_encode(args, &codec).await,
        Commands::Capture(args) => run_capture(args, &config, &codec).await,
        Commands::Decode(args) => run_decode(args, &codec).await,
        Commands::Tree(args) => run_tree(args, &codec).await,
        Commands::Lookup(args) => run_lookup(args, &codec).await,
        Commands::Render(args) => run_render(args, &config, &codec).await,
        Commands::Prompt(args) => run_prompt(args, &codec).await,
    }
}
