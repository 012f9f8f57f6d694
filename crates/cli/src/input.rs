use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

/// Where a command reads its token from: `--token`, `--input <FILE>`, or stdin.
#[derive(Args, Debug, Clone)]
pub struct TokenSource {
    /// Token text
    #[arg(long, conflicts_with = "input")]
    pub token: Option<String>,

    /// File holding the token (`-` for stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

impl TokenSource {
    pub fn uses_stdin(&self) -> bool {
        self.token.is_none() && self.input.as_deref().map_or(true, is_stdin)
    }

    pub fn read(&self) -> Result<String> {
        let raw = match (&self.token, &self.input) {
            (Some(token), _) => token.clone(),
            (None, Some(path)) => read_text(path, "token")?,
            (None, None) => read_stdin("token")?,
        };
        let token = raw.trim();
        if token.is_empty() {
            bail!("Token is empty. Provide --token, --input, or pipe it via stdin.");
        }
        Ok(token.to_string())
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read a whole file, or stdin for `-`.
pub fn read_text(path: &Path, what: &str) -> Result<String> {
    if is_stdin(path) {
        return read_stdin(what);
    }
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} from {}", path.display()))
}

pub fn read_stdin(what: &str) -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .with_context(|| format!("Failed to read {what} from stdin"))?;
    Ok(buffer)
}

pub fn read_json(path: &Path, what: &str) -> Result<serde_json::Value> {
    let raw = read_text(path, what)?;
    serde_json::from_str(&raw).with_context(|| format!("{what} is not valid JSON"))
}
