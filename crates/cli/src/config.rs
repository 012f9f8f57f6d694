use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use troublecode_codec::{BundleCodec, CompressionAdapter, DEFAULT_MAX_PAYLOAD_BYTES};
use troublecode_render::{HtmlOptions, RenderOptions};
use troublecode_report::DEFAULT_LOG_CAPACITY;

pub const CONFIG_FILE_NAME: &str = "troublecode.toml";
pub const CONFIG_ENV: &str = "TROUBLECODE_CONFIG";
pub const COMPRESSION_ENV: &str = "TROUBLECODE_COMPRESSION";
pub const MAX_PAYLOAD_ENV: &str = "TROUBLECODE_MAX_PAYLOAD_BYTES";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// Use the compression transform when the build has one
    Auto,
    /// Behave as if no transform were available
    Off,
}

impl FromStr for CompressionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "off" => Ok(Self::Off),
            other => bail!("compression must be 'auto' or 'off' (got '{other}')"),
        }
    }
}

/// Settings from `troublecode.toml`, then environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub compression: CompressionMode,
    /// Cap on the decoded JSON size of a token
    pub max_payload_bytes: usize,
    pub max_heading_level: u8,
    /// Added to heading levels in HTML output
    pub heading_offset: u8,
    /// Log entries kept by `capture` (oldest dropped first)
    pub log_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            compression: CompressionMode::Auto,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_heading_level: RenderOptions::default().max_heading_level,
            heading_offset: HtmlOptions::default().heading_offset,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Load from `explicit`, `$TROUBLECODE_CONFIG`, or `./troublecode.toml` when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::from_file(&path)?,
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `TROUBLECODE_*` overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(COMPRESSION_ENV) {
            self.compression = raw
                .parse()
                .with_context(|| format!("Invalid {COMPRESSION_ENV}"))?;
        }
        if let Some(raw) = lookup(MAX_PAYLOAD_ENV) {
            self.max_payload_bytes = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {MAX_PAYLOAD_ENV}: '{raw}'"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_payload_bytes == 0 {
            bail!("max_payload_bytes must be > 0");
        }
        self.render_options()
            .validate()
            .context("max_heading_level")?;
        if self.heading_offset > 5 {
            bail!(
                "heading_offset must be between 0 and 5 (got {})",
                self.heading_offset
            );
        }
        Ok(())
    }

    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            max_heading_level: self.max_heading_level,
        }
    }

    #[must_use]
    pub fn html_options(&self) -> HtmlOptions {
        HtmlOptions {
            heading_offset: self.heading_offset,
        }
    }

    /// Codec honouring the compression setting; `force_off` wins over the config.
    #[must_use]
    pub fn codec(&self, force_off: bool) -> BundleCodec {
        let adapter = if force_off || self.compression == CompressionMode::Off {
            CompressionAdapter::unavailable()
        } else {
            CompressionAdapter::detect()
        };
        log::debug!("compression transform: {}", adapter.transform_name());
        BundleCodec::new(adapter).with_max_payload_bytes(self.max_payload_bytes)
    }
}
