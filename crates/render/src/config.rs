use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Renderer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Deepest heading level produced; deeper `#` runs are clamped to it (1-6)
    pub max_heading_level: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_heading_level: 6,
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<()> {
        if !(1..=6).contains(&self.max_heading_level) {
            return Err(RenderError::InvalidOptions(format!(
                "max_heading_level must be between 1 and 6 (got {})",
                self.max_heading_level
            )));
        }
        Ok(())
    }
}
