//! Prompts for the external text generator.
//!
//! Both modes ask for `[[ref:path]]` callback tokens so the reply can be rendered with
//! clickable bindings back into the report.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReportError, Result};

const BASE_INSTRUCTION: &str = "You are a troubleshooting assistant. Analyze the TroubleCode report. \
When referencing specific fields, include a callback token in the form [[ref:path.to.field]].";

const TRIAGE_ASK: &str = "Provide: 1) quick summary, 2) likely issues, 3) next checks.";

const TROUBLESHOOT_ASK: &str =
    "Provide: 1) possible reasons, 2) suspected fields with callbacks, 3) suggested next actions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// General health check of the whole report
    Triage,
    /// Focused on a user-described problem
    Troubleshoot,
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Triage => "triage",
            Self::Troubleshoot => "troubleshoot",
        })
    }
}

impl FromStr for PromptMode {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "triage" => Ok(Self::Triage),
            "troubleshoot" => Ok(Self::Troubleshoot),
            _ => Err(ReportError::UnknownMode(s.to_string())),
        }
    }
}

/// Build the prompt for `mode` over `bundle`.
///
/// `issue` is required (non-blank) for [`PromptMode::Troubleshoot`] and ignored for triage.
pub fn build_prompt(mode: PromptMode, bundle: &Value, issue: Option<&str>) -> Result<String> {
    let report_json = serde_json::to_string_pretty(bundle)?;
    match mode {
        PromptMode::Triage => Ok(format!(
            "{BASE_INSTRUCTION}\n\n{TRIAGE_ASK}\n\nReport JSON:\n{report_json}"
        )),
        PromptMode::Troubleshoot => {
            let issue = issue
                .map(str::trim)
                .filter(|issue| !issue.is_empty())
                .ok_or(ReportError::EmptyIssue)?;
            Ok(format!(
                "{BASE_INSTRUCTION}\n\nUser issue description:\n{issue}\n\n{TROUBLESHOOT_ASK}\n\nReport JSON:\n{report_json}"
            ))
        }
    }
}
