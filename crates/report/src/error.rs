use thiserror::Error;

/// Result type for report assembly
pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    /// Troubleshooting needs a description of what went wrong
    #[error("Issue description is empty")]
    EmptyIssue,

    /// Host facts tried to replace a key the builder owns
    #[error("Section '{0}' is reserved")]
    ReservedSection(String),

    /// Facts must be a mapping of section name to value
    #[error("Facts must be a JSON object, got {0}")]
    FactsNotAnObject(&'static str),

    #[error("Unknown prompt mode '{0}' (expected 'triage' or 'troubleshoot')")]
    UnknownMode(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
