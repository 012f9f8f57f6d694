use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

/// Rendering itself never fails; only building a renderer from bad options does.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Invalid render options: {0}")]
    InvalidOptions(String),
}
