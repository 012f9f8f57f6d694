use thiserror::Error;

pub type Result<T> = std::result::Result<T, PathError>;

/// Errors from parsing a path string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Empty key at offset {offset}")]
    EmptyKey { offset: usize },

    #[error("Unclosed index bracket at offset {offset}")]
    UnclosedIndex { offset: usize },

    #[error("Invalid index {raw:?} at offset {offset}")]
    InvalidIndex { raw: String, offset: usize },

    #[error("Unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
}
