use thiserror::Error;

/// Errors raised while building or loading visual styles.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error("Invalid color value: {0:?}")]
    InvalidColor(String),
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
    #[error("Invalid theme document: {0}")]
    InvalidTheme(String),
}
