use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Type mismatch: column '{column}' is {actual}, not {expected}")]
    Type {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}
