use thiserror::Error;

/// Result type local to sluice-io.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid codec options: {0}")]
    Options(String),

    #[error("{0}")]
    Encode(String),

    #[error("csv writer: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("scratch memory: {0}")]
    Mem(#[from] sluice_mem::Error),

    #[error("batch: {0}")]
    Core(#[from] sluice_core::error::Error),
}
