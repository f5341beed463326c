use thiserror::Error;

/// Result type local to sluice-mem.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("allocation failed for {bytes} bytes (tag '{tag}', limit {limit})")]
    AllocFailed {
        tag: &'static str,
        bytes: usize,
        limit: usize,
    },
}
