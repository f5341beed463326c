//! Step trait + the side channels steps write to.
//!
//! The pipeline threads every decoded batch through its steps in order.
//! `process` takes the batch by value and returns the batch to hand to the
//! next step, or `None` to drop it. `flush` runs once at end of input and
//! may emit one final batch (aggregating steps emit their result here).

use serde::Serialize;
use sluice_core::batch::Batch;
use sluice_mem::ByteBuffer;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpError {
    #[error("planning error: {0}")]
    Plan(String),

    #[error("execution error: {0}")]
    Exec(String),

    #[error("schema error: {0}")]
    Schema(String),
}

impl From<sluice_core::error::Error> for OpError {
    fn from(e: sluice_core::error::Error) -> Self {
        match e {
            sluice_core::error::Error::Schema(msg) => OpError::Schema(msg),
            other => OpError::Exec(other.to_string()),
        }
    }
}

/// Auxiliary output streams shared by every step of a pipeline.
#[derive(Debug, Default)]
pub struct SideChannels {
    /// Per-row or per-column problems that did not stop the pipeline.
    pub errors: ByteBuffer,
    /// Run and per-step counters.
    pub stats: ByteBuffer,
    /// Sampling summaries.
    pub samples: ByteBuffer,
}

impl SideChannels {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Append `value` to `buf` as one JSON line.
pub fn write_json_line<T: Serialize>(buf: &mut ByteBuffer, value: &T) -> Result<(), OpError> {
    serde_json::to_writer(&mut *buf, value)
        .map_err(|e| OpError::Exec(format!("writing side channel record: {}", e)))?;
    buf.write(b"\n");
    Ok(())
}

/// Trait that all pipeline steps implement.
pub trait Step: Send {
    /// Stable step name, as used in plans.
    fn name(&self) -> &'static str;

    fn process(&mut self, batch: Batch, side: &mut SideChannels)
        -> Result<Option<Batch>, OpError>;

    fn flush(&mut self, _side: &mut SideChannels) -> Result<Option<Batch>, OpError> {
        Ok(None)
    }
}
