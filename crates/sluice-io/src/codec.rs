//! Decoder/encoder interfaces driven by the pipeline.

use sluice_core::batch::Batch;
use sluice_mem::ByteBuffer;

use crate::error::Result;

/// Byte stream → batches.
pub trait Decoder: Send {
    /// Stable codec name, as used in plans.
    fn name(&self) -> &'static str;

    /// Consume `input` and return every batch that became complete. Bytes of
    /// an unfinished record stay buffered for the next call.
    fn decode(&mut self, input: &[u8]) -> Result<Vec<Batch>>;

    /// End of input: drain the final partial record and any partially-filled
    /// batch.
    fn flush(&mut self) -> Result<Vec<Batch>>;
}

/// Batches → byte stream.
pub trait Encoder: Send {
    fn name(&self) -> &'static str;

    fn encode(&mut self, batch: &Batch, out: &mut ByteBuffer) -> Result<()>;

    fn flush(&mut self, out: &mut ByteBuffer) -> Result<()>;
}
