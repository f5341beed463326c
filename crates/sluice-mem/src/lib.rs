#![forbid(unsafe_code)]
//! sluice-mem: allocation primitives shared by codecs and the pipeline.
//!
//! - [`ScratchArena`]: a bump arena for short-lived per-line storage. Its
//!   allocations borrow the arena, and `reset` needs `&mut self`, so nothing
//!   allocated before a reset can be used after it.
//! - [`ByteBuffer`]: a single-producer/single-consumer byte queue used for
//!   undecoded input and for every output channel.
//! - [`PeakTracker`]: high-water mark bookkeeping for both.

pub mod arena;
pub mod buffer;
pub mod error;
pub mod tracking;

pub use arena::ScratchArena;
pub use buffer::ByteBuffer;
pub use error::{Error, Result};
pub use tracking::PeakTracker;
