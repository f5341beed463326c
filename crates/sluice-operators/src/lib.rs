#![forbid(unsafe_code)]
//! sluice-operators: pipeline steps.
//!
//! - `stats`: streaming per-column summaries (moments, P² quantiles,
//!   HyperLogLog, adaptive histogram, reservoir sample).
//! - Row steps: `filter`, `select`, `rename`, `head`, `skip`, `sort`,
//!   `sample`.
//!
//! Steps are synchronous and own the batches they are handed.

pub mod traits;

pub mod filter;
pub mod head;
pub mod rename;
pub mod sample;
pub mod select;
pub mod skip;
pub mod sort;
pub mod stats;

pub use traits::{write_json_line, OpError, SideChannels, Step};
