#![forbid(unsafe_code)]
//! sluice-exec: the streaming pipeline engine.
//!
//! [`Pipeline`] owns one decoder, the transform steps and one encoder, plus
//! four output channels (main, errors, stats, samples). Hosts push input
//! bytes, call `finish` once, and pull each channel at their own pace.

pub mod build;
pub mod error;
pub mod last_error;
pub mod metrics;
pub mod pipeline;

pub use error::ExecError;
pub use last_error::{clear_last_error, last_error};
pub use pipeline::{Channel, Pipeline, RunStats};
