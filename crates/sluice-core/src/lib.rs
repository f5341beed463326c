#![forbid(unsafe_code)]
//! sluice-core: value kinds, the typed columnar `Batch`, temporal helpers,
//! number formatting, and engine configuration.
//!
//! Nothing in this crate performs IO. Decoders, steps, and the pipeline all
//! exchange data through `Batch`, which is moved (never shared) between
//! stages.

pub mod batch;
pub mod config;
pub mod error;
pub mod format;
pub mod prelude;
pub mod schema;
pub mod temporal;
pub mod value;
