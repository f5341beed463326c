//! Convenient re-exports for downstream crates.

pub use crate::batch::{Batch, ColumnData};
pub use crate::config::EngineConfig;
pub use crate::error::{Error, Result};
pub use crate::schema::{Field, Schema};
pub use crate::value::{widen, Value, ValueKind};
