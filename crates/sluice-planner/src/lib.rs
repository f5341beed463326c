#![forbid(unsafe_code)]
//! sluice-planner: JSON/YAML plan documents → a validated, typed pipeline
//! description.
//!
//! A plan is a linear list of steps, each an `op` key plus an `args` object:
//! ```yaml
//! steps:
//!   - op: codec.csv.decode
//!     args: { delimiter: "," }
//!   - op: filter
//!     args: { expr: "age >= 18" }
//!   - op: stats
//!     args: { stats: [count, avg, p75] }
//!   - op: codec.csv.encode
//! ```
//! Compilation resolves each op key, deserializes its args into the step's
//! typed argument struct and checks the decoder-first/encoder-last shape.
//! Exec instantiates the concrete decoder, steps and encoder from the result.

pub mod compile;
pub mod error;
pub mod plan;

pub use compile::{compile, CompiledPlan, DecoderSpec, EncoderSpec, StepSpec};
pub use error::PlanError;
pub use plan::{Plan, PlanStep};
