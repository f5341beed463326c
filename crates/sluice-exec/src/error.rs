use sluice_planner::PlanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("processing error: {0}")]
    Step(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("{0}")]
    Usage(&'static str),
}
