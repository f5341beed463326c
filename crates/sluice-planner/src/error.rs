use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("invalid plan: {0}")]
    Invalid(String),

    #[error("plan has no steps")]
    Empty,

    #[error("unknown op: '{0}'")]
    UnknownOp(String),

    #[error("invalid args for '{op}': {reason}")]
    InvalidArgs { op: String, reason: String },

    #[error("multiple decoders not supported")]
    MultipleDecoders,

    #[error("multiple encoders not supported")]
    MultipleEncoders,

    #[error("plan has no decoder")]
    NoDecoder,

    #[error("plan has no encoder")]
    NoEncoder,

    #[error("decoder must be the first step")]
    DecoderNotFirst,

    #[error("encoder must be the last step")]
    EncoderNotLast,
}
