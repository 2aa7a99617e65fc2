use thiserror::Error;

/// TF publisher errors
#[derive(Debug, Error)]
pub enum TfError {
    #[error("target_frame and source frame are the same ({0}, {0}) this cannot work")]
    SameFrame(String),

    #[error("Invalid value '{value}' for argument '{name}'")]
    InvalidArgument { name: String, value: String },

    #[error("Publish period must be positive, got {0} ms")]
    InvalidPeriod(f64),

    #[error("Quaternion length cannot be 0.0")]
    DegenerateQuaternion,

    #[error("Unknown parameter '{0}'")]
    UnknownParam(String),

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },
}

/// Result type for TF operations
pub type TfResult<T> = Result<T, TfError>;
