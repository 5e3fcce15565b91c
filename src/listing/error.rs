use crate::error::AppError;
use thiserror::Error;

/// Client-correctable problem with listing input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid '{field}': {message}")]
pub struct ValidationError {
    /// Request parameter at fault
    pub field: String,

    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}
