use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("{value} value cannot be stored in field {field}")]
    FieldMismatch {
        field: &'static str,
        value: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, PayloadError>;
