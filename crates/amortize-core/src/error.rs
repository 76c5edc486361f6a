use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::LoanField;

/// The one message shown to an end user for any rejected loan submission.
pub const INVALID_INPUT_MESSAGE: &str = "Please enter valid positive numbers.";

/// Why a raw loan field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: LoanField, value: String },

    #[error("{field} must be greater than zero (got {value})")]
    NonPositive { field: LoanField, value: Decimal },

    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: LoanField, reason: String },
}

impl InputError {
    /// Field that failed validation.
    pub fn field(&self) -> LoanField {
        match self {
            InputError::NotANumber { field, .. }
            | InputError::NonPositive { field, .. }
            | InputError::OutOfRange { field, .. } => *field,
        }
    }

    /// All variants collapse to the same advisory for the end user.
    pub fn user_message(&self) -> &'static str {
        INVALID_INPUT_MESSAGE
    }
}

#[derive(Debug, Error)]
pub enum AmortizeError {
    #[error("Invalid loan input: {0}")]
    Input(#[from] InputError),

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for AmortizeError {
    fn from(e: serde_json::Error) -> Self {
        AmortizeError::SerializationError(e.to_string())
    }
}
