use thiserror::Error;

#[derive(Debug, Error)]
pub enum BudgetBridgeError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BudgetBridgeError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        BudgetBridgeError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for BudgetBridgeError {
    fn from(e: serde_json::Error) -> Self {
        BudgetBridgeError::SerializationError(e.to_string())
    }
}
