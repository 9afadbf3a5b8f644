use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoanError {
    #[error("Unknown repayment plan: {0}")]
    UnknownPlan(String),

    #[error("Repayment horizon exhausted: {years} years remaining")]
    HorizonExhausted { years: i64 },

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid plan table: {0}")]
    PlanTable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LoanError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::Serialization(e.to_string())
    }
}
