use thiserror::Error;

#[derive(Debug, Error)]
pub enum DcaError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    #[error("Insufficient overlap: {aligned} aligned periods, at least {required} required")]
    InsufficientOverlap { aligned: usize, required: usize },

    #[error("Upstream data unavailable: {0}")]
    UpstreamDataUnavailable(String),

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DcaError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        DcaError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DcaError {
    fn from(e: serde_json::Error) -> Self {
        DcaError::SerializationError(e.to_string())
    }
}
