use serde::Serialize;
use thiserror::Error;

/// Request-level failure. Bad input maps to a client error, anything else to
/// a server error carrying the underlying message.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("{0}")]
    BadInput(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AnalyzeError {
    pub fn bad_input(message: impl Into<String>) -> Self {
        AnalyzeError::BadInput(message.into())
    }

    /// HTTP-style status code for the failure.
    pub fn status(&self) -> u16 {
        match self {
            AnalyzeError::BadInput(_) => 400,
            AnalyzeError::Internal(_) => 500,
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            AnalyzeError::BadInput(_) => 2,
            AnalyzeError::Internal(_) => 1,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: self.status(),
            detail: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub detail: String,
}
