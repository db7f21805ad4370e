//! Defines the custom error types for the deposit client.
//!
//! This uses `thiserror` for clean, boilerplate-free error handling.

use crate::response::DepositResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepositError {
    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    #[error("JSON Deserialization Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization Error: {0}")]
    Serialization(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Transport Error: {0}")]
    Transport(String),

    /// The deposit server answered with a non-success status. The parsed
    /// response is kept so its deposit fields remain available.
    #[error("Deposit request failed with HTTP status {status}")]
    Rejected {
        status: u16,
        response: Box<DepositResponse>,
    },

    #[error("I/O Error: {1} - {0}")]
    Io(#[source] std::io::Error, String),
}

impl From<std::io::Error> for DepositError {
    fn from(err: std::io::Error) -> Self {
        DepositError::Io(err, "IO operation failed".to_string())
    }
}

impl DepositError {
    /// Returns the server response attached to a rejected request, if any.
    pub fn response(&self) -> Option<&DepositResponse> {
        match self {
            DepositError::Rejected { response, .. } => Some(&**response),
            _ => None,
        }
    }
}
