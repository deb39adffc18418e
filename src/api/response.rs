/// Uniform response envelope for every endpoint
use serde::{Deserialize, Serialize};

/// Standard structure of an API response: outcome flag, human-readable
/// message, optional payload and a list of errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response with the default message.
    pub fn ok(data: T) -> Self {
        Self::success(data, "Request succeeded.")
    }

    /// Successful response with an explicit message.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// Failed response carrying the error list.
    pub fn error(errors: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
        }
    }
}
