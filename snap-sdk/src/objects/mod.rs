//! Wire objects for SNAP endpoints.

pub mod qr;
pub mod token;

use serde::{Deserialize, Serialize};

/// Message used when an error response carries no readable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Normalized body of a non-success response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub response_code: String,
    #[serde(default)]
    pub response_message: String,
}

impl ApiError {
    /// Parse an error body, falling back to a generic message when the body
    /// is missing, not JSON, or has an empty message.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<ApiError>(body) {
            Ok(error) if !error.response_message.is_empty() => error,
            Ok(error) => Self {
                response_code: error.response_code,
                response_message: UNKNOWN_ERROR_MESSAGE.to_owned(),
            },
            Err(_) => Self {
                response_code: String::new(),
                response_message: UNKNOWN_ERROR_MESSAGE.to_owned(),
            },
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.response_code.is_empty() {
            f.write_str(&self.response_message)
        } else {
            write!(f, "{} ({})", self.response_message, self.response_code)
        }
    }
}
