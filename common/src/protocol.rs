//! Shared HTTP protocol types for communication between the agent and the
//! collector.

use serde::{Deserialize, Serialize};

/// Response body for `POST /collect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectResponse {
    pub status: String,
    pub message: String,
}

impl CollectResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Health-check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}
