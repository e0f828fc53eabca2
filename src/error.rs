//! Error types for the content and sentiment pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Generation service error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Empty response from generation service")]
    EmptyResponse,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ReelError {
    /// True when the external text service failed (network, auth, quota, bad reply envelope).
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            ReelError::Api(_)
                | ReelError::Auth(_)
                | ReelError::Network(_)
                | ReelError::RateLimited { .. }
                | ReelError::EmptyResponse
                | ReelError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReelError>;
