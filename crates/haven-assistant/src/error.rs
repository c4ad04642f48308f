//! Assistant-specific error types.

use thiserror::Error;

/// Errors that can occur talking to the generative-AI API.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Assistant is not configured (missing API key)")]
    NotConfigured,

    #[error("AI API returned an error: {0}")]
    Api(String),

    #[error("AI API returned no usable candidates")]
    EmptyResponse,

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for AssistantError {
    fn from(e: reqwest::Error) -> Self {
        AssistantError::Api(e.to_string())
    }
}

impl From<AssistantError> for haven_common::error::HavenError {
    fn from(e: AssistantError) -> Self {
        haven_common::error::HavenError::Upstream {
            service: "assistant".into(),
            message: e.to_string(),
        }
    }
}
