//! Centralized error types for Haven.
//!
//! Uses `thiserror` for ergonomic error definitions and provides HTTP-friendly
//! error variants that can be directly converted to API responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Core application error type used across all Haven services.
#[derive(Debug, thiserror::Error)]
pub enum HavenError {
    // === Auth errors ===
    #[error("Invalid login credentials. Please check your username/email and password")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Please verify your email address to continue")]
    EmailNotVerified { email: String },

    #[error("This account has been deactivated")]
    AccountDeactivated,

    // === Resource errors ===
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("{resource} already exists")]
    AlreadyExists { resource: String },

    // === Validation errors ===
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // === Permission errors ===
    #[error("This action requires the {role} role")]
    MissingRole { role: String },

    #[error("Forbidden")]
    Forbidden,

    // === Rate limiting ===
    #[error("Rate limit exceeded. Retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // === External services ===
    #[error("{service} error: {message}")]
    Upstream { service: String, message: String },

    // === Infrastructure errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body sent to clients.
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_secs: Option<u64>,
}

impl HavenError {
    /// Map error to HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::Unauthorized
            | Self::EmailNotVerified { .. }
            | Self::AccountDeactivated => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadyExists { .. } => StatusCode::CONFLICT,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::MissingRole { .. } | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Redis(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Error code string for programmatic handling by clients.
    pub fn error_code(&self) -> &str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::EmailNotVerified { .. } => "EMAIL_NOT_VERIFIED",
            Self::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::MissingRole { .. } => "MISSING_ROLE",
            Self::Forbidden => "FORBIDDEN",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Redis(_) => "CACHE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for HavenError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't leak internal details to clients
        let message = match &self {
            HavenError::Database(e) => {
                tracing::error!("Database error: {e}");
                "An internal error occurred".to_string()
            }
            HavenError::Redis(e) => {
                tracing::error!("Redis error: {e}");
                "An internal error occurred".to_string()
            }
            HavenError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                "An internal error occurred".to_string()
            }
            HavenError::Upstream { service, message } => {
                tracing::error!(service = %service, "Upstream error: {message}");
                "Sorry, we're having trouble reaching an external service right now. Please try again.".to_string()
            }
            other => other.to_string(),
        };

        let email = if let HavenError::EmailNotVerified { email } = &self {
            Some(email.clone())
        } else {
            None
        };

        let retry_after_secs = if let HavenError::RateLimited { retry_after_secs } = &self {
            Some(*retry_after_secs)
        } else {
            None
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            error: self.error_code().to_string(),
            message,
            email,
            retry_after_secs,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Convenience type alias for Results using HavenError.
pub type HavenResult<T> = Result<T, HavenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_401() {
        assert_eq!(
            HavenError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HavenError::EmailNotVerified { email: "a@b.c".into() }.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HavenError::AccountDeactivated.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn permission_errors_map_to_403() {
        assert_eq!(HavenError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            HavenError::MissingRole { role: "admin".into() }.status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn conflict_and_rate_limit_codes() {
        assert_eq!(
            HavenError::AlreadyExists { resource: "Wishlist entry".into() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            HavenError::RateLimited { retry_after_secs: 42 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            HavenError::RateLimited { retry_after_secs: 42 }.error_code(),
            "RATE_LIMITED"
        );
    }

    #[test]
    fn upstream_maps_to_bad_gateway() {
        let err = HavenError::Upstream {
            service: "gemini".into(),
            message: "timeout".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
