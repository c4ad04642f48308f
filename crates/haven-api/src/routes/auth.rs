//! Authentication routes — register, email confirmation, login, refresh,
//! password reset.
//!
//! Registration does not log the user in: the account stays unusable until
//! the emailed confirmation link is followed. Login deliberately returns
//! one generic error for unknown users and wrong passwords.

use axum::{Json, Router, extract::State, routing::post};
use haven_common::{
    error::{HavenError, HavenResult},
    id,
    models::user::{LoginRequest, RegisterRequest, Role, UserResponse},
    validation::validate_request,
};
use haven_db::repository::{tokens, tokens::TokenPurpose, users};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::{
    AppState,
    auth::{self, TokenPair},
};

/// Auth router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/confirm-email", post(confirm_email))
        .route("/auth/resend-confirmation", post(resend_confirmation))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/password-reset", post(password_reset_request))
        .route("/auth/password-reset/confirm", post(password_reset_confirm))
}

#[derive(Serialize)]
pub(crate) struct AuthResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Serialize)]
struct RegisterResponse {
    message: String,
    user_id: uuid::Uuid,
    email: String,
}

/// POST /api/v1/auth/register
///
/// Create a new account and send the confirmation link. The account cannot
/// log in until the email is confirmed.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> HavenResult<Json<RegisterResponse>> {
    validate_request(&body)?;

    let role = body.role.unwrap_or(Role::Buyer);
    if role == Role::Admin {
        return Err(HavenError::Validation {
            message: "Admin accounts cannot be self-registered".into(),
        });
    }

    // Check username and email availability
    if users::find_by_username(&state.db.pg, &body.username)
        .await?
        .is_some()
    {
        return Err(HavenError::AlreadyExists {
            resource: "Username".into(),
        });
    }
    if users::find_by_email(&state.db.pg, &body.email).await?.is_some() {
        return Err(HavenError::AlreadyExists {
            resource: "Email".into(),
        });
    }

    let password_hash = auth::hash_password(&body.password)
        .map_err(|e| HavenError::Internal(anyhow::anyhow!("{e}")))?;

    let user = users::create_user(
        &state.db.pg,
        id::generate_id(),
        &body.username,
        &body.email,
        &password_hash,
        role,
        body.phone_number.as_deref(),
        false,
    )
    .await?;

    send_confirmation_link(&state, &user.id, &user.username, &user.email).await?;

    tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "New user registered");

    Ok(Json(RegisterResponse {
        message: "Registration successful! Please check your email to confirm your account before logging in.".into(),
        user_id: user.id,
        email: user.email,
    }))
}

/// Issue a fresh confirmation token and email the link. Mail failures are
/// logged, not surfaced — the user can always request a resend.
async fn send_confirmation_link(
    state: &AppState,
    user_id: &uuid::Uuid,
    username: &str,
    email: &str,
) -> HavenResult<()> {
    let config = haven_common::config::get();
    let (raw, digest) = auth::new_account_token();
    tokens::issue(
        &state.db.pg,
        id::generate_id(),
        *user_id,
        &digest,
        TokenPurpose::ConfirmEmail,
        chrono::Utc::now() + chrono::Duration::seconds(config.auth.confirm_token_ttl_secs as i64),
    )
    .await?;

    let confirm_url = format!("{}/confirm-email/{raw}", config.server.frontend_url);
    if let Err(e) = state
        .mailer
        .send_confirmation_email(email, username, &confirm_url)
        .await
    {
        tracing::warn!(email = %email, "Failed to send confirmation email: {e}");
    }
    Ok(())
}

#[derive(Deserialize)]
struct ConfirmEmailRequest {
    token: String,
}

/// POST /api/v1/auth/confirm-email
///
/// Consume the emailed token, activate the account, and log the user in.
async fn confirm_email(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConfirmEmailRequest>,
) -> HavenResult<Json<AuthResponse>> {
    let digest = auth::hash_account_token(&body.token);
    let user_id = tokens::consume(&state.db.pg, &digest, TokenPurpose::ConfirmEmail)
        .await?
        .ok_or(HavenError::InvalidToken)?;

    users::set_email_verified(&state.db.pg, user_id).await?;
    let user = users::find_by_id(&state.db.pg, user_id)
        .await?
        .ok_or(HavenError::InvalidToken)?;

    let config = haven_common::config::get();
    let tokens = auth::generate_token_pair(
        user.id,
        &user.username,
        user.role,
        &config.auth.jwt_secret,
        config.auth.access_token_ttl_secs,
        config.auth.refresh_token_ttl_secs,
    )
    .map_err(|e| HavenError::Internal(e.into()))?;

    tracing::info!(user_id = %user.id, "Email confirmed");

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens,
    }))
}

#[derive(Deserialize, Validate)]
struct ResendConfirmationRequest {
    #[validate(email(message = "Invalid email format"))]
    email: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

/// POST /api/v1/auth/resend-confirmation
async fn resend_confirmation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResendConfirmationRequest>,
) -> HavenResult<Json<MessageResponse>> {
    validate_request(&body)?;

    let user = users::find_by_email(&state.db.pg, &body.email)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "User".into(),
        })?;

    if user.email_verified {
        return Err(HavenError::Validation {
            message: "Email is already verified".into(),
        });
    }

    send_confirmation_link(&state, &user.id, &user.username, &user.email).await?;

    Ok(Json(MessageResponse {
        message: "Confirmation email has been resent. Please check your inbox.".into(),
    }))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username or email + password. Returns JWT tokens.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> HavenResult<Json<AuthResponse>> {
    validate_request(&body)?;

    let user = users::find_by_identity(&state.db.pg, &body.username)
        .await?
        .ok_or(HavenError::InvalidCredentials)?;

    // OAuth-only accounts have no password hash
    if user.password_hash.is_empty() {
        return Err(HavenError::InvalidCredentials);
    }

    let valid = auth::verify_password(&body.password, &user.password_hash)
        .map_err(|_| HavenError::InvalidCredentials)?;
    if !valid {
        return Err(HavenError::InvalidCredentials);
    }

    if !user.email_verified {
        return Err(HavenError::EmailNotVerified { email: user.email });
    }
    if !user.is_active {
        return Err(HavenError::AccountDeactivated);
    }

    let config = haven_common::config::get();
    let tokens = auth::generate_token_pair(
        user.id,
        &user.username,
        user.role,
        &config.auth.jwt_secret,
        config.auth.access_token_ttl_secs,
        config.auth.refresh_token_ttl_secs,
    )
    .map_err(|e| HavenError::Internal(e.into()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens,
    }))
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new token pair.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> HavenResult<Json<TokenPair>> {
    let config = haven_common::config::get();

    let claims = auth::validate_token(&body.refresh_token, &config.auth.jwt_secret)
        .map_err(|_| HavenError::InvalidToken)?;

    if claims.token_type != "refresh" {
        return Err(HavenError::InvalidToken);
    }

    let user_id: uuid::Uuid = claims.sub.parse().map_err(|_| HavenError::InvalidToken)?;

    // Verify user still exists and isn't deactivated
    let user = users::find_by_id(&state.db.pg, user_id)
        .await?
        .ok_or(HavenError::InvalidToken)?;
    if !user.is_active {
        return Err(HavenError::AccountDeactivated);
    }

    let tokens = auth::generate_token_pair(
        user.id,
        &user.username,
        user.role,
        &config.auth.jwt_secret,
        config.auth.access_token_ttl_secs,
        config.auth.refresh_token_ttl_secs,
    )
    .map_err(|e| HavenError::Internal(e.into()))?;

    Ok(Json(tokens))
}

#[derive(Deserialize, Validate)]
struct PasswordResetRequest {
    #[validate(email(message = "Invalid email format"))]
    email: String,
}

/// POST /api/v1/auth/password-reset
///
/// Always answers 200 so the endpoint cannot be used to probe for accounts.
async fn password_reset_request(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PasswordResetRequest>,
) -> HavenResult<Json<MessageResponse>> {
    validate_request(&body)?;

    if let Some(user) = users::find_by_email(&state.db.pg, &body.email).await? {
        let config = haven_common::config::get();
        let (raw, digest) = auth::new_account_token();
        tokens::issue(
            &state.db.pg,
            id::generate_id(),
            user.id,
            &digest,
            TokenPurpose::ResetPassword,
            chrono::Utc::now() + chrono::Duration::seconds(config.auth.reset_token_ttl_secs as i64),
        )
        .await?;

        let reset_url = format!("{}/reset-password/{raw}", config.server.frontend_url);
        if let Err(e) = state
            .mailer
            .send_password_reset(&user.email, &user.username, &reset_url)
            .await
        {
            tracing::warn!(email = %user.email, "Failed to send password reset email: {e}");
        }
    }

    Ok(Json(MessageResponse {
        message: "Password reset link has been sent to your email.".into(),
    }))
}

#[derive(Deserialize, Validate)]
struct PasswordResetConfirmRequest {
    token: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    new_password: String,

    #[validate(must_match(other = "new_password", message = "Password fields didn't match"))]
    confirm_password: String,
}

/// POST /api/v1/auth/password-reset/confirm
async fn password_reset_confirm(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PasswordResetConfirmRequest>,
) -> HavenResult<Json<MessageResponse>> {
    validate_request(&body)?;

    let digest = auth::hash_account_token(&body.token);
    let user_id = tokens::consume(&state.db.pg, &digest, TokenPurpose::ResetPassword)
        .await?
        .ok_or(HavenError::InvalidToken)?;

    let password_hash = auth::hash_password(&body.new_password)
        .map_err(|e| HavenError::Internal(anyhow::anyhow!("{e}")))?;
    users::set_password_hash(&state.db.pg, user_id, &password_hash).await?;

    tracing::info!(user_id = %user_id, "Password reset");

    Ok(Json(MessageResponse {
        message: "Password has been reset successfully.".into(),
    }))
}
