//! Social login route — Google OAuth.

use axum::{Json, Router, extract::State, routing::post};
use haven_common::{
    error::{HavenError, HavenResult},
    id,
    models::user::Role,
};
use haven_db::repository::users;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{AppState, auth, oauth, routes::auth::AuthResponse};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/auth/google", post(google_auth))
}

#[derive(Deserialize)]
struct GoogleAuthRequest {
    access_token: String,
}

#[derive(Serialize)]
struct GoogleAuthResponse {
    created: bool,
    #[serde(flatten)]
    auth: AuthResponse,
}

/// POST /api/v1/auth/google
///
/// Verify a Google access token and get-or-create the matching account.
/// Google-verified emails skip the confirmation flow.
async fn google_auth(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GoogleAuthRequest>,
) -> HavenResult<Json<GoogleAuthResponse>> {
    if body.access_token.is_empty() {
        return Err(HavenError::Validation {
            message: "No access token provided".into(),
        });
    }

    let info = oauth::verify_google_token(&state.http, &body.access_token).await?;
    let email = info.email.ok_or(HavenError::Validation {
        message: "No email found in Google token".into(),
    })?;

    let (user, created) = match users::find_by_email(&state.db.pg, &email).await? {
        Some(existing) => {
            if !existing.is_active {
                return Err(HavenError::AccountDeactivated);
            }
            // Google has verified this address even if we never did
            if !existing.email_verified {
                users::set_email_verified(&state.db.pg, existing.id).await?;
            }
            let refreshed = users::find_by_id(&state.db.pg, existing.id)
                .await?
                .ok_or(HavenError::Unauthorized)?;
            (refreshed, false)
        }
        None => {
            let username = available_username(&state, &email).await?;
            let user = users::create_user(
                &state.db.pg,
                id::generate_id(),
                &username,
                &email,
                "", // OAuth-only account — no password login
                Role::Buyer,
                None,
                true,
            )
            .await?;
            let user = users::update_profile(
                &state.db.pg,
                user.id,
                info.given_name.as_deref(),
                info.family_name.as_deref(),
                None,
            )
            .await?;
            tracing::info!(user_id = %user.id, "New user created via Google login");
            (user, true)
        }
    };

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

    Ok(Json(GoogleAuthResponse {
        created,
        auth: AuthResponse {
            user: user.into(),
            tokens,
        },
    }))
}

/// Pick a free username derived from the email local part.
async fn available_username(state: &AppState, email: &str) -> HavenResult<String> {
    let base = oauth::username_from_email(email);
    if users::find_by_username(&state.db.pg, &base).await?.is_none() {
        return Ok(base);
    }
    for n in 1..100 {
        let candidate = format!("{base}{n}");
        if users::find_by_username(&state.db.pg, &candidate)
            .await?
            .is_none()
        {
            return Ok(candidate);
        }
    }
    Err(HavenError::Internal(anyhow::anyhow!(
        "could not find a free username for {email}"
    )))
}
