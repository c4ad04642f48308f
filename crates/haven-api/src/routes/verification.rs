//! Seller verification routes — document submission, status, withdrawal.
//!
//! Any non-admin user can submit one document; an admin decision (see
//! `admin_verifications.rs`) approves or rejects it, and approval promotes
//! the account to seller.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Extension, Multipart, State},
    middleware,
    routing::post,
};
use chrono::{DateTime, Utc};
use haven_common::{
    error::{HavenError, HavenResult},
    id,
    permissions,
};
use haven_db::repository::verifications;
use haven_db::storage::{self, PRESIGN_TTL_SECS};
use serde::Serialize;
use std::sync::Arc;

use crate::{AppState, middleware::AuthContext};

const MAX_MULTIPART_BYTES: usize = 32 * 1024 * 1024;

/// Document types accepted for verification (IDs, licences).
fn is_allowed_document_type(ct: &str) -> bool {
    matches!(
        ct,
        "application/pdf" | "image/jpeg" | "image/png" | "image/webp"
    )
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/verification",
            post(submit_verification)
                .get(verification_status)
                .delete(withdraw_verification),
        )
        .layer(DefaultBodyLimit::max(MAX_MULTIPART_BYTES))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Serialize)]
struct VerificationStatusResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// POST /api/v1/verification — Submit a verification document.
async fn submit_verification(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> HavenResult<Json<VerificationStatusResponse>> {
    let user = crate::middleware::current_user(&state, &auth).await?;

    // Admins review verifications; they don't submit them.
    if permissions::is_admin(&user) {
        return Err(HavenError::Forbidden);
    }

    if verifications::find_by_user(&state.db.pg, user.id)
        .await?
        .is_some()
    {
        return Err(HavenError::AlreadyExists {
            resource: "Verification".into(),
        });
    }

    let config = haven_common::config::get();
    let mut document_key: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| HavenError::Validation {
        message: format!("Multipart error: {e}"),
    })? {
        if field.name() != Some("document") {
            continue;
        }

        let filename = field.file_name().unwrap_or("document").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !is_allowed_document_type(&content_type) {
            return Err(HavenError::Validation {
                message: format!("File type '{content_type}' is not allowed for verification documents"),
            });
        }

        let bytes = field.bytes().await.map_err(|e| HavenError::Validation {
            message: format!("Failed to read file: {e}"),
        })?;
        if bytes.len() as u64 > config.limits.max_document_size_bytes {
            return Err(HavenError::Validation {
                message: format!(
                    "File too large: {} bytes (max {} bytes)",
                    bytes.len(),
                    config.limits.max_document_size_bytes
                ),
            });
        }

        let key = storage::object_key("verifications", user.id, &filename);
        state
            .storage
            .put_object(&key, bytes.to_vec(), &content_type)
            .await?;
        document_key = Some(key);
    }

    let key = document_key.ok_or(HavenError::Validation {
        message: "Missing 'document' field".into(),
    })?;

    let verification =
        verifications::create(&state.db.pg, id::generate_id(), user.id, Some(&key)).await?;
    let document_url = state.storage.presigned_get_url(&key, PRESIGN_TTL_SECS).await?;

    tracing::info!(user_id = %user.id, "Verification document submitted");

    Ok(Json(VerificationStatusResponse {
        status: verification.status.as_str().to_string(),
        submitted_at: Some(verification.submitted_at),
        reviewed_at: None,
        admin_notes: None,
        document_url: Some(document_url),
        message: Some("Verification submitted successfully".into()),
    }))
}

/// GET /api/v1/verification — Own verification status.
async fn verification_status(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<VerificationStatusResponse>> {
    let user = crate::middleware::current_user(&state, &auth).await?;

    let Some(verification) = verifications::find_by_user(&state.db.pg, user.id).await? else {
        return Ok(Json(VerificationStatusResponse {
            status: "none".into(),
            submitted_at: None,
            reviewed_at: None,
            admin_notes: None,
            document_url: None,
            message: Some("No verification submitted".into()),
        }));
    };

    let document_url = match &verification.document {
        Some(key) => Some(state.storage.presigned_get_url(key, PRESIGN_TTL_SECS).await?),
        None => None,
    };

    Ok(Json(VerificationStatusResponse {
        status: verification.status.as_str().to_string(),
        submitted_at: Some(verification.submitted_at),
        reviewed_at: verification.reviewed_at,
        admin_notes: verification.admin_notes,
        document_url,
        message: None,
    }))
}

/// DELETE /api/v1/verification — Withdraw the submission and delete the
/// stored document.
async fn withdraw_verification(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<VerificationStatusResponse>> {
    let user = crate::middleware::current_user(&state, &auth).await?;

    let verification = verifications::delete_by_user(&state.db.pg, user.id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Verification".into(),
        })?;

    if let Some(key) = &verification.document {
        if let Err(e) = state.storage.delete_object(key).await {
            tracing::warn!(key = %key, "Failed to delete verification document: {e}");
        }
    }

    tracing::info!(user_id = %user.id, "Verification withdrawn");

    Ok(Json(VerificationStatusResponse {
        status: "none".into(),
        submitted_at: None,
        reviewed_at: None,
        admin_notes: None,
        document_url: None,
        message: Some("Verification document deleted successfully".into()),
    }))
}
