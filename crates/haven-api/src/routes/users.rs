//! User routes — profile management, avatar upload, seller contact lookup.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Extension, Multipart, Path, State},
    middleware,
    routing::{get, post},
};
use haven_common::{
    error::{HavenError, HavenResult},
    models::user::{Role, UpdateProfileRequest, UserResponse},
    validation::validate_request,
};
use haven_db::repository::{users, verifications};
use haven_db::storage::{self, PRESIGN_TTL_SECS};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{AppState, middleware::AuthContext};

/// Request bodies stay small except for the avatar upload.
const MAX_MULTIPART_BYTES: usize = 32 * 1024 * 1024;

/// User routes (all require authentication).
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/@me", get(get_current_user).patch(update_current_user))
        .route(
            "/users/@me/avatar",
            post(upload_avatar).get(get_avatar).delete(delete_avatar),
        )
        .route("/sellers/{seller_id}/contact", get(seller_contact))
        .layer(DefaultBodyLimit::max(MAX_MULTIPART_BYTES))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// Attach the verification status non-admins see on their own profile.
async fn with_verification_status(
    state: &AppState,
    user: haven_common::models::user::User,
) -> HavenResult<UserResponse> {
    let status = if user.role == Role::Admin {
        None
    } else {
        Some(
            verifications::find_by_user(&state.db.pg, user.id)
                .await?
                .map(|v| v.status.as_str().to_string())
                .unwrap_or_else(|| "not_submitted".to_string()),
        )
    };

    let mut response: UserResponse = user.into();
    response.verification_status = status;
    Ok(response)
}

/// GET /api/v1/users/@me — Get the authenticated user's profile.
async fn get_current_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<UserResponse>> {
    let user = crate::middleware::current_user(&state, &auth).await?;
    Ok(Json(with_verification_status(&state, user).await?))
}

/// PATCH /api/v1/users/@me — Update the authenticated user's profile.
/// Username, email, and role are immutable here.
async fn update_current_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateProfileRequest>,
) -> HavenResult<Json<UserResponse>> {
    validate_request(&body)?;

    crate::middleware::current_user(&state, &auth).await?;
    let user = users::update_profile(
        &state.db.pg,
        auth.user_id,
        body.first_name.as_deref(),
        body.last_name.as_deref(),
        body.phone_number.as_deref(),
    )
    .await?;

    Ok(Json(with_verification_status(&state, user).await?))
}

// ── Avatar ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AvatarResponse {
    user_id: Uuid,
    has_avatar: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

/// POST /api/v1/users/@me/avatar — Upload a profile picture.
async fn upload_avatar(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> HavenResult<Json<AvatarResponse>> {
    let user = crate::middleware::current_user(&state, &auth).await?;
    let config = haven_common::config::get();

    let mut uploaded: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| HavenError::Validation {
        message: format!("Multipart error: {e}"),
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("avatar").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(HavenError::Validation {
                message: format!("File type '{content_type}' is not an image"),
            });
        }

        let bytes = field.bytes().await.map_err(|e| HavenError::Validation {
            message: format!("Failed to read file: {e}"),
        })?;
        if bytes.len() as u64 > config.limits.max_image_size_bytes {
            return Err(HavenError::Validation {
                message: format!(
                    "File too large: {} bytes (max {} bytes)",
                    bytes.len(),
                    config.limits.max_image_size_bytes
                ),
            });
        }

        let key = storage::object_key("avatars", auth.user_id, &filename);
        state
            .storage
            .put_object(&key, bytes.to_vec(), &content_type)
            .await?;
        uploaded = Some(key);
    }

    let key = uploaded.ok_or(HavenError::Validation {
        message: "Missing 'file' field".into(),
    })?;

    // Replace any previous avatar
    if let Some(old) = &user.avatar {
        if let Err(e) = state.storage.delete_object(old).await {
            tracing::warn!(key = %old, "Failed to delete replaced avatar: {e}");
        }
    }

    let user = users::set_avatar(&state.db.pg, auth.user_id, Some(&key)).await?;
    let url = state.storage.presigned_get_url(&key, PRESIGN_TTL_SECS).await?;

    Ok(Json(AvatarResponse {
        user_id: user.id,
        has_avatar: true,
        url: Some(url),
    }))
}

/// GET /api/v1/users/@me/avatar — Presigned URL for the profile picture.
async fn get_avatar(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<AvatarResponse>> {
    let user = crate::middleware::current_user(&state, &auth).await?;

    let url = match &user.avatar {
        Some(key) => Some(state.storage.presigned_get_url(key, PRESIGN_TTL_SECS).await?),
        None => None,
    };

    Ok(Json(AvatarResponse {
        user_id: user.id,
        has_avatar: url.is_some(),
        url,
    }))
}

/// DELETE /api/v1/users/@me/avatar
async fn delete_avatar(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<AvatarResponse>> {
    let user = crate::middleware::current_user(&state, &auth).await?;

    if let Some(key) = &user.avatar {
        if let Err(e) = state.storage.delete_object(key).await {
            tracing::warn!(key = %key, "Failed to delete avatar object: {e}");
        }
    }
    let user = users::set_avatar(&state.db.pg, auth.user_id, None).await?;

    Ok(Json(AvatarResponse {
        user_id: user.id,
        has_avatar: false,
        url: None,
    }))
}

// ── Seller contact ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SellerContactResponse {
    id: Uuid,
    username: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email: String,
    phone: Option<String>,
    is_verified: bool,
}

/// GET /api/v1/sellers/:seller_id/contact — Contact card for a seller,
/// visible to any authenticated user.
async fn seller_contact(
    Extension(_auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(seller_id): Path<Uuid>,
) -> HavenResult<Json<SellerContactResponse>> {
    let seller = users::find_by_id(&state.db.pg, seller_id)
        .await?
        .filter(|u| u.role == Role::Seller)
        .ok_or(HavenError::NotFound {
            resource: "Seller".into(),
        })?;

    let is_verified = verifications::is_approved(&state.db.pg, seller.id).await?;

    Ok(Json(SellerContactResponse {
        id: seller.id,
        username: seller.username,
        first_name: seller.first_name,
        last_name: seller.last_name,
        email: seller.email,
        phone: seller.phone_number,
        is_verified,
    }))
}
