//! Listing photo routes — upload, list, delete.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Extension, Multipart, Path, State},
    middleware,
    routing::{delete, get, post},
};
use haven_common::{
    error::{HavenError, HavenResult},
    id,
    models::property::PropertyImageResponse,
    permissions,
};
use haven_db::repository::{images, properties};
use haven_db::storage::{self, PRESIGN_TTL_SECS};
use std::sync::Arc;
use uuid::Uuid;

use crate::{AppState, middleware::AuthContext};

const MAX_MULTIPART_BYTES: usize = 32 * 1024 * 1024;

fn is_allowed_image_type(ct: &str) -> bool {
    matches!(
        ct,
        "image/jpeg" | "image/png" | "image/gif" | "image/webp" | "image/avif"
    )
}

/// Public photo listing.
pub fn public_router() -> Router<Arc<AppState>> {
    Router::new().route("/properties/{property_id}/images", get(list_images))
}

/// Owner-only mutation routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/properties/{property_id}/images", post(upload_image))
        .route("/properties/images/{image_id}", delete(delete_image))
        .layer(DefaultBodyLimit::max(MAX_MULTIPART_BYTES))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// GET /api/v1/properties/:property_id/images
async fn list_images(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
) -> HavenResult<Json<Vec<PropertyImageResponse>>> {
    // 404 for unknown listings rather than an empty list
    properties::find_by_id(&state.db.pg, property_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Property".into(),
        })?;

    let mut out = Vec::new();
    for image in images::list_for_property(&state.db.pg, property_id).await? {
        let url = state
            .storage
            .presigned_get_url(&image.image, PRESIGN_TTL_SECS)
            .await?;
        out.push(PropertyImageResponse {
            id: image.id,
            url,
            is_primary: image.is_primary,
            uploaded_at: image.uploaded_at,
        });
    }
    Ok(Json(out))
}

/// POST /api/v1/properties/:property_id/images — Upload a photo
/// (multipart/form-data).
///
/// Form fields:
/// - `file` — the image (required)
/// - `is_primary` — "true" to make this the primary photo (optional)
async fn upload_image(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
    mut multipart: Multipart,
) -> HavenResult<Json<PropertyImageResponse>> {
    let property = properties::find_by_id(&state.db.pg, property_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Property".into(),
        })?;
    permissions::ensure_owner(auth.user_id, property.seller_id)?;

    let config = haven_common::config::get();

    let count = images::count_for_property(&state.db.pg, property_id).await?;
    if count >= config.limits.max_images_per_property as i64 {
        return Err(HavenError::Validation {
            message: format!(
                "A listing can have at most {} photos",
                config.limits.max_images_per_property
            ),
        });
    }

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut is_primary = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| HavenError::Validation {
        message: format!("Multipart error: {e}"),
    })? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("photo").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if !is_allowed_image_type(&content_type) {
                    return Err(HavenError::Validation {
                        message: format!("File type '{content_type}' is not allowed"),
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

                file = Some((filename, content_type, bytes.to_vec()));
            }
            Some("is_primary") => {
                let val = field.text().await.unwrap_or_default();
                is_primary = val.trim() == "true";
            }
            _ => {}
        }
    }

    let (filename, content_type, data) = file.ok_or(HavenError::Validation {
        message: "Missing 'file' field".into(),
    })?;

    // First photo becomes primary automatically
    if count == 0 {
        is_primary = true;
    }

    let key = storage::object_key("properties", property_id, &filename);
    state.storage.put_object(&key, data, &content_type).await?;

    let image = images::add(&state.db.pg, id::generate_id(), property_id, &key, is_primary).await?;
    let url = state.storage.presigned_get_url(&key, PRESIGN_TTL_SECS).await?;

    tracing::info!(property_id = %property_id, image_id = %image.id, "Listing photo uploaded");

    Ok(Json(PropertyImageResponse {
        id: image.id,
        url,
        is_primary: image.is_primary,
        uploaded_at: image.uploaded_at,
    }))
}

/// DELETE /api/v1/properties/images/:image_id — Owner-only; removes the
/// stored object as well.
async fn delete_image(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<Uuid>,
) -> HavenResult<Json<serde_json::Value>> {
    let image = images::find_by_id(&state.db.pg, image_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Image".into(),
        })?;

    let property = properties::find_by_id(&state.db.pg, image.property_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Property".into(),
        })?;
    permissions::ensure_owner(auth.user_id, property.seller_id)?;

    if let Some(key) = images::delete(&state.db.pg, image_id).await? {
        if let Err(e) = state.storage.delete_object(&key).await {
            tracing::warn!(key = %key, "Failed to delete photo object: {e}");
        }
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
