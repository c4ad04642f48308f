//! Wishlist routes — list, toggle, check.

use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    middleware,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use haven_common::{
    error::{HavenError, HavenResult},
    id,
    models::property::PropertyResponse,
};
use haven_db::repository::{properties, wishlists};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{AppState, middleware::AuthContext, routes::properties::build_property_response};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wishlist", get(list_wishlist))
        .route("/wishlist/toggle/{property_id}", post(toggle_wishlist))
        .route("/wishlist/check/{property_id}", get(check_wishlist))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Serialize)]
struct WishlistItemResponse {
    id: Uuid,
    created_at: DateTime<Utc>,
    property: PropertyResponse,
}

/// GET /api/v1/wishlist — Own wishlist with embedded listing details.
async fn list_wishlist(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<Vec<WishlistItemResponse>>> {
    let entries = wishlists::list_for_user(&state.db.pg, auth.user_id).await?;

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        // Listings can vanish between the join fetches; skip dangling rows.
        let Some(property) = properties::find_by_id(&state.db.pg, entry.property_id).await? else {
            continue;
        };
        out.push(WishlistItemResponse {
            id: entry.id,
            created_at: entry.created_at,
            property: build_property_response(&state, property, Some(auth.user_id)).await?,
        });
    }

    Ok(Json(out))
}

#[derive(Serialize)]
struct ToggleResponse {
    message: String,
    in_wishlist: bool,
    action: String,
}

/// POST /api/v1/wishlist/toggle/:property_id — Add if absent, remove if
/// present.
async fn toggle_wishlist(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
) -> HavenResult<Json<ToggleResponse>> {
    properties::find_by_id(&state.db.pg, property_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Property".into(),
        })?;

    if wishlists::remove(&state.db.pg, auth.user_id, property_id).await? {
        return Ok(Json(ToggleResponse {
            message: "Removed from wishlist".into(),
            in_wishlist: false,
            action: "removed".into(),
        }));
    }

    wishlists::add(&state.db.pg, id::generate_id(), auth.user_id, property_id).await?;
    Ok(Json(ToggleResponse {
        message: "Added to wishlist".into(),
        in_wishlist: true,
        action: "added".into(),
    }))
}

#[derive(Serialize)]
struct CheckResponse {
    property_id: Uuid,
    in_wishlist: bool,
}

/// GET /api/v1/wishlist/check/:property_id
async fn check_wishlist(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
) -> HavenResult<Json<CheckResponse>> {
    properties::find_by_id(&state.db.pg, property_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Property".into(),
        })?;

    Ok(Json(CheckResponse {
        property_id,
        in_wishlist: wishlists::contains(&state.db.pg, auth.user_id, property_id).await?,
    }))
}
