//! Property listing routes — public browse/search plus seller CRUD.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::HeaderMap,
    middleware,
    routing::get,
};
use haven_common::{
    error::{HavenError, HavenResult},
    id,
    models::property::{
        CreatePropertyRequest, Property, PropertyImageResponse, PropertyResponse, PropertyType,
        UpdatePropertyRequest,
    },
    permissions,
    validation::validate_request,
};
use haven_db::repository::{images, properties, properties::PropertyFilter, users, verifications, wishlists};
use haven_db::storage::PRESIGN_TTL_SECS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{AppState, middleware::AuthContext};

/// Public listing routes — no authentication required.
pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/properties", get(list_properties))
        .route("/properties/filters", get(filter_options))
        .route("/properties/{property_id}", get(get_property))
}

/// Seller routes — authentication required.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/properties", axum::routing::post(create_property))
        .route("/properties/mine", get(my_properties))
        .route(
            "/properties/{property_id}",
            axum::routing::patch(update_property).delete(delete_property),
        )
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

// ── Response assembly ────────────────────────────────────────────────────────

/// Build the full API representation of a listing: seller name, presigned
/// image URLs, and — for authenticated viewers — wishlist state.
pub(crate) async fn build_property_response(
    state: &AppState,
    property: Property,
    viewer: Option<Uuid>,
) -> HavenResult<PropertyResponse> {
    let seller_name = users::find_by_id(&state.db.pg, property.seller_id)
        .await?
        .map(|u| u.username);

    let mut response = PropertyResponse::from_property(property, seller_name);

    for image in images::list_for_property(&state.db.pg, response.id).await? {
        let url = state
            .storage
            .presigned_get_url(&image.image, PRESIGN_TTL_SECS)
            .await?;
        response.images.push(PropertyImageResponse {
            id: image.id,
            url,
            is_primary: image.is_primary,
            uploaded_at: image.uploaded_at,
        });
    }

    if let Some(viewer) = viewer {
        response.in_wishlist =
            Some(wishlists::contains(&state.db.pg, viewer, response.id).await?);
    }

    Ok(response)
}

pub(crate) async fn build_property_responses(
    state: &AppState,
    rows: Vec<Property>,
    viewer: Option<Uuid>,
) -> HavenResult<Vec<PropertyResponse>> {
    let mut out = Vec::with_capacity(rows.len());
    for property in rows {
        out.push(build_property_response(state, property, viewer).await?);
    }
    Ok(out)
}

// ── Browse & search ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ListParams {
    property_type: Option<PropertyType>,
    city: Option<String>,
    number_of_rooms: Option<i32>,
    is_available: Option<bool>,
    min_price: Option<i64>,
    max_price: Option<i64>,
    search: Option<String>,
    ordering: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// Clamp a client-supplied page size to the configured bounds.
pub(crate) fn page_limit(limit: Option<u32>) -> i64 {
    let config = haven_common::config::get();
    limit
        .unwrap_or(config.limits.default_page_size)
        .min(config.limits.max_page_size) as i64
}

impl ListParams {
    fn into_filter(self) -> PropertyFilter {
        PropertyFilter {
            cities: self.city.into_iter().collect(),
            property_type: self.property_type,
            number_of_rooms: self.number_of_rooms,
            is_available: self.is_available,
            min_price: self.min_price,
            max_price: self.max_price,
            seller_id: None,
            search: self.search,
            ordering: self.ordering,
            limit: page_limit(self.limit),
            offset: self.offset.unwrap_or(0) as i64,
        }
    }
}

/// GET /api/v1/properties — Public filtered listing search.
async fn list_properties(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> HavenResult<Json<Vec<PropertyResponse>>> {
    let viewer = crate::middleware::maybe_auth(&headers).map(|a| a.user_id);
    let filter = params.into_filter();
    let rows = properties::search(&state.db.pg, &filter).await?;
    Ok(Json(build_property_responses(&state, rows, viewer).await?))
}

/// GET /api/v1/properties/:property_id — Public listing detail.
async fn get_property(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(property_id): Path<Uuid>,
) -> HavenResult<Json<PropertyResponse>> {
    let viewer = crate::middleware::maybe_auth(&headers).map(|a| a.user_id);
    let property = properties::find_by_id(&state.db.pg, property_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Property".into(),
        })?;
    Ok(Json(build_property_response(&state, property, viewer).await?))
}

#[derive(Serialize)]
struct FilterOptions {
    cities: Vec<String>,
    property_types: Vec<String>,
    room_options: Vec<i32>,
}

/// GET /api/v1/properties/filters — Available filter options.
async fn filter_options(
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<FilterOptions>> {
    Ok(Json(FilterOptions {
        cities: properties::distinct_cities(&state.db.pg).await?,
        property_types: properties::distinct_types(&state.db.pg).await?,
        room_options: (1..=6).collect(),
    }))
}

// ── Seller CRUD ──────────────────────────────────────────────────────────────

/// Listing is restricted to verified sellers: seller role AND an approved
/// verification.
async fn ensure_verified_seller(
    state: &AppState,
    auth: &AuthContext,
) -> HavenResult<haven_common::models::user::User> {
    let user = crate::middleware::current_user(state, auth).await?;
    permissions::ensure_seller(&user)?;
    if !verifications::is_approved(&state.db.pg, user.id).await? {
        return Err(HavenError::Forbidden);
    }
    Ok(user)
}

/// POST /api/v1/properties — Create a listing (verified sellers only).
async fn create_property(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePropertyRequest>,
) -> HavenResult<Json<PropertyResponse>> {
    validate_request(&body)?;
    let seller = ensure_verified_seller(&state, &auth).await?;

    let property = properties::create(
        &state.db.pg,
        id::generate_id(),
        seller.id,
        &body.name,
        &body.description,
        &body.address,
        &body.city,
        body.price,
        body.number_of_rooms,
        body.size_sqm,
        body.property_type,
        body.is_available.unwrap_or(true),
    )
    .await?;

    tracing::info!(property_id = %property.id, seller = %seller.id, name = %property.name, "Listing created");

    Ok(Json(
        build_property_response(&state, property, Some(seller.id)).await?,
    ))
}

/// GET /api/v1/properties/mine — The authenticated seller's listings.
async fn my_properties(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<Vec<PropertyResponse>>> {
    let rows = properties::list_by_seller(&state.db.pg, auth.user_id).await?;
    Ok(Json(
        build_property_responses(&state, rows, Some(auth.user_id)).await?,
    ))
}

/// PATCH /api/v1/properties/:property_id — Owner-only update.
async fn update_property(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
    Json(body): Json<UpdatePropertyRequest>,
) -> HavenResult<Json<PropertyResponse>> {
    validate_request(&body)?;

    let property = properties::find_by_id(&state.db.pg, property_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Property".into(),
        })?;
    permissions::ensure_owner(auth.user_id, property.seller_id)?;

    let updated = properties::update(
        &state.db.pg,
        property_id,
        body.name.as_deref(),
        body.description.as_deref(),
        body.address.as_deref(),
        body.city.as_deref(),
        body.price,
        body.number_of_rooms,
        body.size_sqm,
        body.property_type,
        body.is_available,
    )
    .await?;

    Ok(Json(
        build_property_response(&state, updated, Some(auth.user_id)).await?,
    ))
}

/// DELETE /api/v1/properties/:property_id — Owner-only delete. Stored
/// photos are removed along with the rows.
async fn delete_property(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
) -> HavenResult<Json<serde_json::Value>> {
    let property = properties::find_by_id(&state.db.pg, property_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Property".into(),
        })?;
    permissions::ensure_owner(auth.user_id, property.seller_id)?;

    let keys = images::keys_for_properties(&state.db.pg, &[property_id]).await?;
    properties::delete(&state.db.pg, property_id).await?;
    for key in keys {
        if let Err(e) = state.storage.delete_object(&key).await {
            tracing::warn!(key = %key, "Failed to delete listing photo: {e}");
        }
    }

    tracing::info!(property_id = %property_id, "Listing deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
