//! Admin property management — cross-seller listing control, stats, bulk
//! actions.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    middleware,
    routing::{get, post},
};
use haven_common::{
    error::{HavenError, HavenResult},
    models::property::{
        BulkPropertyAction, BulkPropertyActionRequest, PropertyResponse, PropertyType,
        UpdatePropertyRequest,
    },
    validation::validate_request,
};
use haven_db::repository::{images, properties, properties::PropertyFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthContext,
    routes::properties::{build_property_response, build_property_responses, page_limit},
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/properties", get(list_all))
        .route("/admin/properties/stats", get(stats))
        .route("/admin/properties/filters", get(filter_options))
        .route("/admin/properties/bulk", post(bulk_action))
        .route(
            "/admin/properties/{property_id}",
            axum::routing::patch(update_any).delete(delete_any),
        )
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Debug, Deserialize)]
struct AdminListParams {
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
    seller: Option<Uuid>,
    /// `active` | `inactive` — admin shorthand on top of `is_available`
    status: Option<String>,
}

/// GET /api/v1/admin/properties
async fn list_all(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<AdminListParams>,
) -> HavenResult<Json<Vec<PropertyResponse>>> {
    let admin = crate::middleware::current_admin(&state, &auth).await?;

    let is_available = match params.status.as_deref() {
        Some("active") => Some(true),
        Some("inactive") => Some(false),
        _ => params.is_available,
    };

    let filter = PropertyFilter {
        cities: params.city.into_iter().collect(),
        property_type: params.property_type,
        number_of_rooms: params.number_of_rooms,
        is_available,
        min_price: params.min_price,
        max_price: params.max_price,
        seller_id: params.seller,
        search: params.search,
        ordering: params.ordering,
        limit: page_limit(params.limit),
        offset: params.offset.unwrap_or(0) as i64,
    };

    let rows = properties::search(&state.db.pg, &filter).await?;
    Ok(Json(build_property_responses(&state, rows, Some(admin.id)).await?))
}

/// PATCH /api/v1/admin/properties/:property_id — No ownership check.
async fn update_any(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
    Json(body): Json<UpdatePropertyRequest>,
) -> HavenResult<Json<PropertyResponse>> {
    let admin = crate::middleware::current_admin(&state, &auth).await?;
    validate_request(&body)?;

    properties::find_by_id(&state.db.pg, property_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Property".into(),
        })?;

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

    tracing::info!(property_id = %property_id, admin = %admin.id, "Listing updated by admin");

    Ok(Json(build_property_response(&state, updated, Some(admin.id)).await?))
}

/// DELETE /api/v1/admin/properties/:property_id
async fn delete_any(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<Uuid>,
) -> HavenResult<Json<serde_json::Value>> {
    let admin = crate::middleware::current_admin(&state, &auth).await?;

    properties::find_by_id(&state.db.pg, property_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Property".into(),
        })?;

    let keys = images::keys_for_properties(&state.db.pg, &[property_id]).await?;
    properties::delete(&state.db.pg, property_id).await?;
    for key in keys {
        if let Err(e) = state.storage.delete_object(&key).await {
            tracing::warn!(key = %key, "Failed to delete listing photo: {e}");
        }
    }

    tracing::info!(property_id = %property_id, admin = %admin.id, "Listing deleted by admin");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Serialize)]
struct TypeCount {
    property_type: String,
    count: i64,
}

#[derive(Serialize)]
struct CityCount {
    city: String,
    count: i64,
}

#[derive(Serialize)]
struct PropertyStats {
    total_properties: i64,
    active_properties: i64,
    inactive_properties: i64,
    recent_properties: i64,
    properties_by_type: Vec<TypeCount>,
    top_cities: Vec<CityCount>,
    top_sellers: Vec<properties::TopSeller>,
}

/// GET /api/v1/admin/properties/stats
async fn stats(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<PropertyStats>> {
    crate::middleware::current_admin(&state, &auth).await?;

    let total = properties::count_total(&state.db.pg).await?;
    let active = properties::count_available(&state.db.pg).await?;
    let week_ago = chrono::Utc::now() - chrono::Duration::days(7);
    let recent = properties::count_created_since(&state.db.pg, week_ago).await?;

    let by_type = properties::breakdown_by_type(&state.db.pg)
        .await?
        .into_iter()
        .map(|b| TypeCount {
            property_type: b.property_type,
            count: b.count,
        })
        .collect();
    let top_cities = properties::breakdown_by_city(&state.db.pg, 10)
        .await?
        .into_iter()
        .map(|b| CityCount {
            city: b.city,
            count: b.count,
        })
        .collect();
    let top_sellers = properties::top_sellers(&state.db.pg, 5).await?;

    Ok(Json(PropertyStats {
        total_properties: total,
        active_properties: active,
        inactive_properties: total - active,
        recent_properties: recent,
        properties_by_type: by_type,
        top_cities,
        top_sellers,
    }))
}

/// POST /api/v1/admin/properties/bulk — activate | deactivate | delete.
async fn bulk_action(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkPropertyActionRequest>,
) -> HavenResult<Json<serde_json::Value>> {
    let admin = crate::middleware::current_admin(&state, &auth).await?;

    if body.property_ids.is_empty() {
        return Err(HavenError::Validation {
            message: "No property IDs provided".into(),
        });
    }

    let (count, message) = match body.action {
        BulkPropertyAction::Activate => {
            let n = properties::bulk_set_available(&state.db.pg, &body.property_ids, true).await?;
            (n, format!("Activated {n} properties"))
        }
        BulkPropertyAction::Deactivate => {
            let n = properties::bulk_set_available(&state.db.pg, &body.property_ids, false).await?;
            (n, format!("Deactivated {n} properties"))
        }
        BulkPropertyAction::Delete => {
            let keys = images::keys_for_properties(&state.db.pg, &body.property_ids).await?;
            let n = properties::bulk_delete(&state.db.pg, &body.property_ids).await?;
            for key in keys {
                if let Err(e) = state.storage.delete_object(&key).await {
                    tracing::warn!(key = %key, "Failed to delete listing photo: {e}");
                }
            }
            (n, format!("Deleted {n} properties"))
        }
    };

    tracing::info!(admin = %admin.id, count, "Bulk property action");

    Ok(Json(serde_json::json!({ "message": message, "updated": count })))
}

#[derive(Serialize)]
struct AdminFilterOptions {
    cities: Vec<String>,
    property_types: Vec<String>,
    sellers: Vec<properties::SellerOption>,
    price_ranges: properties::PriceStats,
    room_options: Vec<i32>,
}

/// GET /api/v1/admin/properties/filters
async fn filter_options(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<AdminFilterOptions>> {
    crate::middleware::current_admin(&state, &auth).await?;

    Ok(Json(AdminFilterOptions {
        cities: properties::distinct_cities(&state.db.pg).await?,
        property_types: properties::distinct_types(&state.db.pg).await?,
        sellers: properties::sellers_with_listings(&state.db.pg).await?,
        price_ranges: properties::price_stats(&state.db.pg).await?,
        room_options: (1..=6).collect(),
    }))
}
