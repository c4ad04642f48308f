//! Admin analytics — dashboard stats and the period-scoped overview.

use axum::{
    Json, Router,
    extract::{Extension, Query, State},
    middleware,
    routing::get,
};
use chrono::{Duration, Utc};
use haven_common::{
    error::HavenResult,
    models::user::Role,
    models::verification::VerificationStatus,
};
use haven_db::repository::{properties, users, verifications, wishlists};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/stats", get(dashboard_stats))
        .route("/admin/analytics", get(overview))
        .route("/admin/analytics/properties", get(property_analytics))
        .route("/admin/analytics/users", get(user_analytics))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

// ── Dashboard stats ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct DashboardStats {
    total_users: i64,
    total_buyers: i64,
    total_sellers: i64,
    total_admins: i64,
    pending_verifications: i64,
    approved_verifications: i64,
    rejected_verifications: i64,
}

/// GET /api/v1/admin/stats
async fn dashboard_stats(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<DashboardStats>> {
    crate::middleware::current_admin(&state, &auth).await?;
    let pg = &state.db.pg;

    Ok(Json(DashboardStats {
        total_users: users::count_users(pg).await?,
        total_buyers: users::count_by_role(pg, Role::Buyer).await?,
        total_sellers: users::count_by_role(pg, Role::Seller).await?,
        total_admins: users::count_by_role(pg, Role::Admin).await?,
        pending_verifications: verifications::count_by_status(pg, VerificationStatus::Pending)
            .await?,
        approved_verifications: verifications::count_by_status(pg, VerificationStatus::Approved)
            .await?,
        rejected_verifications: verifications::count_by_status(pg, VerificationStatus::Rejected)
            .await?,
    }))
}

// ── Overview ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct OverviewParams {
    period: Option<String>,
}

/// Map the period parameter to a day count. Unknown values fall back to 30
/// days, matching the documented default.
fn period_days(period: Option<&str>) -> i64 {
    match period.unwrap_or("30d") {
        "7d" => 7,
        "90d" => 90,
        "1y" => 365,
        _ => 30,
    }
}

fn trend(rate: f64) -> &'static str {
    if rate > 0.0 {
        "up"
    } else if rate < 0.0 {
        "down"
    } else {
        "stable"
    }
}

#[derive(Serialize)]
struct UserGrowth {
    total: i64,
    new_users: i64,
    growth_rate: f64,
    trend: &'static str,
}

#[derive(Serialize)]
struct PropertyMetrics {
    total: i64,
    active: i64,
    new_listings: i64,
}

#[derive(Serialize)]
struct Engagement {
    wishlist_total: i64,
    wishlist_new: i64,
}

#[derive(Serialize)]
struct TopLocation {
    city: String,
    listings: i64,
    percentage: f64,
}

#[derive(Serialize)]
struct Demographics {
    buyers: i64,
    sellers: i64,
    verified_sellers: i64,
    top_locations: Vec<TopLocation>,
}

#[derive(Serialize)]
struct OverviewResponse {
    period: String,
    user_growth: UserGrowth,
    property_metrics: PropertyMetrics,
    engagement: Engagement,
    top_properties: Vec<properties::TopWishlisted>,
    demographics: Demographics,
}

/// GET /api/v1/admin/analytics?period=7d|30d|90d|1y
async fn overview(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<OverviewParams>,
) -> HavenResult<Json<OverviewResponse>> {
    crate::middleware::current_admin(&state, &auth).await?;
    let pg = &state.db.pg;

    let days = period_days(params.period.as_deref());
    let start = Utc::now() - Duration::days(days);

    // User growth relative to the period baseline
    let total_users = users::count_users(pg).await?;
    let new_users = users::count_created_since(pg, start).await?;
    let baseline = users::count_created_before(pg, start).await?;
    let growth_rate = if baseline > 0 {
        (new_users as f64 / baseline as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    let total_properties = properties::count_total(pg).await?;
    let active_properties = properties::count_available(pg).await?;
    let new_properties = properties::count_created_since(pg, start).await?;

    let wishlist_total = wishlists::count_total(pg).await?;
    let wishlist_new = wishlists::count_created_since(pg, start).await?;

    let top_properties = properties::most_wishlisted(pg, 5).await?;

    let top_locations = properties::breakdown_by_city(pg, 5)
        .await?
        .into_iter()
        .map(|b| TopLocation {
            city: b.city,
            listings: b.count,
            percentage: if total_properties > 0 {
                (b.count as f64 / total_properties as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            },
        })
        .collect();

    Ok(Json(OverviewResponse {
        period: format!("last_{days}_days"),
        user_growth: UserGrowth {
            total: total_users,
            new_users,
            growth_rate,
            trend: trend(growth_rate),
        },
        property_metrics: PropertyMetrics {
            total: total_properties,
            active: active_properties,
            new_listings: new_properties,
        },
        engagement: Engagement {
            wishlist_total,
            wishlist_new,
        },
        top_properties,
        demographics: Demographics {
            buyers: users::count_by_role(pg, Role::Buyer).await?,
            sellers: users::count_by_role(pg, Role::Seller).await?,
            verified_sellers: verifications::count_by_status(pg, VerificationStatus::Approved)
                .await?,
            top_locations,
        },
    }))
}

// ── Property analytics ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct RecentActivity {
    new_properties: i64,
    updated_properties: i64,
}

#[derive(Serialize)]
struct PropertyAnalytics {
    by_type: Vec<properties::TypeBreakdown>,
    by_city: Vec<properties::CityBreakdown>,
    price_stats: properties::PriceStats,
    recent_activity: RecentActivity,
}

/// GET /api/v1/admin/analytics/properties
async fn property_analytics(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<PropertyAnalytics>> {
    crate::middleware::current_admin(&state, &auth).await?;
    let pg = &state.db.pg;

    let week_ago = Utc::now() - Duration::days(7);

    Ok(Json(PropertyAnalytics {
        by_type: properties::breakdown_by_type(pg).await?,
        by_city: properties::breakdown_by_city(pg, 10).await?,
        price_stats: properties::price_stats(pg).await?,
        recent_activity: RecentActivity {
            new_properties: properties::count_created_since(pg, week_ago).await?,
            updated_properties: properties::count_updated_since(pg, week_ago).await?,
        },
    }))
}

// ── User analytics ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct UserActivity {
    active_users: i64,
    total_users: i64,
    new_users_this_month: i64,
}

#[derive(Serialize)]
struct UserAnalytics {
    growth_timeline: Vec<users::SignupBucket>,
    role_distribution: Vec<users::RoleCount>,
    activity: UserActivity,
}

/// GET /api/v1/admin/analytics/users
async fn user_analytics(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<UserAnalytics>> {
    crate::middleware::current_admin(&state, &auth).await?;
    let pg = &state.db.pg;

    let month_ago = Utc::now() - Duration::days(30);

    Ok(Json(UserAnalytics {
        growth_timeline: users::signup_timeline(pg, 30).await?,
        role_distribution: users::role_distribution(pg).await?,
        activity: UserActivity {
            active_users: users::count_active_since(pg, month_ago).await?,
            total_users: users::count_users(pg).await?,
            new_users_this_month: users::count_created_since(pg, month_ago).await?,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::{period_days, trend};

    #[test]
    fn period_parsing_falls_back_to_30_days() {
        assert_eq!(period_days(Some("7d")), 7);
        assert_eq!(period_days(Some("90d")), 90);
        assert_eq!(period_days(Some("1y")), 365);
        assert_eq!(period_days(Some("nonsense")), 30);
        assert_eq!(period_days(None), 30);
    }

    #[test]
    fn trend_labels() {
        assert_eq!(trend(3.2), "up");
        assert_eq!(trend(-0.1), "down");
        assert_eq!(trend(0.0), "stable");
    }
}
