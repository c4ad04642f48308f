//! Admin user management.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    middleware,
    routing::{get, post},
};
use haven_common::{
    error::{HavenError, HavenResult},
    id,
    models::user::{
        AdminCreateUserRequest, AdminUpdateUserRequest, BulkUserAction, BulkUserActionRequest,
        Role, UserResponse,
    },
    validation::validate_request,
};
use haven_db::repository::{users, verifications};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{AppState, auth, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route(
            "/admin/users/{user_id}",
            get(user_detail).patch(update_user).delete(delete_user),
        )
        .route("/admin/users/bulk", post(bulk_action))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Debug, Deserialize)]
struct ListUsersParams {
    role: Option<Role>,
    is_active: Option<bool>,
    search: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// GET /api/v1/admin/users
async fn list_users(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListUsersParams>,
) -> HavenResult<Json<Vec<UserResponse>>> {
    crate::middleware::current_admin(&state, &auth).await?;

    let config = haven_common::config::get();
    let limit = params
        .limit
        .unwrap_or(config.limits.default_page_size)
        .min(config.limits.max_page_size) as i64;

    let rows = users::admin_list(
        &state.db.pg,
        params.role,
        params.is_active,
        params.search.as_deref(),
        limit,
        params.offset.unwrap_or(0) as i64,
    )
    .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/admin/users — Create a user with explicit role and
/// email-verification control.
async fn create_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdminCreateUserRequest>,
) -> HavenResult<Json<UserResponse>> {
    let admin = crate::middleware::current_admin(&state, &auth).await?;
    validate_request(&body)?;

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
        body.role,
        body.phone_number.as_deref(),
        body.email_verified.unwrap_or(true),
    )
    .await?;
    let user = users::update_profile(
        &state.db.pg,
        user.id,
        body.first_name.as_deref(),
        body.last_name.as_deref(),
        None,
    )
    .await?;

    tracing::info!(user_id = %user.id, admin = %admin.id, role = %user.role, "User created by admin");

    Ok(Json(user.into()))
}

#[derive(Serialize)]
struct AdminUserDetail {
    #[serde(flatten)]
    user: UserResponse,
    verification_details: Option<haven_common::models::verification::SellerVerification>,
}

/// GET /api/v1/admin/users/:user_id — Full detail including the
/// verification record.
async fn user_detail(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> HavenResult<Json<AdminUserDetail>> {
    crate::middleware::current_admin(&state, &auth).await?;

    let user = users::find_by_id(&state.db.pg, user_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "User".into(),
        })?;
    let verification = verifications::find_by_user(&state.db.pg, user_id).await?;

    Ok(Json(AdminUserDetail {
        user: user.into(),
        verification_details: verification,
    }))
}

/// PATCH /api/v1/admin/users/:user_id
async fn update_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AdminUpdateUserRequest>,
) -> HavenResult<Json<UserResponse>> {
    crate::middleware::current_admin(&state, &auth).await?;
    validate_request(&body)?;

    users::find_by_id(&state.db.pg, user_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "User".into(),
        })?;

    let user = users::admin_update(
        &state.db.pg,
        user_id,
        body.role,
        body.is_active,
        body.first_name.as_deref(),
        body.last_name.as_deref(),
        body.phone_number.as_deref(),
    )
    .await?;

    Ok(Json(user.into()))
}

/// DELETE /api/v1/admin/users/:user_id — Soft delete (deactivate). Admins
/// cannot delete themselves.
async fn delete_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> HavenResult<Json<serde_json::Value>> {
    let admin = crate::middleware::current_admin(&state, &auth).await?;

    if admin.id == user_id {
        return Err(HavenError::Validation {
            message: "You cannot delete your own account".into(),
        });
    }

    users::find_by_id(&state.db.pg, user_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "User".into(),
        })?;

    users::set_active(&state.db.pg, user_id, false).await?;

    tracing::info!(user_id = %user_id, admin = %admin.id, "User deactivated by admin");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// POST /api/v1/admin/users/bulk — Activate/deactivate a list of users.
async fn bulk_action(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkUserActionRequest>,
) -> HavenResult<Json<serde_json::Value>> {
    let admin = crate::middleware::current_admin(&state, &auth).await?;

    if body.user_ids.is_empty() {
        return Err(HavenError::Validation {
            message: "No user IDs provided".into(),
        });
    }
    // Deactivating yourself through the bulk path is also off the table
    if body.action == BulkUserAction::Deactivate && body.user_ids.contains(&admin.id) {
        return Err(HavenError::Validation {
            message: "You cannot deactivate your own account".into(),
        });
    }

    let active = matches!(body.action, BulkUserAction::Activate);
    let updated = users::bulk_set_active(&state.db.pg, &body.user_ids, active).await?;

    tracing::info!(admin = %admin.id, updated, active, "Bulk user action");

    Ok(Json(serde_json::json!({
        "message": format!(
            "{updated} users {} successfully",
            if active { "activated" } else { "deactivated" }
        ),
        "updated": updated,
    })))
}
