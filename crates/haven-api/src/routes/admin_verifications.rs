//! Admin verification review — listing, decisions, bulk decisions.
//!
//! Approval promotes the applicant to the seller role and both decisions
//! trigger a notification email.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    middleware,
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use haven_common::{
    error::{HavenError, HavenResult},
    models::user::Role,
    models::verification::{
        BulkVerificationRequest, SellerVerification, VerificationDecisionRequest,
        VerificationStatus,
    },
    validation::validate_request,
};
use haven_db::repository::{users, verifications};
use haven_db::storage::PRESIGN_TTL_SECS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{AppState, middleware::AuthContext};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/verifications", get(list_verifications))
        .route("/admin/verifications/stats", get(verification_stats))
        .route("/admin/verifications/{verification_id}", patch(decide_verification))
        .route("/admin/verifications/bulk", post(bulk_decide))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Serialize)]
struct ApplicantCard {
    id: Uuid,
    username: String,
    email: String,
    role: Role,
    phone_number: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct VerificationRow {
    id: Uuid,
    user: ApplicantCard,
    status: VerificationStatus,
    submitted_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
    admin_notes: Option<String>,
    document_url: Option<String>,
}

async fn to_row(
    state: &AppState,
    verification: SellerVerification,
) -> HavenResult<Option<VerificationRow>> {
    // Applicants can be hard-deleted out of band; skip orphaned rows.
    let Some(user) = users::find_by_id(&state.db.pg, verification.user_id).await? else {
        return Ok(None);
    };

    let document_url = match &verification.document {
        Some(key) => Some(state.storage.presigned_get_url(key, PRESIGN_TTL_SECS).await?),
        None => None,
    };

    Ok(Some(VerificationRow {
        id: verification.id,
        user: ApplicantCard {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            phone_number: user.phone_number,
            created_at: user.created_at,
        },
        status: verification.status,
        submitted_at: verification.submitted_at,
        reviewed_at: verification.reviewed_at,
        admin_notes: verification.admin_notes,
        document_url,
    }))
}

#[derive(Deserialize)]
struct ListParams {
    status: Option<VerificationStatus>,
}

/// GET /api/v1/admin/verifications
async fn list_verifications(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> HavenResult<Json<Vec<VerificationRow>>> {
    crate::middleware::current_admin(&state, &auth).await?;

    let rows = verifications::list(&state.db.pg, params.status).await?;
    let mut out = Vec::with_capacity(rows.len());
    for verification in rows {
        if let Some(row) = to_row(&state, verification).await? {
            out.push(row);
        }
    }
    Ok(Json(out))
}

/// GET /api/v1/admin/verifications/stats
async fn verification_stats(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<verifications::VerificationStats>> {
    crate::middleware::current_admin(&state, &auth).await?;
    Ok(Json(verifications::stats(&state.db.pg).await?))
}

/// Apply a decision: update the row, promote on approval, send the
/// notification email. Mail failures are logged, not surfaced.
async fn apply_decision(
    state: &AppState,
    verification: &SellerVerification,
    status: VerificationStatus,
    admin_notes: Option<&str>,
) -> HavenResult<SellerVerification> {
    let updated = verifications::decide(&state.db.pg, verification.id, status, admin_notes).await?;

    let Some(user) = users::find_by_id(&state.db.pg, updated.user_id).await? else {
        return Ok(updated);
    };

    if status == VerificationStatus::Approved && user.role != Role::Seller {
        users::set_role(&state.db.pg, user.id, Role::Seller).await?;
    }

    let name = user.first_name.as_deref().unwrap_or(&user.username);
    let result = match status {
        VerificationStatus::Approved => {
            state.mailer.send_verification_approved(&user.email, name).await
        }
        VerificationStatus::Rejected => {
            state
                .mailer
                .send_verification_rejected(&user.email, name, updated.admin_notes.as_deref())
                .await
        }
        VerificationStatus::Pending => Ok(()),
    };
    if let Err(e) = result {
        tracing::warn!(email = %user.email, "Failed to send verification decision email: {e}");
    }

    Ok(updated)
}

/// PATCH /api/v1/admin/verifications/:verification_id
async fn decide_verification(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(verification_id): Path<Uuid>,
    Json(body): Json<VerificationDecisionRequest>,
) -> HavenResult<Json<VerificationRow>> {
    let admin = crate::middleware::current_admin(&state, &auth).await?;
    validate_request(&body)?;

    let verification = verifications::find_by_id(&state.db.pg, verification_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Verification".into(),
        })?;

    let status: VerificationStatus = body.status.into();
    let updated = apply_decision(&state, &verification, status, body.admin_notes.as_deref()).await?;

    tracing::info!(
        verification_id = %verification_id,
        admin = %admin.id,
        status = status.as_str(),
        "Verification reviewed"
    );

    let row = to_row(&state, updated).await?.ok_or(HavenError::NotFound {
        resource: "User".into(),
    })?;
    Ok(Json(row))
}

/// POST /api/v1/admin/verifications/bulk — Approve/reject a list. Rows
/// already in the requested state are refreshed but not counted.
async fn bulk_decide(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkVerificationRequest>,
) -> HavenResult<Json<serde_json::Value>> {
    let admin = crate::middleware::current_admin(&state, &auth).await?;
    validate_request(&body)?;

    if body.verification_ids.is_empty() {
        return Err(HavenError::Validation {
            message: "No verification IDs provided".into(),
        });
    }

    let status: VerificationStatus = body.action.into();
    let mut updated_count: u64 = 0;

    for id in &body.verification_ids {
        let Some(verification) = verifications::find_by_id(&state.db.pg, *id).await? else {
            continue;
        };
        if verification.status != status {
            updated_count += 1;
        }
        apply_decision(&state, &verification, status, body.admin_notes.as_deref()).await?;
    }

    tracing::info!(
        admin = %admin.id,
        status = status.as_str(),
        updated = updated_count,
        "Bulk verification review"
    );

    Ok(Json(serde_json::json!({
        "message": format!("{updated_count} verifications updated"),
        "updated": updated_count,
    })))
}
