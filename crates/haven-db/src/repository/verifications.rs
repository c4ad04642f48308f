//! Seller-verification repository.

use haven_common::models::verification::{SellerVerification, VerificationStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// Create a submission for a user. Fails on the unique constraint if one
/// already exists.
pub async fn create(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    document: Option<&str>,
) -> Result<SellerVerification, sqlx::Error> {
    sqlx::query_as::<_, SellerVerification>(
        r#"
        INSERT INTO seller_verifications (id, user_id, document, status, submitted_at)
        VALUES ($1, $2, $3, 'pending', NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(document)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<SellerVerification>, sqlx::Error> {
    sqlx::query_as::<_, SellerVerification>("SELECT * FROM seller_verifications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<SellerVerification>, sqlx::Error> {
    sqlx::query_as::<_, SellerVerification>(
        "SELECT * FROM seller_verifications WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Whether the user has an approved verification — the gate for listing
/// properties.
pub async fn is_approved(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM seller_verifications WHERE user_id = $1 AND status = 'approved')",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Withdraw a submission. Returns the deleted row so the caller can clean
/// up the stored document.
pub async fn delete_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<SellerVerification>, sqlx::Error> {
    sqlx::query_as::<_, SellerVerification>(
        "DELETE FROM seller_verifications WHERE user_id = $1 RETURNING *",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// All submissions, optionally filtered by status, newest first.
pub async fn list(
    pool: &PgPool,
    status: Option<VerificationStatus>,
) -> Result<Vec<SellerVerification>, sqlx::Error> {
    match status {
        Some(status) => {
            sqlx::query_as::<_, SellerVerification>(
                "SELECT * FROM seller_verifications WHERE status = $1 ORDER BY submitted_at DESC",
            )
            .bind(status)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, SellerVerification>(
                "SELECT * FROM seller_verifications ORDER BY submitted_at DESC",
            )
            .fetch_all(pool)
            .await
        }
    }
}

/// Record a review decision. Stamps `reviewed_at` and replaces the notes.
pub async fn decide(
    pool: &PgPool,
    id: Uuid,
    status: VerificationStatus,
    admin_notes: Option<&str>,
) -> Result<SellerVerification, sqlx::Error> {
    sqlx::query_as::<_, SellerVerification>(
        r#"
        UPDATE seller_verifications SET
            status = $2,
            admin_notes = COALESCE($3, admin_notes),
            reviewed_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(admin_notes)
    .fetch_one(pool)
    .await
}

/// Submission counts by status, for the admin dashboard.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct VerificationStats {
    pub total_verifications: i64,
    pub pending_verifications: i64,
    pub approved_verifications: i64,
    pub rejected_verifications: i64,
}

pub async fn stats(pool: &PgPool) -> Result<VerificationStats, sqlx::Error> {
    sqlx::query_as::<_, VerificationStats>(
        r#"
        SELECT
            COUNT(*) AS total_verifications,
            COUNT(*) FILTER (WHERE status = 'pending') AS pending_verifications,
            COUNT(*) FILTER (WHERE status = 'approved') AS approved_verifications,
            COUNT(*) FILTER (WHERE status = 'rejected') AS rejected_verifications
        FROM seller_verifications
        "#,
    )
    .fetch_one(pool)
    .await
}

/// Count submissions in a given status.
pub async fn count_by_status(
    pool: &PgPool,
    status: VerificationStatus,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM seller_verifications WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}
