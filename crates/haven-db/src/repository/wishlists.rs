//! Wishlist repository — the (user, property) join table.

use haven_common::models::property::WishlistEntry;
use sqlx::PgPool;
use uuid::Uuid;

/// Add an entry. Returns true if newly added, false if it already existed.
pub async fn add(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    property_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO wishlists (id, user_id, property_id, created_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (user_id, property_id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(property_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove an entry. Returns true if something was removed.
pub async fn remove(
    pool: &PgPool,
    user_id: Uuid,
    property_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM wishlists WHERE user_id = $1 AND property_id = $2")
            .bind(user_id)
            .bind(property_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether the user has wishlisted the property.
pub async fn contains(
    pool: &PgPool,
    user_id: Uuid,
    property_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM wishlists WHERE user_id = $1 AND property_id = $2)",
    )
    .bind(user_id)
    .bind(property_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// A user's wishlist, newest first.
pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<WishlistEntry>, sqlx::Error> {
    sqlx::query_as::<_, WishlistEntry>(
        "SELECT * FROM wishlists WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Total wishlist entries across the platform.
pub async fn count_total(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wishlists")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Entries created at or after `since`.
pub async fn count_created_since(
    pool: &PgPool,
    since: chrono::DateTime<chrono::Utc>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wishlists WHERE created_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
