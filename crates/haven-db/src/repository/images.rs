//! Property image repository.

use haven_common::models::property::PropertyImage;
use sqlx::PgPool;
use uuid::Uuid;

/// Attach a photo to a listing. Marking it primary demotes any previous
/// primary photo.
pub async fn add(
    pool: &PgPool,
    id: Uuid,
    property_id: Uuid,
    image: &str,
    is_primary: bool,
) -> Result<PropertyImage, sqlx::Error> {
    if is_primary {
        sqlx::query("UPDATE property_images SET is_primary = FALSE WHERE property_id = $1")
            .bind(property_id)
            .execute(pool)
            .await?;
    }

    sqlx::query_as::<_, PropertyImage>(
        r#"
        INSERT INTO property_images (id, property_id, image, is_primary, uploaded_at)
        VALUES ($1, $2, $3, $4, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(property_id)
    .bind(image)
    .bind(is_primary)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<PropertyImage>, sqlx::Error> {
    sqlx::query_as::<_, PropertyImage>("SELECT * FROM property_images WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Photos for a listing, primary first, then upload order.
pub async fn list_for_property(
    pool: &PgPool,
    property_id: Uuid,
) -> Result<Vec<PropertyImage>, sqlx::Error> {
    sqlx::query_as::<_, PropertyImage>(
        r#"
        SELECT * FROM property_images
        WHERE property_id = $1
        ORDER BY is_primary DESC, uploaded_at ASC
        "#,
    )
    .bind(property_id)
    .fetch_all(pool)
    .await
}

pub async fn count_for_property(pool: &PgPool, property_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM property_images WHERE property_id = $1")
            .bind(property_id)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

/// Delete a photo row. Returns the storage key for cleanup.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("DELETE FROM property_images WHERE id = $1 RETURNING image")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}

/// Storage keys for every photo of the given listings — collected before a
/// delete so the objects can be removed too.
pub async fn keys_for_properties(
    pool: &PgPool,
    property_ids: &[Uuid],
) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT image FROM property_images WHERE property_id = ANY($1)")
            .bind(property_ids)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}
