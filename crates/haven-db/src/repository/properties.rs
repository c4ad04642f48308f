//! Property repository — listing CRUD, filtered search, and the aggregate
//! queries behind the admin dashboards.

use haven_common::models::property::{Property, PropertyType};
use haven_common::validation::ordering_clause;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

/// Filter set for listing searches. All criteria are optional; `cities`
/// entries are OR'd, everything else is AND'd.
#[derive(Debug, Default, Clone)]
pub struct PropertyFilter {
    /// City substrings, matched case-insensitively and OR'd together
    pub cities: Vec<String>,
    pub property_type: Option<PropertyType>,
    pub number_of_rooms: Option<i32>,
    pub is_available: Option<bool>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub seller_id: Option<Uuid>,
    /// Free-text search over name/description/address/city
    pub search: Option<String>,
    /// Whitelisted ordering parameter (see [`ordering_clause`])
    pub ordering: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Create a listing.
#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &PgPool,
    id: Uuid,
    seller_id: Uuid,
    name: &str,
    description: &str,
    address: &str,
    city: &str,
    price: i64,
    number_of_rooms: i32,
    size_sqm: f64,
    property_type: PropertyType,
    is_available: bool,
) -> Result<Property, sqlx::Error> {
    sqlx::query_as::<_, Property>(
        r#"
        INSERT INTO properties
            (id, seller_id, name, description, address, city, price, number_of_rooms,
             size_sqm, property_type, is_available, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(seller_id)
    .bind(name)
    .bind(description)
    .bind(address)
    .bind(city)
    .bind(price)
    .bind(number_of_rooms)
    .bind(size_sqm)
    .bind(property_type)
    .bind(is_available)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Property>, sqlx::Error> {
    sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Update listing fields (absent fields keep their value).
#[allow(clippy::too_many_arguments)]
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
    address: Option<&str>,
    city: Option<&str>,
    price: Option<i64>,
    number_of_rooms: Option<i32>,
    size_sqm: Option<f64>,
    property_type: Option<PropertyType>,
    is_available: Option<bool>,
) -> Result<Property, sqlx::Error> {
    sqlx::query_as::<_, Property>(
        r#"
        UPDATE properties SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            address = COALESCE($4, address),
            city = COALESCE($5, city),
            price = COALESCE($6, price),
            number_of_rooms = COALESCE($7, number_of_rooms),
            size_sqm = COALESCE($8, size_sqm),
            property_type = COALESCE($9, property_type),
            is_available = COALESCE($10, is_available),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(address)
    .bind(city)
    .bind(price)
    .bind(number_of_rooms)
    .bind(size_sqm)
    .bind(property_type)
    .bind(is_available)
    .fetch_one(pool)
    .await
}

/// Delete a listing. Images and wishlist entries cascade.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Filtered listing search.
pub async fn search(pool: &PgPool, filter: &PropertyFilter) -> Result<Vec<Property>, sqlx::Error> {
    let mut qb: QueryBuilder<sqlx::Postgres> =
        QueryBuilder::new("SELECT * FROM properties WHERE 1=1");

    if !filter.cities.is_empty() {
        qb.push(" AND (");
        let mut first = true;
        for city in &filter.cities {
            if !first {
                qb.push(" OR ");
            }
            first = false;
            qb.push("city ILIKE ").push_bind(format!("%{city}%"));
        }
        qb.push(")");
    }
    if let Some(property_type) = filter.property_type {
        qb.push(" AND property_type = ").push_bind(property_type);
    }
    if let Some(rooms) = filter.number_of_rooms {
        qb.push(" AND number_of_rooms = ").push_bind(rooms);
    }
    if let Some(available) = filter.is_available {
        qb.push(" AND is_available = ").push_bind(available);
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(seller_id) = filter.seller_id {
        qb.push(" AND seller_id = ").push_bind(seller_id);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR address ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR city ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY ");
    qb.push(ordering_clause(filter.ordering.as_deref()));
    qb.push(" LIMIT ").push_bind(filter.limit);
    qb.push(" OFFSET ").push_bind(filter.offset);

    qb.build_query_as::<Property>().fetch_all(pool).await
}

/// A seller's own listings, newest first.
pub async fn list_by_seller(pool: &PgPool, seller_id: Uuid) -> Result<Vec<Property>, sqlx::Error> {
    sqlx::query_as::<_, Property>(
        "SELECT * FROM properties WHERE seller_id = $1 ORDER BY created_at DESC",
    )
    .bind(seller_id)
    .fetch_all(pool)
    .await
}

/// Distinct cities with at least one listing.
pub async fn distinct_cities(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT DISTINCT city FROM properties ORDER BY city")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Distinct property types in use.
pub async fn distinct_types(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT DISTINCT property_type FROM properties ORDER BY property_type")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Bulk availability toggle. Returns the number of affected rows.
pub async fn bulk_set_available(
    pool: &PgPool,
    ids: &[Uuid],
    available: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE properties SET is_available = $2, updated_at = NOW() WHERE id = ANY($1)",
    )
    .bind(ids)
    .bind(available)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Bulk delete. Returns the number of deleted rows.
pub async fn bulk_delete(pool: &PgPool, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM properties WHERE id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// ── Aggregates ───────────────────────────────────────────────────────────────

pub async fn count_total(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM properties")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn count_available(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM properties WHERE is_available")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn count_created_since(
    pool: &PgPool,
    since: chrono::DateTime<chrono::Utc>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM properties WHERE created_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn count_updated_since(
    pool: &PgPool,
    since: chrono::DateTime<chrono::Utc>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM properties WHERE updated_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Min/avg/max price across all listings. Zeroes when there are none.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct PriceStats {
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
}

pub async fn price_stats(pool: &PgPool) -> Result<PriceStats, sqlx::Error> {
    sqlx::query_as::<_, PriceStats>(
        r#"
        SELECT
            COALESCE(MIN(price), 0)::FLOAT8 AS min_price,
            COALESCE(MAX(price), 0)::FLOAT8 AS max_price,
            COALESCE(AVG(price), 0)::FLOAT8 AS avg_price
        FROM properties
        "#,
    )
    .fetch_one(pool)
    .await
}

/// Listing count + averages per property type.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct TypeBreakdown {
    pub property_type: String,
    pub count: i64,
    pub avg_price: f64,
    pub avg_size: f64,
}

pub async fn breakdown_by_type(pool: &PgPool) -> Result<Vec<TypeBreakdown>, sqlx::Error> {
    sqlx::query_as::<_, TypeBreakdown>(
        r#"
        SELECT
            property_type,
            COUNT(*) AS count,
            AVG(price)::FLOAT8 AS avg_price,
            AVG(size_sqm)::FLOAT8 AS avg_size
        FROM properties
        GROUP BY property_type
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Listing count + average price per city, busiest first.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct CityBreakdown {
    pub city: String,
    pub count: i64,
    pub avg_price: f64,
}

pub async fn breakdown_by_city(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CityBreakdown>, sqlx::Error> {
    sqlx::query_as::<_, CityBreakdown>(
        r#"
        SELECT city, COUNT(*) AS count, AVG(price)::FLOAT8 AS avg_price
        FROM properties
        GROUP BY city
        ORDER BY count DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Sellers ranked by listing count.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct TopSeller {
    pub username: String,
    pub email: String,
    pub property_count: i64,
}

pub async fn top_sellers(pool: &PgPool, limit: i64) -> Result<Vec<TopSeller>, sqlx::Error> {
    sqlx::query_as::<_, TopSeller>(
        r#"
        SELECT u.username, u.email, COUNT(p.id) AS property_count
        FROM users u
        INNER JOIN properties p ON p.seller_id = u.id
        GROUP BY u.id, u.username, u.email
        ORDER BY property_count DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Sellers with at least one listing (admin filter options).
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct SellerOption {
    pub id: Uuid,
    pub username: String,
}

pub async fn sellers_with_listings(pool: &PgPool) -> Result<Vec<SellerOption>, sqlx::Error> {
    sqlx::query_as::<_, SellerOption>(
        r#"
        SELECT DISTINCT u.id, u.username
        FROM users u
        INNER JOIN properties p ON p.seller_id = u.id
        ORDER BY u.username
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Listings ranked by wishlist count.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct TopWishlisted {
    pub id: Uuid,
    pub name: String,
    pub wishlist_count: i64,
}

pub async fn most_wishlisted(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<TopWishlisted>, sqlx::Error> {
    sqlx::query_as::<_, TopWishlisted>(
        r#"
        SELECT p.id, p.name, COUNT(w.id) AS wishlist_count
        FROM properties p
        LEFT JOIN wishlists w ON w.property_id = p.id
        GROUP BY p.id, p.name
        ORDER BY wishlist_count DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
