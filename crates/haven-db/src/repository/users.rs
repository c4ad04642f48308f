//! User repository — account CRUD and the admin user-management queries.

use haven_common::models::user::{Role, User};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

/// Create a new user account.
#[allow(clippy::too_many_arguments)]
pub async fn create_user(
    pool: &PgPool,
    id: Uuid,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
    phone_number: Option<&str>,
    email_verified: bool,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, phone_number, email_verified, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(phone_number)
    .bind(email_verified)
    .fetch_one(pool)
    .await
}

/// Find a user by their unique ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find a user by username (case-insensitive).
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Find a user by email (case-insensitive).
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Login lookup — `identity` may be a username or an email address.
pub async fn find_by_identity(pool: &PgPool, identity: &str) -> Result<Option<User>, sqlx::Error> {
    if identity.contains('@') {
        find_by_email(pool, identity).await
    } else {
        find_by_username(pool, identity).await
    }
}

/// Update own-profile fields.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    first_name: Option<&str>,
    last_name: Option<&str>,
    phone_number: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            phone_number = COALESCE($4, phone_number),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(first_name)
    .bind(last_name)
    .bind(phone_number)
    .fetch_one(pool)
    .await
}

/// Mark the user's email as confirmed.
pub async fn set_email_verified(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET email_verified = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Replace the password hash (password reset).
pub async fn set_password_hash(pool: &PgPool, id: Uuid, hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Set or clear the profile picture storage key.
pub async fn set_avatar(pool: &PgPool, id: Uuid, avatar: Option<&str>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(avatar)
    .fetch_one(pool)
    .await
}

/// Change a user's marketplace role (verification approval, admin edits).
pub async fn set_role(pool: &PgPool, id: Uuid, role: Role) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(role)
        .execute(pool)
        .await?;
    Ok(())
}

/// Activate or deactivate an account (soft delete).
pub async fn set_active(pool: &PgPool, id: Uuid, active: bool) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(active)
        .execute(pool)
        .await?;
    Ok(())
}

/// Bulk activate/deactivate. Returns the number of affected rows.
pub async fn bulk_set_active(
    pool: &PgPool,
    ids: &[Uuid],
    active: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = ANY($1)",
    )
    .bind(ids)
    .bind(active)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

// ── Admin listing ────────────────────────────────────────────────────────────

/// Admin user listing with optional role/active filters and free-text search
/// over username, email, and names. Newest accounts first.
pub async fn admin_list(
    pool: &PgPool,
    role: Option<Role>,
    is_active: Option<bool>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, sqlx::Error> {
    let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("SELECT * FROM users WHERE 1=1");

    if let Some(role) = role {
        qb.push(" AND role = ").push_bind(role);
    }
    if let Some(active) = is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (username ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR last_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    qb.build_query_as::<User>().fetch_all(pool).await
}

/// Admin update — role, active flag, and profile fields.
pub async fn admin_update(
    pool: &PgPool,
    id: Uuid,
    role: Option<Role>,
    is_active: Option<bool>,
    first_name: Option<&str>,
    last_name: Option<&str>,
    phone_number: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            role = COALESCE($2, role),
            is_active = COALESCE($3, is_active),
            first_name = COALESCE($4, first_name),
            last_name = COALESCE($5, last_name),
            phone_number = COALESCE($6, phone_number),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(role)
    .bind(is_active)
    .bind(first_name)
    .bind(last_name)
    .bind(phone_number)
    .fetch_one(pool)
    .await
}

// ── Analytics ────────────────────────────────────────────────────────────────

/// Count all users.
pub async fn count_users(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Count users holding a role.
pub async fn count_by_role(pool: &PgPool, role: Role) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(role)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Count accounts created at or after `since`.
pub async fn count_created_since(
    pool: &PgPool,
    since: chrono::DateTime<chrono::Utc>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE created_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Count accounts created before `before` (growth-rate baseline).
pub async fn count_created_before(
    pool: &PgPool,
    before: chrono::DateTime<chrono::Utc>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE created_at < $1")
        .bind(before)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Accounts touched since `since` — the "active users" approximation
/// (profile edits, logins that bump updated_at, etc.).
pub async fn count_active_since(
    pool: &PgPool,
    since: chrono::DateTime<chrono::Utc>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_active AND updated_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

/// Daily signup counts for the last `days` days.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct SignupBucket {
    pub date: chrono::NaiveDate,
    pub count: i64,
}

pub async fn signup_timeline(pool: &PgPool, days: i32) -> Result<Vec<SignupBucket>, sqlx::Error> {
    sqlx::query_as::<_, SignupBucket>(
        r#"
        SELECT created_at::DATE AS date, COUNT(*) AS count
        FROM users
        WHERE created_at >= NOW() - make_interval(days => $1)
        GROUP BY created_at::DATE
        ORDER BY date
        "#,
    )
    .bind(days)
    .fetch_all(pool)
    .await
}

/// Role distribution across all accounts.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

pub async fn role_distribution(pool: &PgPool) -> Result<Vec<RoleCount>, sqlx::Error> {
    sqlx::query_as::<_, RoleCount>(
        "SELECT role, COUNT(*) AS count FROM users GROUP BY role ORDER BY count DESC",
    )
    .fetch_all(pool)
    .await
}
