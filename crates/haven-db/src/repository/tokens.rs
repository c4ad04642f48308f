//! Account tokens — single-use email-confirmation and password-reset tokens.
//!
//! Only the SHA-256 digest of a token ever reaches the database. Consuming
//! a token deletes its row, so each link works exactly once.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Token purposes. Stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    ConfirmEmail,
    ResetPassword,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::ConfirmEmail => "confirm_email",
            TokenPurpose::ResetPassword => "reset_password",
        }
    }
}

/// Store a token digest, replacing any previous token of the same purpose
/// for this user (re-sending a link invalidates the old one).
pub async fn issue(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    token_hash: &str,
    purpose: TokenPurpose,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM account_tokens WHERE user_id = $1 AND purpose = $2")
        .bind(user_id)
        .bind(purpose.as_str())
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO account_tokens (id, user_id, token_hash, purpose, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(token_hash)
    .bind(purpose.as_str())
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Consume a token: delete it and return the owning user id, or `None` when
/// the digest is unknown, expired, or has the wrong purpose.
pub async fn consume(
    pool: &PgPool,
    token_hash: &str,
    purpose: TokenPurpose,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        DELETE FROM account_tokens
        WHERE token_hash = $1 AND purpose = $2 AND expires_at > NOW()
        RETURNING user_id
        "#,
    )
    .bind(token_hash)
    .bind(purpose.as_str())
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| r.0))
}
