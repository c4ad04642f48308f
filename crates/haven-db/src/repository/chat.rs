//! Chat repository — assistant sessions and their messages.

use haven_common::models::chat::{ChatMessage, ChatRole, ChatSession};
use sqlx::PgPool;
use uuid::Uuid;

/// Create a session with the given opaque identifier.
pub async fn create_session(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    session_id: &str,
) -> Result<ChatSession, sqlx::Error> {
    sqlx::query_as::<_, ChatSession>(
        r#"
        INSERT INTO chat_sessions (id, user_id, session_id, created_at, updated_at)
        VALUES ($1, $2, $3, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(session_id)
    .fetch_one(pool)
    .await
}

/// Find a session by its opaque identifier, scoped to the owning user.
pub async fn find_session(
    pool: &PgPool,
    user_id: Uuid,
    session_id: &str,
) -> Result<Option<ChatSession>, sqlx::Error> {
    sqlx::query_as::<_, ChatSession>(
        "SELECT * FROM chat_sessions WHERE user_id = $1 AND session_id = $2",
    )
    .bind(user_id)
    .bind(session_id)
    .fetch_optional(pool)
    .await
}

/// Bump the session's `updated_at` (called after each exchange).
pub async fn touch_session(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE chat_sessions SET updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a session; messages cascade.
pub async fn delete_session(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM chat_sessions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// A user's sessions, most recently active first.
pub async fn list_sessions(pool: &PgPool, user_id: Uuid) -> Result<Vec<ChatSession>, sqlx::Error> {
    sqlx::query_as::<_, ChatSession>(
        "SELECT * FROM chat_sessions WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Append a message to a session.
pub async fn add_message(
    pool: &PgPool,
    id: Uuid,
    session_pk: Uuid,
    role: ChatRole,
    content: &str,
    response_time: Option<f64>,
) -> Result<ChatMessage, sqlx::Error> {
    sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO chat_messages (id, session_id, role, content, response_time, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(session_pk)
    .bind(role)
    .bind(content)
    .bind(response_time)
    .fetch_one(pool)
    .await
}

/// The most recent `limit` messages, returned oldest-first for prompt
/// assembly.
pub async fn recent_messages(
    pool: &PgPool,
    session_pk: Uuid,
    limit: i64,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    let mut messages = sqlx::query_as::<_, ChatMessage>(
        r#"
        SELECT * FROM chat_messages
        WHERE session_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(session_pk)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    messages.reverse();
    Ok(messages)
}

/// Full history, oldest first.
pub async fn all_messages(
    pool: &PgPool,
    session_pk: Uuid,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC",
    )
    .bind(session_pk)
    .fetch_all(pool)
    .await
}

/// Message count for a session.
pub async fn message_count(pool: &PgPool, session_pk: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_messages WHERE session_id = $1")
        .bind(session_pk)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
