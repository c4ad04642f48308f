//! Redis helpers — the chat rate limiter lives here.
//!
//! Rate limiting is a fixed-window counter: INCR the per-user key and set
//! the window TTL when the key is first created. Requests past the cap are
//! rejected until the key expires.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Key for a user's chat rate-limit window.
pub fn chat_rate_limit_key(user_id: uuid::Uuid) -> String {
    format!("chat_rate_limit:{user_id}")
}

/// Increment a counter, starting the expiry window on first increment.
/// Returns the post-increment count.
pub async fn incr_expire(
    conn: &mut ConnectionManager,
    key: &str,
    ttl_secs: u64,
) -> Result<i64, redis::RedisError> {
    let count: i64 = conn.incr(key, 1).await?;
    if count == 1 {
        let _: () = conn.expire(key, ttl_secs as i64).await?;
    }
    Ok(count)
}

/// Read a counter without touching it. Missing keys read as 0.
pub async fn get_count(
    conn: &mut ConnectionManager,
    key: &str,
) -> Result<i64, redis::RedisError> {
    let count: Option<i64> = conn.get(key).await?;
    Ok(count.unwrap_or(0))
}

/// Seconds until a key expires. Returns 0 when the key has no TTL or does
/// not exist.
pub async fn ttl_secs(
    conn: &mut ConnectionManager,
    key: &str,
) -> Result<i64, redis::RedisError> {
    let ttl: i64 = conn.ttl(key).await?;
    Ok(ttl.max(0))
}

/// Delete a key.
pub async fn del(conn: &mut ConnectionManager, key: &str) -> Result<(), redis::RedisError> {
    conn.del(key).await
}

#[cfg(test)]
mod tests {
    use super::chat_rate_limit_key;

    #[test]
    fn rate_limit_keys_are_per_user() {
        let a = uuid::Uuid::now_v7();
        let b = uuid::Uuid::now_v7();
        assert_ne!(chat_rate_limit_key(a), chat_rate_limit_key(b));
        assert!(chat_rate_limit_key(a).starts_with("chat_rate_limit:"));
    }
}
