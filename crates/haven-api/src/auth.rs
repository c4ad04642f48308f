//! Authentication — Argon2id password hashing, JWT bearer tokens, and the
//! single-use account tokens behind email confirmation and password reset.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use haven_common::models::user::Role;

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// Marketplace role at issue time — authoritative checks re-read the DB
    pub role: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// Token type ("access" or "refresh")
    pub token_type: String,
}

/// Token pair returned on login/register.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against an Argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn make_token(
    user_id: Uuid,
    username: &str,
    role: Role,
    secret: &str,
    ttl_secs: u64,
    token_type: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role: role.as_str().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
        token_type: token_type.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Generate both access and refresh tokens.
pub fn generate_token_pair(
    user_id: Uuid,
    username: &str,
    role: Role,
    secret: &str,
    access_ttl: u64,
    refresh_ttl: u64,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    Ok(TokenPair {
        access_token: make_token(user_id, username, role, secret, access_ttl, "access")?,
        refresh_token: make_token(user_id, username, role, secret, refresh_ttl, "refresh")?,
        expires_in: access_ttl,
        token_type: "Bearer".to_string(),
    })
}

/// Validate and decode a JWT token.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

// ── Account tokens ───────────────────────────────────────────────────────────

/// Generate a fresh account token. Returns `(raw, digest)` — the raw token
/// goes into the emailed link, only the digest is stored.
pub fn new_account_token() -> (String, String) {
    let raw: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect();
    let digest = hash_account_token(&raw);
    (raw, digest)
}

/// SHA-256 digest of a raw account token, hex-encoded.
pub fn hash_account_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn token_pair_validates_and_carries_role() {
        let user_id = Uuid::now_v7();
        let pair =
            generate_token_pair(user_id, "ada", Role::Seller, "test-secret", 900, 3600).unwrap();

        let access = validate_token(&pair.access_token, "test-secret").unwrap();
        assert_eq!(access.token_type, "access");
        assert_eq!(access.sub, user_id.to_string());
        assert_eq!(access.role, "seller");

        let refresh = validate_token(&pair.refresh_token, "test-secret").unwrap();
        assert_eq!(refresh.token_type, "refresh");
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let pair =
            generate_token_pair(Uuid::now_v7(), "ada", Role::Buyer, "secret-a", 900, 3600).unwrap();
        assert!(validate_token(&pair.access_token, "secret-b").is_err());
    }

    #[test]
    fn account_tokens_hash_deterministically() {
        let (raw, digest) = new_account_token();
        assert_eq!(raw.len(), 48);
        assert_eq!(hash_account_token(&raw), digest);

        let (other_raw, other_digest) = new_account_token();
        assert_ne!(raw, other_raw);
        assert_ne!(digest, other_digest);
    }
}
