//! User model — the identity layer.
//!
//! Every account carries a marketplace role. Buyers browse and wishlist,
//! sellers list properties once verified, admins review verifications and
//! manage the platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A Haven user account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v7 — time-sortable)
    pub id: Uuid,

    /// Unique username (3-32 chars, alphanumeric + underscores/hyphens)
    pub username: String,

    /// Unique email address — required; login accepts username or email
    #[serde(skip_serializing)]
    pub email: String,

    /// Argon2id password hash. Empty for OAuth-only accounts.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,

    /// Marketplace role
    pub role: Role,

    pub phone_number: Option<String>,

    /// Whether the email address has been confirmed. Unconfirmed accounts
    /// cannot log in with a password.
    pub email_verified: bool,

    /// Soft-delete flag — deactivated accounts cannot log in.
    pub is_active: bool,

    /// Profile picture storage key
    pub avatar: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Marketplace roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default role — can browse, wishlist, chat, and apply for verification
    Buyer,
    /// Can list properties once their verification is approved
    Seller,
    /// Reviews verifications, manages users and listings
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username can only contain letters, numbers, underscores, and hyphens"
    ))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Password fields didn't match"))]
    pub password_confirm: String,

    /// Requested role — buyer (default) or seller. Admin accounts can only
    /// be created by an admin.
    pub role: Option<Role>,

    #[validate(length(max = 15, message = "Phone number must be at most 15 characters"))]
    pub phone_number: Option<String>,
}

/// Login request — `username` accepts either a username or an email address.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Missing credentials"))]
    pub username: String,

    #[validate(length(min = 1, message = "Missing credentials"))]
    pub password: String,
}

/// Update profile request. Username, email, and role are immutable here.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 64))]
    pub first_name: Option<String>,

    #[validate(length(max = 64))]
    pub last_name: Option<String>,

    #[validate(length(max = 15))]
    pub phone_number: Option<String>,
}

/// Safe user representation for API responses (no sensitive fields beyond
/// the owner's own email).
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub phone_number: Option<String>,
    pub email_verified: bool,
    pub is_active: bool,
    pub avatar: Option<String>,
    /// Seller-verification status (`pending`/`approved`/`rejected`) or
    /// `not_submitted`; omitted for admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
            phone_number: u.phone_number,
            email_verified: u.email_verified,
            is_active: u.is_active,
            avatar: u.avatar,
            verification_status: None,
            created_at: u.created_at,
        }
    }
}

// ── Admin DTOs ───────────────────────────────────────────────────────────────

/// Admin user-creation request — unlike registration, the admin controls the
/// role and whether the email counts as verified.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(length(min = 3, max = 32))]
    #[validate(regex(path = *USERNAME_REGEX))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    pub role: Role,

    #[validate(length(max = 64))]
    pub first_name: Option<String>,

    #[validate(length(max = 64))]
    pub last_name: Option<String>,

    #[validate(length(max = 15))]
    pub phone_number: Option<String>,

    pub email_verified: Option<bool>,
}

/// Admin user-update request.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateUserRequest {
    pub role: Option<Role>,
    pub is_active: Option<bool>,

    #[validate(length(max = 64))]
    pub first_name: Option<String>,

    #[validate(length(max = 64))]
    pub last_name: Option<String>,

    #[validate(length(max = 15))]
    pub phone_number: Option<String>,
}

/// Bulk action over a list of users.
#[derive(Debug, Deserialize)]
pub struct BulkUserActionRequest {
    pub user_ids: Vec<Uuid>,
    pub action: BulkUserAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkUserAction {
    Activate,
    Deactivate,
}

use std::sync::LazyLock;
static USERNAME_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_serde() {
        let json = serde_json::to_string(&Role::Seller).unwrap();
        assert_eq!(json, "\"seller\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Seller);
    }

    #[test]
    fn register_rejects_mismatched_passwords() {
        let req = RegisterRequest {
            username: "greta".into(),
            email: "greta@example.com".into(),
            password: "hunter2hunter2".into(),
            password_confirm: "hunter2hunter3".into(),
            role: None,
            phone_number: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn register_rejects_bad_username() {
        let req = RegisterRequest {
            username: "bad name!".into(),
            email: "greta@example.com".into(),
            password: "hunter2hunter2".into(),
            password_confirm: "hunter2hunter2".into(),
            role: Some(Role::Buyer),
            phone_number: None,
        };
        assert!(req.validate().is_err());
    }
}
