//! Role-based permission helpers.
//!
//! Haven's permission model is deliberately small: three roles plus
//! ownership checks. Anything needing the verification table (the
//! "verified seller" gate) lives in the API layer where the repository is
//! available.

use uuid::Uuid;

use crate::error::HavenError;
use crate::models::user::{Role, User};

/// True if the user holds the admin role.
pub fn is_admin(user: &User) -> bool {
    user.role == Role::Admin
}

/// Require the admin role.
pub fn ensure_admin(user: &User) -> Result<(), HavenError> {
    if is_admin(user) {
        Ok(())
    } else {
        Err(HavenError::MissingRole { role: "admin".into() })
    }
}

/// Require the seller role. Verification state is checked separately.
pub fn ensure_seller(user: &User) -> Result<(), HavenError> {
    if user.role == Role::Seller {
        Ok(())
    } else {
        Err(HavenError::MissingRole { role: "seller".into() })
    }
}

/// Require that `user` owns the resource, unless they are an admin.
pub fn ensure_owner_or_admin(user: &User, owner_id: Uuid) -> Result<(), HavenError> {
    if user.id == owner_id || is_admin(user) {
        Ok(())
    } else {
        Err(HavenError::Forbidden)
    }
}

/// Require that `user` owns the resource — admins get no bypass here.
pub fn ensure_owner(user_id: Uuid, owner_id: Uuid) -> Result<(), HavenError> {
    if user_id == owner_id {
        Ok(())
    } else {
        Err(HavenError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_role(role: Role) -> User {
        User {
            id: crate::id::generate_id(),
            username: "probe".into(),
            email: "probe@example.com".into(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            role,
            phone_number: None,
            email_verified: true,
            is_active: true,
            avatar: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_check() {
        assert!(ensure_admin(&user_with_role(Role::Admin)).is_ok());
        assert!(ensure_admin(&user_with_role(Role::Buyer)).is_err());
    }

    #[test]
    fn owner_or_admin_allows_both() {
        let owner = user_with_role(Role::Seller);
        assert!(ensure_owner_or_admin(&owner, owner.id).is_ok());

        let admin = user_with_role(Role::Admin);
        assert!(ensure_owner_or_admin(&admin, owner.id).is_ok());

        let stranger = user_with_role(Role::Buyer);
        assert!(ensure_owner_or_admin(&stranger, owner.id).is_err());
    }

    #[test]
    fn strict_owner_check_has_no_admin_bypass() {
        let a = crate::id::generate_id();
        let b = crate::id::generate_id();
        assert!(ensure_owner(a, a).is_ok());
        assert!(ensure_owner(a, b).is_err());
    }
}
