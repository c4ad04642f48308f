//! API route modules.

pub mod admin_properties;
pub mod admin_users;
pub mod admin_verifications;
pub mod analytics;
pub mod auth;
pub mod chat;
pub mod health;
pub mod images;
pub mod oauth;
pub mod properties;
pub mod users;
pub mod verification;
pub mod wishlist;
