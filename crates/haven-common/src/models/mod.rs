//! Core domain models shared across all Haven services.
//!
//! These are the "truth" types — what the database stores and the API
//! serializes. Primary keys are UUID v7 (time-sortable).

pub mod chat;
pub mod property;
pub mod user;
pub mod verification;

/// Re-export all model types for convenience.
pub use chat::*;
pub use property::*;
pub use user::*;
pub use verification::*;
