//! # haven-assistant
//!
//! The LLM-backed chat assistant. Two halves:
//!
//! - **Query extraction** (`query.rs`): a deliberately simple rule-based
//!   parser that pulls cities, property type, room count, and price range
//!   out of free-text messages. No scoring, no backtracking — the extracted
//!   criteria feed the normal listing search.
//! - **Generative client** (`client.rs`): a reqwest client for a Gemini-style
//!   `generateContent` API. The conversational reply is produced by the
//!   model from a prompt that embeds the matched listings
//!   (`context.rs`).
//!
//! The assistant degrades gracefully: with no API key configured the chat
//! endpoints report the service as unavailable instead of failing requests
//! at random.

pub mod client;
pub mod context;
pub mod error;
pub mod query;
pub mod types;

pub use client::AssistantClient;
pub use error::AssistantError;
pub use query::PropertyQuery;
