//! Chat assistant routes.
//!
//! `POST /chat/messages` is the main flow: fixed-window rate limit, session
//! bookkeeping, heuristic listing search over the message text, one LLM
//! call for the conversational reply, and persistence of both sides of the
//! exchange.

use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    middleware,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use haven_common::{
    error::{HavenError, HavenResult},
    id,
    models::chat::{ChatMessage, ChatRole, ChatSession, SendChatRequest},
    models::property::PropertyResponse,
    validation::validate_request,
};
use haven_db::redis_pool::{self, chat_rate_limit_key};
use haven_db::repository::{chat, properties, properties::PropertyFilter};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::{AppState, middleware::AuthContext, routes::properties::build_property_responses};

/// How many history messages are loaded for prompt context.
const HISTORY_LIMIT: i64 = 10;
/// Cap on listings surfaced per chat reply.
const MAX_CHAT_RESULTS: i64 = 8;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/messages", post(send_message))
        .route("/chat/rate-limit", get(rate_limit_status))
        .route("/chat/sessions", get(list_sessions))
        .route(
            "/chat/sessions/{session_id}",
            get(session_history).delete(delete_session),
        )
        .route("/chat/sessions/{session_id}/export", get(export_session))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

// ── Rate limiting ────────────────────────────────────────────────────────────

/// Fixed-window counter per user: INCR, with the TTL set when the window
/// opens. One request over the cap trips the limiter until expiry.
async fn check_rate_limit(state: &AppState, auth: &AuthContext) -> HavenResult<()> {
    let config = haven_common::config::get();
    let key = chat_rate_limit_key(auth.user_id);
    let mut redis = state.db.redis.clone();

    let count = redis_pool::incr_expire(&mut redis, &key, config.limits.chat_window_secs).await?;
    if count > config.limits.chat_requests_per_window as i64 {
        let retry_after = redis_pool::ttl_secs(&mut redis, &key).await?;
        return Err(HavenError::RateLimited {
            retry_after_secs: retry_after as u64,
        });
    }
    Ok(())
}

// ── Send message ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatPerformance {
    response_time: f64,
    message_count: i64,
}

#[derive(Serialize)]
struct ChatResponse {
    session_id: String,
    response: String,
    properties: Vec<PropertyResponse>,
    properties_count: usize,
    performance: ChatPerformance,
}

/// POST /api/v1/chat/messages
async fn send_message(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendChatRequest>,
) -> HavenResult<Json<ChatResponse>> {
    check_rate_limit(&state, &auth).await?;
    validate_request(&body)?;

    let session = get_or_create_session(&state, &auth, body.session_id.as_deref()).await?;

    // History before this message — it becomes the prompt context.
    let history = chat::recent_messages(&state.db.pg, session.id, HISTORY_LIMIT).await?;

    chat::add_message(
        &state.db.pg,
        id::generate_id(),
        session.id,
        ChatRole::User,
        &body.message,
        None,
    )
    .await?;

    // Heuristic listing search over the message text
    let matched = search_listings(&state, &body.message).await?;

    let started = Instant::now();
    let reply = state
        .assistant
        .generate_reply(&body.message, &history, &matched)
        .await?;
    let response_time = started.elapsed().as_secs_f64();

    chat::add_message(
        &state.db.pg,
        id::generate_id(),
        session.id,
        ChatRole::Assistant,
        &reply,
        Some(response_time),
    )
    .await?;
    chat::touch_session(&state.db.pg, session.id).await?;

    let message_count = chat::message_count(&state.db.pg, session.id).await?;

    tracing::info!(
        session_id = %session.session_id,
        matched = matched.len(),
        response_time,
        "Chat exchange completed"
    );

    let properties = build_property_responses(&state, matched, Some(auth.user_id)).await?;

    Ok(Json(ChatResponse {
        session_id: session.session_id,
        response: reply,
        properties_count: properties.len(),
        properties,
        performance: ChatPerformance {
            response_time,
            message_count,
        },
    }))
}

/// Continue the session the client named (creating it on first use), or
/// start a fresh one.
async fn get_or_create_session(
    state: &AppState,
    auth: &AuthContext,
    session_id: Option<&str>,
) -> HavenResult<ChatSession> {
    match session_id {
        Some(sid) => {
            if let Some(session) = chat::find_session(&state.db.pg, auth.user_id, sid).await? {
                Ok(session)
            } else {
                Ok(chat::create_session(&state.db.pg, id::generate_id(), auth.user_id, sid).await?)
            }
        }
        None => {
            let sid = id::generate_session_id();
            Ok(chat::create_session(&state.db.pg, id::generate_id(), auth.user_id, &sid).await?)
        }
    }
}

/// Run the extracted criteria against available listings; fall back to
/// keyword search when nothing was extracted. Newest first, capped.
async fn search_listings(
    state: &AppState,
    message: &str,
) -> HavenResult<Vec<haven_common::models::property::Property>> {
    let query = haven_assistant::query::parse_query(message);

    let mut filter = PropertyFilter {
        is_available: Some(true),
        limit: MAX_CHAT_RESULTS,
        ..Default::default()
    };

    if query.is_empty() {
        if !message.trim().is_empty() {
            filter.search = Some(message.to_string());
        }
    } else {
        filter.cities = query.cities;
        filter.property_type = query.property_type;
        filter.number_of_rooms = query.rooms;
        filter.min_price = query.min_price;
        filter.max_price = query.max_price;
    }

    Ok(properties::search(&state.db.pg, &filter).await?)
}

// ── Rate-limit status ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RateLimitStatus {
    max_requests: u32,
    window_secs: u64,
    current_requests: i64,
    remaining_requests: i64,
    reset_in_secs: i64,
}

/// GET /api/v1/chat/rate-limit — Current window usage.
async fn rate_limit_status(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<RateLimitStatus>> {
    let config = haven_common::config::get();
    let key = chat_rate_limit_key(auth.user_id);
    let mut redis = state.db.redis.clone();

    let current = redis_pool::get_count(&mut redis, &key).await?;
    let reset_in = if current > 0 {
        redis_pool::ttl_secs(&mut redis, &key).await?
    } else {
        0
    };

    Ok(Json(RateLimitStatus {
        max_requests: config.limits.chat_requests_per_window,
        window_secs: config.limits.chat_window_secs,
        current_requests: current,
        remaining_requests: (config.limits.chat_requests_per_window as i64 - current).max(0),
        reset_in_secs: reset_in,
    }))
}

// ── Session management ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct SessionSummary {
    session_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    message_count: i64,
}

#[derive(Serialize)]
struct SessionListResponse {
    sessions: Vec<SessionSummary>,
    total_sessions: usize,
}

/// GET /api/v1/chat/sessions — Own sessions, most recently active first.
async fn list_sessions(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> HavenResult<Json<SessionListResponse>> {
    let sessions = chat::list_sessions(&state.db.pg, auth.user_id).await?;

    let mut out = Vec::with_capacity(sessions.len());
    for session in sessions {
        let message_count = chat::message_count(&state.db.pg, session.id).await?;
        out.push(SessionSummary {
            session_id: session.session_id,
            created_at: session.created_at,
            updated_at: session.updated_at,
            message_count,
        });
    }

    Ok(Json(SessionListResponse {
        total_sessions: out.len(),
        sessions: out,
    }))
}

#[derive(Serialize)]
struct SessionHistoryResponse {
    session_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
}

async fn find_owned_session(
    state: &AppState,
    auth: &AuthContext,
    session_id: &str,
) -> HavenResult<ChatSession> {
    chat::find_session(&state.db.pg, auth.user_id, session_id)
        .await?
        .ok_or(HavenError::NotFound {
            resource: "Chat session".into(),
        })
}

/// GET /api/v1/chat/sessions/:session_id — Full history.
async fn session_history(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> HavenResult<Json<SessionHistoryResponse>> {
    let session = find_owned_session(&state, &auth, &session_id).await?;
    let messages = chat::all_messages(&state.db.pg, session.id).await?;

    Ok(Json(SessionHistoryResponse {
        session_id: session.session_id,
        created_at: session.created_at,
        updated_at: session.updated_at,
        messages,
    }))
}

/// DELETE /api/v1/chat/sessions/:session_id — Delete a session and its
/// messages.
async fn delete_session(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> HavenResult<Json<serde_json::Value>> {
    let session = find_owned_session(&state, &auth, &session_id).await?;
    chat::delete_session(&state.db.pg, session.id).await?;

    tracing::info!(session_id = %session_id, "Chat session deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Serialize)]
struct ExportInfo {
    session_id: String,
    user: String,
    exported_at: DateTime<Utc>,
    total_messages: usize,
}

#[derive(Serialize)]
struct ExportResponse {
    export_info: ExportInfo,
    conversation: Vec<ChatMessage>,
}

/// GET /api/v1/chat/sessions/:session_id/export — JSON export of a
/// conversation.
async fn export_session(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> HavenResult<Json<ExportResponse>> {
    let session = find_owned_session(&state, &auth, &session_id).await?;
    let messages = chat::all_messages(&state.db.pg, session.id).await?;

    Ok(Json(ExportResponse {
        export_info: ExportInfo {
            session_id: session.session_id,
            user: auth.username.clone(),
            exported_at: Utc::now(),
            total_messages: messages.len(),
        },
        conversation: messages,
    }))
}
