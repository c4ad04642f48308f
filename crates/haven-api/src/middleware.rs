//! Middleware — authentication extraction and security headers.

use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use haven_common::error::{HavenError, HavenResult};
use haven_common::models::user::{Role, User};

use crate::{AppState, auth};

/// Authentication context extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: uuid::Uuid,
    pub username: String,
    /// Role as of token issue; authoritative role checks re-read the user row.
    pub role: Role,
}

fn context_from_token(token: &str) -> Result<AuthContext, HavenError> {
    let config = haven_common::config::get();
    let claims = auth::validate_token(token, &config.auth.jwt_secret)
        .map_err(|_| HavenError::InvalidToken)?;

    // Ensure it's an access token, not a refresh token
    if claims.token_type != "access" {
        return Err(HavenError::InvalidToken);
    }

    let user_id = claims
        .sub
        .parse::<uuid::Uuid>()
        .map_err(|_| HavenError::InvalidToken)?;

    let role = match claims.role.as_str() {
        "buyer" => Role::Buyer,
        "seller" => Role::Seller,
        "admin" => Role::Admin,
        _ => return Err(HavenError::InvalidToken),
    };

    Ok(AuthContext {
        user_id,
        username: claims.username,
        role,
    })
}

/// Extract and validate the JWT from the Authorization: Bearer <token> header.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, HavenError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(HavenError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(HavenError::Unauthorized)?;

    let auth_ctx = context_from_token(token)?;

    // Insert auth context into request extensions for handlers to use
    request.extensions_mut().insert(auth_ctx);

    Ok(next.run(request).await)
}

/// Best-effort authentication for public endpoints — listing responses show
/// wishlist state to logged-in callers without requiring a token.
pub fn maybe_auth(headers: &HeaderMap) -> Option<AuthContext> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?
        .strip_prefix("Bearer ")?;
    context_from_token(token).ok()
}

/// Load the authenticated user's current row. Tokens can outlive role and
/// active-flag changes, so permission checks go through here.
pub async fn current_user(state: &crate::AppState, auth: &AuthContext) -> HavenResult<User> {
    let user = haven_db::repository::users::find_by_id(&state.db.pg, auth.user_id)
        .await?
        .ok_or(HavenError::Unauthorized)?;
    if !user.is_active {
        return Err(HavenError::AccountDeactivated);
    }
    Ok(user)
}

/// Load the authenticated user and require the admin role.
pub async fn current_admin(state: &AppState, auth: &AuthContext) -> HavenResult<User> {
    let user = current_user(state, auth).await?;
    haven_common::permissions::ensure_admin(&user)?;
    Ok(user)
}

// ── Security headers ──────────────────────────────────────────────────────────

/// Add defensive security headers to every HTTP response.
///
/// Headers applied:
/// - `X-Content-Type-Options: nosniff` — prevents MIME sniffing
/// - `X-Frame-Options: DENY` — prevents clickjacking
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Permissions-Policy` — disables camera, mic, geolocation
/// - `Strict-Transport-Security` — HSTS (max-age 2 years + preload)
/// - `Content-Security-Policy` — restrictive CSP for API endpoints
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let h = response.headers_mut();

    macro_rules! set {
        ($name:expr, $val:expr) => {
            if let Ok(v) = $val.parse::<axum::http::HeaderValue>() {
                h.insert($name, v);
            }
        };
    }

    set!(
        axum::http::header::HeaderName::from_static("x-content-type-options"),
        "nosniff"
    );
    set!(
        axum::http::header::HeaderName::from_static("x-frame-options"),
        "DENY"
    );
    set!(
        axum::http::header::HeaderName::from_static("referrer-policy"),
        "strict-origin-when-cross-origin"
    );
    set!(
        axum::http::header::HeaderName::from_static("permissions-policy"),
        "camera=(), microphone=(), geolocation=(), payment=()"
    );
    set!(
        axum::http::header::HeaderName::from_static("strict-transport-security"),
        "max-age=63072000; includeSubDomains; preload"
    );
    set!(
        axum::http::header::HeaderName::from_static("content-security-policy"),
        "default-src 'self'; \
         script-src 'self'; \
         style-src 'self' 'unsafe-inline'; \
         img-src 'self' data: blob:; \
         connect-src 'self'; \
         font-src 'self'; \
         frame-ancestors 'none'"
    );

    response
}
