//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global application configuration.
///
/// # Panics
/// Panics if config has not been initialized via [`init`].
pub fn get() -> &'static AppConfig {
    CONFIG.get().expect("Config not initialized. Call haven_common::config::init() first.")
}

/// Initialize the global configuration from environment.
///
/// Should be called once at application startup, before any other code accesses config.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = config::Config::builder()
        // Defaults
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("server.frontend_url", "http://localhost:3000")?
        .set_default("database.max_connections", 20)?
        .set_default("database.min_connections", 5)?
        .set_default("redis.url", "redis://127.0.0.1:6379")?
        .set_default("auth.access_token_ttl_secs", 900)? // 15 min
        .set_default("auth.refresh_token_ttl_secs", 2_592_000)? // 30 days
        .set_default("auth.confirm_token_ttl_secs", 259_200)? // 3 days
        .set_default("auth.reset_token_ttl_secs", 3_600)? // 1 hour
        .set_default("storage.endpoint", "http://localhost:9000")?
        .set_default("storage.bucket", "haven")?
        .set_default("storage.access_key", "")?
        .set_default("storage.secret_key", "")?
        .set_default("storage.region", "us-east-1")?
        .set_default("mail.endpoint", "")?
        .set_default("mail.api_key", "")?
        .set_default("mail.from_address", "no-reply@haven.local")?
        .set_default("mail.from_name", "Haven")?
        .set_default("assistant.base_url", "https://generativelanguage.googleapis.com")?
        .set_default("assistant.model", "gemini-2.0-flash")?
        .set_default("assistant.api_key", "")?
        .set_default("oauth.google_userinfo_url", "https://www.googleapis.com/oauth2/v3/userinfo")?
        .set_default("limits.chat_requests_per_window", 30)?
        .set_default("limits.chat_window_secs", 60)?
        .set_default("limits.max_image_size_bytes", 10_485_760)? // 10 MiB
        .set_default("limits.max_document_size_bytes", 20_971_520)? // 20 MiB
        .set_default("limits.max_images_per_property", 12)?
        .set_default("limits.default_page_size", 20)?
        .set_default("limits.max_page_size", 100)?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Environment variables (HAVEN_SERVER__HOST, HAVEN_DATABASE__URL, etc.)
        .add_source(
            config::Environment::with_prefix("HAVEN")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub assistant: AssistantConfig,
    pub oauth: OauthConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public URL of the front-end — used when building links in
    /// confirmation and password-reset emails.
    pub frontend_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    /// Redis connection URL — rate-limit counters live here.
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret (HS256) — should be 256+ bits of entropy
    pub jwt_secret: String,
    /// Access token TTL in seconds
    pub access_token_ttl_secs: u64,
    /// Refresh token TTL in seconds
    pub refresh_token_ttl_secs: u64,
    /// Email-confirmation token TTL in seconds
    pub confirm_token_ttl_secs: u64,
    /// Password-reset token TTL in seconds
    pub reset_token_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// S3 endpoint URL (e.g., http://localhost:9000 for MinIO).
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// Transactional mail HTTP API endpoint. Leave empty to log outbound
    /// mail instead of sending it (development mode).
    pub endpoint: String,
    pub api_key: String,
    pub from_address: String,
    pub from_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    /// Generative-AI API base URL
    pub base_url: String,
    /// Model identifier, e.g. `gemini-2.0-flash`
    pub model: String,
    /// API key — the chat assistant is disabled when empty.
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OauthConfig {
    /// Google UserInfo endpoint used to verify access tokens for social login.
    pub google_userinfo_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Max chat messages per rate-limit window (fixed window, per user).
    pub chat_requests_per_window: u32,
    /// Rate-limit window length in seconds.
    pub chat_window_secs: u64,
    pub max_image_size_bytes: u64,
    pub max_document_size_bytes: u64,
    pub max_images_per_property: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
}
