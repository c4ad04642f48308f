//! Generative-AI HTTP client.
//!
//! Talks to a Gemini-style `generateContent` endpoint:
//!
//! `POST {base_url}/v1beta/models/{model}:generateContent?key={api_key}`
//!
//! The whole conversation is folded into one prompt (see
//! [`crate::context::assemble_prompt`]); the reply is the concatenated text
//! parts of the first candidate.

use std::time::Duration;

use haven_common::models::chat::ChatMessage;
use haven_common::models::property::Property;
use tracing::debug;

use crate::context;
use crate::error::AssistantError;
use crate::types::{
    ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part,
};

/// Async client for the generative-AI API.
#[derive(Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl AssistantClient {
    /// Build a client from config. A missing API key is allowed — the
    /// client reports itself disabled and every call fails fast.
    pub fn new(cfg: &haven_common::config::AssistantConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("Haven-Assistant/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build reqwest client");

        Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
        }
    }

    /// Whether an API key is configured.
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Generate a conversational reply for `message`, given recent history
    /// and the listings matched for this query.
    pub async fn generate_reply(
        &self,
        message: &str,
        history: &[ChatMessage],
        listings: &[Property],
    ) -> Result<String, AssistantError> {
        if !self.is_enabled() {
            return Err(AssistantError::NotConfigured);
        }

        let listing_context = context::property_context(listings);
        let prompt = context::assemble_prompt(history, &listing_context, message);

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: 0.8,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 800,
            }),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        debug!(model = %self.model, "Assistant generateContent request");

        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(AssistantError::Api(format!("{status}: {detail}")));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let reply: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(AssistantError::EmptyResponse);
        }

        Ok(reply)
    }
}
