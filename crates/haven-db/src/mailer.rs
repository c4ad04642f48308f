//! Outbound mail — confirmation links, password resets, verification
//! decisions.
//!
//! Sends through a transactional-mail HTTP API. When no endpoint is
//! configured the mailer runs in log-only mode: the message is written to
//! the log and the call succeeds, so development setups need no mail
//! provider.

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;

/// Outbound mailer client.
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from_address: String,
    from_name: String,
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    from_address: &'a str,
    from_name: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl Mailer {
    pub fn new(cfg: &haven_common::config::MailConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("Haven-Mailer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build mail HTTP client")?;

        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
            from_address: cfg.from_address.clone(),
            from_name: cfg.from_name.clone(),
        })
    }

    /// True when no provider is configured and mail only goes to the log.
    pub fn is_log_only(&self) -> bool {
        self.endpoint.is_empty()
    }

    /// Send a plain-text message.
    pub async fn send(&self, to: &str, subject: &str, text: &str) -> Result<()> {
        if self.is_log_only() {
            tracing::info!(to = %to, subject = %subject, "Mail (log-only mode):\n{text}");
            return Ok(());
        }

        let body = OutboundMessage {
            from_address: &self.from_address,
            from_name: &self.from_name,
            to,
            subject,
            text,
        };

        self.http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Mail API request failed")?
            .error_for_status()
            .context("Mail API rejected the message")?;

        tracing::debug!(to = %to, subject = %subject, "Mail sent");
        Ok(())
    }

    // ── Domain messages ──────────────────────────────────────────────────────

    /// Email-confirmation link sent on registration and resend.
    pub async fn send_confirmation_email(
        &self,
        to: &str,
        name: &str,
        confirm_url: &str,
    ) -> Result<()> {
        let subject = "Confirm your Haven account";
        let text = format!(
            "Hello {name},\n\n\
             Welcome to Haven! Please confirm your email address to activate\n\
             your account:\n\n{confirm_url}\n\n\
             If you did not create this account, you can ignore this message.\n\n\
             Best regards,\nThe Haven Team"
        );
        self.send(to, subject, &text).await
    }

    /// Password-reset link.
    pub async fn send_password_reset(&self, to: &str, name: &str, reset_url: &str) -> Result<()> {
        let subject = "Reset your Haven password";
        let text = format!(
            "Hello {name},\n\n\
             A password reset was requested for your account. Use the link\n\
             below to choose a new password:\n\n{reset_url}\n\n\
             If you did not request this, no action is needed.\n\n\
             Best regards,\nThe Haven Team"
        );
        self.send(to, subject, &text).await
    }

    /// Notification sent when an admin approves a seller verification.
    pub async fn send_verification_approved(&self, to: &str, name: &str) -> Result<()> {
        let subject = "Congratulations! You're now a verified seller";
        let text = format!(
            "Hello {name},\n\n\
             Great news! Your seller verification has been approved.\n\n\
             You can now:\n\
             - List properties for sale\n\
             - Manage your property portfolio\n\
             - Connect with potential buyers\n\n\
             Best regards,\nThe Haven Team"
        );
        self.send(to, subject, &text).await
    }

    /// Notification sent when an admin rejects a seller verification.
    pub async fn send_verification_rejected(
        &self,
        to: &str,
        name: &str,
        reason: Option<&str>,
    ) -> Result<()> {
        let subject = "Update on your seller verification request";
        let reason = reason
            .filter(|r| !r.is_empty())
            .unwrap_or("Please contact support for more information.");
        let text = format!(
            "Hello {name},\n\n\
             Your seller verification request has been rejected.\n\n\
             Reason: {reason}\n\n\
             You can submit a new verification request with corrected\n\
             documents.\n\n\
             Best regards,\nThe Haven Team"
        );
        self.send(to, subject, &text).await
    }
}
