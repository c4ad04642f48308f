//! Google OAuth social login — access-token verification via the UserInfo
//! endpoint.
//!
//! The front-end obtains an access token from Google and posts it to
//! `/auth/google`; the backend verifies it by calling the UserInfo API and
//! gets-or-creates the matching account with a pre-verified email.

use haven_common::error::{HavenError, HavenResult};
use serde::Deserialize;

/// The subset of the Google UserInfo response we use.
#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
}

/// Verify an access token against the UserInfo endpoint. Invalid or expired
/// tokens come back as `InvalidToken`; transport failures as `Upstream`.
pub async fn verify_google_token(
    http: &reqwest::Client,
    access_token: &str,
) -> HavenResult<GoogleUserInfo> {
    let config = haven_common::config::get();

    let response = http
        .get(&config.oauth.google_userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| HavenError::Upstream {
            service: "google-oauth".into(),
            message: e.to_string(),
        })?;

    if response.status() == reqwest::StatusCode::UNAUTHORIZED {
        return Err(HavenError::InvalidToken);
    }
    if !response.status().is_success() {
        return Err(HavenError::Upstream {
            service: "google-oauth".into(),
            message: format!("UserInfo returned {}", response.status()),
        });
    }

    response.json().await.map_err(|e| HavenError::Upstream {
        service: "google-oauth".into(),
        message: e.to_string(),
    })
}

/// Derive a username candidate from an email address: the local part,
/// stripped to the characters usernames allow, with a numeric suffix added
/// by the caller on collision.
pub fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    let cleaned: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if cleaned.len() >= 3 {
        cleaned
    } else {
        format!("user-{cleaned}")
    }
}

#[cfg(test)]
mod tests {
    use super::username_from_email;

    #[test]
    fn username_strips_disallowed_chars() {
        assert_eq!(username_from_email("jane.doe+x@example.com"), "janedoex");
        assert_eq!(username_from_email("a_b-c@example.com"), "a_b-c");
    }

    #[test]
    fn short_local_parts_get_a_prefix() {
        assert_eq!(username_from_email("jo@example.com"), "user-jo");
    }
}
