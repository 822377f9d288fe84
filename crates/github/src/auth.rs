//! GitHub App authentication: a short-lived JWT for the app itself, then an
//! installation access token minted with it.

use anyhow::{Context, Result};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use octocrab::models::AppId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// GitHub rejects app tokens valid for longer than ten minutes.
pub const APP_TOKEN_LIFETIME_SECS: i64 = 10 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClaims {
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl AppClaims {
    pub fn new(app_id: AppId, issued_at: OffsetDateTime) -> Self {
        let iat = issued_at.unix_timestamp();
        Self { iat, exp: iat + APP_TOKEN_LIFETIME_SECS, iss: app_id.to_string() }
    }

    pub fn encode(&self, key: &EncodingKey) -> Result<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), self, key)
            .context("Failed to sign app token")
    }
}

/// Response of `POST /app/installations/{id}/access_tokens`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationToken {
    pub token: String,
    pub expires_at: Option<String>,
}
