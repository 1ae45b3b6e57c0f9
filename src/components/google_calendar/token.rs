use super::oauth::OAuthClientConfig;
use crate::error::{oauth_error, SyncResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Seconds before expiry at which a token is already treated as expired
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth token as persisted in the token file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp
    pub expires_at: i64,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl StoredToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= Utc::now().timestamp()
    }

    /// Whether the token was granted every scope in `scopes`
    pub fn covers(&self, scopes: &[String]) -> bool {
        scopes.iter().all(|scope| self.scopes.contains(scope))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
}

/// Loads, refreshes and saves the OAuth token file
#[derive(Clone)]
pub struct TokenManager {
    token_path: PathBuf,
    oauth: OAuthClientConfig,
    scopes: Vec<String>,
    client: Client,
}

impl TokenManager {
    pub fn new(token_path: &Path, oauth: OAuthClientConfig, scopes: Vec<String>) -> Self {
        Self {
            token_path: token_path.to_path_buf(),
            oauth,
            scopes,
            client: Client::new(),
        }
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn oauth(&self) -> &OAuthClientConfig {
        &self.oauth
    }

    /// Read the token file, if there is one
    pub fn load(&self) -> SyncResult<Option<StoredToken>> {
        if !self.token_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.token_path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, token: &StoredToken) -> SyncResult<()> {
        fs::write(&self.token_path, serde_json::to_string_pretty(token)?)?;
        Ok(())
    }

    /// Get a usable token, refreshing an expired one
    ///
    /// `None` means the user has to go through the consent flow.
    pub async fn get_token(&self) -> SyncResult<Option<StoredToken>> {
        let Some(token) = self.load()? else {
            return Ok(None);
        };

        if !token.covers(&self.scopes) {
            warn!("Stored token does not cover the configured scopes");
            return Ok(None);
        }
        if !token.is_expired() {
            return Ok(Some(token));
        }
        if token.refresh_token.is_none() {
            warn!("Stored token expired and has no refresh token");
            return Ok(None);
        }

        let refreshed = self.refresh_token(&token).await?;
        self.save(&refreshed)?;
        info!("Refreshed Google Calendar token");
        Ok(Some(refreshed))
    }

    /// Refresh an expired token
    pub async fn refresh_token(&self, token: &StoredToken) -> SyncResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| oauth_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.oauth.client_id.as_str()),
            ("client_secret", self.oauth.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = self.request_token(&params).await?;

        // Refresh responses usually omit the refresh token and scope
        Ok(StoredToken {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or_else(|| token.refresh_token.clone()),
            expires_at: expires_at(response.expires_in),
            scopes: response
                .scope
                .map(|s| split_scopes(&s))
                .unwrap_or_else(|| token.scopes.clone()),
        })
    }

    /// Exchange an authorization code for a token
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> SyncResult<StoredToken> {
        let params = [
            ("client_id", self.oauth.client_id.as_str()),
            ("client_secret", self.oauth.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];
        let response = self.request_token(&params).await?;

        Ok(StoredToken {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: expires_at(response.expires_in),
            scopes: response
                .scope
                .map(|s| split_scopes(&s))
                .unwrap_or_else(|| self.scopes.clone()),
        })
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> SyncResult<TokenResponse> {
        let response = self
            .client
            .post(&self.oauth.token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| oauth_error(&format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(oauth_error(&format!(
                "Token request failed: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| oauth_error(&format!("Failed to parse token response: {}", e)))
    }
}

fn expires_at(expires_in: Option<i64>) -> i64 {
    Utc::now().timestamp() + expires_in.unwrap_or(3600)
}

fn split_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(String::from).collect()
}
