use super::token::{StoredToken, TokenManager};
use crate::error::{oauth_error, SyncResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;
use url::Url;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client registration read from a Google client secrets file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Desktop clients are stored under `installed`, web clients under `web`
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<OAuthClientConfig>,
    web: Option<OAuthClientConfig>,
}

impl OAuthClientConfig {
    /// Load the client registration file
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        if !path.exists() {
            return Err(oauth_error(&format!(
                "Place your Google OAuth client file as {}",
                path.display()
            )));
        }
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_json(content: &str) -> SyncResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(content)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| oauth_error("Client file has neither an 'installed' nor a 'web' section"))
    }

    /// Consent page URL requesting offline access
    pub fn authorization_url(&self, scopes: &[String], redirect_uri: &str, state: &str) -> SyncResult<Url> {
        let mut url = Url::parse(&self.auth_uri)
            .map_err(|e| oauth_error(&format!("Failed to parse URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("scope", &scopes.join(" "))
            .append_pair("state", state);
        Ok(url)
    }
}

/// Pull `code` out of the redirect request path after checking `state`
pub fn authorization_code(request_path: &str, expected_state: &str) -> SyncResult<String> {
    let url = Url::parse(&format!("http://localhost{}", request_path))
        .map_err(|e| oauth_error(&format!("Invalid callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(oauth_error(&format!("Authorization denied: {}", value))),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(oauth_error("State mismatch in authorization callback"));
    }
    code.ok_or_else(|| oauth_error("No authorization code found in callback"))
}

/// Walk the user through browser consent and save the resulting token
pub async fn run_consent_flow(token_manager: &TokenManager, port: u16) -> SyncResult<StoredToken> {
    let redirect_uri = format!("http://localhost:{}", port);

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = token_manager
        .oauth()
        .authorization_url(token_manager.scopes(), &redirect_uri, &state)?;

    // Start the listener before the browser can redirect to it
    let server = tiny_http::Server::http(("127.0.0.1", port))
        .map_err(|e| oauth_error(&format!("Failed to listen on port {}: {}", port, e)))?;

    info!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        info!("Open this URL to authorize: {}", auth_url);
    }

    info!("Waiting for authorization callback on {}", redirect_uri);
    let request = server.recv()?;
    let outcome = authorization_code(request.url(), &state);

    let message = match &outcome {
        Ok(_) => "Authorization successful! You can close this window.".to_string(),
        Err(e) => format!("Authorization failed: {}", e),
    };
    request.respond(tiny_http::Response::from_string(message))?;

    let token = token_manager.exchange_code(&outcome?, &redirect_uri).await?;
    token_manager.save(&token)?;
    info!("Token saved");

    Ok(token)
}
