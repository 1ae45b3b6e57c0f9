use chrono::Utc;
use gradesync::components::google_calendar::{OAuthClientConfig, StoredToken, TokenManager};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCOPE: &str = "https://www.googleapis.com/auth/calendar";

fn oauth(token_uri: &str) -> OAuthClientConfig {
    OAuthClientConfig {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        auth_uri: "https://accounts.example/auth".to_string(),
        token_uri: token_uri.to_string(),
    }
}

fn token(expires_at: i64, refresh_token: Option<&str>) -> StoredToken {
    StoredToken {
        access_token: "old-access".to_string(),
        refresh_token: refresh_token.map(String::from),
        expires_at,
        scopes: vec![SCOPE.to_string()],
    }
}

#[tokio::test]
async fn test_missing_token_file() {
    let dir = tempfile::tempdir().unwrap();
    let manager = TokenManager::new(
        &dir.path().join("token.json"),
        oauth("http://unused.invalid/token"),
        vec![SCOPE.to_string()],
    );

    assert!(manager.get_token().await.unwrap().is_none());
}

#[tokio::test]
async fn test_valid_token_is_used_as_is() {
    let dir = tempfile::tempdir().unwrap();
    let manager = TokenManager::new(
        &dir.path().join("token.json"),
        oauth("http://unused.invalid/token"),
        vec![SCOPE.to_string()],
    );
    let stored = token(Utc::now().timestamp() + 3600, Some("refresh"));
    manager.save(&stored).unwrap();

    assert_eq!(manager.get_token().await.unwrap(), Some(stored));
}

#[tokio::test]
async fn test_token_missing_scope_needs_consent() {
    let dir = tempfile::tempdir().unwrap();
    let manager = TokenManager::new(
        &dir.path().join("token.json"),
        oauth("http://unused.invalid/token"),
        vec![SCOPE.to_string(), "https://www.googleapis.com/auth/tasks".to_string()],
    );
    manager
        .save(&token(Utc::now().timestamp() + 3600, Some("refresh")))
        .unwrap();

    assert!(manager.get_token().await.unwrap().is_none());
}

#[tokio::test]
async fn test_expired_token_without_refresh_needs_consent() {
    let dir = tempfile::tempdir().unwrap();
    let manager = TokenManager::new(
        &dir.path().join("token.json"),
        oauth("http://unused.invalid/token"),
        vec![SCOPE.to_string()],
    );
    manager.save(&token(Utc::now().timestamp() - 10, None)).unwrap();

    assert!(manager.get_token().await.unwrap().is_none());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_saved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=keep-me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join("token.json");
    let manager = TokenManager::new(
        &token_path,
        oauth(&format!("{}/token", mock_server.uri())),
        vec![SCOPE.to_string()],
    );
    manager
        .save(&token(Utc::now().timestamp() - 10, Some("keep-me")))
        .unwrap();

    let refreshed = manager.get_token().await.unwrap().expect("token should refresh");
    assert_eq!(refreshed.access_token, "new-access");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("keep-me"));
    assert!(!refreshed.is_expired());
    assert_eq!(refreshed.scopes, vec![SCOPE.to_string()]);

    // Persisted for the next run
    assert_eq!(manager.load().unwrap(), Some(refreshed));
}

#[tokio::test]
async fn test_refresh_failure_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let manager = TokenManager::new(
        &dir.path().join("token.json"),
        oauth(&format!("{}/token", mock_server.uri())),
        vec![SCOPE.to_string()],
    );
    manager
        .save(&token(Utc::now().timestamp() - 10, Some("revoked")))
        .unwrap();

    let err = manager.get_token().await.unwrap_err();
    assert!(err.to_string().contains("invalid_grant"));
}
