mod common;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Duration;
use pretty_assertions::assert_eq;
use tonearm::auth::{AuthError, SpotifyAuth};
use wiremock::matchers::{body_string_contains, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{fresh_record, record_expiring_in, InMemoryTokenStore};

const CLIENT_ID: &str = "client-id";
const CLIENT_SECRET: &str = "client-secret";
const REDIRECT_URI: &str = "http://localhost:5000/callback";

fn auth_with(store: Arc<InMemoryTokenStore>, token_url: &str) -> SpotifyAuth {
    SpotifyAuth::new(store, CLIENT_ID, CLIENT_SECRET, REDIRECT_URI).with_token_url(token_url)
}

fn expected_basic_header() -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}"))
    )
}

fn token_body(access_token: &str, refresh_token: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "user-read-playback-state",
    });
    if let Some(refresh) = refresh_token {
        body["refresh_token"] = serde_json::Value::String(refresh.to_string());
    }
    body
}

#[test]
fn authorize_url_carries_required_params() {
    let store = Arc::new(InMemoryTokenStore::new());
    let auth = SpotifyAuth::new(store, CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);

    let url = reqwest::Url::parse(&auth.authorize_url()).expect("valid URL");
    assert_eq!(url.host_str(), Some("accounts.spotify.com"));
    assert_eq!(url.path(), "/authorize");

    let params: std::collections::HashMap<_, _> = url.query_pairs().collect();
    assert_eq!(params.get("client_id").map(|v| v.as_ref()), Some(CLIENT_ID));
    assert_eq!(params.get("response_type").map(|v| v.as_ref()), Some("code"));
    assert_eq!(
        params.get("redirect_uri").map(|v| v.as_ref()),
        Some(REDIRECT_URI)
    );
    let scope = params.get("scope").expect("scope param");
    assert!(scope.contains("user-modify-playback-state"));
    assert!(scope.contains("user-read-currently-playing"));
}

#[tokio::test]
async fn exchange_posts_code_with_basic_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("authorization", expected_basic_header().as_str()))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=my-auth-code"))
        .and(body_string_contains("redirect_uri="))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("exchanged-access", Some("exchanged-refresh"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let auth = auth_with(store.clone(), &mock_server.uri());

    let record = auth
        .exchange_code("my-auth-code")
        .await
        .expect("exchange should succeed");

    assert_eq!(record.access_token, "exchanged-access");
    assert_eq!(record.refresh_token.as_deref(), Some("exchanged-refresh"));
    assert_eq!(record.token_type, "Bearer");
    assert!(!record.needs_refresh());

    let stored = store.get().expect("record persisted");
    assert_eq!(stored.access_token, "exchanged-access");
}

#[tokio::test]
async fn exchange_rejected_surfaces_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant"
            })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let auth = auth_with(store.clone(), &mock_server.uri());

    let result = auth.exchange_code("bad-code").await;

    match result {
        Err(AuthError::Rejected { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn exchange_with_invalid_payload_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not-json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let auth = auth_with(store, &mock_server.uri());

    let result = auth.exchange_code("my-auth-code").await;

    assert!(matches!(result, Err(AuthError::InvalidResponse(_))));
}

#[tokio::test]
async fn refresh_posts_refresh_token_grant() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("authorization", expected_basic_header().as_str()))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=stored-refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("refreshed-access", Some("rotated-refresh"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let auth = auth_with(store.clone(), &mock_server.uri());

    let refreshed = auth
        .refresh(&fresh_record("old-access"))
        .await
        .expect("refresh should succeed");

    assert_eq!(refreshed.access_token, "refreshed-access");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("rotated-refresh"));

    let stored = store.get().expect("record persisted");
    assert_eq!(stored.access_token, "refreshed-access");
}

#[tokio::test]
async fn refresh_retains_previous_refresh_token_when_response_omits_it() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("refreshed-access", None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let auth = auth_with(store.clone(), &mock_server.uri());

    let refreshed = auth
        .refresh(&fresh_record("old-access"))
        .await
        .expect("refresh should succeed");

    assert_eq!(refreshed.refresh_token.as_deref(), Some("stored-refresh"));
    let stored = store.get().expect("record persisted");
    assert_eq!(stored.refresh_token.as_deref(), Some("stored-refresh"));
}

#[tokio::test]
async fn refresh_without_refresh_token_fails() {
    let store = Arc::new(InMemoryTokenStore::new());
    let auth = auth_with(store.clone(), "http://127.0.0.1:9/unused");

    let mut record = fresh_record("old-access");
    record.refresh_token = None;

    let result = auth.refresh(&record).await;

    assert!(matches!(result, Err(AuthError::MissingRefreshToken)));
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn refresh_rejection_surfaces_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client"
            })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let auth = auth_with(store, &mock_server.uri());

    let result = auth.refresh(&fresh_record("old-access")).await;

    match result {
        Err(AuthError::Rejected { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn ensure_valid_refreshes_expiring_record_exactly_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("refreshed-access", Some("rotated-refresh"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let auth = auth_with(store.clone(), &mock_server.uri());

    let expiring = record_expiring_in("about-to-expire", Duration::seconds(30));
    let record = auth
        .ensure_valid(expiring)
        .await
        .expect("ensure_valid should refresh");

    assert_eq!(record.access_token, "refreshed-access");
    assert_eq!(store.save_count(), 1);
    assert_eq!(
        store.get().expect("record persisted").access_token,
        "refreshed-access"
    );
}

#[tokio::test]
async fn ensure_valid_passes_fresh_record_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("unexpected", None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let auth = auth_with(store.clone(), &mock_server.uri());

    let fresh = fresh_record("still-good");
    let record = auth
        .ensure_valid(fresh.clone())
        .await
        .expect("ensure_valid should pass through");

    assert_eq!(record, fresh);
    assert_eq!(store.save_count(), 0);
}
