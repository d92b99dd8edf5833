use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, Utc};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::{debug, info};

use super::error::AuthError;
use super::store::TokenStore;
use super::token::TokenRecord;

const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Scopes needed to read playback state and issue control commands.
const SCOPE: &str =
    "user-read-playback-state user-modify-playback-state user-read-currently-playing";

/// Authorization-code flow against the accounts service.
///
/// Owns exchange, refresh, and the lazy freshness policy; every
/// successful token response is persisted through the injected store
/// before being returned.
pub struct SpotifyAuth {
    store: Arc<dyn TokenStore>,
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_url: String,
    token_url: String,
}

impl SpotifyAuth {
    pub fn new(
        store: Arc<dyn TokenStore>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            store,
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    /// Point both accounts endpoints at a different base URL.
    pub fn with_accounts_url(mut self, base: impl AsRef<str>) -> Self {
        let base = base.as_ref().trim_end_matches('/');
        self.authorize_url = format!("{base}/authorize");
        self.token_url = format!("{base}/api/token");
        self
    }

    /// Override only the token endpoint (tests point this at a mock).
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Accounts authorize URL the login flow redirects to.
    pub fn authorize_url(&self) -> String {
        let url = reqwest::Url::parse_with_params(
            &self.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPE),
            ],
        )
        .expect("authorize URL");
        url.into()
    }

    /// Exchange an authorization code for a fresh token record.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenRecord, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        let response = self.token_request(&params).await?;
        let record = response.into_record(None);
        self.store.save(&record)?;
        info!(expires_at = %record.expires_at, "authorization code exchanged");
        Ok(record)
    }

    /// Refresh an existing record, persisting the replacement.
    ///
    /// The accounts service may omit a rotated refresh token from the
    /// response; the previous one is carried forward so the next refresh
    /// still works.
    pub async fn refresh(&self, record: &TokenRecord) -> Result<TokenRecord, AuthError> {
        let refresh_token = record
            .refresh_token
            .as_deref()
            .ok_or(AuthError::MissingRefreshToken)?;
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self.token_request(&params).await?;
        let refreshed = response.into_record(record.refresh_token.clone());
        self.store.save(&refreshed)?;
        debug!(expires_at = %refreshed.expires_at, "access token refreshed");
        Ok(refreshed)
    }

    /// Refresh the record if it is about to expire, otherwise hand it
    /// back unchanged. At most one refresh per call.
    pub async fn ensure_valid(&self, record: TokenRecord) -> Result<TokenRecord, AuthError> {
        if record.needs_refresh() {
            self.refresh(&record).await
        } else {
            Ok(record)
        }
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let credentials = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        let resp = self
            .client
            .post(&self.token_url)
            .header(AUTHORIZATION, format!("Basic {credentials}"))
            .form(params)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| AuthError::InvalidResponse(format!("token payload: {e}")))
    }
}

/// Wire format of the accounts token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: i64,
    refresh_token: Option<String>,
    scope: Option<String>,
}

impl TokenResponse {
    fn into_record(self, previous_refresh: Option<String>) -> TokenRecord {
        let now = Utc::now();
        TokenRecord {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            token_type: self.token_type,
            expires_at: now + Duration::seconds(self.expires_in),
            scope: self.scope,
            last_refresh: Some(now),
        }
    }
}
