//! Pure service facade for the playback proxy.

use std::sync::Arc;

use serde_json::Value;

use crate::auth::{AuthError, FileTokenStore, SpotifyAuth, TokenRecord, TokenStore};
use crate::config::Config;
use crate::error::Result;
use crate::upstream::{PlaybackApi, PlaybackCommand};

/// Outcome of a status poll.
#[derive(Debug, Clone)]
pub enum StatusOutcome {
    /// Something is playing; the upstream payload passes through untouched.
    Playing(Value),
    NotPlaying,
}

/// Ties the token manager to the upstream client.
///
/// Each operation follows the same pattern: load the persisted record,
/// ensure it is still valid (at most one lazy refresh), then forward a
/// single bearer-authenticated call. All response and redirect decisions
/// belong to the HTTP layer.
pub struct PlayerService {
    store: Arc<dyn TokenStore>,
    auth: SpotifyAuth,
    api: PlaybackApi,
}

impl PlayerService {
    pub fn new(store: Arc<dyn TokenStore>, auth: SpotifyAuth, api: PlaybackApi) -> Self {
        Self { store, auth, api }
    }

    /// Wire the service from runtime configuration.
    pub fn from_config(config: &Config) -> Self {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token_file.clone()));
        let mut auth = SpotifyAuth::new(
            store.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            config.redirect_uri.clone(),
        );
        if let Some(base) = &config.accounts_url {
            auth = auth.with_accounts_url(base);
        }
        let mut api = PlaybackApi::new();
        if let Some(base) = &config.api_url {
            api = api.with_base_url(base);
        }
        Self::new(store, auth, api)
    }

    /// Authorize URL the login flow redirects to.
    pub fn login_url(&self) -> String {
        self.auth.authorize_url()
    }

    /// Complete the authorization-code flow: exchange and persist.
    pub async fn complete_login(&self, code: &str) -> Result<TokenRecord> {
        Ok(self.auth.exchange_code(code).await?)
    }

    /// Currently-playing passthrough.
    pub async fn status(&self) -> Result<StatusOutcome> {
        let token = self.valid_access_token().await?;
        match self.api.currently_playing(&token).await? {
            Some(payload) => Ok(StatusOutcome::Playing(payload)),
            None => Ok(StatusOutcome::NotPlaying),
        }
    }

    /// Forward a playback-control command.
    pub async fn control(&self, command: PlaybackCommand) -> Result<()> {
        let token = self.valid_access_token().await?;
        self.api.control(&token, command).await
    }

    /// Upstream client, for callers that want the search surface.
    pub fn api(&self) -> &PlaybackApi {
        &self.api
    }

    async fn valid_access_token(&self) -> Result<String> {
        let record = self.store.load()?.ok_or(AuthError::NotLoggedIn)?;
        let record = self.auth.ensure_valid(record).await?;
        Ok(record.access_token)
    }
}
