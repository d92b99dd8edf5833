//! Thin client for the upstream playback REST API.

pub mod http;
pub mod types;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::error::PlayerError;

use self::http::{bearer_headers, shared_client};
use self::types::{Artist, SearchResponse, TopTracksResponse, Track};

const DEFAULT_BASE_URL: &str = "https://api.spotify.com/v1";

/// Playback-control command forwarded to the upstream player endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Next,
    Previous,
}

impl PlaybackCommand {
    /// Path segment under `/me/player`.
    pub fn path(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Next => "next",
            Self::Previous => "previous",
        }
    }

    /// Fixed confirmation used in logs once the upstream accepts the call.
    pub fn confirmation(self) -> &'static str {
        match self {
            Self::Play => "Playback started",
            Self::Pause => "Playback paused",
            Self::Next => "Next track",
            Self::Previous => "Previous track",
        }
    }

    /// Play/pause are PUT upstream, track skips are POST.
    fn is_put(self) -> bool {
        matches!(self, Self::Play | Self::Pause)
    }
}

/// Client for the playback endpoints. Holds no credentials; callers pass
/// a valid access token per call.
pub struct PlaybackApi {
    base_url: String,
}

impl PlaybackApi {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.base_url = url.as_ref().trim_end_matches('/').to_string();
        self
    }

    /// Fetch the currently-playing payload.
    ///
    /// `None` when nothing is playing: either a 200 whose `is_playing`
    /// is false (paused), or the empty 204 the API answers when idle.
    /// Other non-success statuses pass through with their body.
    pub async fn currently_playing(&self, access_token: &str) -> Result<Option<Value>, PlayerError> {
        let url = format!("{}/me/player/currently-playing", self.base_url);
        let resp = shared_client()
            .get(&url)
            .headers(bearer_headers(access_token))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(PlayerError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        if status == StatusCode::NO_CONTENT || body.is_empty() {
            return Ok(None);
        }
        let payload: Value = serde_json::from_str(&body)?;
        if payload
            .get("is_playing")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            Ok(Some(payload))
        } else {
            Ok(None)
        }
    }

    /// Forward one control command; the upstream answers 204 on success.
    pub async fn control(
        &self,
        access_token: &str,
        command: PlaybackCommand,
    ) -> Result<(), PlayerError> {
        let url = format!("{}/me/player/{}", self.base_url, command.path());
        let client = shared_client();
        let request = if command.is_put() {
            client.put(&url)
        } else {
            client.post(&url)
        };
        let resp = request.headers(bearer_headers(access_token)).send().await?;
        let status = resp.status();
        if status.is_success() {
            debug!(command = command.confirmation(), "upstream accepted control call");
            return Ok(());
        }
        let body = resp.text().await?;
        Err(PlayerError::Upstream {
            status: status.as_u16(),
            body,
        })
    }

    /// Search for an artist by name; first match or `None`.
    pub async fn search_artist(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Option<Artist>, PlayerError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[("q", query), ("type", "artist")],
        )
        .map_err(|e| PlayerError::Configuration(format!("search URL: {e}")))?;
        let body = self.get_json(url, access_token).await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed.artists.items.into_iter().next())
    }

    /// Top tracks for an artist.
    pub async fn artist_top_tracks(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<Vec<Track>, PlayerError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/artists/{artist_id}/top-tracks", self.base_url),
            &[("market", "US")],
        )
        .map_err(|e| PlayerError::Configuration(format!("top-tracks URL: {e}")))?;
        let body = self.get_json(url, access_token).await?;
        let parsed: TopTracksResponse = serde_json::from_str(&body)?;
        Ok(parsed.tracks)
    }

    async fn get_json(&self, url: reqwest::Url, access_token: &str) -> Result<String, PlayerError> {
        let resp = shared_client()
            .get(url)
            .headers(bearer_headers(access_token))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(PlayerError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl Default for PlaybackApi {
    fn default() -> Self {
        Self::new()
    }
}
