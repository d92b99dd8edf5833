//! Environment-backed configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::store::default_token_path;
use crate::error::PlayerError;

const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Runtime configuration, assembled once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub bind: SocketAddr,
    pub token_file: PathBuf,
    pub redirect_uri: String,
    /// Accounts base URL override (tests, mock servers).
    pub accounts_url: Option<String>,
    /// Playback API base URL override.
    pub api_url: Option<String>,
}

impl Config {
    /// Load from environment variables, reading `.env` first if present.
    ///
    /// `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET` are required;
    /// everything else has a default.
    pub fn from_env() -> Result<Self, PlayerError> {
        let _ = dotenvy::dotenv();

        let client_id = require("SPOTIFY_CLIENT_ID")?;
        let client_secret = require("SPOTIFY_CLIENT_SECRET")?;

        let bind: SocketAddr = std::env::var("TONEARM_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()
            .map_err(|e| PlayerError::Configuration(format!("invalid TONEARM_BIND: {e}")))?;

        let token_file = std::env::var("TONEARM_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_token_path());

        let redirect_uri = std::env::var("SPOTIFY_REDIRECT_URI")
            .unwrap_or_else(|_| default_redirect_uri(bind.port()));

        Ok(Self {
            client_id,
            client_secret,
            bind,
            token_file,
            redirect_uri,
            accounts_url: std::env::var("SPOTIFY_ACCOUNTS_URL").ok(),
            api_url: std::env::var("SPOTIFY_API_URL").ok(),
        })
    }
}

/// Callback URI the accounts app registration must list.
pub fn default_redirect_uri(port: u16) -> String {
    format!("http://localhost:{port}/callback")
}

fn require(name: &str) -> Result<String, PlayerError> {
    std::env::var(name).map_err(|_| PlayerError::Configuration(format!("{name} must be set")))
}
