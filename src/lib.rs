//! Tonearm: personal Spotify playback controller.
//!
//! Owns the OAuth token lifecycle (authorization-code exchange,
//! persistence, lazy expiry-based refresh) and exposes a small local
//! HTTP proxy for playback status and control. The desktop window is a
//! separate program: it polls `GET /index`, renders the result, and
//! calls the PUT control endpoints on user action.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tonearm::config::Config;
//! use tonearm::server;
//! use tonearm::service::PlayerService;
//!
//! # async fn example() -> std::io::Result<()> {
//! let config = Config::from_env().expect("SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET");
//! let service = Arc::new(PlayerService::from_config(&config));
//! server::serve(&config, service).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod upstream;
