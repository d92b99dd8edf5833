//! Typed views of upstream payloads for the search surface.
//!
//! The currently-playing payload is deliberately passed through as raw
//! JSON so the desktop window sees exactly what the upstream sent.

use serde::{Deserialize, Serialize};

/// Artist entry as returned by the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<TrackArtist>,
    pub album: Album,
    pub duration_ms: u64,
}

/// Slim artist reference embedded in a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub artists: ArtistPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistPage {
    pub items: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopTracksResponse {
    pub tracks: Vec<Track>,
}
