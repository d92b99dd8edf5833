//! Command-line interface.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Local OAuth + playback-control proxy for a Spotify account.
#[derive(Parser, Debug)]
#[command(name = "tonearm", version, about)]
pub struct Cli {
    /// Listen address for the local proxy (overrides TONEARM_BIND)
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Token file path (overrides TONEARM_TOKEN_FILE)
    #[arg(long)]
    pub token_file: Option<PathBuf>,
}
