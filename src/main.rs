//! tonearm binary entry point.

use std::sync::Arc;

use clap::Parser;

use tonearm::cli::Cli;
use tonearm::config::{default_redirect_uri, Config};
use tonearm::server;
use tonearm::service::PlayerService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
        // keep the callback target on the advertised port unless pinned via env
        if std::env::var("SPOTIFY_REDIRECT_URI").is_err() {
            config.redirect_uri = default_redirect_uri(bind.port());
        }
    }
    if let Some(path) = cli.token_file {
        config.token_file = path;
    }

    let service = Arc::new(PlayerService::from_config(&config));
    server::serve(&config, service).await?;

    Ok(())
}
