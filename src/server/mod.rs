//! Local HTTP surface of the playback proxy.
//!
//! The desktop window polls `GET /index` and calls the PUT control
//! endpoints; `GET /` and `GET /callback` carry the login flow.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::AuthError;
use crate::config::Config;
use crate::error::PlayerError;
use crate::service::{PlayerService, StatusOutcome};
use crate::upstream::PlaybackCommand;

#[derive(Clone)]
struct AppState {
    service: Arc<PlayerService>,
}

/// Build the proxy router.
pub fn build_router(service: Arc<PlayerService>) -> Router {
    Router::new()
        .route("/", get(login))
        .route("/callback", get(callback))
        .route("/index", get(index))
        .route("/play", put(play))
        .route("/pause", put(pause))
        .route("/next", put(next_track))
        .route("/previous", put(previous_track))
        .with_state(AppState { service })
}

/// Bind and serve until ctrl-c / SIGTERM.
pub async fn serve(config: &Config, service: Arc<PlayerService>) -> std::io::Result<()> {
    let app = build_router(service);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("playback proxy listening on http://{}", config.bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.service.login_url())
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

async fn callback(State(state): State<AppState>, Query(params): Query<CallbackParams>) -> Response {
    if let Some(error) = params.error {
        warn!(%error, "authorization denied by accounts service");
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response();
    }
    let Some(code) = params.code else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing authorization code" })),
        )
            .into_response();
    };
    match state.service.complete_login(&code).await {
        Ok(_) => Redirect::to("/index").into_response(),
        Err(err) => error_response(err),
    }
}

async fn index(State(state): State<AppState>) -> Response {
    match state.service.status().await {
        Ok(StatusOutcome::Playing(payload)) => Json(payload).into_response(),
        Ok(StatusOutcome::NotPlaying) => {
            Json(json!({ "error": "No song is currently playing" })).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn play(State(state): State<AppState>) -> Response {
    control(state, PlaybackCommand::Play).await
}

async fn pause(State(state): State<AppState>) -> Response {
    control(state, PlaybackCommand::Pause).await
}

async fn next_track(State(state): State<AppState>) -> Response {
    control(state, PlaybackCommand::Next).await
}

async fn previous_track(State(state): State<AppState>) -> Response {
    control(state, PlaybackCommand::Previous).await
}

async fn control(state: AppState, command: PlaybackCommand) -> Response {
    match state.service.control(command).await {
        Ok(()) => {
            info!("{}", command.confirmation());
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Map proxy errors onto the local surface: a missing login redirects
/// into the authorization flow, upstream failures pass through with
/// their original status and body.
fn error_response(err: PlayerError) -> Response {
    match err {
        PlayerError::Auth(AuthError::NotLoggedIn) => Redirect::to("/").into_response(),
        PlayerError::Upstream { status, body } => {
            let payload = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(json!({ "error": payload }))).into_response()
        }
        PlayerError::Auth(err) => {
            warn!(%err, "authentication failure");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
        PlayerError::Network(err) => {
            warn!(%err, "upstream unreachable");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
        err => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let term = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = term => {},
    }

    info!("shutdown signal received");
}
