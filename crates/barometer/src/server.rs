//! Slack のスラッシュコマンドを受け付ける HTTP サーバー。

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::SlackConfig;
use crate::pipeline::{SlashCommand, handle_command};
use crate::storage::Database;

/// Slack がリクエスト時刻を入れるヘッダー。
pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";

#[derive(Clone)]
pub struct AppState {
    pub slack: Arc<SlackConfig>,
    pub db: Arc<dyn Database>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/log", post(handle_log))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");
    axum::serve(listener, build_router(state))
        .await
        .context("Server error")?;
    Ok(())
}

#[derive(Serialize)]
struct Pong {
    data: &'static str,
}

async fn handle_index() -> Json<Pong> {
    Json(Pong { data: "PONG" })
}

async fn handle_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<SlashCommand>, FormRejection>,
) -> Response {
    let Form(command) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), status = %rejection.status(), "Rejected form");
            return rejection.into_response();
        }
    };

    let timestamp = headers
        .get(TIMESTAMP_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match handle_command(&command, timestamp, &state.slack, state.db.as_ref()).await {
        Ok(reply) => {
            info!(user_id = %command.user_id, "Log item stored");
            Json(reply).into_response()
        }
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                error!(error = %e, user_id = %command.user_id, "Failed to process command");
            } else {
                warn!(error = %e, user_id = %command.user_id, "Rejected command");
            }
            (status, e.public_message()).into_response()
        }
    }
}
