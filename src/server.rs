//! HTTP front end for the archive.
//!
//! - `GET /api/messages` answers one page of a message query
//! - `GET /api/contacts` returns the contacts file as stored
//! - `GET /` serves the embedded viewer
//!
//! Archive failures are logged with their paths and reported to the client
//! only as a generic 500.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::MementoError;
use crate::logging::OperationTimer;
use crate::paginate::QueryParams;
use crate::query;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Files the handlers read on every request
#[derive(Debug, Clone)]
pub struct AppState {
    messages_file: Arc<PathBuf>,
    contacts_file: Arc<PathBuf>,
}

impl AppState {
    /// State serving the given archive files
    pub fn new(messages_file: impl Into<PathBuf>, contacts_file: impl Into<PathBuf>) -> Self {
        Self {
            messages_file: Arc::new(messages_file.into()),
            contacts_file: Arc::new(contacts_file.into()),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/contacts", get(contacts_handler))
        .route("/api/messages", get(messages_handler))
        .with_state(state)
}

/// Bind to the configured address and serve until Ctrl-C.
pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = AppState::new(
        config.archive.messages_file.clone(),
        config.archive.contacts_file.clone(),
    );
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {address}"))?;

    info!(url = %format!("http://{address}"), "http server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await
        .context("Server error")?;

    info!("http server stopped");
    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn contacts_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let timer = OperationTimer::new("http_contacts");
    let response = match tokio::fs::read(state.contacts_file.as_path()).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            let err = MementoError::io(state.contacts_file.as_path(), e);
            error!(error = %err, "failed to read contacts");
            internal_error()
        }
    };
    info!(uri = %uri, duration_ms = timer.finish(), status = response.status().as_u16(), "request");
    response
}

async fn messages_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let timer = OperationTimer::new("http_messages");
    let response = answer_messages(&state, &uri).await;
    info!(uri = %uri, duration_ms = timer.finish(), status = response.status().as_u16(), "request");
    response
}

async fn answer_messages(state: &AppState, uri: &Uri) -> Response {
    let params = match QueryParams::parse(uri.query().unwrap_or_default()) {
        Ok(params) => params,
        Err(err) => {
            warn!(error = %err, "rejecting request");
            return bad_request();
        }
    };

    let log = Arc::clone(&state.messages_file);
    let path = uri.path().to_string();
    let outcome = tokio::task::spawn_blocking(move || query::answer(&log, &path, &params)).await;

    match outcome {
        Ok(Ok(body)) => Json(body).into_response(),
        Ok(Err(err)) if err.is_client_error() => {
            warn!(error = %err, "rejecting request");
            bad_request()
        }
        Ok(Err(err)) => {
            error!(error = %err, "message query failed");
            internal_error()
        }
        Err(join) => {
            error!(error = %join, "message query task failed");
            internal_error()
        }
    }
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "Bad Request").into_response()
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
