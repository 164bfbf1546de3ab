//! Inbox HTTP server: JSON API routes plus static assets on a single port.

use crate::aggregate;
use crate::catalog;
use crate::config::{Config, DataPaths};
use crate::contact::{ContactForm, ContactLog};
use crate::error::InboxError;
use crate::faq;
use crate::ingest::MessageIngest;
use crate::init;
use super::protocol::{
    AddMessageParams, ApiOk, FormOrJson, JsonFailure, MessagesQuery, PlatformsBody,
    QuestionsBody, SummariesBody, TextFailure, ThreadBody,
};
use crate::store::{FsStore, ThreadStore};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

const CONTACT_OK: &str = "Form was successfully submitted!";
const CONTACT_MISSING_FIELDS: &str = "All fields are required. Please try again.";
const MESSAGE_MISSING: &str = "A message is required.";

/// Shared state for the handlers.
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn ThreadStore>,
    /// Appends go through here so writes to one conversation are serialized.
    pub ingest: MessageIngest,
    pub paths: Arc<DataPaths>,
    pub contact_log: ContactLog,
    /// Port reported by the health probe.
    pub port: u16,
}

impl ServerState {
    pub fn new(store: Arc<dyn ThreadStore>, paths: DataPaths, port: u16) -> Self {
        Self {
            ingest: MessageIngest::new(store.clone()),
            contact_log: ContactLog::new(paths.contact_log.clone()),
            paths: Arc::new(paths),
            store,
            port,
        }
    }
}

/// Routes of the inbox API; anything unmatched is served from the public directory.
pub fn router(state: ServerState) -> Router {
    let assets = ServeDir::new(&state.paths.public);
    Router::new()
        .route("/health", get(health_http))
        .route("/getPlatforms", get(get_platforms))
        .route("/getQAndA", get(get_questions))
        .route("/contactUs", post(contact_us))
        .route("/getMessages", get(get_messages))
        .route("/getMessageContent/:platform/:sender", get(get_message_content))
        .route("/addMessage/:platform/:sender", post(add_message))
        .fallback_service(assets)
        .with_state(state)
}

/// Run the server on config.server.bind:config.server.port until Ctrl+C or SIGTERM.
/// `config_path` locates the data root; the platform directory must already exist (`inbox init`).
/// The PORT env override is applied by the caller (see [`crate::config::resolve_port`]).
pub async fn run_server(config: Config, config_path: PathBuf) -> Result<()> {
    let paths = crate::config::resolve_data_paths(&config, &config_path);
    init::require_initialized(&paths)?;
    log::info!("serving platforms from {}", paths.platforms.display());
    if !paths.public.is_dir() {
        log::warn!(
            "public directory {} not found; static assets will 404",
            paths.public.display()
        );
    }

    let store: Arc<dyn ThreadStore> = Arc::new(FsStore::new(paths.platforms.clone()));
    let state = ServerState::new(store, paths, config.server.port);
    let app = router(state);

    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("inbox listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("inbox server exited")?;
    log::info!("inbox server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// Log a core failure and turn it into the uniform JSON failure.
fn json_failure(route: &str, e: InboxError) -> JsonFailure {
    log::warn!("{} failed: {}", route, e);
    JsonFailure
}

/// GET /health returns a simple health JSON (for probes).
async fn health_http(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.port,
    }))
}

/// GET /getPlatforms lists the platform ids.
async fn get_platforms(
    State(state): State<ServerState>,
) -> Result<Json<ApiOk<PlatformsBody>>, JsonFailure> {
    let platforms = catalog::list_platforms(state.store.as_ref())
        .await
        .map_err(|e| json_failure("getPlatforms", e))?;
    Ok(Json(ApiOk::new(PlatformsBody { platforms })))
}

/// GET /getQAndA returns the Q&A file as stored.
async fn get_questions(
    State(state): State<ServerState>,
) -> Result<Json<ApiOk<QuestionsBody>>, JsonFailure> {
    let questions = faq::load_questions(&state.paths.questions)
        .await
        .map_err(|e| {
            log::warn!("getQAndA failed: {:#}", e);
            JsonFailure
        })?;
    Ok(Json(ApiOk::new(QuestionsBody { questions })))
}

/// POST /contactUs appends a submission to the contact log.
async fn contact_us(
    State(state): State<ServerState>,
    FormOrJson(form): FormOrJson<ContactForm>,
) -> Result<&'static str, TextFailure> {
    let Some(submission) = form.validate() else {
        return Err(TextFailure(StatusCode::BAD_REQUEST, CONTACT_MISSING_FIELDS));
    };
    state.contact_log.append(&submission).await.map_err(|e| {
        log::warn!("contactUs failed: {:#}", e);
        TextFailure::server_error()
    })?;
    Ok(CONTACT_OK)
}

/// GET /getMessages[?platform=] returns platform summaries (one platform, or all).
async fn get_messages(
    State(state): State<ServerState>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<ApiOk<SummariesBody>>, JsonFailure> {
    let platform = query
        .platform
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    log::debug!("getMessages platform={:?}", platform);
    let data = aggregate::collect_summaries(state.store.as_ref(), platform)
        .await
        .map_err(|e| json_failure("getMessages", e))?;
    Ok(Json(ApiOk::new(SummariesBody { data })))
}

/// GET /getMessageContent/:platform/:sender returns the full thread.
async fn get_message_content(
    State(state): State<ServerState>,
    Path((platform, sender)): Path<(String, String)>,
) -> Result<Json<ApiOk<ThreadBody>>, JsonFailure> {
    log::debug!("getMessageContent {}/{}", platform, sender);
    let thread = state
        .store
        .read_thread(&platform, &sender)
        .await
        .map_err(|e| json_failure("getMessageContent", e))?;
    Ok(Json(ApiOk::new(ThreadBody {
        all_messages: thread.into_messages(),
    })))
}

/// POST /addMessage/:platform/:sender appends `{"Me": message}` to the thread.
async fn add_message(
    State(state): State<ServerState>,
    Path((platform, sender)): Path<(String, String)>,
    FormOrJson(params): FormOrJson<AddMessageParams>,
) -> Result<&'static str, TextFailure> {
    let Some(message) = params.message else {
        return Err(TextFailure(StatusCode::BAD_REQUEST, MESSAGE_MISSING));
    };
    state
        .ingest
        .append_message(&platform, &sender, &message)
        .await
        .map_err(|e| {
            log::warn!("addMessage failed: {}", e);
            TextFailure::server_error()
        })?;
    Ok("success")
}
