//! HTTP API for the Defect Cost Engine.
//!
//! This module exposes the cost calculator, the system configuration
//! and the defect ledger as a small REST API using the
//! [`axum`](https://crates.io/crates/axum) framework.  Every handler
//! works on the same [`Repository`], guarded by a read-write lock so
//! that a configuration save and a defect submission never interleave.

use crate::dashboard::{self, DashboardSummary, DefectFilter};
use crate::error::CostError;
use crate::models::{CostBreakdown, Defect, SystemConfig};
use crate::simulator::DefectDraft;
use crate::store::{FileStore, Repository};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state shared across requests.
pub struct AppState {
    pub repository: RwLock<Repository>,
}

/// Error returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(CostError);

impl From<CostError> for ApiError {
    fn from(err: CostError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CostError::UnknownRole(_) => StatusCode::NOT_FOUND,
            err if err.is_validation() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Build the API router around the given repository.  Returns the
/// router and a handle to the state.
pub fn build_router(repository: Repository) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        repository: RwLock::new(repository),
    });
    let router = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/config", get(get_config_handler).put(put_config_handler))
        .route("/api/config/reset", post(reset_config_handler))
        .route("/api/simulate", post(simulate_handler))
        .route(
            "/api/defects",
            get(list_defects_handler)
                .post(create_defect_handler)
                .delete(delete_defects_handler),
        )
        .route("/api/dashboard", get(dashboard_handler))
        .with_state(state.clone());
    (router, state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn get_config_handler(State(app_state): State<Arc<AppState>>) -> ApiResult<Json<SystemConfig>> {
    let repository = app_state.repository.read().await;
    Ok(Json(repository.load_config()?))
}

async fn put_config_handler(
    State(app_state): State<Arc<AppState>>,
    Json(config): Json<SystemConfig>,
) -> ApiResult<Json<SystemConfig>> {
    let repository = app_state.repository.write().await;
    Ok(Json(repository.save_config(config)?))
}

async fn reset_config_handler(State(app_state): State<Arc<AppState>>) -> ApiResult<Json<SystemConfig>> {
    let repository = app_state.repository.write().await;
    Ok(Json(repository.reset_config()?))
}

/// Handler for POST /api/simulate.  Rates are resolved from the
/// current configuration; nothing is recorded.
async fn simulate_handler(
    State(app_state): State<Arc<AppState>>,
    Json(mut draft): Json<DefectDraft>,
) -> ApiResult<Json<CostBreakdown>> {
    let config = app_state.repository.read().await.load_config()?;
    draft.resolve_roles(&config)?;
    Ok(Json(draft.simulate(&config)?))
}

async fn list_defects_handler(
    State(app_state): State<Arc<AppState>>,
    Query(filter): Query<DefectFilter>,
) -> ApiResult<Json<Vec<Defect>>> {
    let defects = app_state.repository.read().await.defects()?;
    Ok(Json(defects.into_iter().filter(|d| filter.matches(d)).collect()))
}

/// Handler for POST /api/defects: resolves rates, simulates the draft
/// and records the result.
async fn create_defect_handler(
    State(app_state): State<Arc<AppState>>,
    Json(mut draft): Json<DefectDraft>,
) -> ApiResult<(StatusCode, Json<Defect>)> {
    let repository = app_state.repository.write().await;
    let config = repository.load_config()?;
    draft.resolve_roles(&config)?;
    let defect = Defect::from_breakdown(draft.simulate(&config)?);
    repository.append_defect(defect.clone())?;
    Ok((StatusCode::CREATED, Json(defect)))
}

/// Body of DELETE /api/defects: either the ids to delete or
/// `"all": true`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
    pub all: bool,
}

async fn delete_defects_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let repository = app_state.repository.write().await;
    let removed = if request.all {
        repository.clear_defects()?
    } else {
        repository.delete_defects(&request.ids)?
    };
    Ok(Json(json!({"removed": removed})))
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub summary: DashboardSummary,
    #[serde(rename = "modulos")]
    pub modules: Vec<String>,
}

async fn dashboard_handler(
    State(app_state): State<Arc<AppState>>,
    Query(filter): Query<DefectFilter>,
) -> ApiResult<Json<DashboardResponse>> {
    let defects = app_state.repository.read().await.defects()?;
    Ok(Json(DashboardResponse {
        summary: dashboard::summarize(&defects, &filter),
        modules: dashboard::modules(&defects),
    }))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

/// Launch the API server.  This function opens the JSON store in
/// `data_dir`, optionally seeds sample defects, and binds to the
/// supplied address.  It blocks until the server is interrupted.
pub async fn serve(addr: &str, data_dir: PathBuf, seed_samples: bool) -> Result<()> {
    let repository = Repository::new(FileStore::new(data_dir.clone()));
    let config = repository
        .load_config()
        .with_context(|| format!("reading configuration from {}", data_dir.display()))?;
    config.validate().context("stored configuration is invalid")?;
    if seed_samples {
        repository.seed_samples_if_empty(&config)?;
    }

    let (router, _state) = build_router(repository);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, data_dir = %data_dir.display(), "server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated")
}
