use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::debug;

use taskweave_core::types::{WorkflowRequest, WorkflowResult, WorkflowStatus};
use taskweave_engine::templates;

use crate::state::AppState;

// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "taskweave",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// GET /agents
pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "agents": state.agents.list() }))
}

// GET /tools
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "tools": state.tools.list() }))
}

// POST /workflows — runs the workflow to a terminal status.
// A submission rejected by validation comes back as 400 with the
// failed WorkflowResult as the body.
pub async fn execute_workflow(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WorkflowRequest>,
) -> impl IntoResponse {
    let result = state.engine.execute(request).await;
    let status = if is_validation_failure(&result) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(result))
}

// GET /workflows/{id}
pub async fn get_workflow(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<String>,
) -> Result<Json<WorkflowResult>, StatusCode> {
    match state.engine.status(&workflow_id) {
        Some(result) => Ok(Json(result)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

// POST /workflows/{id}/cancel — idempotent; unknown or finished
// workflows report cancelled=false.
pub async fn cancel_workflow(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<String>,
) -> Json<serde_json::Value> {
    let cancelled = state.engine.cancel(&workflow_id);
    debug!(workflow_id = %workflow_id, cancelled, "Cancel requested via API");
    Json(serde_json::json!({ "cancelled": cancelled }))
}

// GET /workflows/templates/{name}
pub async fn get_template(
    Path(name): Path<String>,
) -> Result<Json<WorkflowRequest>, StatusCode> {
    match templates::template(&name) {
        Some(request) => Ok(Json(request)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// A validation failure is reported before any agent runs: the result is
/// failed, carries an error, and has an empty result map.
fn is_validation_failure(result: &WorkflowResult) -> bool {
    result.status == WorkflowStatus::Failed
        && result.error.is_some()
        && result.agent_results.is_empty()
}
