//! API Handlers
use crate::metrics;
use agentry_core::{RunReport, RunState, RunnerConfig, WorkflowRunner, ENGINE_VERSION};
use agentry_tools::{CannedGenerator, Generator, MemoryStore};
use agentry_workflows::{design_graph, legal_graph, LegalConfig, LegalToolkit};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state. The store and generator are long-lived;
/// every run builds its own graph and audit sink on top of them.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub generator: Arc<dyn Generator>,
    pub config: LegalConfig,
}

impl AppState {
    pub fn new(config: LegalConfig) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            generator: Arc::new(CannedGenerator::studio()),
            config,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub documents: Vec<IngestDocument>,
}

#[derive(Debug, Deserialize)]
pub struct IngestDocument {
    pub text: String,
    #[serde(default = "unknown_source")]
    pub source: String,
}

fn unknown_source() -> String {
    "unknown".to_string()
}

pub async fn run_legal(
    State(app): State<AppState>,
    Json(request): Json<RunRequest>,
) -> (StatusCode, Json<Value>) {
    let toolkit = LegalToolkit::new(app.store.clone(), &app.config);
    let graph = match legal_graph(toolkit, &app.config) {
        Ok(graph) => graph,
        Err(e) => return failure("legal", e.to_string()),
    };
    let runner = match WorkflowRunner::new(
        graph,
        RunnerConfig {
            max_steps: app.config.max_steps,
            ..Default::default()
        },
    ) {
        Ok(runner) => runner,
        Err(e) => return failure("legal", e.to_string()),
    };

    match runner.run(RunState::seeded(&request.prompt)).await {
        Ok(report) => {
            metrics::record_run("legal", "success");
            (StatusCode::OK, Json(run_payload(report)))
        }
        Err(e) => failure("legal", e.to_string()),
    }
}

pub async fn run_design(
    State(app): State<AppState>,
    Json(request): Json<RunRequest>,
) -> (StatusCode, Json<Value>) {
    let graph = match design_graph(app.generator.clone()) {
        Ok(graph) => graph,
        Err(e) => return failure("design", e.to_string()),
    };
    let runner = match WorkflowRunner::new(graph, RunnerConfig::default()) {
        Ok(runner) => runner,
        Err(e) => return failure("design", e.to_string()),
    };

    match runner.run(RunState::seeded(&request.prompt)).await {
        Ok(report) => {
            metrics::record_run("design", "success");
            (StatusCode::OK, Json(run_payload(report)))
        }
        Err(e) => failure("design", e.to_string()),
    }
}

pub async fn ingest(
    State(app): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> (StatusCode, Json<Value>) {
    let count = request.documents.len();
    app.store.add_documents(
        request
            .documents
            .into_iter()
            .map(|doc| (doc.text, doc.source)),
    );
    tracing::info!(count, total = app.store.len(), "documents ingested");

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "ingested": count,
            "total": app.store.len(),
        })),
    )
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": ENGINE_VERSION })),
    )
}

pub async fn metrics_text() -> (StatusCode, String) {
    match metrics::encode() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Response shape shared by both run endpoints: the final message as the
/// headline, the full timeline for UIs, and the raw state fields for
/// programmatic callers.
fn run_payload(report: RunReport) -> Value {
    let timeline: Vec<Value> = report
        .state
        .messages
        .iter()
        .map(|m| json!({ "role": m.role, "content": m.content }))
        .collect();
    let response = report
        .state
        .messages
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default();

    json!({
        "status": "success",
        "run_id": report.run_id,
        "response": response,
        "timeline": timeline,
        "output": report.state.output,
        "metrics": report.state.metrics,
        "history": report.state.history,
        "steps": report.steps,
        "forced_finish": report.forced_finish,
        "run_status": report.status,
    })
}

fn failure(workflow: &str, detail: String) -> (StatusCode, Json<Value>) {
    metrics::record_run(workflow, "error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "detail": detail })),
    )
}
