//! Agentry API /v1: REST endpoints over the workflow runners
pub mod handlers;
pub mod metrics;
pub mod middleware;

pub use handlers::AppState;

use agentry_workflows::LegalConfig;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/legal/run", post(handlers::run_legal))
        .route("/v1/design/run", post(handlers::run_design))
        .route("/v1/knowledge/ingest", post(handlers::ingest))
        .route("/v1/health", get(handlers::health))
        .route("/v1/metrics", get(handlers::metrics_text))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors())
        .with_state(state)
}

pub async fn run(addr: &str, config: LegalConfig) {
    let app = create_app(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    tracing::info!("agentry API listening on {}", addr);
    axum::serve(listener, app).await.expect("Server error");
}
