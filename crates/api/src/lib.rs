//! HTTP API server with observability for the money-transfer engine.
//!
//! Accepts transfer requests, reports their status, and exposes health and
//! Prometheus metrics endpoints. Transfers run on a [`TransferWorker`] wired
//! to in-memory collaborators.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use banking::InMemoryBank;
use metrics_exporter_prometheus::PrometheusHandle;
use status_store::InMemoryStatusStore;
use task_queue::InMemoryQueue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use transfer::TransferWorker;

/// The worker type served by the API.
pub type AppWorker = TransferWorker<InMemoryQueue, InMemoryStatusStore, InMemoryBank>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub worker: Arc<AppWorker>,
    pub queue: InMemoryQueue,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/transfers", post(routes::transfers::create))
        .route("/transfers/{reference_id}", get(routes::transfers::get))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state and starts the transfer worker.
///
/// Must be called from within a Tokio runtime.
pub fn create_default_state(bank: InMemoryBank) -> Arc<AppState> {
    let queue = InMemoryQueue::new();
    let store = InMemoryStatusStore::new();
    let worker = TransferWorker::new(queue.clone(), store, bank).run();

    Arc::new(AppState { worker, queue })
}
