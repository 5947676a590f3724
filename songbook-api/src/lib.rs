//! songbook-api library - song catalog HTTP service
//!
//! Routes, shared state, and the storage seam. The binary in `main.rs` only
//! resolves configuration, picks a repository, and serves `build_router`.

use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, BoxError, Router};
use songbook_common::config::DEFAULT_REQUEST_TIMEOUT_MS;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod db;
pub mod error;
pub mod pagination;
pub mod service;

use db::SongRepository;
use error::ApiError;
use service::SongService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: SongService,
    /// Upper bound on a single request, storage included
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(repo: Arc<dyn SongRepository>) -> Self {
        Self {
            service: SongService::new(repo),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Build application router
///
/// Catalog routes, `/health`, `/api/buildinfo`, and the Swagger UI at
/// `/docs`. Every request is traced and bounded by the state's timeout.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let timeout = state.request_timeout;

    let app = Router::new()
        .merge(api::song_routes())
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .with_state(state)
        .merge(api::docs_routes());

    apply_request_timeout(app, timeout).layer(TraceLayer::new_for_http())
}

/// Bound every request by `timeout`; an expired request answers 408 with
/// the usual `{"error": ...}` body
fn apply_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .layer(TimeoutLayer::new(timeout)),
    )
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(format!("unhandled middleware error: {}", err))
    }
}
