use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower::timeout::error::Elapsed;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::handlers::response::ApiError;
use crate::store::StudentStore;
use crate::sync::KeyedLocks;

/// Maximum accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentStore>,
    /// Serializes read-modify-write updates per student id.
    pub student_locks: KeyedLocks<i64>,
    pub env: String,
}

impl AppState {
    pub fn new(students: Arc<dyn StudentStore>, env: impl Into<String>) -> Self {
        Self {
            students,
            student_locks: KeyedLocks::new(),
            env: env.into(),
        }
    }

    /// Like [`AppState::new`], also sweeping idle per-id locks in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_lock_cleanup(students: Arc<dyn StudentStore>, env: impl Into<String>) -> Self {
        Self {
            students,
            student_locks: KeyedLocks::with_cleanup("student_locks"),
            env: env.into(),
        }
    }
}

// ============================================================================
// Server Setup
// ============================================================================

pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let api_routes = Router::new()
        .route(
            "/students",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            "/students/{id}",
            get(handlers::get_student)
                .patch(handlers::update_student)
                .delete(handlers::remove_student),
        )
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));
    let api_routes = with_request_timeout(api_routes, request_timeout);

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
}

/// Fail requests that run longer than `timeout` with a 408 error envelope.
pub fn with_request_timeout<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_layer_error))
            .timeout(timeout),
    )
}

async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::internal(format!("unhandled middleware error: {err}"))
    }
}
