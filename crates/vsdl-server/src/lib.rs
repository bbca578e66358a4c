//! Router construction, split out from `main` so integration tests can drive
//! the full Issue → Dispense → Verify flow over the actual HTTP stack with
//! `tower::ServiceExt::oneshot` instead of calling handler functions
//! directly.

pub mod catalog;
pub mod error;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handlers::AppState;
pub use state::ServerState;

/// Build the router for a given (already-seeded) [`ServerState`].
pub fn app(state: ServerState) -> Router {
    let state: AppState = Arc::new(RwLock::new(state));

    Router::new()
        .route("/token/create", post(handlers::issue))
        .route("/delegate/{token}", get(handlers::dispense))
        .route("/verify", post(handlers::verify))
        .route("/generators", get(handlers::generators))
        .route("/policies", get(handlers::policies))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
