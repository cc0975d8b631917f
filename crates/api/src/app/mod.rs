//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (ledger store, stock master client, recorder)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response envelope and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::SharedRecorder;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(recorder: SharedRecorder) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(recorder))
        .layer(ServiceBuilder::new())
}
