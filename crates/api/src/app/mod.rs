//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, job engine and worker wiring
//! - `routes/`: HTTP handlers, one file per resource
//! - `dto.rs`: request/response bodies and input parsing helpers
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::assets::router())
        .nest("/api", routes::router())
        .fallback(errors::route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_request))
                .layer(Extension(services)),
        )
}
