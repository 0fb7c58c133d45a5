//! Kicks storefront library.
//!
//! Accounts, the sneaker catalog and transactional checkout behind an axum
//! router. The binary in `main.rs` adds Sentry, the static frontend and the
//! listener; tests drive [`app`] in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::Request};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the storefront router with tracing and request IDs applied.
///
/// The request span declares an empty `request_id` field that the request-id
/// middleware fills in.
pub fn app(state: AppState) -> Router {
    routes::routes(state.config())
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
