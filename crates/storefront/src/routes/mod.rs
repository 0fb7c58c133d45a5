//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Accounts
//! POST /signup                 - Create an account (rate limited)
//! POST /login                  - Log in, returns a session token (rate limited)
//! GET  /isLoggedIn             - Session status for the `token` header
//!
//! # Catalog
//! GET  /items/sneakers         - Every item
//! GET  /items/sneakers/{id}    - One item
//!
//! # Purchases (require a session)
//! POST /transaction            - Check out a list of {itemId, quantity} lines
//! GET  /orderHistory           - Purchases grouped by confirmation code
//! ```
//!
//! Anything else falls through to the static frontend (see `main.rs`).

pub mod auth;
pub mod extract;
pub mod health;
pub mod items;
pub mod orders;
pub mod transaction;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::StorefrontConfig;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the account routes router.
///
/// `/signup` and `/login` are rate limited per client IP when
/// `config.rate_limit` is set.
pub fn account_routes(config: &StorefrontConfig) -> Router<AppState> {
    let credentials = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login));
    let credentials = if config.rate_limit {
        credentials.layer(auth_rate_limiter(config.trust_proxy))
    } else {
        credentials
    };

    credentials.route("/isLoggedIn", get(auth::is_logged_in))
}

/// Create the catalog routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/sneakers", get(items::list))
        .route("/sneakers/{id}", get(items::show))
}

/// Create all API routes.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(account_routes(config))
        .nest("/items", item_routes())
        .route("/transaction", post(transaction::transaction))
        .route("/orderHistory", get(orders::order_history))
}
