//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span, Sentry scope and response)
//! 4. Rate limiting on `/signup` and `/login` (governor)
//!
//! Session resolution is not a layer: handlers ask for it through the
//! [`SessionContext`] and [`RequireAuth`] extractors.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{RequireAuth, SESSION_TOKEN_HEADER, SessionContext};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
