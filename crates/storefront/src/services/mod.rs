//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Signup, login and session resolution
//! - `checkout` - Order validation, the transactional order processor and
//!   order history
//! - `tokens` - Random session tokens, confirmation codes and session digests

pub mod auth;
pub mod checkout;
pub mod tokens;
