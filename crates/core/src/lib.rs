//! Kicks Core - Shared types library.
//!
//! This crate provides the domain types used across the Kicks components:
//! - `storefront` - Sneaker storefront HTTP service (auth, catalog, checkout)
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Randomness for tokens is supplied by the caller, which keeps
//! every constructor here deterministic and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, usernames, quantities, prices and tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
