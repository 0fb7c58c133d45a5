//! Core types for Kicks.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod gender;
pub mod id;
pub mod price;
pub mod quantity;
pub mod token;
pub mod username;

pub use email::{Email, EmailError};
pub use gender::{Gender, GenderError};
pub use id::*;
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
pub use token::{ConfirmationCode, SessionToken, TokenError};
pub use username::{Username, UsernameError};
