//! User domain types.

use chrono::{DateTime, Utc};

use kicks_core::{Email, UserId, Username};

/// A storefront account (domain type).
///
/// The password hash and session digest never leave the repository layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Optional contact email given at signup.
    pub email: Option<Email>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
