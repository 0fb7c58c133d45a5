//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password was empty.
    #[error("missing required fields")]
    MissingFields,

    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] kicks_core::UsernameError),

    /// Email was given but failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] kicks_core::EmailError),

    /// Signup with a username that is already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// Login for a username with no account.
    #[error("user does not exist")]
    UserNotFound,

    /// Login with the wrong password.
    #[error("invalid password")]
    InvalidPassword,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
