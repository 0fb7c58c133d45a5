//! Session-related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kicks_core::{SessionToken, UserId, Username};

/// Verified identity resolved from a session token.
///
/// This is the only thing downstream handlers learn about the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: Username,
}

/// A session created by a successful login.
///
/// Holds the only copy of the bearer token; the database keeps a keyed digest.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Bearer token to hand back to the client.
    pub token: SessionToken,
    /// Who the session belongs to.
    pub user: CurrentUser,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token stops resolving.
    pub expires_at: DateTime<Utc>,
}
