//! User repository for database operations.
//!
//! Accounts, password hashes and the single live session digest per user.

use sqlx::SqlitePool;

use kicks_core::{Email, UserId, Username};

use super::{RepositoryError, conflict_on_unique, from_millis, now_millis};
use crate::models::{CurrentUser, User};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: Username,
    email: Option<Email>,
    created_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            username: row.username,
            email: row.email,
            created_at: from_millis(row.created_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        email: Option<&Email>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, password_hash, email, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, email, created_at
            ",
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(now_millis())
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        row.try_into()
    }

    /// Get a user and their password hash for login.
    ///
    /// Usernames match exactly (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or a stored
    /// field does not decode.
    pub async fn get_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, username, email, created_at, password_hash
            FROM users
            WHERE username = ?
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.user.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Replace the user's session with a new one.
    ///
    /// Any previously issued token stops resolving.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_session(
        &self,
        id: UserId,
        digest: &str,
        issued_at_millis: i64,
        expires_at_millis: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET session_digest = ?, session_issued_at = ?, session_expires_at = ?
            WHERE id = ?
            ",
        )
        .bind(digest)
        .bind(issued_at_millis)
        .bind(expires_at_millis)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Find the user owning an unexpired session digest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or the stored
    /// username does not decode.
    pub async fn get_by_session_digest(
        &self,
        digest: &str,
        now_millis: i64,
    ) -> Result<Option<CurrentUser>, RepositoryError> {
        let row: Option<(UserId, Username)> = sqlx::query_as(
            r"
            SELECT id, username
            FROM users
            WHERE session_digest = ? AND session_expires_at > ?
            ",
        )
        .bind(digest)
        .bind(now_millis)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id, username)| CurrentUser { id, username }))
    }
}
