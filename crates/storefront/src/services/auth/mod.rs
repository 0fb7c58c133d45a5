//! Authentication service.
//!
//! Password signup and login, and resolution of bearer session tokens.
//!
//! A login issues a fresh random token and stores only its HMAC digest,
//! overwriting whatever session the user had before. Resolution recomputes
//! the digest and accepts it only until the session's expiry.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{TimeDelta, Utc};
use secrecy::SecretString;
use sqlx::SqlitePool;

use kicks_core::{Email, SessionToken, Username};

use super::tokens::{generate_session_token, session_digest};
use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{CurrentUser, IssuedSession, User};

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    session_secret: &'a SecretString,
    session_ttl: TimeDelta,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        pool: &'a SqlitePool,
        session_secret: &'a SecretString,
        session_ttl: TimeDelta,
    ) -> Self {
        Self {
            users: UserRepository::new(pool),
            session_secret,
            session_ttl,
        }
    }

    /// Register a new account.
    ///
    /// A blank email is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if the username or password is empty.
    /// Returns `AuthError::InvalidUsername` / `AuthError::InvalidEmail` for malformed input.
    /// Returns `AuthError::UsernameTaken` if the username is already registered.
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<User, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        let username = Username::parse(username)?;
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(Email::parse)
            .transpose()?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &password_hash, email.as_ref())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "account created");
        Ok(user)
    }

    /// Log in with username and password, issuing a new session.
    ///
    /// The user's previous session, if any, stops resolving.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if the username or password is empty.
    /// Returns `AuthError::UserNotFound` if no such account exists.
    /// Returns `AuthError::InvalidPassword` if the password does not match.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedSession, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        // A name that could never have been registered cannot have an account.
        let username = Username::parse(username).map_err(|_| AuthError::UserNotFound)?;

        let (user, hash) = self
            .users
            .get_credentials(&username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password, &hash)?;

        let token = generate_session_token();
        let issued_at = Utc::now();
        let expires_at = issued_at + self.session_ttl;
        self.users
            .set_session(
                user.id,
                &session_digest(self.session_secret, &token),
                issued_at.timestamp_millis(),
                expires_at.timestamp_millis(),
            )
            .await?;

        tracing::info!(user_id = %user.id, %expires_at, "session issued");
        Ok(IssuedSession {
            token,
            user: CurrentUser {
                id: user.id,
                username: user.username,
            },
            issued_at,
            expires_at,
        })
    }

    /// Resolve a bearer token to the user it belongs to.
    ///
    /// Unknown, superseded and expired tokens all resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn resolve(&self, token: &SessionToken) -> Result<Option<CurrentUser>, AuthError> {
        let digest = session_digest(self.session_secret, token);
        let user = self
            .users
            .get_by_session_digest(&digest, Utc::now().timestamp_millis())
            .await?;
        Ok(user)
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidPassword)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::migrated_pool;

    fn secret() -> SecretString {
        SecretString::from("unit-test-session-secret-Zq8!vR2#mK5@".to_owned())
    }

    fn service<'a>(pool: &'a SqlitePool, secret: &'a SecretString) -> AuthService<'a> {
        AuthService::new(pool, secret, TimeDelta::hours(1))
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AuthError::InvalidPassword)
        ));
    }

    #[tokio::test]
    async fn test_signup_then_login_resolves() {
        let pool = migrated_pool().await;
        let secret = secret();
        let auth = service(&pool, &secret);

        let user = auth.signup("alice", "pw", Some("alice@example.com")).await.unwrap();
        let session = auth.login("alice", "pw").await.unwrap();

        assert_eq!(session.user.id, user.id);
        assert!(session.expires_at > session.issued_at);
        let resolved = auth.resolve(&session.token).await.unwrap().unwrap();
        assert_eq!(resolved.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_signup_errors() {
        let pool = migrated_pool().await;
        let secret = secret();
        let auth = service(&pool, &secret);

        assert!(matches!(auth.signup("", "pw", None).await, Err(AuthError::MissingFields)));
        assert!(matches!(auth.signup("bob", "", None).await, Err(AuthError::MissingFields)));
        assert!(matches!(
            auth.signup("bob smith", "pw", None).await,
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(
            auth.signup("bob", "pw", Some("not-an-email")).await,
            Err(AuthError::InvalidEmail(_))
        ));

        auth.signup("bob", "pw", Some("   ")).await.unwrap();
        assert!(matches!(auth.signup("bob", "other", None).await, Err(AuthError::UsernameTaken)));
    }

    #[tokio::test]
    async fn test_login_errors() {
        let pool = migrated_pool().await;
        let secret = secret();
        let auth = service(&pool, &secret);
        auth.signup("carol", "right", None).await.unwrap();

        assert!(matches!(auth.login("dave", "x").await, Err(AuthError::UserNotFound)));
        assert!(matches!(auth.login("Carol", "right").await, Err(AuthError::UserNotFound)));
        assert!(matches!(auth.login("carol", "wrong").await, Err(AuthError::InvalidPassword)));
        assert!(matches!(auth.login("carol", "").await, Err(AuthError::MissingFields)));
    }

    #[tokio::test]
    async fn test_second_login_supersedes_first() {
        let pool = migrated_pool().await;
        let secret = secret();
        let auth = service(&pool, &secret);
        auth.signup("erin", "pw", None).await.unwrap();

        let first = auth.login("erin", "pw").await.unwrap();
        let second = auth.login("erin", "pw").await.unwrap();

        assert!(auth.resolve(&first.token).await.unwrap().is_none());
        assert!(auth.resolve(&second.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_session_does_not_resolve() {
        let pool = migrated_pool().await;
        let secret = secret();
        let auth = AuthService::new(&pool, &secret, TimeDelta::zero());
        auth.signup("finn", "pw", None).await.unwrap();

        let session = auth.login("finn", "pw").await.unwrap();
        assert!(auth.resolve(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_under_other_secret_does_not_resolve() {
        let pool = migrated_pool().await;
        let secret = secret();
        let auth = service(&pool, &secret);
        auth.signup("gus", "pw", None).await.unwrap();
        let session = auth.login("gus", "pw").await.unwrap();

        let rotated = SecretString::from("a-completely-different-secret-W4x!".to_owned());
        let other = service(&pool, &rotated);
        assert!(other.resolve(&session.token).await.unwrap().is_none());
    }
}
