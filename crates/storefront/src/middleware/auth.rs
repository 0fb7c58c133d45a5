//! Session extractors.
//!
//! Clients present their bearer token in the `token` header as a JSON value:
//! a JSON string holding the token, or `null` when logged out (a missing
//! header means the same). The token is resolved against the session store
//! once per request and cached in the request extensions.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

use kicks_core::SessionToken;

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// The request header carrying the JSON-encoded session token.
pub const SESSION_TOKEN_HEADER: &str = "token";

/// Who is making the request.
///
/// Produced only by resolving a presented token; there is no other way to
/// obtain an `Authenticated` context.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(ctx: SessionContext) -> impl IntoResponse {
///     match ctx {
///         SessionContext::Authenticated(user) => format!("Hello, {}!", user.username),
///         SessionContext::Anonymous => "Hello, guest!".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionContext {
    /// The token resolved to a live session.
    Authenticated(CurrentUser),
    /// No token, or one that is unknown, superseded or expired.
    Anonymous,
}

impl SessionContext {
    /// The authenticated user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }
}

/// Read the claimed session token from request headers.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the header is not valid JSON, is not a
/// string or `null`, or does not have the shape of a session token.
pub fn claimed_token(headers: &HeaderMap) -> Result<Option<SessionToken>, AppError> {
    let Some(value) = headers.get(SESSION_TOKEN_HEADER) else {
        return Ok(None);
    };

    let malformed = || AppError::BadRequest("Malformed session token.".to_owned());
    let raw = value.to_str().map_err(|_| malformed())?;
    let claimed: Option<String> = serde_json::from_str(raw).map_err(|_| malformed())?;

    claimed
        .map(|token| SessionToken::parse(&token).map_err(|_| malformed()))
        .transpose()
}

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<Self>() {
            return Ok(ctx.clone());
        }

        let ctx = match claimed_token(&parts.headers)? {
            Some(token) => state
                .auth()
                .resolve(&token)
                .await?
                .map_or(Self::Anonymous, Self::Authenticated),
            None => Self::Anonymous,
        };

        if let Self::Authenticated(user) = &ctx {
            set_sentry_user(&user.id, user.username.as_str());
        }
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

/// Extractor that requires a resolved session.
///
/// Anonymous requests are rejected with 401 before the handler runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match SessionContext::from_request_parts(parts, state).await? {
            SessionContext::Authenticated(user) => Ok(Self(user)),
            SessionContext::Anonymous => Err(AppError::Unauthorized(
                "You must be logged in.".to_owned(),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_TOKEN_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_or_null_is_anonymous() {
        assert!(claimed_token(&HeaderMap::new()).unwrap().is_none());
        assert!(claimed_token(&headers("null")).unwrap().is_none());
    }

    #[test]
    fn test_json_string_token() {
        let raw = "0123456789abcdef0123456789abcdef";
        let token = claimed_token(&headers(&format!("\"{raw}\""))).unwrap().unwrap();
        assert_eq!(token.expose(), raw);
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        for bad in ["", "0123456789abcdef0123456789abcdef", "\"short\"", "42", "{}"] {
            assert!(
                matches!(claimed_token(&headers(bad)), Err(AppError::BadRequest(_))),
                "accepted {bad:?}"
            );
        }
    }
}
