//! Account route handlers: signup, login and session status.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use kicks_core::{UserId, Username};

use super::extract::FlexibleForm;
use crate::error::Result;
use crate::middleware::SessionContext;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Signup form data. Missing fields arrive as empty strings.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Login form data. Missing fields arrive as empty strings.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub message: &'static str,
}

/// Session status for `/isLoggedIn`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginStatus {
    pub is_logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<Username>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account.
///
/// Responds with plain text on success.
pub async fn signup(
    State(state): State<AppState>,
    FlexibleForm(form): FlexibleForm<SignupForm>,
) -> Result<&'static str> {
    state
        .auth()
        .signup(&form.username, &form.password, form.email.as_deref())
        .await?;
    Ok("Successfully signed up.")
}

/// Log in and issue a session token.
///
/// Any token issued by an earlier login for the same user stops working.
pub async fn login(
    State(state): State<AppState>,
    FlexibleForm(form): FlexibleForm<LoginForm>,
) -> Result<Json<LoginResponse>> {
    let session = state.auth().login(&form.username, &form.password).await?;

    Ok(Json(LoginResponse {
        token: session.token.expose().to_owned(),
        message: "Successfully logged in!",
    }))
}

/// Report whether the `token` header resolves to a session.
pub async fn is_logged_in(ctx: SessionContext) -> Json<LoginStatus> {
    let status = match ctx {
        SessionContext::Authenticated(user) => LoginStatus {
            is_logged_in: true,
            username: Some(user.username),
            id: Some(user.id),
        },
        SessionContext::Anonymous => LoginStatus {
            is_logged_in: false,
            username: None,
            id: None,
        },
    };
    Json(status)
}
