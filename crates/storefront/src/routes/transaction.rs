//! Checkout route handler.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Serialize;

use kicks_core::ConfirmationCode;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::OrderLineRequest;
use crate::state::AppState;

/// Successful purchase response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub message: &'static str,
    pub confirmation_code: ConfirmationCode,
}

/// Check out a list of `{itemId, quantity}` lines for the logged-in user.
///
/// The whole order is validated first; nothing is written unless every line
/// can be filled.
pub async fn transaction(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<Vec<OrderLineRequest>>, JsonRejection>,
) -> Result<Json<PurchaseResponse>> {
    let Json(lines) =
        body.map_err(|e| AppError::BadRequest(format!("Invalid order: {}", e.body_text())))?;

    let receipt = state
        .checkout()
        .checkout(&user, &lines)
        .await
        .inspect_err(|e| {
            let item = e.item_id().map(|id| id.to_string()).unwrap_or_default();
            add_breadcrumb("checkout", &e.to_string(), Some(&[("item_id", item.as_str())]));
        })?;

    Ok(Json(PurchaseResponse {
        message: "Purchase successful!",
        confirmation_code: receipt.confirmation_code,
    }))
}
