//! Order history route handler.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::OrderHistory;
use crate::state::AppState;

/// The logged-in user's purchases, keyed by confirmation code.
pub async fn order_history(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<OrderHistory>> {
    let history = state.checkout().order_history(user.id).await?;
    Ok(Json(history))
}
