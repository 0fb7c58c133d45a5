//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};

use kicks_core::ItemId;

use crate::db::ItemRepository;
use crate::error::{AppError, Result};
use crate::models::Item;
use crate::state::AppState;

/// List every item in the catalog.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Item>>> {
    let items = ItemRepository::new(state.pool()).list().await?;
    Ok(Json(items))
}

/// Show one item.
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Item>> {
    let Path(id) = id.map_err(|_| AppError::BadRequest("Invalid item id.".to_owned()))?;

    ItemRepository::new(state.pool())
        .get(ItemId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Item not found".to_owned()))
}
