//! Checkout error types.

use thiserror::Error;

use kicks_core::ItemId;

use crate::db::RepositoryError;

/// Errors that can occur while validating or committing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The order has no lines.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// A line names an item that does not exist.
    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// The order asks for more units of an item than are available.
    #[error("item {0} not in stock")]
    InsufficientStock(ItemId),

    /// Stock was taken by a concurrent checkout after validation passed.
    /// Nothing was written; the client may retry.
    #[error("stock for item {0} changed during checkout")]
    StockConflict(ItemId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CheckoutError {
    /// The item that caused the failure, if the failure is about one item.
    #[must_use]
    pub const fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::ItemNotFound(id) | Self::InsufficientStock(id) | Self::StockConflict(id) => {
                Some(*id)
            }
            Self::EmptyOrder | Self::Repository(_) => None,
        }
    }
}
