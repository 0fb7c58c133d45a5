//! Catalog item types.

use serde::Serialize;

use kicks_core::{Gender, ItemId, Price};

/// A sneaker in the catalog together with its remaining stock.
///
/// Serialized as-is for the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Image path relative to the static root.
    pub image: String,
    pub price: Price,
    /// Units left. Never negative.
    pub availability: i64,
    pub gender: Gender,
}

/// Input for adding an item to the catalog.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub image: String,
    pub price: Price,
    pub availability: i64,
    pub gender: Gender,
}
