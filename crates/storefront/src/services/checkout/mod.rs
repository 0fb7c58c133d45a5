//! Checkout service: order validation, the order processor and order history.
//!
//! A checkout is validate, then commit:
//!
//! 1. [`CheckoutService::validate`] reads every line's item and rejects the
//!    order at the first line that names a missing item or asks for more than
//!    is available. It writes nothing.
//! 2. [`CheckoutService::commit`] runs one transaction. For each line it takes
//!    stock with a conditional decrement and appends an order line. If any
//!    decrement finds too little stock the whole transaction rolls back.
//!
//! Validation can pass and the commit still fail with
//! [`CheckoutError::StockConflict`] when a concurrent checkout took the stock
//! in between. Stock never goes negative and a failed checkout leaves no
//! order lines behind.

mod error;

pub use error::CheckoutError;

use std::collections::HashMap;

use sqlx::SqlitePool;

use kicks_core::{ConfirmationCode, ItemId, UserId};

use super::tokens::generate_confirmation_code;
use crate::db::{ItemRepository, OrderRepository, RepositoryError, items, orders};
use crate::models::{CurrentUser, OrderHistory, OrderLineRequest};

/// Result of a committed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// Code shared by every line of this purchase.
    pub confirmation_code: ConfirmationCode,
    /// Number of order lines written.
    pub lines: usize,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a SqlitePool,
    items: ItemRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            items: ItemRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Check an order against current stock without reserving anything.
    ///
    /// Lines are checked in order and the first failure wins. Lines naming the
    /// same item are checked against their combined quantity.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyOrder` for an order with no lines.
    /// Returns `CheckoutError::ItemNotFound` / `CheckoutError::InsufficientStock`
    /// for the first offending line.
    pub async fn validate(&self, lines: &[OrderLineRequest]) -> Result<(), CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyOrder);
        }

        let mut demand: HashMap<ItemId, i64> = HashMap::new();
        for line in lines {
            let item = self
                .items
                .get(line.item_id)
                .await?
                .ok_or(CheckoutError::ItemNotFound(line.item_id))?;

            let wanted = demand.entry(line.item_id).or_insert(0);
            *wanted += line.quantity.get();
            if item.availability < *wanted {
                return Err(CheckoutError::InsufficientStock(line.item_id));
            }
        }
        Ok(())
    }

    /// Take stock and write order lines for every line, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::StockConflict` if an item no longer has enough
    /// stock, `CheckoutError::ItemNotFound` if it was removed, and
    /// `CheckoutError::Repository` on a storage fault. In every error case the
    /// transaction is rolled back.
    pub async fn commit(
        &self,
        user: &CurrentUser,
        code: &ConfirmationCode,
        lines: &[OrderLineRequest],
    ) -> Result<(), CheckoutError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        for line in lines {
            if !items::take_stock(&mut tx, line.item_id, line.quantity).await? {
                let err = if items::exists(&mut tx, line.item_id).await? {
                    CheckoutError::StockConflict(line.item_id)
                } else {
                    CheckoutError::ItemNotFound(line.item_id)
                };
                tx.rollback().await.map_err(RepositoryError::from)?;
                return Err(err);
            }
            orders::insert_line(&mut tx, user.id, line.item_id, line.quantity, code).await?;
        }

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(())
    }

    /// Validate an order, then commit it under a fresh confirmation code.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::validate`] or [`Self::commit`].
    pub async fn checkout(
        &self,
        user: &CurrentUser,
        lines: &[OrderLineRequest],
    ) -> Result<CheckoutReceipt, CheckoutError> {
        self.validate(lines).await?;

        let code = generate_confirmation_code();
        self.commit(user, &code, lines).await?;

        tracing::info!(
            user_id = %user.id,
            confirmation = %code,
            lines = lines.len(),
            "checkout committed"
        );
        Ok(CheckoutReceipt {
            confirmation_code: code,
            lines: lines.len(),
        })
    }

    /// A user's purchases grouped by confirmation code, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the lookup fails.
    pub async fn order_history(&self, user_id: UserId) -> Result<OrderHistory, CheckoutError> {
        let lines = self.orders.history_for_user(user_id).await?;
        Ok(OrderHistory::from_lines(lines))
    }
}
