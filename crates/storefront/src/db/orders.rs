//! Order repository: append-only order lines.

use sqlx::{SqliteConnection, SqlitePool};

use kicks_core::{ConfirmationCode, ItemId, OrderLineId, Price, Quantity, UserId};

use super::{RepositoryError, now_millis};
use crate::models::OrderHistoryLine;

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: OrderLineId,
    quantity: i64,
    confirmation: ConfirmationCode,
    name: String,
    price: f64,
    image: String,
}

/// Repository for reading order lines.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// A user's order lines joined with item display data, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn history_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderHistoryLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r"
            SELECT orders.id, orders.quantity, orders.confirmation,
                   items.name, items.price, items.image
            FROM orders
            JOIN items ON items.id = orders.item_id
            WHERE orders.user_id = ?
            ORDER BY orders.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let price = Price::from_f64(r.price).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
                })?;
                Ok(OrderHistoryLine {
                    id: r.id,
                    quantity: r.quantity,
                    confirmation: r.confirmation,
                    name: r.name,
                    price,
                    image: r.image,
                })
            })
            .collect()
    }

    /// Total number of order lines, across all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Append one order line on `conn`, normally a checkout transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails, including an
/// unknown user or item rejected by a foreign key.
pub async fn insert_line(
    conn: &mut SqliteConnection,
    user_id: UserId,
    item_id: ItemId,
    quantity: Quantity,
    code: &ConfirmationCode,
) -> Result<OrderLineId, RepositoryError> {
    let (id,): (OrderLineId,) = sqlx::query_as(
        r"
        INSERT INTO orders (user_id, item_id, quantity, confirmation, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        ",
    )
    .bind(user_id)
    .bind(item_id)
    .bind(quantity.get())
    .bind(code)
    .bind(now_millis())
    .fetch_one(conn)
    .await?;

    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::items::tests::sneaker;
    use crate::db::{ItemRepository, UserRepository};
    use kicks_core::Username;

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let pool = crate::db::test_support::migrated_pool().await;
        let user = UserRepository::new(&pool)
            .create(&Username::parse("eve").unwrap(), "h", None)
            .await
            .unwrap();
        let item = ItemRepository::new(&pool)
            .create(&sneaker("Blazer Mid", 9))
            .await
            .unwrap();
        let code = ConfirmationCode::from_bytes(&[0x42; ConfirmationCode::BYTES]);

        let mut conn = pool.acquire().await.unwrap();
        let first = insert_line(&mut conn, user.id, item.id, Quantity::new(2).unwrap(), &code)
            .await
            .unwrap();
        let second = insert_line(&mut conn, user.id, item.id, Quantity::new(1).unwrap(), &code)
            .await
            .unwrap();
        drop(conn);
        assert!(first < second);

        let repo = OrderRepository::new(&pool);
        let history = repo.history_for_user(user.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, first);
        assert_eq!(history[0].quantity, 2);
        assert_eq!(history[0].confirmation, code);
        assert_eq!(history[0].name, "Blazer Mid");
        assert_eq!(history[0].price, Price::from_dollars(120));
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_item_rejected_by_foreign_key() {
        let pool = crate::db::test_support::migrated_pool().await;
        let user = UserRepository::new(&pool)
            .create(&Username::parse("fay").unwrap(), "h", None)
            .await
            .unwrap();
        let code = ConfirmationCode::from_bytes(&[1; ConfirmationCode::BYTES]);

        let mut conn = pool.acquire().await.unwrap();
        let result =
            insert_line(&mut conn, user.id, ItemId::new(99), Quantity::new(1).unwrap(), &code).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_stored_code_fails_to_decode() {
        let pool = crate::db::test_support::migrated_pool().await;
        let user = UserRepository::new(&pool)
            .create(&Username::parse("gil").unwrap(), "h", None)
            .await
            .unwrap();
        let item = ItemRepository::new(&pool)
            .create(&sneaker("Cortez", 3))
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO orders (user_id, item_id, quantity, confirmation, created_at) VALUES (?, ?, 1, 'not-a-code', 0)",
        )
        .bind(user.id)
        .bind(item.id)
        .execute(&pool)
        .await
        .unwrap();

        let err = OrderRepository::new(&pool)
            .history_for_user(user.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::ColumnDecode { .. })));
    }
}
