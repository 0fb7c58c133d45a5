//! Item repository: the catalog and the inventory ledger.
//!
//! Reads go through [`ItemRepository`]. Stock is decremented only inside a
//! checkout transaction, via the free functions taking a connection.

use sqlx::{SqliteConnection, SqlitePool};

use kicks_core::{Gender, ItemId, Price, Quantity};

use super::RepositoryError;
use crate::models::{Item, NewItem};

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: ItemId,
    name: String,
    image: String,
    price: f64,
    availability: i64,
    gender: String,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let price = Price::from_f64(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for item {}: {e}", row.id))
        })?;
        let gender = row.gender.parse::<Gender>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid gender for item {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            image: row.image,
            price,
            availability: row.availability,
            gender,
        })
    }
}

/// Repository for catalog reads and maintenance.
pub struct ItemRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List the whole catalog, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored item is invalid.
    pub async fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, image, price, availability, gender FROM items ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Item::try_from)
        .collect()
    }

    /// Get one item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored item is invalid.
    pub async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, image, price, availability, gender FROM items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Item::try_from)
        .transpose()
    }

    /// Add an item to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, including a
    /// negative availability rejected by the table constraint.
    pub async fn create(&self, item: &NewItem) -> Result<Item, RepositoryError> {
        sqlx::query_as::<_, ItemRow>(
            r"
            INSERT INTO items (name, image, price, availability, gender)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, image, price, availability, gender
            ",
        )
        .bind(&item.name)
        .bind(&item.image)
        .bind(item.price.to_f64())
        .bind(item.availability)
        .bind(item.gender.as_str())
        .fetch_one(self.pool)
        .await?
        .try_into()
    }

    /// Delete every item that has never been ordered, returning how many went.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_all_unordered(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM items
            WHERE NOT EXISTS (SELECT 1 FROM orders WHERE orders.item_id = items.id)
            ",
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Take `quantity` units of an item if at least that many are available.
///
/// The check and the write are one statement, so two checkouts racing for
/// the last unit cannot both succeed. Returns `false` when no row matched:
/// either the item is gone or its stock is too low.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn take_stock(
    conn: &mut SqliteConnection,
    id: ItemId,
    quantity: Quantity,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE items
        SET availability = availability - ?
        WHERE id = ? AND availability >= ?
        ",
    )
    .bind(quantity.get())
    .bind(id)
    .bind(quantity.get())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Whether an item exists, as seen by `conn`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn exists(conn: &mut SqliteConnection, id: ItemId) -> Result<bool, RepositoryError> {
    let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM items WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(found.is_some())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::db::test_support::migrated_pool;

    pub(crate) fn sneaker(name: &str, availability: i64) -> NewItem {
        NewItem {
            name: name.to_owned(),
            image: format!("images/{}.jpg", name.to_lowercase().replace(' ', "-")),
            price: Price::from_dollars(120),
            availability,
            gender: Gender::Women,
        }
    }

    #[tokio::test]
    async fn test_create_get_and_list() {
        let pool = migrated_pool().await;
        let repo = ItemRepository::new(&pool);

        let a = repo.create(&sneaker("Air Max 90", 5)).await.unwrap();
        let b = repo.create(&sneaker("Gel Lyte", 0)).await.unwrap();

        assert_eq!(repo.get(a.id).await.unwrap(), Some(a.clone()));
        assert_eq!(repo.list().await.unwrap(), vec![a, b]);
        assert!(repo.get(ItemId::new(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_take_stock_is_conditional() {
        let pool = migrated_pool().await;
        let repo = ItemRepository::new(&pool);
        let item = repo.create(&sneaker("Court Vision", 2)).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        assert!(!take_stock(&mut conn, item.id, Quantity::new(3).unwrap()).await.unwrap());
        assert!(take_stock(&mut conn, item.id, Quantity::new(2).unwrap()).await.unwrap());
        assert!(!take_stock(&mut conn, item.id, Quantity::new(1).unwrap()).await.unwrap());
        drop(conn);

        assert_eq!(repo.get(item.id).await.unwrap().unwrap().availability, 0);
    }

    #[tokio::test]
    async fn test_take_stock_missing_item() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let id = ItemId::new(7);
        assert!(!take_stock(&mut conn, id, Quantity::new(1).unwrap()).await.unwrap());
        assert!(!exists(&mut conn, id).await.unwrap());
    }

    #[tokio::test]
    async fn test_negative_availability_rejected() {
        let pool = migrated_pool().await;
        let repo = ItemRepository::new(&pool);
        assert!(repo.create(&sneaker("Broken", -1)).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_all_unordered() {
        let pool = migrated_pool().await;
        let repo = ItemRepository::new(&pool);
        let item = repo.create(&sneaker("Old Skool", 4)).await.unwrap();

        assert_eq!(repo.delete_all_unordered().await.unwrap(), 1);
        assert!(repo.get(item.id).await.unwrap().is_none());
        assert_eq!(repo.delete_all_unordered().await.unwrap(), 0);
    }
}
