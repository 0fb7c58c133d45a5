//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded in the
//! storefront library at compile time.

use tracing::info;

use kicks_storefront::db;

/// Apply storefront migrations to the configured database.
///
/// The database file is created if it does not exist.
///
/// # Errors
///
/// Returns an error if the URL is missing, the database cannot be opened, or
/// a migration fails.
pub async fn storefront() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running storefront migrations...");
    db::run_migrations(&pool).await?;

    info!("Storefront migrations complete");
    Ok(())
}
