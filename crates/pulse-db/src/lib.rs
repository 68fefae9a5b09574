//! # pulse-db
//!
//! PostgreSQL database layer for the Pulse engagement tracker.
//!
//! This crate provides:
//! - Connection pool management
//! - The append-only engagement event store
//! - Read-only lookups against the casino/bonus catalog
//!
//! ## Example
//!
//! ```rust,ignore
//! use pulse_db::{Database, EngagementStore, NewEngagementEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/pulse").await?;
//!
//!     let event = db
//!         .events
//!         .insert(&NewEngagementEvent::search("welcome bonus"))
//!         .await?;
//!
//!     println!("Recorded event: {}", event.id);
//!     Ok(())
//! }
//! ```
pub mod content;
pub mod engagement;
pub mod pool;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use pulse_core::*;

// Re-export repository implementations
pub use content::PgContentDirectory;
pub use engagement::PgEngagementStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Append-only engagement event store.
    pub events: PgEngagementStore,
    /// Casino/bonus catalog lookups for claim notifications.
    pub content: PgContentDirectory,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            events: PgEngagementStore::new(pool.clone()),
            content: PgContentDirectory::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Connect to test database (for integration tests).
    #[cfg(test)]
    pub async fn connect_test() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| crate::test_fixtures::DEFAULT_TEST_DATABASE_URL.to_string());
        Self::connect(&database_url).await
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Verify the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL with migrated database
    async fn test_connect_and_ping() {
        let db = Database::connect_test().await.expect("Failed to connect");
        db.ping().await.expect("Ping failed");
    }
}
