use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

pub mod error;
pub mod migrations;
pub mod models;
pub mod repositories;

pub use error::{StoreError, StoreResult};
pub use migrations::{run_migrations, MigrationError};

pub type DbPool = sqlx::SqlitePool;

/// Open (creating if needed) the SQLite database at `path`.
///
/// WAL journaling, `busy_timeout` of 5 s and foreign-key enforcement are
/// always on; cascades depend on the latter.
pub async fn create_pool(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Check that the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
