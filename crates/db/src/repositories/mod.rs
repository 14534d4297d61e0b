//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async operations that
//! accept `&DbPool` as the first argument. Operations that enforce business
//! rules load what they need and write inside a single transaction.

pub mod project_repo;
pub mod task_repo;
pub mod time_entry_repo;

pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;
pub use time_entry_repo::TimeEntryRepo;

use focus_core::types::DbId;
use sqlx::SqliteConnection;

async fn row_exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: DbId,
) -> Result<bool, sqlx::Error> {
    let query = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)");
    let (exists,): (bool,) = sqlx::query_as(&query).bind(id).fetch_one(conn).await?;
    Ok(exists)
}
