use serde::Serialize;
use sqlx::FromRow;
use focus_core::types::Timestamp;

/// A row from the `schema_migrations` ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: Timestamp,
}
