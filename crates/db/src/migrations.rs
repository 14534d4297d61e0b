//! Versioned schema migrations with a ledger table.
//!
//! Each migration runs its `up` script and records itself in
//! `schema_migrations` inside one transaction. The current version is the
//! highest recorded version; anything above it is applied in ascending order
//! and the first failure aborts the run.

use chrono::Utc;

use crate::models::migration::AppliedMigration;
use crate::DbPool;

/// A single schema change.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to prepare migration ledger: {0}")]
    Ledger(#[source] sqlx::Error),

    #[error("failed to apply migration {version} ({name}): {source}")]
    Apply {
        version: i64,
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to roll back migration {version} ({name}): {source}")]
    Rollback {
        version: i64,
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("cannot roll back to version {target}: current version is {current}")]
    InvalidTarget { target: i64, current: i64 },
}

const LEDGER_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at DATETIME NOT NULL
)";

/// All migrations, in ascending version order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_projects_table",
        up: "CREATE TABLE projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                color TEXT NOT NULL,
                icon TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            );",
        down: "DROP TABLE IF EXISTS projects;",
    },
    Migration {
        version: 2,
        name: "create_tasks_table",
        up: "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                parent_id INTEGER REFERENCES tasks(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'in_progress', 'completed', 'cancelled')),
                priority INTEGER NOT NULL DEFAULT 0,
                due_date DATETIME,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            );",
        down: "DROP TABLE IF EXISTS tasks;",
    },
    Migration {
        version: 3,
        name: "create_time_entries_table",
        up: "CREATE TABLE time_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                start_time DATETIME NOT NULL,
                end_time DATETIME,
                duration INTEGER,
                description TEXT,
                created_at DATETIME NOT NULL
            );",
        down: "DROP TABLE IF EXISTS time_entries;",
    },
    Migration {
        version: 4,
        name: "create_performance_indexes",
        up: "CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks(project_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_parent_id ON tasks(parent_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
            CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
            CREATE INDEX IF NOT EXISTS idx_projects_created_at ON projects(created_at);
            CREATE INDEX IF NOT EXISTS idx_time_entries_task_id ON time_entries(task_id);
            CREATE INDEX IF NOT EXISTS idx_time_entries_start_time ON time_entries(start_time);",
        down: "DROP INDEX IF EXISTS idx_time_entries_start_time;
            DROP INDEX IF EXISTS idx_time_entries_task_id;
            DROP INDEX IF EXISTS idx_projects_created_at;
            DROP INDEX IF EXISTS idx_tasks_created_at;
            DROP INDEX IF EXISTS idx_tasks_status;
            DROP INDEX IF EXISTS idx_tasks_parent_id;
            DROP INDEX IF EXISTS idx_tasks_project_id;",
    },
    Migration {
        version: 5,
        name: "add_task_completed_at",
        up: "ALTER TABLE tasks ADD COLUMN completed_at DATETIME;",
        down: "ALTER TABLE tasks DROP COLUMN completed_at;",
    },
    Migration {
        version: 6,
        name: "add_single_active_entry_index",
        up: "CREATE UNIQUE INDEX IF NOT EXISTS idx_time_entries_one_active
                ON time_entries(task_id) WHERE end_time IS NULL;",
        down: "DROP INDEX IF EXISTS idx_time_entries_one_active;",
    },
];

/// Version of the newest migration known to this build.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

async fn ensure_ledger(pool: &DbPool) -> Result<(), MigrationError> {
    sqlx::raw_sql(LEDGER_TABLE)
        .execute(pool)
        .await
        .map_err(MigrationError::Ledger)?;
    Ok(())
}

/// Highest applied version, or 0 for an empty ledger.
pub async fn current_version(pool: &DbPool) -> Result<i64, MigrationError> {
    ensure_ledger(pool).await?;
    let (version,): (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
            .fetch_one(pool)
            .await
            .map_err(MigrationError::Ledger)?;
    Ok(version)
}

/// Apply every migration newer than the current version.
///
/// Returns the number of migrations applied.
pub async fn run_migrations(pool: &DbPool) -> Result<usize, MigrationError> {
    let current = current_version(pool).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        tracing::debug!(version = current, "Schema is up to date");
        return Ok(0);
    }

    for migration in &pending {
        apply(pool, migration)
            .await
            .map_err(|source| MigrationError::Apply {
                version: migration.version,
                name: migration.name,
                source,
            })?;
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applied migration"
        );
    }

    Ok(pending.len())
}

async fn apply(pool: &DbPool, migration: &Migration) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::raw_sql(migration.up).execute(&mut *tx).await?;

    sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES ($1, $2, $3)")
        .bind(migration.version)
        .bind(migration.name)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// The ledger, oldest first.
pub async fn applied_migrations(pool: &DbPool) -> Result<Vec<AppliedMigration>, MigrationError> {
    ensure_ledger(pool).await?;
    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, name, applied_at FROM schema_migrations ORDER BY version ASC",
    )
    .fetch_all(pool)
    .await
    .map_err(MigrationError::Ledger)
}

/// Undo every applied migration above `target`, newest first.
///
/// `target` must be below the current version. Each step runs `down` and
/// removes the ledger row in one transaction. Returns the number of
/// migrations rolled back.
pub async fn rollback_to(pool: &DbPool, target: i64) -> Result<usize, MigrationError> {
    let current = current_version(pool).await?;
    if target < 0 || target >= current {
        return Err(MigrationError::InvalidTarget { target, current });
    }

    let mut rolled_back = 0;
    for migration in MIGRATIONS
        .iter()
        .rev()
        .filter(|m| m.version > target && m.version <= current)
    {
        rollback(pool, migration)
            .await
            .map_err(|source| MigrationError::Rollback {
                version: migration.version,
                name: migration.name,
                source,
            })?;
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Rolled back migration"
        );
        rolled_back += 1;
    }

    Ok(rolled_back)
}

async fn rollback(pool: &DbPool, migration: &Migration) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::raw_sql(migration.down).execute(&mut *tx).await?;

    sqlx::query("DELETE FROM schema_migrations WHERE version = $1")
        .bind(migration.version)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}
