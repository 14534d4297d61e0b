//! Repository for the `tasks` table.
//!
//! Listings use the canonical order: priority descending, then creation time
//! ascending, with the id as a final tiebreak.

use chrono::Utc;
use focus_core::error::CoreError;
use focus_core::hierarchy::{ensure_movable, validate_parent, ParentRef};
use focus_core::task_status::TaskStatus;
use focus_core::types::{DbId, Timestamp};
use sqlx::SqliteConnection;

use crate::error::StoreResult;
use crate::models::statistics::TaskStatistics;
use crate::models::task::{CreateTask, Task, TaskOrder, UpdateTask};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, parent_id, title, description, status, priority, \
                       due_date, completed_at, created_at, updated_at";

const ORDER_BY: &str = "ORDER BY priority DESC, created_at ASC, id ASC";

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound { entity: "Task", id }
}

/// `completed_at` after moving from `previous` to `next`.
fn completed_at_for(
    previous: TaskStatus,
    previous_completed_at: Option<Timestamp>,
    next: TaskStatus,
    now: Timestamp,
) -> Option<Timestamp> {
    match (previous, next) {
        (TaskStatus::Completed, TaskStatus::Completed) => previous_completed_at.or(Some(now)),
        (_, TaskStatus::Completed) => Some(now),
        _ => None,
    }
}

/// Provides CRUD, hierarchy and ordering operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task after checking its project and parent.
    pub async fn create(pool: &DbPool, input: &CreateTask) -> StoreResult<Task> {
        let mut tx = pool.begin().await?;

        if !super::row_exists(&mut *tx, "projects", input.project_id).await? {
            return Err(CoreError::Referential(format!(
                "project {} does not exist",
                input.project_id
            ))
            .into());
        }

        if let Some(parent_id) = input.parent_id {
            let parent = Self::parent_ref(&mut *tx, parent_id).await?;
            validate_parent(None, input.project_id, parent, &[])?;
        }

        let now = Utc::now();
        let status = input.status.unwrap_or_default();
        let completed_at = (status == TaskStatus::Completed).then_some(now);

        let query = format!(
            "INSERT INTO tasks
                (project_id, parent_id, title, description, status, priority, due_date,
                 completed_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(input.parent_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(status.as_str())
            .bind(input.priority)
            .bind(input.due_date)
            .bind(completed_at)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(task_id = task.id, project_id = task.project_id, "Task created");
        Ok(task)
    }

    /// Find a task by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> StoreResult<Option<Task>> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(task)
    }

    /// All tasks of a project, subtasks included.
    pub async fn list_by_project(pool: &DbPool, project_id: DbId) -> StoreResult<Vec<Task>> {
        let mut conn = pool.acquire().await?;
        if !super::row_exists(&mut *conn, "projects", project_id).await? {
            return Err(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            }
            .into());
        }

        let query = format!("SELECT {COLUMNS} FROM tasks WHERE project_id = $1 {ORDER_BY}");
        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(tasks)
    }

    /// Direct children of a task.
    pub async fn list_subtasks(pool: &DbPool, parent_id: DbId) -> StoreResult<Vec<Task>> {
        let mut conn = pool.acquire().await?;
        if !super::row_exists(&mut *conn, "tasks", parent_id).await? {
            return Err(not_found(parent_id).into());
        }

        let query = format!("SELECT {COLUMNS} FROM tasks WHERE parent_id = $1 {ORDER_BY}");
        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(tasks)
    }

    /// Patch a task.
    ///
    /// The merged row is validated as a whole: the target project must exist,
    /// the parent must live in that project and must not be the task itself or
    /// one of its descendants, and a task with subtasks cannot change project.
    pub async fn update(pool: &DbPool, id: DbId, input: &UpdateTask) -> StoreResult<Task> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        let current = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found(id))?;

        let project_id = input.project_id.unwrap_or(current.project_id);
        if project_id != current.project_id {
            if !super::row_exists(&mut *tx, "projects", project_id).await? {
                return Err(CoreError::Referential(format!(
                    "project {project_id} does not exist"
                ))
                .into());
            }
            let children = Self::child_count(&mut *tx, id).await?;
            ensure_movable(id, current.project_id, project_id, children)?;
        }

        let parent_id = match input.parent_id {
            Some(explicit) => explicit,
            None => current.parent_id,
        };
        if let Some(parent_id) = parent_id {
            let parent = Self::parent_ref(&mut *tx, parent_id).await?;
            let chain = Self::ancestor_chain(&mut *tx, parent_id).await?;
            validate_parent(Some(id), project_id, parent, &chain)?;
        }

        let now = Utc::now();
        let status = input.status.unwrap_or(current.status);
        let completed_at = completed_at_for(current.status, current.completed_at, status, now);
        let due_date = match input.due_date {
            Some(explicit) => explicit,
            None => current.due_date,
        };

        let query = format!(
            "UPDATE tasks SET
                project_id = $2,
                parent_id = $3,
                title = $4,
                description = $5,
                status = $6,
                priority = $7,
                due_date = $8,
                completed_at = $9,
                updated_at = $10
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(project_id)
            .bind(parent_id)
            .bind(input.title.as_ref().unwrap_or(&current.title))
            .bind(input.description.as_ref().or(current.description.as_ref()))
            .bind(status.as_str())
            .bind(input.priority.unwrap_or(current.priority))
            .bind(due_date)
            .bind(completed_at)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(task_id = id, "Task updated");
        Ok(task)
    }

    /// Set a task's status. `completed_at` follows the status.
    pub async fn update_status(pool: &DbPool, id: DbId, status: TaskStatus) -> StoreResult<Task> {
        let query = format!(
            "UPDATE tasks SET
                status = $2,
                completed_at = CASE
                    WHEN $2 = 'completed' THEN COALESCE(completed_at, $3)
                    ELSE NULL
                END,
                updated_at = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(Utc::now())
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(task_id = id, status = %status, "Task status changed");
        Ok(task)
    }

    /// Set a task's priority.
    pub async fn update_priority(pool: &DbPool, id: DbId, priority: i64) -> StoreResult<Task> {
        let query = format!(
            "UPDATE tasks SET priority = $2, updated_at = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(priority)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(id))?;
        Ok(task)
    }

    /// Apply a batch of priorities atomically.
    ///
    /// If any task is missing, nothing is changed.
    pub async fn reorder(pool: &DbPool, orders: &[TaskOrder]) -> StoreResult<()> {
        if orders.is_empty() {
            return Err(CoreError::Validation("no tasks to reorder".to_string()).into());
        }

        let now = Utc::now();
        let mut tx = pool.begin().await?;

        for order in orders {
            let result = sqlx::query("UPDATE tasks SET priority = $2, updated_at = $3 WHERE id = $1")
                .bind(order.task_id)
                .bind(order.priority)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(not_found(order.task_id).into());
            }
        }

        tx.commit().await?;
        tracing::info!(count = orders.len(), "Tasks reordered");
        Ok(())
    }

    /// Delete a task with its subtasks and time entries.
    pub async fn delete(pool: &DbPool, id: DbId) -> StoreResult<()> {
        let mut tx = pool.begin().await?;

        if !super::row_exists(&mut *tx, "tasks", id).await? {
            return Err(not_found(id).into());
        }

        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(task_id = id, "Task deleted");
        Ok(())
    }

    /// Status, hierarchy and due-date breakdown for a project's tasks.
    pub async fn statistics(pool: &DbPool, project_id: DbId) -> StoreResult<TaskStatistics> {
        let mut conn = pool.acquire().await?;
        if !super::row_exists(&mut *conn, "projects", project_id).await? {
            return Err(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            }
            .into());
        }

        let stats = sqlx::query_as::<_, TaskStatistics>(
            "SELECT
                $1 AS project_id,
                COUNT(*) AS total_tasks,
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending_tasks,
                COALESCE(SUM(CASE WHEN status = 'in_progress' THEN 1 ELSE 0 END), 0)
                    AS in_progress_tasks,
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0)
                    AS completed_tasks,
                COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0)
                    AS cancelled_tasks,
                COALESCE(SUM(CASE WHEN parent_id IS NULL THEN 1 ELSE 0 END), 0) AS root_tasks,
                COALESCE(SUM(CASE WHEN parent_id IS NOT NULL THEN 1 ELSE 0 END), 0) AS subtasks,
                COALESCE(SUM(CASE
                    WHEN due_date IS NOT NULL AND due_date < $2
                         AND status NOT IN ('completed', 'cancelled') THEN 1
                    ELSE 0
                END), 0) AS overdue_tasks,
                CAST(COALESCE(AVG(priority), 0) AS REAL) AS average_priority,
                CASE WHEN COUNT(*) = 0 THEN 0.0
                     ELSE CAST(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END) AS REAL)
                          / COUNT(*)
                END AS completion_rate
             FROM tasks
             WHERE project_id = $1",
        )
        .bind(project_id)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(stats)
    }

    // -- helpers ------------------------------------------------------------

    async fn parent_ref(conn: &mut SqliteConnection, parent_id: DbId) -> StoreResult<ParentRef> {
        let row: Option<(DbId, DbId)> =
            sqlx::query_as("SELECT id, project_id FROM tasks WHERE id = $1")
                .bind(parent_id)
                .fetch_optional(conn)
                .await?;
        let (id, project_id) = row.ok_or_else(|| {
            CoreError::Referential(format!("parent task {parent_id} does not exist"))
        })?;
        Ok(ParentRef { id, project_id })
    }

    /// `task_id` followed by all of its ancestors.
    async fn ancestor_chain(conn: &mut SqliteConnection, task_id: DbId) -> StoreResult<Vec<DbId>> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "WITH RECURSIVE chain(id, parent_id) AS (
                SELECT id, parent_id FROM tasks WHERE id = $1
                UNION
                SELECT t.id, t.parent_id FROM tasks t JOIN chain c ON t.id = c.parent_id
             )
             SELECT id FROM chain",
        )
        .bind(task_id)
        .fetch_all(conn)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn child_count(conn: &mut SqliteConnection, task_id: DbId) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE parent_id = $1")
            .bind(task_id)
            .fetch_one(conn)
            .await?;
        Ok(count)
    }
}
