//! Repository for the `projects` table.

use chrono::Utc;
use focus_core::error::CoreError;
use focus_core::types::DbId;

use crate::error::StoreResult;
use crate::models::project::{CreateProject, Project, ProjectWithTaskCount, UpdateProject};
use crate::models::statistics::ProjectStatistics;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, color, icon, created_at, updated_at";

/// Same columns qualified with the `p` alias, for joins.
const P_COLUMNS: &str =
    "p.id, p.name, p.description, p.color, p.icon, p.created_at, p.updated_at";

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Project",
        id,
    }
}

/// Provides CRUD operations and aggregates for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &DbPool, input: &CreateProject) -> StoreResult<Project> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO projects (name, description, color, icon, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.color)
            .bind(&input.icon)
            .bind(now)
            .fetch_one(pool)
            .await?;

        tracing::info!(project_id = project.id, name = %project.name, "Project created");
        Ok(project)
    }

    /// Find a project by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> StoreResult<Option<Project>> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(project)
    }

    /// List all projects, newest first.
    pub async fn list(pool: &DbPool) -> StoreResult<Vec<Project>> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        let projects = sqlx::query_as::<_, Project>(&query).fetch_all(pool).await?;
        Ok(projects)
    }

    /// List all projects with their task counts, newest first.
    pub async fn list_with_task_counts(pool: &DbPool) -> StoreResult<Vec<ProjectWithTaskCount>> {
        let query = format!(
            "SELECT {P_COLUMNS}, COUNT(t.id) AS task_count
             FROM projects p
             LEFT JOIN tasks t ON t.project_id = p.id
             GROUP BY p.id
             ORDER BY p.created_at DESC, p.id DESC"
        );
        let rows = sqlx::query_as::<_, ProjectWithTaskCount>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    pub async fn update(pool: &DbPool, id: DbId, input: &UpdateProject) -> StoreResult<Project> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                color = COALESCE($4, color),
                icon = COALESCE($5, icon),
                updated_at = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.color)
            .bind(&input.icon)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(id))?;
        Ok(project)
    }

    /// Delete a project. Its tasks and their time entries go with it.
    pub async fn delete(pool: &DbPool, id: DbId) -> StoreResult<()> {
        let mut tx = pool.begin().await?;

        if !super::row_exists(&mut *tx, "projects", id).await? {
            return Err(not_found(id).into());
        }

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(project_id = id, "Project deleted");
        Ok(())
    }

    /// Task counts by status plus tracked time totals.
    pub async fn statistics(pool: &DbPool, id: DbId) -> StoreResult<ProjectStatistics> {
        let stats = sqlx::query_as::<_, ProjectStatistics>(
            "SELECT
                p.id AS project_id,
                (SELECT COUNT(*) FROM tasks WHERE project_id = p.id) AS total_tasks,
                (SELECT COUNT(*) FROM tasks WHERE project_id = p.id AND status = 'pending')
                    AS pending_tasks,
                (SELECT COUNT(*) FROM tasks WHERE project_id = p.id AND status = 'in_progress')
                    AS in_progress_tasks,
                (SELECT COUNT(*) FROM tasks WHERE project_id = p.id AND status = 'completed')
                    AS completed_tasks,
                (SELECT COUNT(*) FROM tasks WHERE project_id = p.id AND status = 'cancelled')
                    AS cancelled_tasks,
                (SELECT COUNT(*) FROM time_entries te
                    JOIN tasks t ON t.id = te.task_id
                    WHERE t.project_id = p.id) AS total_time_entries,
                (SELECT COALESCE(SUM(te.duration), 0) FROM time_entries te
                    JOIN tasks t ON t.id = te.task_id
                    WHERE t.project_id = p.id) AS total_tracked_seconds
             FROM projects p
             WHERE p.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))?;
        Ok(stats)
    }
}
