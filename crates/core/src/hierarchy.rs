//! Parent/child rules for the task tree.
//!
//! Tasks form a forest inside a single project. Every check takes the data it
//! needs as plain values so the repository can load it inside its transaction.

use crate::error::CoreError;
use crate::types::DbId;

/// The parent a task is being attached to, as loaded from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub id: DbId,
    pub project_id: DbId,
}

/// Validate attaching `task_id` (None while creating) to `parent` within
/// `project_id`.
///
/// `parent_chain` holds the proposed parent followed by all of its ancestors.
/// If the task itself shows up there, the new edge would close a cycle.
pub fn validate_parent(
    task_id: Option<DbId>,
    project_id: DbId,
    parent: ParentRef,
    parent_chain: &[DbId],
) -> Result<(), CoreError> {
    if task_id == Some(parent.id) {
        return Err(CoreError::Referential(
            "task cannot be its own parent".to_string(),
        ));
    }

    if parent.project_id != project_id {
        return Err(CoreError::Referential(
            "parent task belongs to different project".to_string(),
        ));
    }

    if let Some(id) = task_id {
        if parent_chain.contains(&id) {
            return Err(CoreError::Referential(format!(
                "task {} is a descendant of task {id}; moving would create a cycle",
                parent.id
            )));
        }
    }

    Ok(())
}

/// A task that still has subtasks cannot change project, otherwise the
/// children would point at a parent outside their own project.
pub fn ensure_movable(
    task_id: DbId,
    current_project: DbId,
    target_project: DbId,
    child_count: i64,
) -> Result<(), CoreError> {
    if current_project != target_project && child_count > 0 {
        return Err(CoreError::Referential(format!(
            "task {task_id} has subtasks and cannot move to another project"
        )));
    }
    Ok(())
}
