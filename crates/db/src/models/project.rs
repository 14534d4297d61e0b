//! Project entity model and DTOs.

use focus_core::sanitize::{sanitize_description, sanitize_optional, sanitize_project_name, Sanitize};
use focus_core::types::{DbId, Timestamp};
use focus_core::validation::{validate_hex_color, validate_icon};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A project together with the number of tasks it holds.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectWithTaskCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,
    pub task_count: i64,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 100, message = "Must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,
    #[validate(custom(function = "validate_icon"))]
    pub icon: String,
}

impl Sanitize for CreateProject {
    fn sanitize(&mut self) {
        self.name = sanitize_project_name(&self.name);
        sanitize_optional(&mut self.description, sanitize_description);
        self.color = self.color.trim().to_string();
        self.icon = self.icon.trim().to_string();
    }
}

/// DTO for updating an existing project. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 100, message = "Must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    #[validate(custom(function = "validate_icon"))]
    pub icon: Option<String>,
}

impl Sanitize for UpdateProject {
    fn sanitize(&mut self) {
        sanitize_optional(&mut self.name, sanitize_project_name);
        sanitize_optional(&mut self.description, sanitize_description);
        sanitize_optional(&mut self.color, |s| s.trim().to_string());
        sanitize_optional(&mut self.icon, |s| s.trim().to_string());
    }
}
