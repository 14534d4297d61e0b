use crate::types::DbId;

/// Domain error taxonomy.
///
/// Each variant maps to exactly one HTTP status in the API layer, so stores
/// must pick the variant that describes the failure rather than folding
/// everything into `Internal`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The addressed entity does not exist.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A foreign-key style reference is broken: missing parent, a parent in
    /// another project, self-parenting or an ancestry cycle.
    #[error("Referential violation: {0}")]
    Referential(String),

    /// A field constraint failed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A temporal, overlap or trackability rule was violated.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// The request conflicts with current state (e.g. an entry is already running).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
