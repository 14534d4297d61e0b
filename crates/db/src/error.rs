use focus_core::error::CoreError;

/// Errors returned by the repository layer.
///
/// Business-rule failures surface as [`CoreError`]; anything the driver
/// reports stays a raw [`sqlx::Error`] so the HTTP layer can classify it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

