use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A batch operation whose id set resolved to zero existing rows.
    /// Reported as not-found naming the whole requested set.
    #[error("No {entity} found for ids {ids:?}")]
    NoneFound { entity: &'static str, ids: Vec<DbId> },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A store anomaly (unavailability, constraint violation). Propagated
    /// unchanged to the caller; the core never retries.
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
