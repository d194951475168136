//! Store errors and their mapping onto handler errors.

use remple::ResourceError;

/// Errors returned by a [`StoreClient`](super::StoreClient).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for ResourceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => {
                ResourceError::NotFound(format!("There is no resource with id {id}."))
            }
            other => ResourceError::other(other),
        }
    }
}
