//! Messages understood by the [`RecordStore`](super::RecordStore).

use super::{Record, StoreError};
use tokio::sync::oneshot;

/// A request sent to the store task.
///
/// Each variant carries the sender half of a oneshot channel the store uses to
/// answer.
#[derive(Debug)]
pub enum StoreRequest {
    /// Assigns an id and stores the record. Replies with the stored record.
    Insert {
        record: Record,
        respond_to: oneshot::Sender<Result<Record, StoreError>>,
    },
    Get {
        id: String,
        respond_to: oneshot::Sender<Option<Record>>,
    },
    /// Every record, in insertion order.
    List {
        respond_to: oneshot::Sender<Vec<Record>>,
    },
    /// Overwrites the given fields of an existing record.
    Merge {
        id: String,
        changes: Record,
        respond_to: oneshot::Sender<Result<Record, StoreError>>,
    },
    Remove {
        id: String,
        respond_to: oneshot::Sender<Result<Record, StoreError>>,
    },
}
