//! # Record Store
//!
//! An in-memory store of JSON records run as an actor.
//!
//! The [`RecordStore`] task owns the records and processes requests one at a
//! time; a cloneable [`StoreClient`] sends it messages over an mpsc channel and
//! awaits the reply on a oneshot channel. Because only the task touches the
//! map, no lock is needed and every request observes the effects of the ones
//! before it.
//!
//! ```rust
//! use serde_json::json;
//! use storage_service::store::{self, RecordStore};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (store, client) = RecordStore::new("pipeline", 16, store::counter_ids("pipeline"));
//! let handle = tokio::spawn(store.run());
//!
//! let record = client
//!     .insert(json!({ "description": "Main" }).as_object().cloned().unwrap())
//!     .await
//!     .unwrap();
//! assert_eq!(record["id"], "pipeline_1");
//!
//! drop(client);
//! handle.await.unwrap();
//! # }
//! ```

pub mod actor;
pub mod client;
pub mod error;
pub mod message;

pub use actor::RecordStore;
pub use client::StoreClient;
pub use error::StoreError;

use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A stored entity: a JSON object that always carries its `id`.
pub type Record = Map<String, Value>;

/// Key under which the store writes each record's identifier.
pub const ID_FIELD: &str = "id";

/// Produces identifiers for newly inserted records.
pub type IdGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// Random UUID v4 identifiers.
pub fn uuid_ids() -> IdGenerator {
    Box::new(|| uuid::Uuid::new_v4().to_string())
}

/// Sequential identifiers: `{prefix}_1`, `{prefix}_2`, ...
pub fn counter_ids(prefix: &str) -> IdGenerator {
    let prefix = prefix.to_string();
    let counter = Arc::new(AtomicU64::new(1));
    Box::new(move || {
        let id = counter.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", prefix, id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_ids_are_sequential() {
        let next = counter_ids("space");
        assert_eq!(next(), "space_1");
        assert_eq!(next(), "space_2");
    }

    #[test]
    fn test_uuid_ids_are_distinct() {
        let next = uuid_ids();
        let (a, b) = (next(), next());
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}
