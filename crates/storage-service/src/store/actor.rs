//! # Record Store Actor
//!
//! The server half of the store. It owns the records and the receiver end of
//! the channel and handles one [`StoreRequest`] at a time, so the map needs no
//! `Mutex`.

use super::client::StoreClient;
use super::message::StoreRequest;
use super::{IdGenerator, Record, StoreError, ID_FIELD};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Owns the records of one collection.
pub struct RecordStore {
    collection: String,
    receiver: mpsc::Receiver<StoreRequest>,
    records: HashMap<String, Record>,
    /// Ids in insertion order.
    order: Vec<String>,
    next_id: IdGenerator,
}

impl RecordStore {
    /// Creates the store and its client.
    ///
    /// `buffer_size` bounds the channel; when it is full, client calls wait
    /// for space.
    pub fn new(
        collection: impl Into<String>,
        buffer_size: usize,
        next_id: IdGenerator,
    ) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let store = Self {
            collection: collection.into(),
            receiver,
            records: HashMap::new(),
            order: Vec::new(),
            next_id,
        };
        (store, StoreClient::new(sender))
    }

    /// Processes requests until every client has been dropped.
    pub async fn run(mut self) {
        let collection = self.collection.clone();
        info!(%collection, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Insert { record, respond_to } => {
                    let record = self.insert(record);
                    let _ = respond_to.send(Ok(record));
                }
                StoreRequest::Get { id, respond_to } => {
                    let record = self.records.get(&id).cloned();
                    debug!(%collection, %id, found = record.is_some(), "Get");
                    let _ = respond_to.send(record);
                }
                StoreRequest::List { respond_to } => {
                    let records = self
                        .order
                        .iter()
                        .filter_map(|id| self.records.get(id).cloned())
                        .collect();
                    let _ = respond_to.send(records);
                }
                StoreRequest::Merge {
                    id,
                    changes,
                    respond_to,
                } => {
                    let result = self.merge(&id, changes);
                    let _ = respond_to.send(result);
                }
                StoreRequest::Remove { id, respond_to } => {
                    let result = match self.records.remove(&id) {
                        Some(record) => {
                            self.order.retain(|existing| existing != &id);
                            info!(%collection, %id, size = self.records.len(), "Removed");
                            Ok(record)
                        }
                        None => {
                            warn!(%collection, %id, "Not found");
                            Err(StoreError::NotFound(id))
                        }
                    };
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(%collection, size = self.records.len(), "Shutdown");
    }

    fn insert(&mut self, mut record: Record) -> Record {
        let id = (self.next_id)();
        record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        self.records.insert(id.clone(), record.clone());
        self.order.push(id.clone());
        info!(collection = %self.collection, %id, size = self.records.len(), "Inserted");
        record
    }

    fn merge(&mut self, id: &str, mut changes: Record) -> Result<Record, StoreError> {
        // The id is assigned by the store and never rewritten.
        changes.remove(ID_FIELD);
        match self.records.get_mut(id) {
            Some(record) => {
                let fields: Vec<String> = changes.keys().cloned().collect();
                record.extend(changes);
                debug!(collection = %self.collection, %id, ?fields, "Merged");
                Ok(record.clone())
            }
            None => {
                warn!(collection = %self.collection, %id, "Not found");
                Err(StoreError::NotFound(id.to_string()))
            }
        }
    }
}
