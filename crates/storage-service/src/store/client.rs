//! Cloneable handle to a [`RecordStore`](super::RecordStore).

use super::message::StoreRequest;
use super::{Record, StoreError};
use tokio::sync::{mpsc, oneshot};

/// Async API over the store's channel. Cloning only clones the sender.
#[derive(Debug, Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    pub async fn insert(&self, record: Record) -> Result<Record, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.send(StoreRequest::Insert { record, respond_to }).await?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.send(StoreRequest::Get {
            id: id.to_string(),
            respond_to,
        })
        .await?;
        response.await.map_err(|_| StoreError::StoreDropped)
    }

    /// Like [`StoreClient::get`], but a missing record is an error.
    pub async fn fetch(&self, id: &str) -> Result<Record, StoreError> {
        self.get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub async fn list(&self) -> Result<Vec<Record>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.send(StoreRequest::List { respond_to }).await?;
        response.await.map_err(|_| StoreError::StoreDropped)
    }

    pub async fn merge(&self, id: &str, changes: Record) -> Result<Record, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.send(StoreRequest::Merge {
            id: id.to_string(),
            changes,
            respond_to,
        })
        .await?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn remove(&self, id: &str) -> Result<Record, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.send(StoreRequest::Remove {
            id: id.to_string(),
            respond_to,
        })
        .await?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    async fn send(&self, request: StoreRequest) -> Result<(), StoreError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| StoreError::StoreClosed)
    }
}
