//! Packages.
//!
//! Creating a package records it as `PENDING` and answers immediately; a
//! background task then copies `current_path` into the package's location and
//! marks it `UPLOADED` (or `FAIL`). Packages are never deleted through the
//! API: the route exists, and every call is `Forbidden`.

use super::{ModelResources, StoreRegistry};
use crate::models::{LOCATIONS, SPACES};
use crate::store::{Record, StoreClient, ID_FIELD};
use async_trait::async_trait;
use remple::{CapabilitySet, Resource, ResourceError, ResourceRequest, ResourceResult};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn, Instrument};

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_UPLOADED: &str = "UPLOADED";
pub const STATUS_FAIL: &str = "FAIL";

#[derive(Debug, Clone)]
pub struct Packages {
    inner: ModelResources,
}

impl Packages {
    pub fn new(inner: ModelResources) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Resource for Packages {
    fn capabilities(&self) -> CapabilitySet {
        self.inner.capabilities()
    }

    async fn create(&self, request: ResourceRequest) -> ResourceResult {
        let mut extra = Record::new();
        extra.insert("status".into(), json!(STATUS_PENDING));
        let record = self.inner.insert_validated(&request, extra).await?;

        let id = record
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let task = StorageTask {
            store: self.inner.store().clone(),
            stores: self.inner.stores().clone(),
            package: record.clone(),
        };
        tokio::spawn(task.run().instrument(info_span!("store_package", %id)));
        Ok(Value::Object(record))
    }

    async fn new(&self, request: ResourceRequest) -> ResourceResult {
        Resource::new(&self.inner, request).await
    }

    async fn index(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.index(request).await
    }

    async fn show(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.show(request).await
    }

    async fn update(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.update(request).await
    }

    async fn edit(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.edit(request).await
    }

    async fn delete(&self, request: ResourceRequest) -> ResourceResult {
        warn!(id = request.id.as_deref(), "Refusing to delete package");
        Err(ResourceError::Forbidden("Packages cannot be deleted.".into()))
    }

    async fn search(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.search(request).await
    }

    async fn new_search(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.new_search(request).await
    }
}

/// Copies one package into its location and records the outcome.
struct StorageTask {
    store: StoreClient,
    stores: StoreRegistry,
    package: Record,
}

impl StorageTask {
    async fn run(self) {
        let id = match self.package.get(ID_FIELD).and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => return,
        };
        let mut changes = Record::new();
        match self.store_package().await {
            Ok(stored_path) => {
                info!(path = %stored_path.display(), "Package stored");
                changes.insert("status".into(), json!(STATUS_UPLOADED));
                changes.insert("stored_path".into(), json!(stored_path.to_string_lossy()));
            }
            Err(e) => {
                warn!(error = %e, "Package storage failed");
                changes.insert("status".into(), json!(STATUS_FAIL));
                changes.insert("status_reason".into(), json!(e.to_string()));
            }
        }
        if let Err(e) = self.store.merge(&id, changes).await {
            warn!(error = %e, "Unable to record package status");
        }
    }

    async fn store_package(&self) -> Result<PathBuf, ResourceError> {
        let field = |record: &Record, key: &str| {
            record
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let location_id = field(&self.package, "current_location");
        let location = self
            .stores
            .client(LOCATIONS)?
            .fetch(&location_id)
            .await?;
        let space = self
            .stores
            .client(SPACES)?
            .fetch(&field(&location, "space"))
            .await?;

        let source = PathBuf::from(field(&self.package, "current_path"));
        let file_name = source
            .file_name()
            .ok_or_else(|| ResourceError::Validation("current_path has no file name".into()))?;
        let destination_dir =
            Path::new(&field(&space, "path")).join(field(&location, "relative_path"));
        let destination = destination_dir.join(file_name);

        tokio::fs::create_dir_all(&destination_dir)
            .await
            .map_err(ResourceError::other)?;
        tokio::fs::copy(&source, &destination)
            .await
            .map_err(ResourceError::other)?;
        Ok(destination)
    }
}
