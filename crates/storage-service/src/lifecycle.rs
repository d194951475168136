//! # Service Lifecycle
//!
//! [`StorageService`] starts one [`RecordStore`] task per collection, wires the
//! handlers to the store clients, and builds the [`Router`] over them.
//!
//! Shutdown follows the channel-closing pattern: dropping the router drops the
//! handlers and with them every store client; each store's receiver then
//! returns `None` and its task ends.

use crate::models::{self, FILES, LOCATIONS, PACKAGES, PIPELINES, SPACES};
use crate::resources::{Locations, ModelResources, Packages, StoreRegistry};
use crate::store::{self, RecordStore, StoreClient};
use remple::{ApiConfig, ConfigError, ResourceConfig, Router};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

const STORE_BUFFER: usize = 32;

/// Every collection of the storage service, running.
pub struct StorageService {
    router: Router,
    stores: StoreRegistry,
    handles: Vec<JoinHandle<()>>,
}

impl StorageService {
    /// Spawns the stores and builds the router. Must be called inside a
    /// Tokio runtime.
    pub fn new(config: ApiConfig) -> Result<Self, ConfigError> {
        let mut clients: HashMap<&'static str, StoreClient> = HashMap::new();
        let mut handles = Vec::new();
        for collection in [LOCATIONS, SPACES, PIPELINES, PACKAGES, FILES] {
            let (store, client) = RecordStore::new(collection, STORE_BUFFER, store::uuid_ids());
            handles.push(tokio::spawn(store.run()));
            clients.insert(collection, client);
        }
        let stores = StoreRegistry::new(clients);

        let model_resources = |model: models::Model| -> Result<ModelResources, ConfigError> {
            let client = stores
                .get(model.collection)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownResource(model.collection.to_string()))?;
            Ok(ModelResources::new(model, client, stores.clone()))
        };

        let router = Router::builder()
            .resource(
                LOCATIONS,
                Arc::new(Locations::new(model_resources(models::location())?)),
            )
            .resource(SPACES, Arc::new(model_resources(models::space())?))
            .resource(PIPELINES, Arc::new(model_resources(models::pipeline())?))
            .resource(
                PACKAGES,
                Arc::new(Packages::new(model_resources(models::package())?)),
            )
            .resource_with(
                FILES,
                Arc::new(model_resources(models::file())?),
                ResourceConfig::default().read_only(true),
            )
            .config(config)
            .build()?;

        info!(routes = router.table().len(), "Storage service started");
        Ok(Self {
            router,
            stores,
            handles,
        })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Direct access to a collection's store, bypassing the router.
    pub fn store(&self, collection: &str) -> Option<&StoreClient> {
        self.stores.get(collection)
    }

    /// Stops every store and waits for its task to finish.
    ///
    /// Stores stay up while background package tasks still hold a client.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down storage service...");
        drop(self.router);
        drop(self.stores);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Store task failed");
                return Err(format!("Store task failed: {:?}", e));
            }
        }
        info!("Storage service stopped");
        Ok(())
    }
}
