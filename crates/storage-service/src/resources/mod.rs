//! # Storage Service Resources
//!
//! [`ModelResources`] implements all nine capabilities over one record store
//! and its [`Model`]. The collections with special behaviour wrap it:
//!
//! - [`Locations`] adds `GET /locations/{id}/browse/`.
//! - [`Packages`] stores packages in the background and refuses deletion.
//!
//! Read-only collections (files) are plain `ModelResources` registered with
//! `ResourceConfig::read_only(true)`; the router then never routes their
//! mutating capabilities.

pub mod locations;
pub mod packages;

pub use locations::Locations;
pub use packages::Packages;

use crate::models::Model;
use crate::schema::{FieldKind, Reference, Schema};
use crate::store::{Record, StoreClient, StoreError, ID_FIELD};
use async_trait::async_trait;
use remple::{CapabilitySet, Resource, ResourceError, ResourceRequest, ResourceResult};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// The store client of every collection, for resolving references.
#[derive(Debug, Clone, Default)]
pub struct StoreRegistry {
    clients: Arc<HashMap<&'static str, StoreClient>>,
}

impl StoreRegistry {
    pub fn new(clients: HashMap<&'static str, StoreClient>) -> Self {
        Self {
            clients: Arc::new(clients),
        }
    }

    pub fn get(&self, collection: &str) -> Option<&StoreClient> {
        self.clients.get(collection)
    }

    /// The client for `collection`; a missing store is a wiring bug.
    pub fn client(&self, collection: &str) -> Result<&StoreClient, ResourceError> {
        self.get(collection).ok_or_else(|| {
            ResourceError::other(StoreError::NotFound(format!("store {collection}")))
        })
    }

    /// Fails with `Validation` on the first reference naming a missing record.
    pub async fn check_references(&self, references: &[Reference]) -> Result<(), ResourceError> {
        for reference in references {
            let store = self.client(reference.collection)?;
            if store.get(&reference.id).await?.is_none() {
                return Err(ResourceError::Validation(format!(
                    "{}: There is no {} record with id {}.",
                    reference.field, reference.collection, reference.id
                )));
            }
        }
        Ok(())
    }

    /// Ids of every record in `collection`.
    async fn ids(&self, collection: &str) -> Result<Vec<Value>, ResourceError> {
        let records = self.client(collection)?.list().await?;
        Ok(records
            .into_iter()
            .filter_map(|mut record| record.remove(ID_FIELD))
            .collect())
    }
}

/// Page selection for `index` and `search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    /// One-based.
    pub page: usize,
    pub items_per_page: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl Paginator {
    /// Reads `page` and `items_per_page` from the query string.
    pub fn from_query(request: &ResourceRequest) -> Result<Self, ResourceError> {
        let mut paginator = Self::default();
        if let Some(page) = request.query_param("page") {
            paginator.page = parse_positive("page", page)?;
        }
        if let Some(items) = request.query_param("items_per_page") {
            paginator.items_per_page = parse_positive("items_per_page", items)?;
        }
        Ok(paginator)
    }

    /// Reads a `paginator` object from a search body.
    pub fn from_json(value: Option<&Value>) -> Result<Self, ResourceError> {
        let mut paginator = Self::default();
        let Some(value) = value else {
            return Ok(paginator);
        };
        let object = value.as_object().ok_or_else(|| {
            ResourceError::Validation("paginator: Must be a JSON object".into())
        })?;
        for (key, value) in object {
            let number = value
                .as_u64()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ResourceError::Validation(format!("paginator.{key}: Please enter a positive integer"))
                })? as usize;
            match key.as_str() {
                "page" => paginator.page = number,
                "items_per_page" => paginator.items_per_page = number,
                other => {
                    return Err(ResourceError::Validation(format!(
                        "paginator: The input field '{other}' was not expected."
                    )))
                }
            }
        }
        Ok(paginator)
    }

    /// `{paginator: {page, items_per_page, count}, items: [...]}`.
    pub fn paginate(&self, records: Vec<Record>) -> Value {
        let count = records.len();
        let start = (self.page - 1).saturating_mul(self.items_per_page);
        let items: Vec<Value> = records
            .into_iter()
            .skip(start)
            .take(self.items_per_page)
            .map(Value::Object)
            .collect();
        json!({
            "paginator": {
                "page": self.page,
                "items_per_page": self.items_per_page,
                "count": count,
            },
            "items": items,
        })
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<usize, ResourceError> {
    raw.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ResourceError::Validation(format!("{name}: Please enter a positive integer")))
}

/// The nine capabilities over one record store.
#[derive(Debug, Clone)]
pub struct ModelResources {
    model: Model,
    store: StoreClient,
    stores: StoreRegistry,
}

impl ModelResources {
    pub fn new(model: Model, store: StoreClient, stores: StoreRegistry) -> Self {
        Self {
            model,
            store,
            stores,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    /// The record with the request's id, or `NotFound`.
    pub async fn fetch(&self, request: &ResourceRequest) -> Result<Record, ResourceError> {
        let id = request.require_id()?;
        self.store
            .get(id)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    pub fn not_found(&self, id: &str) -> ResourceError {
        ResourceError::NotFound(format!("There is no {} with id {}.", self.model.member, id))
    }

    /// Validates a create payload and inserts `extra` along with it.
    pub async fn insert_validated(
        &self,
        request: &ResourceRequest,
        extra: Record,
    ) -> Result<Record, ResourceError> {
        let validated = self.model.create.validate(request.body_object()?, false)?;
        self.stores.check_references(&validated.references).await?;
        let mut record = validated.fields;
        record.extend(extra);
        let record = self.store.insert(record).await?;
        info!(collection = self.model.collection, id = ?record.get(ID_FIELD), "Created");
        Ok(record)
    }

    /// Choices for every reference field, keyed by field name.
    async fn reference_options(&self, schema: &Schema) -> Result<Value, ResourceError> {
        let mut options = Map::new();
        for spec in schema.fields() {
            if let FieldKind::Reference(collection) | FieldKind::ReferenceList(collection) = spec.kind {
                options.insert(spec.name.to_string(), Value::Array(self.stores.ids(collection).await?));
            }
        }
        Ok(Value::Object(options))
    }

    fn filter_matches(filter: &Map<String, Value>, record: &Record) -> bool {
        filter
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

#[async_trait]
impl Resource for ModelResources {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::ALL
    }

    async fn create(&self, request: ResourceRequest) -> ResourceResult {
        let record = self.insert_validated(&request, Record::new()).await?;
        Ok(Value::Object(record))
    }

    async fn new(&self, _request: ResourceRequest) -> ResourceResult {
        let mut description = self.model.create.describe();
        description["options"] = self.reference_options(&self.model.create).await?;
        Ok(description)
    }

    async fn index(&self, request: ResourceRequest) -> ResourceResult {
        let paginator = Paginator::from_query(&request)?;
        let records = self.store.list().await?;
        debug!(collection = self.model.collection, count = records.len(), ?paginator, "Index");
        Ok(paginator.paginate(records))
    }

    async fn show(&self, request: ResourceRequest) -> ResourceResult {
        Ok(Value::Object(self.fetch(&request).await?))
    }

    async fn update(&self, request: ResourceRequest) -> ResourceResult {
        let id = request.require_id()?;
        let validated = self.model.update.validate(request.body_object()?, true)?;
        self.stores.check_references(&validated.references).await?;
        match self.store.merge(id, validated.fields).await {
            Ok(record) => {
                info!(collection = self.model.collection, %id, "Updated");
                Ok(Value::Object(record))
            }
            Err(StoreError::NotFound(_)) => Err(self.not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn edit(&self, request: ResourceRequest) -> ResourceResult {
        let record = self.fetch(&request).await?;
        let mut description = self.model.update.describe();
        description["options"] = self.reference_options(&self.model.update).await?;
        description["data"] = Value::Object(record);
        Ok(description)
    }

    async fn delete(&self, request: ResourceRequest) -> ResourceResult {
        let id = request.require_id()?;
        match self.store.remove(id).await {
            Ok(record) => {
                info!(collection = self.model.collection, %id, "Deleted");
                Ok(Value::Object(record))
            }
            Err(StoreError::NotFound(_)) => Err(self.not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Body: `{"filter": {field: value, ...}, "paginator": {...}}`. Every
    /// filter entry must equal the record's field.
    async fn search(&self, request: ResourceRequest) -> ResourceResult {
        let empty = Map::new();
        let body = match &request.body {
            None => &empty,
            Some(_) => request.body_object()?,
        };
        if let Some(key) = body.keys().find(|k| !matches!(k.as_str(), "filter" | "paginator")) {
            return Err(ResourceError::Validation(format!(
                "{key}: The input field '{key}' was not expected."
            )));
        }

        let filter = match body.get("filter") {
            None => &empty,
            Some(Value::Object(filter)) => filter,
            Some(_) => {
                return Err(ResourceError::Validation("filter: Must be a JSON object".into()))
            }
        };
        let searchable = self.model.searchable_fields();
        if let Some(field) = filter
            .keys()
            .find(|field| !searchable.iter().any(|known| *known == field.as_str()))
        {
            return Err(ResourceError::Validation(format!(
                "filter: Unknown search attribute {field}"
            )));
        }
        let paginator = Paginator::from_json(body.get("paginator"))?;

        let matches: Vec<Record> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|record| Self::filter_matches(filter, record))
            .collect();
        debug!(collection = self.model.collection, matches = matches.len(), "Search");
        Ok(paginator.paginate(matches))
    }

    async fn new_search(&self, _request: ResourceRequest) -> ResourceResult {
        let attributes = self.model.searchable_fields();
        let defaults = Paginator::default();
        Ok(json!({
            "search_parameters": {
                "attributes": attributes,
                "relations": ["="],
            },
            "paginator": {
                "page": defaults.page,
                "items_per_page": defaults.items_per_page,
            },
        }))
    }
}
