//! # Resource Trait
//!
//! The `Resource` trait is the contract a handler implements to be exposed by the
//! [`Router`](crate::Router). It plays the same role for HTTP collections that a
//! lifecycle-hook trait plays for an actor: the router owns the plumbing (path
//! matching, verb selection, error envelopes) and the handler owns the business
//! logic.
//!
//! # Capability Hooks
//! Each of the nine capabilities is a **provided method** that reports
//! [`ResourceError::Unsupported`] by default. A handler overrides the hooks it
//! implements and lists them in [`Resource::capabilities`]. The advertised set is
//! read exactly once, when the route table is built; a capability that is not
//! advertised never gets a route.
//!
//! # Custom Endpoints
//! Extra endpoints outside the convention (e.g. `GET /locations/{id}/browse/`)
//! are declared through [`Resource::custom_endpoints`] and served by
//! [`Resource::custom`].

use crate::capability::{Capability, CapabilitySet, HttpMethod};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// What every capability hook returns: a JSON entity representation
/// (object or array of objects) or a domain error.
pub type ResourceResult = Result<Value, ResourceError>;

/// Errors a handler may raise.
///
/// `Validation`, `NotFound` and `Forbidden` are passed to the caller unchanged in
/// meaning. Everything else is reported as an internal error with a generic
/// message.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Capability not implemented: {0}")]
    Unsupported(Capability),
    #[error("Unknown custom action: {0}")]
    UnknownAction(String),
    #[error("Handler error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl ResourceError {
    /// Wraps any error as an unexpected handler failure.
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ResourceError::Other(Box::new(error))
    }
}

/// The normalized request handed to a capability hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRequest {
    /// Name of the resource collection the request was routed to.
    pub resource: String,
    /// The `{id}` segment for member-level routes.
    pub id: Option<String>,
    /// Parsed JSON body, if any.
    pub body: Option<Value>,
    /// Query string parameters.
    pub query: HashMap<String, String>,
}

impl ResourceRequest {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// The member identifier; member-level hooks can rely on it being present.
    pub fn require_id(&self) -> Result<&str, ResourceError> {
        self.id
            .as_deref()
            .ok_or_else(|| ResourceError::Validation("A resource identifier is required.".into()))
    }

    /// The body as a JSON object, or a validation error.
    pub fn body_object(&self) -> Result<&Map<String, Value>, ResourceError> {
        match &self.body {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(ResourceError::Validation(
                "The request body must be a JSON object.".into(),
            )),
            None => Err(ResourceError::Validation("A JSON request body is required.".into())),
        }
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// An endpoint outside the nine-capability convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEndpoint {
    /// Name passed to [`Resource::custom`]; also part of the route name.
    pub action: String,
    pub method: HttpMethod,
    /// Path relative to the collection root, e.g. `{id}/browse/`.
    pub path: String,
    pub summary: String,
}

impl CustomEndpoint {
    pub fn new(action: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            method,
            path: path.into(),
            summary: String::new(),
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

/// Trait that any resource handler must implement to be routed.
///
/// Handlers are shared across concurrent requests (`&self`); any mutable state
/// they manage is their own concern.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// The capabilities this handler implements.
    fn capabilities(&self) -> CapabilitySet;

    /// Extra endpoints served by [`Resource::custom`].
    fn custom_endpoints(&self) -> Vec<CustomEndpoint> {
        Vec::new()
    }

    async fn create(&self, _request: ResourceRequest) -> ResourceResult {
        Err(ResourceError::Unsupported(Capability::Create))
    }

    async fn new(&self, _request: ResourceRequest) -> ResourceResult {
        Err(ResourceError::Unsupported(Capability::New))
    }

    async fn index(&self, _request: ResourceRequest) -> ResourceResult {
        Err(ResourceError::Unsupported(Capability::Index))
    }

    async fn show(&self, _request: ResourceRequest) -> ResourceResult {
        Err(ResourceError::Unsupported(Capability::Show))
    }

    async fn update(&self, _request: ResourceRequest) -> ResourceResult {
        Err(ResourceError::Unsupported(Capability::Update))
    }

    async fn edit(&self, _request: ResourceRequest) -> ResourceResult {
        Err(ResourceError::Unsupported(Capability::Edit))
    }

    async fn delete(&self, _request: ResourceRequest) -> ResourceResult {
        Err(ResourceError::Unsupported(Capability::Delete))
    }

    async fn search(&self, _request: ResourceRequest) -> ResourceResult {
        Err(ResourceError::Unsupported(Capability::Search))
    }

    async fn new_search(&self, _request: ResourceRequest) -> ResourceResult {
        Err(ResourceError::Unsupported(Capability::NewSearch))
    }

    /// Handle a custom endpoint declared in [`Resource::custom_endpoints`].
    async fn custom(&self, action: &str, _request: ResourceRequest) -> ResourceResult {
        Err(ResourceError::UnknownAction(action.to_string()))
    }
}
