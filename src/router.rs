//! # Router
//!
//! The public entry point. A [`Router`] owns the resource registry and the route
//! table compiled from it; each call to [`Router::dispatch`] matches the request
//! to a route, normalizes it and hands it to the [`CapabilityDispatcher`].
//!
//! ## Usage Pattern
//!
//! 1. **Register**: add handlers to a [`RouterBuilder`], optionally with a
//!    per-resource [`ResourceConfig`] and an [`ApiConfig`].
//! 2. **Build**: [`RouterBuilder::build`] validates the registry and compiles
//!    the routes. Any problem is a [`ConfigError`] and the router never starts.
//! 3. **Dispatch**: share the router (it is `Send + Sync`) and call
//!    [`Router::dispatch`] per request.
//!
//! ```rust
//! use remple::{Capability, CapabilitySet, Request, Resource, ResourceRequest, ResourceResult, Router};
//! use async_trait::async_trait;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct Widgets;
//!
//! #[async_trait]
//! impl Resource for Widgets {
//!     fn capabilities(&self) -> CapabilitySet {
//!         CapabilitySet::EMPTY.with(Capability::Show)
//!     }
//!
//!     async fn show(&self, request: ResourceRequest) -> ResourceResult {
//!         Ok(json!({ "id": request.require_id()? }))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::builder()
//!         .resource("widgets", Arc::new(Widgets))
//!         .build()
//!         .unwrap();
//!
//!     let response = router.dispatch(Request::get("/widgets/abc123/")).await;
//!     assert_eq!(response.status, 200);
//!     assert_eq!(response.body["id"], "abc123");
//! }
//! ```
//!
//! ## Concurrency
//!
//! The route table is read-only after `build`, so dispatch takes `&self` and no
//! locks. The router adds no timeouts; dropping a `dispatch` future drops the
//! handler future with it, and [`Router::dispatch_cancellable`] turns a
//! caller's [`CancellationToken`] into [`RouterError::Cancelled`].

use crate::builder::RouteTableBuilder;
use crate::config::ApiConfig;
use crate::descriptor::{ResourceConfig, ResourceDescriptor, ResourceRegistry};
use crate::dispatcher::CapabilityDispatcher;
use crate::error::{ConfigError, RouterError};
use crate::openapi;
use crate::resource::{Resource, ResourceRequest};
use crate::response::{Reply, Request, Response};
use crate::route::RouteListing;
use crate::table::{RouteMatch, RouteTable};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn, Span};

/// Collects resources and configuration, then builds a [`Router`].
#[derive(Debug, Default)]
pub struct RouterBuilder {
    registry: ResourceRegistry,
    config: ApiConfig,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name` with the default config.
    pub fn resource(self, name: &str, handler: Arc<dyn Resource>) -> Self {
        self.resource_with(name, handler, ResourceConfig::default())
    }

    pub fn resource_with(
        mut self,
        name: &str,
        handler: Arc<dyn Resource>,
        config: ResourceConfig,
    ) -> Self {
        self.registry
            .register(ResourceDescriptor::with_config(name, handler, config));
        self
    }

    pub fn descriptor(mut self, descriptor: ResourceDescriptor) -> Self {
        self.registry.register(descriptor);
        self
    }

    /// API-wide settings and per-resource overrides.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(mut self) -> Result<Router, ConfigError> {
        self.registry.validate()?;
        for (name, overrides) in &self.config.resources {
            let descriptor = self
                .registry
                .get_mut(name)
                .ok_or_else(|| ConfigError::UnknownResource(name.clone()))?;
            overrides.apply(descriptor.config_mut());
        }

        let table = RouteTableBuilder::new(&self.config.api_version).build(&self.registry)?;
        info!(
            service = %self.config.service_name,
            version = %self.config.api_version,
            resources = self.registry.len(),
            "Router ready"
        );
        Ok(Router {
            registry: self.registry,
            table,
            dispatcher: CapabilityDispatcher::new(),
            config: self.config,
        })
    }
}

/// Matches requests to routes and dispatches them to resource handlers.
#[derive(Debug)]
pub struct Router {
    registry: ResourceRegistry,
    table: RouteTable,
    dispatcher: CapabilityDispatcher,
    config: ApiConfig,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The discoverable (method, path, resource, capability) listing.
    pub fn routes(&self) -> Vec<RouteListing> {
        self.table.listing()
    }

    /// OpenAPI 3 description of every route.
    pub fn openapi(&self) -> Value {
        openapi::document(&self.config, &self.registry, &self.table)
    }

    /// Matches without invoking anything.
    pub fn route(&self, method: &str, path: &str) -> Result<RouteMatch<'_>, RouterError> {
        self.table.find(method, path)
    }

    /// Dispatches and returns the envelope the boundary layer should send.
    pub async fn dispatch(&self, request: Request) -> Response {
        self.try_dispatch(request).await.into()
    }

    /// Like [`Router::dispatch`], but resolves to `Cancelled` as soon as
    /// `cancel` fires. The in-flight handler future is dropped.
    pub async fn dispatch_cancellable(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Response {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Dispatch cancelled by caller");
                RouterError::Cancelled.into()
            }
            response = self.dispatch(request) => response,
        }
    }

    /// Dispatches, keeping success and failure apart.
    #[instrument(
        name = "dispatch",
        skip(self, request),
        fields(method = %request.method, path = %request.path, status = tracing::field::Empty)
    )]
    pub async fn try_dispatch(&self, request: Request) -> Result<Reply, RouterError> {
        let result = self.run(request).await;
        let status = match &result {
            Ok(reply) => reply.status,
            Err(e) => e.status(),
        };
        Span::current().record("status", status);
        match &result {
            Ok(_) => info!(status, "Dispatched"),
            Err(e) => info!(status, error_kind = %e.kind(), "Dispatch failed"),
        }
        result
    }

    async fn run(&self, request: Request) -> Result<Reply, RouterError> {
        let Request {
            method,
            path,
            body,
            query,
        } = request;

        let RouteMatch { route, id } = self.table.find(&method, &path)?;
        debug!(
            resource = route.resource(),
            target = %route.target(),
            id = id.as_deref(),
            "Route matched"
        );

        let descriptor = self.registry.get(route.resource()).ok_or_else(|| {
            warn!(resource = route.resource(), "Route points at an unknown resource");
            RouterError::internal()
        })?;

        let body = body.into_json().map_err(|e| RouterError::Validation(e.to_string()))?;
        let resource_request = ResourceRequest {
            resource: route.resource().to_string(),
            id,
            body,
            query,
        };

        self.dispatcher
            .invoke(descriptor, route.target(), resource_request)
            .await
    }
}
