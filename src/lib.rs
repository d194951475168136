//! # Remple
//!
//! > **REST Simple: convention-driven resource routing.**
//!
//! Give the router a set of named collections, each backed by a handler that
//! implements some of nine standard capabilities, and it derives a uniform set
//! of HTTP endpoints per collection, matches requests to them, and wraps
//! results in a uniform envelope.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into layers:
//!
//! 1. **Handler Layer** ([`Resource`]) - business logic, one hook per capability
//! 2. **Description Layer** ([`ResourceDescriptor`], [`ResourceConfig`]) - names a
//!    handler and narrows what it exposes (`searchable`, `read_only`)
//! 3. **Compilation Layer** ([`RouteTableBuilder`], [`RouteTable`]) - turns the
//!    registry into routes, once, at startup
//! 4. **Dispatch Layer** ([`Router`], [`CapabilityDispatcher`]) - matches a request,
//!    calls the hook, maps errors to the taxonomy in [`RouterError`]
//!
//! ## The Route Convention
//!
//! | Purpose         | Method | Path                   | Capability   |
//! |-----------------|--------|------------------------|--------------|
//! | Create new      | POST   | `/{name}/`             | `create`     |
//! | Create data     | GET    | `/{name}/new/`         | `new`        |
//! | Read all        | GET    | `/{name}/`             | `index`      |
//! | Read specific   | GET    | `/{name}/{id}/`        | `show`       |
//! | Update specific | PUT    | `/{name}/{id}/`        | `update`     |
//! | Update data     | GET    | `/{name}/{id}/edit/`   | `edit`       |
//! | Delete specific | DELETE | `/{name}/{id}/`        | `delete`     |
//! | Search          | SEARCH | `/{name}/`             | `search`     |
//! | Search          | POST   | `/{name}/search/`      | `search`     |
//! | Search data     | GET    | `/{name}/new_search/`  | `new_search` |
//!
//! A capability the handler does not advertise, or that its config disables,
//! has no route at all: requests for it are indistinguishable from requests for
//! any other unknown endpoint. A capability that *is* routed but whose handler
//! rejects the call (e.g. an indelible resource answering every `delete` with
//! `Forbidden`) is a runtime error on an existing route.
//!
//! ## Error Taxonomy
//!
//! | Kind               | Status | Raised by |
//! |--------------------|--------|-----------|
//! | `RouteNotFound`    | 404    | router    |
//! | `MethodNotAllowed` | 405    | router    |
//! | `ValidationError`  | 400    | handler   |
//! | `NotFound`         | 404    | handler   |
//! | `Forbidden`        | 403    | handler   |
//! | `InternalError`    | 500    | anything unexpected |
//! | `Cancelled`        | 499    | caller    |
//!
//! ## Testing
//!
//! [`mock::MockResource`] is a queue-of-expectations handler for exercising the
//! router without storage.

pub mod builder;
pub mod capability;
pub mod config;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod mock;
pub mod openapi;
pub mod resource;
pub mod response;
pub mod route;
pub mod router;
pub mod table;
pub mod tracing;

// Re-export core types for convenience
pub use builder::RouteTableBuilder;
pub use capability::{Capability, CapabilitySet, HttpMethod, PathShape};
pub use config::ApiConfig;
pub use descriptor::{ResourceConfig, ResourceDescriptor, ResourceOverrides, ResourceRegistry};
pub use dispatcher::CapabilityDispatcher;
pub use error::{ConfigError, ErrorKind, RouterError};
pub use resource::{CustomEndpoint, Resource, ResourceError, ResourceRequest, ResourceResult};
pub use response::{Reply, Request, RequestBody, Response};
pub use route::{PathTemplate, Route, RouteListing, RouteTarget, Segment};
pub use router::{Router, RouterBuilder};
pub use table::{RouteMatch, RouteTable};
pub use tokio_util::sync::CancellationToken;
