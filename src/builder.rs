//! # Route Table Builder
//!
//! Turns a [`ResourceRegistry`] into a [`RouteTable`].
//!
//! For every descriptor and every capability, a route is emitted only if
//!
//! 1. the handler advertises the capability, and
//! 2. the descriptor's [`ResourceConfig`](crate::ResourceConfig) permits it.
//!    A handler that advertises none of create, update and delete counts as
//!    read-only here, so it gets no `new` or `edit` routes either.
//!
//! The two `search` routes share one capability, so `searchable = false`
//! removes both of them together (and `new_search`). Custom endpoints are
//! appended after the standard ones.
//!
//! The output order follows registration order and then
//! [`Capability::ALL`](crate::Capability::ALL), so building twice from the same registry yields the same
//! table.

use crate::capability::PathShape;
use crate::descriptor::{ResourceDescriptor, ResourceRegistry};
use crate::error::ConfigError;
use crate::route::{PathTemplate, Route, RouteTarget};
use crate::table::{PathEntry, RouteTable};
use std::sync::Arc;
use tracing::{debug, info};

/// Compiles route tables.
#[derive(Debug, Clone)]
pub struct RouteTableBuilder {
    api_version: String,
}

impl Default for RouteTableBuilder {
    fn default() -> Self {
        Self::new("v1")
    }
}

impl RouteTableBuilder {
    /// `api_version` is used as the prefix of every route name.
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
        }
    }

    /// Builds the table, failing on duplicate or malformed resource names and
    /// on custom endpoints that clash with another route.
    pub fn build(&self, registry: &ResourceRegistry) -> Result<RouteTable, ConfigError> {
        registry.validate()?;

        let mut entries: Vec<PathEntry> = Vec::new();
        for descriptor in registry.iter() {
            let before = entries.iter().map(|e| e.routes.len()).sum::<usize>();
            for route in self.standard_routes(descriptor) {
                insert_route(&mut entries, route)?;
            }
            for route in self.custom_routes(descriptor)? {
                insert_route(&mut entries, route)?;
            }
            let after = entries.iter().map(|e| e.routes.len()).sum::<usize>();
            debug!(
                resource = descriptor.name(),
                capabilities = ?descriptor.effective_capabilities(),
                routes = after - before,
                "Resource registered"
            );
        }

        let table = RouteTable::from_entries(entries);
        info!(
            resources = registry.len(),
            routes = table.len(),
            "Route table built"
        );
        Ok(table)
    }

    fn standard_routes(&self, descriptor: &ResourceDescriptor) -> Vec<Route> {
        let resource = descriptor.shared_name();
        descriptor
            .effective_capabilities()
            .iter()
            .flat_map(|capability| {
                let resource = resource.clone();
                capability
                    .endpoints()
                    .iter()
                    .map(move |&(method, shape)| Route {
                        name: self.route_name(&resource, shape),
                        method,
                        template: PathTemplate::for_shape(&resource, shape),
                        resource: resource.clone(),
                        target: RouteTarget::Capability(capability),
                        summary: String::new(),
                    })
            })
            .collect()
    }

    fn custom_routes(&self, descriptor: &ResourceDescriptor) -> Result<Vec<Route>, ConfigError> {
        let resource = descriptor.shared_name();
        descriptor
            .handler()
            .custom_endpoints()
            .into_iter()
            .map(|endpoint| -> Result<Route, ConfigError> {
                let template = PathTemplate::for_custom(&resource, &endpoint.path).ok_or_else(
                    || ConfigError::InvalidCustomPath {
                        resource: resource.to_string(),
                        path: endpoint.path.clone(),
                    },
                )?;
                Ok(Route {
                    name: format!("{}_{}_{}", self.api_version, resource, endpoint.action),
                    method: endpoint.method,
                    template,
                    resource: resource.clone(),
                    target: RouteTarget::Custom(Arc::from(endpoint.action.as_str())),
                    summary: endpoint.summary,
                })
            })
            .collect()
    }

    fn route_name(&self, resource: &str, shape: PathShape) -> String {
        let v = &self.api_version;
        match shape {
            PathShape::Collection(None) => format!("{v}_{resource}"),
            PathShape::Member(None) => format!("{v}_{resource}_member"),
            PathShape::Collection(Some(suffix)) | PathShape::Member(Some(suffix)) => {
                format!("{v}_{resource}_{suffix}")
            }
        }
    }
}

/// Adds `route` to the entry for its template, rejecting a second route with
/// the same verb and path.
fn insert_route(entries: &mut Vec<PathEntry>, route: Route) -> Result<(), ConfigError> {
    match entries.iter_mut().find(|e| e.template == route.template) {
        Some(entry) => {
            if entry.routes.iter().any(|r| r.method == route.method) {
                return Err(ConfigError::ConflictingRoute {
                    method: route.method,
                    path: route.template.to_string(),
                });
            }
            entry.routes.push(route);
        }
        None => entries.push(PathEntry {
            template: route.template.clone(),
            routes: vec![route],
        }),
    }
    Ok(())
}
