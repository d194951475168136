//! The compiled route table and request matching.

use crate::capability::HttpMethod;
use crate::error::RouterError;
use crate::route::{PathTemplate, Route, RouteListing};
use std::collections::HashMap;

/// All routes sharing one path template, keyed by verb.
#[derive(Debug, Clone)]
pub(crate) struct PathEntry {
    pub(crate) template: PathTemplate,
    pub(crate) routes: Vec<Route>,
}

impl PathEntry {
    fn allowed_methods(&self) -> Vec<HttpMethod> {
        let mut methods: Vec<HttpMethod> = self.routes.iter().map(Route::method).collect();
        methods.sort();
        methods.dedup();
        methods
    }
}

/// Result of matching a request line against the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'t> {
    pub route: &'t Route,
    pub id: Option<String>,
}

/// The immutable set of routes for every registered resource.
///
/// Built once at startup; safe to share across any number of tasks.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<PathEntry>,
    by_collection: HashMap<String, Vec<usize>>,
}

impl RouteTable {
    pub(crate) fn from_entries(entries: Vec<PathEntry>) -> Self {
        let mut by_collection: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            by_collection
                .entry(entry.template.collection().to_string())
                .or_default()
                .push(index);
        }
        Self {
            entries,
            by_collection,
        }
    }

    /// Every route, in generation order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.entries.iter().flat_map(|entry| entry.routes.iter())
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.routes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn listing(&self) -> Vec<RouteListing> {
        self.routes().map(Route::listing).collect()
    }

    /// Routes belonging to one resource.
    pub fn routes_for<'a>(&'a self, resource: &'a str) -> impl Iterator<Item = &'a Route> {
        self.routes().filter(move |route| route.resource() == resource)
    }

    pub fn contains(&self, method: HttpMethod, path: &str) -> bool {
        self.routes()
            .any(|route| route.method() == method && route.template().to_string() == path)
    }

    /// Finds the route for `method` and `path`.
    ///
    /// The most specific matching template wins, so `/widgets/new/` is never
    /// read as `show` with id `new` when a `new` route exists. A matching path
    /// with no route for the verb is `MethodNotAllowed`, listing the verbs that
    /// do match; no matching path at all is `RouteNotFound`.
    pub fn find(&self, method: &str, path: &str) -> Result<RouteMatch<'_>, RouterError> {
        let parts = split_path(path);
        let not_found = || RouterError::RouteNotFound {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
        };

        let candidates = parts
            .first()
            .and_then(|collection| self.by_collection.get(*collection))
            .ok_or_else(not_found)?;

        let (entry, id) = candidates
            .iter()
            .map(|&index| &self.entries[index])
            .filter_map(|entry| entry.template.matches(&parts).map(|id| (entry, id)))
            .max_by(|(a, _), (b, _)| a.template.specificity_cmp(&b.template))
            .ok_or_else(not_found)?;

        let route = method
            .parse::<HttpMethod>()
            .ok()
            .and_then(|verb| entry.routes.iter().find(|route| route.method() == verb));

        match route {
            Some(route) => Ok(RouteMatch {
                route,
                id: id.map(str::to_string),
            }),
            None => Err(RouterError::MethodNotAllowed {
                method: method.trim().to_ascii_uppercase(),
                allowed: entry.allowed_methods(),
            }),
        }
    }
}

/// Splits a request path into its non-empty segments; a trailing slash is
/// optional. Any query string is ignored.
fn split_path(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|part| !part.is_empty()).collect()
}
