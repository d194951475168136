//! OpenAPI documentation generated from the route table.
//!
//! The document is a projection of what the router will actually serve: one
//! tag per resource, one operation per route, and the error envelope as a
//! shared schema. Handlers are not consulted beyond their capability sets and
//! custom endpoint summaries.

use crate::capability::{Capability, HttpMethod};
use crate::config::ApiConfig;
use crate::descriptor::ResourceRegistry;
use crate::error::ErrorKind;
use crate::route::{Route, RouteTarget};
use crate::table::RouteTable;
use serde_json::{json, Map, Value};

const ERROR_SCHEMA_NAME: &str = "ErrorSchema";

/// Builds the OpenAPI 3.0 document.
pub fn document(config: &ApiConfig, registry: &ResourceRegistry, table: &RouteTable) -> Value {
    let mut paths = Map::new();
    for route in table.routes() {
        let path = paths
            .entry(route.template().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(operations) = path {
            operations.insert(route.method().as_str().to_ascii_lowercase(), operation(route));
        }
    }

    let tags: Vec<Value> = registry
        .iter()
        .map(|descriptor| {
            let access = if descriptor.is_read_only() {
                "read-only"
            } else {
                "read-write"
            };
            json!({
                "name": descriptor.name(),
                "description": format!("Access to the {} resource ({access})", descriptor.name()),
            })
        })
        .collect();

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": config.service_name,
            "version": config.api_version,
            "description": format!("{} API, version {}", config.service_name, config.api_version),
        },
        "tags": tags,
        "paths": paths,
        "components": {
            "schemas": {
                ERROR_SCHEMA_NAME: error_schema(),
            },
        },
    })
}

fn operation(route: &Route) -> Value {
    let resource = route.resource();
    let mut op = Map::new();
    op.insert(
        "operationId".into(),
        json!(format!("{resource}.{}", operation_suffix(route))),
    );
    op.insert("tags".into(), json!([resource]));
    op.insert("summary".into(), json!(summary(route)));

    if route.template().has_id() {
        op.insert(
            "parameters".into(),
            json!([{
                "name": "id",
                "in": "path",
                "required": true,
                "description": format!("Identifier of a {resource} resource"),
                "schema": { "type": "string" },
            }]),
        );
    }
    if takes_body(route) {
        op.insert(
            "requestBody".into(),
            json!({
                "required": true,
                "content": { "application/json": { "schema": { "type": "object" } } },
            }),
        );
    }
    op.insert("responses".into(), responses(route));
    Value::Object(op)
}

/// The SEARCH verb and POST `/search/` share a capability; keep their
/// operation ids distinct.
fn operation_suffix(route: &Route) -> String {
    match (route.target(), route.method()) {
        (RouteTarget::Capability(Capability::Search), HttpMethod::Post) => "search_post".into(),
        (target, _) => target.name().to_string(),
    }
}

fn summary(route: &Route) -> String {
    let resource = route.resource();
    match route.target() {
        RouteTarget::Capability(capability) => match capability {
            Capability::Create => format!("Create a new {resource} resource."),
            Capability::New => format!("Get the data needed to create a new {resource} resource."),
            Capability::Index => format!("View all {resource} resources."),
            Capability::Show => format!("View a single {resource} resource."),
            Capability::Update => format!("Update an existing {resource} resource."),
            Capability::Edit => format!("Get the data needed to update an existing {resource} resource."),
            Capability::Delete => format!("Delete an existing {resource} resource."),
            Capability::Search => format!("Search over all {resource} resources."),
            Capability::NewSearch => format!("Get the data needed to search over all {resource} resources."),
        },
        RouteTarget::Custom(action) if route.summary().is_empty() => {
            format!("Perform {action} on {resource}.")
        }
        RouteTarget::Custom(_) => route.summary().to_string(),
    }
}

fn takes_body(route: &Route) -> bool {
    matches!(
        route.target(),
        RouteTarget::Capability(Capability::Create | Capability::Update | Capability::Search)
    )
}

fn responses(route: &Route) -> Value {
    let mut map = Map::new();
    map.insert(
        route.target().success_status().to_string(),
        json!({
            "description": "Success",
            "content": { "application/json": { "schema": { "type": "object" } } },
        }),
    );
    for kind in error_kinds(route) {
        map.insert(
            kind.status().to_string(),
            json!({
                "description": kind.as_str(),
                "content": { "application/json": {
                    "schema": { "$ref": format!("#/components/schemas/{ERROR_SCHEMA_NAME}") },
                } },
            }),
        );
    }
    Value::Object(map)
}

fn error_kinds(route: &Route) -> Vec<ErrorKind> {
    let mut kinds = Vec::new();
    if takes_body(route) {
        kinds.push(ErrorKind::ValidationError);
    }
    if route.template().has_id() {
        kinds.push(ErrorKind::NotFound);
    }
    kinds.push(ErrorKind::Forbidden);
    kinds
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "error_kind": { "type": "string" },
            "message": { "type": "string" },
        },
        "required": ["error_kind", "message"],
    })
}
