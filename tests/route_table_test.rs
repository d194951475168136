use remple::mock::MockResource;
use remple::{
    ApiConfig, Capability, ConfigError, CustomEndpoint, HttpMethod, ResourceConfig,
    ResourceOverrides, RouteListing, Router, RouterError,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn listing_set(router: &Router) -> BTreeSet<(HttpMethod, String, String)> {
    router
        .routes()
        .into_iter()
        .map(|r| (r.method, r.path, r.capability))
        .collect()
}

fn route(method: HttpMethod, path: &str, capability: &str) -> (HttpMethod, String, String) {
    (method, path.to_string(), capability.to_string())
}

#[test]
fn test_full_handler_gets_all_ten_routes() {
    let router = Router::builder()
        .resource("widgets", Arc::new(MockResource::full()))
        .build()
        .unwrap();

    let expected: BTreeSet<_> = [
        route(HttpMethod::Post, "/widgets/", "create"),
        route(HttpMethod::Get, "/widgets/new/", "new"),
        route(HttpMethod::Get, "/widgets/", "index"),
        route(HttpMethod::Get, "/widgets/{id}/", "show"),
        route(HttpMethod::Put, "/widgets/{id}/", "update"),
        route(HttpMethod::Get, "/widgets/{id}/edit/", "edit"),
        route(HttpMethod::Delete, "/widgets/{id}/", "delete"),
        route(HttpMethod::Search, "/widgets/", "search"),
        route(HttpMethod::Post, "/widgets/search/", "search"),
        route(HttpMethod::Get, "/widgets/new_search/", "new_search"),
    ]
    .into_iter()
    .collect();

    assert_eq!(listing_set(&router), expected);
    assert_eq!(router.table().len(), 10);
}

#[test]
fn test_non_searchable_resource_drops_all_search_routes() {
    let router = Router::builder()
        .resource_with(
            "widgets",
            Arc::new(MockResource::full()),
            ResourceConfig::default().searchable(false),
        )
        .resource("gadgets", Arc::new(MockResource::full()))
        .build()
        .unwrap();

    let table = router.table();
    assert!(!table.contains(HttpMethod::Search, "/widgets/"));
    assert!(!table.contains(HttpMethod::Post, "/widgets/search/"));
    assert!(!table.contains(HttpMethod::Get, "/widgets/new_search/"));
    assert_eq!(table.routes_for("widgets").count(), 7);

    // Other resources keep theirs.
    assert!(table.contains(HttpMethod::Search, "/gadgets/"));
    assert_eq!(table.routes_for("gadgets").count(), 10);
}

#[test]
fn test_missing_capabilities_have_no_routes() {
    let handler = MockResource::new([Capability::Index, Capability::Show]);
    let router = Router::builder()
        .resource("widgets", Arc::new(handler))
        .build()
        .unwrap();

    let expected: BTreeSet<_> = [
        route(HttpMethod::Get, "/widgets/", "index"),
        route(HttpMethod::Get, "/widgets/{id}/", "show"),
    ]
    .into_iter()
    .collect();
    assert_eq!(listing_set(&router), expected);

    // Absent, not a 404-on-call: DELETE on the member path is a verb the path
    // does not accept.
    let err = router.route("DELETE", "/widgets/1/").unwrap_err();
    assert_eq!(
        err,
        RouterError::MethodNotAllowed {
            method: "DELETE".into(),
            allowed: vec![HttpMethod::Get],
        }
    );
}

#[test]
fn test_read_only_config_suppresses_mutating_routes() {
    let router = Router::builder()
        .resource_with(
            "files",
            Arc::new(MockResource::full()),
            ResourceConfig::default().read_only(true),
        )
        .build()
        .unwrap();

    let capabilities: BTreeSet<String> = router
        .table()
        .routes_for("files")
        .map(|r| r.target().name().to_string())
        .collect();
    let expected: BTreeSet<String> = ["index", "show", "search", "new_search"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(capabilities, expected);
    assert!(router.registry().get("files").unwrap().is_read_only());
}

#[test]
fn test_read_only_is_derived_from_capabilities() {
    let router = Router::builder()
        .resource(
            "events",
            Arc::new(MockResource::new([Capability::Index, Capability::Show])),
        )
        .resource(
            "reports",
            Arc::new(MockResource::new([
                Capability::Index,
                Capability::Show,
                Capability::New,
                Capability::Edit,
            ])),
        )
        .resource("widgets", Arc::new(MockResource::full()))
        .build()
        .unwrap();

    assert!(router.registry().get("events").unwrap().is_read_only());
    assert!(!router.registry().get("widgets").unwrap().is_read_only());

    let reports = router.registry().get("reports").unwrap();
    assert!(reports.is_read_only());
    assert!(!reports.effective_capabilities().contains(Capability::New));
    assert!(!reports.effective_capabilities().contains(Capability::Edit));

    let table = router.table();
    assert!(table.contains(HttpMethod::Get, "/reports/"));
    assert!(table.contains(HttpMethod::Get, "/reports/{id}/"));
    assert!(!table.contains(HttpMethod::Get, "/reports/new/"));
    assert!(!table.contains(HttpMethod::Get, "/reports/{id}/edit/"));
    assert_eq!(table.routes_for("reports").count(), 2);
    assert!(table.contains(HttpMethod::Get, "/widgets/new/"));

    let docs = router.openapi();
    assert!(docs["paths"]["/reports/new/"].is_null());
}

#[test]
fn test_duplicate_resource_name_fails_build() {
    let result = Router::builder()
        .resource("widgets", Arc::new(MockResource::full()))
        .resource("widgets", Arc::new(MockResource::new([Capability::Index])))
        .build();

    match result {
        Err(ConfigError::DuplicateResource(name)) => assert_eq!(name, "widgets"),
        other => panic!("expected DuplicateResource, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_invalid_resource_name_fails_build() {
    let result = Router::builder()
        .resource("wid/gets", Arc::new(MockResource::full()))
        .build();
    assert!(matches!(result, Err(ConfigError::InvalidResourceName(_))));
}

#[test]
fn test_listing_is_stable_across_builds() {
    let build = || {
        Router::builder()
            .resource("widgets", Arc::new(MockResource::full()))
            .resource_with(
                "locations",
                Arc::new(MockResource::new([Capability::Index, Capability::Search])),
                ResourceConfig::default().searchable(false),
            )
            .resource("files", Arc::new(MockResource::new([Capability::Show])))
            .build()
            .unwrap()
            .routes()
    };

    let first: Vec<RouteListing> = build();
    let second: Vec<RouteListing> = build();
    assert_eq!(first, second);
    assert_eq!(first.len(), 12);
}

#[test]
fn test_route_names_use_api_version() {
    let router = Router::builder()
        .resource("widgets", Arc::new(MockResource::full()))
        .config(ApiConfig::new("beta", "Widget Works"))
        .build()
        .unwrap();

    let names: BTreeSet<String> = router.routes().into_iter().map(|r| r.name).collect();
    for name in [
        "beta_widgets",
        "beta_widgets_member",
        "beta_widgets_new",
        "beta_widgets_edit",
        "beta_widgets_search",
        "beta_widgets_new_search",
    ] {
        assert!(names.contains(name), "missing route name {name}");
    }
}

#[test]
fn test_config_overrides_merge_onto_registration() {
    let config = ApiConfig::default().with_overrides(
        "widgets",
        ResourceOverrides {
            searchable: Some(false),
            read_only: None,
        },
    );
    let router = Router::builder()
        .resource("widgets", Arc::new(MockResource::full()))
        .config(config)
        .build()
        .unwrap();

    assert_eq!(router.table().routes_for("widgets").count(), 7);
    assert!(!router.registry().get("widgets").unwrap().config().searchable);
}

#[test]
fn test_config_override_for_unknown_resource_fails_build() {
    let config = ApiConfig::default().with_overrides("gizmos", ResourceOverrides::default());
    let result = Router::builder()
        .resource("widgets", Arc::new(MockResource::full()))
        .config(config)
        .build();
    assert!(matches!(result, Err(ConfigError::UnknownResource(name)) if name == "gizmos"));
}

#[test]
fn test_custom_endpoints_are_listed() {
    let handler = MockResource::new([Capability::Show]).with_custom_endpoint(
        CustomEndpoint::new("browse", HttpMethod::Get, "{pk}/browse/").summary("Browse"),
    );
    let router = Router::builder()
        .resource("locations", Arc::new(handler))
        .build()
        .unwrap();

    assert!(router
        .table()
        .contains(HttpMethod::Get, "/locations/{id}/browse/"));
    let browse = router
        .routes()
        .into_iter()
        .find(|r| r.capability == "browse")
        .unwrap();
    assert_eq!(browse.name, "v1_locations_browse");
}

#[test]
fn test_conflicting_custom_endpoint_fails_build() {
    let handler = MockResource::new([Capability::Show])
        .with_custom_endpoint(CustomEndpoint::new("peek", HttpMethod::Get, "{id}/"));
    let result = Router::builder()
        .resource("widgets", Arc::new(handler))
        .build();
    assert!(matches!(
        result,
        Err(ConfigError::ConflictingRoute { method: HttpMethod::Get, .. })
    ));
}

#[test]
fn test_malformed_custom_path_fails_build() {
    let handler = MockResource::new([Capability::Show])
        .with_custom_endpoint(CustomEndpoint::new("pair", HttpMethod::Get, "{a}/{b}/"));
    let result = Router::builder()
        .resource("widgets", Arc::new(handler))
        .build();
    assert!(matches!(result, Err(ConfigError::InvalidCustomPath { .. })));
}
