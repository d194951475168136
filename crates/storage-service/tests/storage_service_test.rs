use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use remple::{ApiConfig, HttpMethod, Request, Response};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use storage_service::StorageService;

fn service() -> StorageService {
    StorageService::new(ApiConfig::default()).unwrap()
}

fn id_of(response: &Response) -> String {
    response.body["id"].as_str().unwrap().to_string()
}

async fn create_space(service: &StorageService, path: &Path) -> String {
    let response = service
        .router()
        .dispatch(Request::post(
            "/spaces/",
            json!({ "access_protocol": "FS", "path": path.to_string_lossy() }),
        ))
        .await;
    assert_eq!(response.status, 201, "{}", response.body);
    id_of(&response)
}

async fn create_location(service: &StorageService, space: &str, relative_path: &str) -> String {
    let response = service
        .router()
        .dispatch(Request::post(
            "/locations/",
            json!({ "purpose": "AS", "space": space, "relative_path": relative_path }),
        ))
        .await;
    assert_eq!(response.status, 201, "{}", response.body);
    id_of(&response)
}

#[tokio::test]
async fn test_route_table_reflects_handlers_and_config() {
    let service = service();
    let table = service.router().table();

    assert!(table.contains(HttpMethod::Get, "/locations/{id}/browse/"));
    assert!(table.contains(HttpMethod::Delete, "/packages/{id}/"));
    assert_eq!(table.routes_for("spaces").count(), 10);

    let mut files: Vec<String> = table
        .routes_for("files")
        .map(|r| format!("{} {}", r.method(), r.template()))
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec![
            "GET /files/",
            "GET /files/new_search/",
            "GET /files/{id}/",
            "POST /files/search/",
            "SEARCH /files/",
        ]
    );

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_read_only_collection_rejects_create_with_405() {
    let service = service();
    let response = service
        .router()
        .dispatch(Request::post("/files/", json!({ "name": "a.txt" })))
        .await;

    assert_eq!(response.status, 405);
    assert_eq!(response.error_kind(), Some("MethodNotAllowed"));
    assert_eq!(response.body["allowed"], json!(["GET", "SEARCH"]));
    assert_eq!(
        response.body["message"],
        "The POST method is not allowed for this resource. The accepted methods are: GET, SEARCH"
    );
}

#[tokio::test]
async fn test_references_must_exist() {
    let service = service();
    let response = service
        .router()
        .dispatch(Request::post(
            "/locations/",
            json!({ "purpose": "AS", "space": "no-such-space" }),
        ))
        .await;

    assert_eq!(response.status, 400);
    assert_eq!(response.error_kind(), Some("ValidationError"));
    assert_eq!(
        response.body["message"],
        "space: There is no spaces record with id no-such-space."
    );
}

#[tokio::test]
async fn test_space_update_uses_its_own_schema() {
    let dir = tempfile::tempdir().unwrap();
    let service = service();
    let space = create_space(&service, dir.path()).await;

    let rejected = service
        .router()
        .dispatch(Request::put(
            format!("/spaces/{space}/"),
            json!({ "access_protocol": "S3" }),
        ))
        .await;
    assert_eq!(rejected.status, 400);
    assert!(rejected.body["message"]
        .as_str()
        .unwrap()
        .contains("access_protocol: The input field 'access_protocol' was not expected."));

    let updated = service
        .router()
        .dispatch(Request::put(format!("/spaces/{space}/"), json!({ "size": 1024 })))
        .await;
    assert_eq!(updated.status, 200);
    assert_eq!(updated.body["size"], 1024);
    assert_eq!(updated.body["access_protocol"], "FS");

    let edit = service
        .router()
        .dispatch(Request::get(format!("/spaces/{space}/edit/")))
        .await;
    assert_eq!(edit.status, 200);
    assert_eq!(edit.body["schema"], "SpaceUpdateSchema");
    assert_eq!(edit.body["data"]["id"], space.as_str());
}

#[tokio::test]
async fn test_new_describes_create_payload_with_options() {
    let dir = tempfile::tempdir().unwrap();
    let service = service();
    let space = create_space(&service, dir.path()).await;

    let response = service.router().dispatch(Request::get("/locations/new/")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["schema"], "LocationSchema");
    assert_eq!(response.body["fields"]["purpose"]["required"], true);
    assert_eq!(response.body["options"]["space"], json!([space]));
    assert_eq!(response.body["options"]["pipeline"], json!([]));
}

#[tokio::test]
async fn test_index_paginates() {
    let service = service();
    for n in 0..3 {
        let response = service
            .router()
            .dispatch(Request::post(
                "/pipelines/",
                json!({ "description": format!("pipeline {n}") }),
            ))
            .await;
        assert_eq!(response.status, 201);
    }

    let page = service
        .router()
        .dispatch(
            Request::get("/pipelines/")
                .query("page", "2")
                .query("items_per_page", "2"),
        )
        .await;
    assert_eq!(page.status, 200);
    assert_eq!(page.body["paginator"]["count"], 3);
    assert_eq!(page.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(page.body["items"][0]["description"], "pipeline 2");

    let bad = service
        .router()
        .dispatch(Request::get("/pipelines/").query("page", "0"))
        .await;
    assert_eq!(bad.status, 400);
}

#[tokio::test]
async fn test_search_by_verb_and_by_post_agree() {
    let service = service();
    for (description, enabled) in [("main", true), ("backup", false), ("spare", true)] {
        service
            .router()
            .dispatch(Request::post(
                "/pipelines/",
                json!({ "description": description, "enabled": enabled }),
            ))
            .await;
    }
    let query = json!({ "filter": { "enabled": true }, "paginator": { "items_per_page": 5 } });

    let by_verb = service
        .router()
        .dispatch(Request::new("SEARCH", "/pipelines/").json(query.clone()))
        .await;
    let by_post = service
        .router()
        .dispatch(Request::post("/pipelines/search/", query))
        .await;

    assert_eq!(by_verb.status, 200);
    assert_eq!(by_verb, by_post);
    let found: Vec<&str> = by_verb.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["description"].as_str().unwrap())
        .collect();
    assert_eq!(found, vec!["main", "spare"]);

    let unknown = service
        .router()
        .dispatch(Request::post(
            "/pipelines/search/",
            json!({ "filter": { "colour": "red" } }),
        ))
        .await;
    assert_eq!(unknown.status, 400);

    let metadata = service
        .router()
        .dispatch(Request::get("/pipelines/new_search/"))
        .await;
    assert!(metadata.body["search_parameters"]["attributes"]
        .as_array()
        .unwrap()
        .contains(&json!("enabled")));
}

#[tokio::test]
async fn test_delete_then_show_is_not_found() {
    let service = service();
    let created = service
        .router()
        .dispatch(Request::post("/pipelines/", json!({ "description": "old" })))
        .await;
    let id = id_of(&created);

    let deleted = service
        .router()
        .dispatch(Request::delete(format!("/pipelines/{id}/")))
        .await;
    assert_eq!(deleted.status, 200);

    let shown = service
        .router()
        .dispatch(Request::get(format!("/pipelines/{id}/")))
        .await;
    assert_eq!(shown.status, 404);
    assert_eq!(shown.error_kind(), Some("NotFound"));
    assert_eq!(
        shown.body["message"],
        format!("There is no pipeline with id {id}.")
    );
}

#[tokio::test]
async fn test_browse_lists_location_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("aips/batch/inner")).unwrap();
    std::fs::write(dir.path().join("aips/readme.txt"), b"hello").unwrap();

    let service = service();
    let space = create_space(&service, dir.path()).await;
    let location = create_location(&service, &space, "aips").await;

    let response = service
        .router()
        .dispatch(Request::get(format!("/locations/{location}/browse/")))
        .await;
    assert_eq!(response.status, 200, "{}", response.body);

    let batch = STANDARD.encode("batch");
    let readme = STANDARD.encode("readme.txt");
    assert_eq!(response.body["entries"], json!([batch, readme]));
    assert_eq!(response.body["directories"], json!([batch]));
    assert_eq!(response.body["properties"][&readme]["size"], 5);
    assert_eq!(response.body["properties"][&batch]["object count"], 1);

    let nested = service
        .router()
        .dispatch(Request::get(format!("/locations/{location}/browse/")).query("path", "batch"))
        .await;
    assert_eq!(nested.body["directories"], json!([STANDARD.encode("inner")]));
}

#[tokio::test]
async fn test_browse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let service = service();
    let space = create_space(&service, dir.path()).await;
    let location = create_location(&service, &space, "").await;

    let escape = service
        .router()
        .dispatch(Request::get(format!("/locations/{location}/browse/")).query("path", "../.."))
        .await;
    assert_eq!(escape.status, 403);

    let missing_dir = service
        .router()
        .dispatch(Request::get(format!("/locations/{location}/browse/")).query("path", "nope"))
        .await;
    assert_eq!(missing_dir.status, 404);

    let missing_location = service
        .router()
        .dispatch(Request::get("/locations/unknown/browse/"))
        .await;
    assert_eq!(missing_location.status, 404);
    assert_eq!(
        missing_location.body["message"],
        "There is no location with id unknown."
    );
}

#[tokio::test]
async fn test_package_is_stored_in_background_and_never_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("transfer.zip");
    std::fs::write(&source, b"package bytes").unwrap();

    let service = service();
    let space = create_space(&service, dir.path()).await;
    let location = create_location(&service, &space, "aips").await;

    let created = service
        .router()
        .dispatch(Request::post(
            "/packages/",
            json!({
                "current_location": location,
                "current_path": source.to_string_lossy(),
                "package_type": "AIP",
            }),
        ))
        .await;
    assert_eq!(created.status, 201, "{}", created.body);
    assert_eq!(created.body["status"], "PENDING");
    let id = id_of(&created);

    let mut status = Value::Null;
    for _ in 0..100 {
        let shown = service
            .router()
            .dispatch(Request::get(format!("/packages/{id}/")))
            .await;
        status = shown.body["status"].clone();
        if status != "PENDING" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status, "UPLOADED");
    let stored = dir.path().join("aips/transfer.zip");
    assert_eq!(std::fs::read(stored).unwrap(), b"package bytes");

    let deleted = service
        .router()
        .dispatch(Request::delete(format!("/packages/{id}/")))
        .await;
    assert_eq!(deleted.status, 403);
    assert_eq!(deleted.error_kind(), Some("Forbidden"));
    assert_eq!(deleted.body["message"], "Packages cannot be deleted.");

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_package_with_missing_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let service = service();
    let space = create_space(&service, dir.path()).await;
    let location = create_location(&service, &space, "aips").await;

    let created = service
        .router()
        .dispatch(Request::post(
            "/packages/",
            json!({
                "current_location": location,
                "current_path": dir.path().join("missing.zip").to_string_lossy(),
                "package_type": "SIP",
            }),
        ))
        .await;
    let id = id_of(&created);

    let store = service.store("packages").unwrap().clone();
    let mut record = None;
    for _ in 0..100 {
        let current = store.fetch(&id).await.unwrap();
        if current["status"] != "PENDING" {
            record = Some(current);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let record = record.expect("package status never changed");
    assert_eq!(record["status"], "FAIL");
    assert!(record.contains_key("status_reason"));
}

#[tokio::test]
async fn test_sample_config_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/storage.json");
    let config = ApiConfig::from_path(path).unwrap();
    assert_eq!(config.api_version, "beta");

    let service = StorageService::new(config).unwrap();
    let table = service.router().table();
    assert!(!table.contains(HttpMethod::Search, "/pipelines/"));
    assert!(!table.contains(HttpMethod::Get, "/pipelines/new_search/"));
    assert!(table.contains(HttpMethod::Search, "/files/"));

    let names: Vec<String> = service.router().routes().into_iter().map(|r| r.name).collect();
    assert!(names.contains(&"beta_locations_browse".to_string()));

    let docs = service.router().openapi();
    assert_eq!(docs["info"]["title"], "Storage Service");
    assert_eq!(
        docs["paths"]["/locations/{id}/browse/"]["get"]["operationId"],
        "locations.browse"
    );
    service.shutdown().await.unwrap();
}
