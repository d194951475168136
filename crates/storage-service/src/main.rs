//! Scripted demo of the storage service.
//!
//! ```text
//! cargo run -p storage-service -- crates/storage-service/config/storage.json
//! ```
//!
//! With no argument the config is read from `REMPLE_CONFIG`, falling back to
//! the defaults. Set `RUST_LOG=debug` to see route matching.

use remple::tracing::setup_tracing;
use remple::{ApiConfig, Request, Response};
use serde_json::json;
use storage_service::StorageService;
use tracing::{info, info_span, warn, Instrument};

fn show(label: &str, response: &Response) {
    if response.is_success() {
        info!(label, status = response.status, body = %response.body, "OK");
    } else {
        warn!(label, status = response.status, body = %response.body, "Failed");
    }
}

fn id_of(response: &Response) -> Result<String, String> {
    response.body["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("response has no id: {}", response.body))
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => ApiConfig::from_path(path),
        None => ApiConfig::from_env(),
    }
    .map_err(|e| e.to_string())?;

    let service = StorageService::new(config).map_err(|e| e.to_string())?;
    let router = service.router();
    for route in router.routes() {
        info!("{route}");
    }

    let root = std::env::temp_dir().join("remple-storage-demo");
    tokio::fs::create_dir_all(root.join("aips/2024"))
        .await
        .map_err(|e| e.to_string())?;
    let source = root.join("transfer.zip");
    tokio::fs::write(&source, b"demo package")
        .await
        .map_err(|e| e.to_string())?;

    let location_id = async {
        let space = router
            .dispatch(Request::post(
                "/spaces/",
                json!({ "access_protocol": "FS", "path": root.to_string_lossy(), "size": 0 }),
            ))
            .await;
        show("create space", &space);

        let location = router
            .dispatch(Request::post(
                "/locations/",
                json!({
                    "purpose": "AS",
                    "relative_path": "aips",
                    "description": "AIP storage",
                    "space": id_of(&space)?,
                }),
            ))
            .await;
        show("create location", &location);
        id_of(&location)
    }
    .instrument(info_span!("setup"))
    .await?;

    let browse = router
        .dispatch(Request::get(format!("/locations/{location_id}/browse/")))
        .await;
    show("browse location", &browse);

    let package = router
        .dispatch(Request::post(
            "/packages/",
            json!({
                "current_location": location_id,
                "current_path": source.to_string_lossy(),
                "package_type": "AIP",
            }),
        ))
        .await;
    show("create package", &package);
    let package_id = id_of(&package)?;

    // Storage runs in the background.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    show(
        "show package",
        &router
            .dispatch(Request::get(format!("/packages/{package_id}/")))
            .await,
    );
    show(
        "delete package",
        &router
            .dispatch(Request::delete(format!("/packages/{package_id}/")))
            .await,
    );
    show(
        "search locations",
        &router
            .dispatch(Request::new("SEARCH", "/locations/").json(json!({ "filter": { "purpose": "AS" } })))
            .await,
    );
    show(
        "patch location",
        &router
            .dispatch(Request::new("PATCH", format!("/locations/{location_id}/")))
            .await,
    );
    show(
        "create file",
        &router
            .dispatch(Request::post("/files/", json!({ "name": "a.txt" })))
            .await,
    );

    let docs = router.openapi();
    info!(paths = docs["paths"].as_object().map(|p| p.len()), "OpenAPI document generated");

    service.shutdown().await?;
    info!("Demo completed");
    Ok(())
}
