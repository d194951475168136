//! Locations, with a custom endpoint for browsing the files under one.
//!
//! A location's directory is its space's `path` joined with the location's
//! `relative_path`. `GET /locations/{id}/browse/?path=sub/dir` lists a
//! directory below it. Names are returned base64-encoded because file names
//! need not be valid UTF-8.

use super::ModelResources;
use crate::models::SPACES;
use crate::store::Record;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use remple::{
    CapabilitySet, CustomEndpoint, HttpMethod, Resource, ResourceError, ResourceRequest,
    ResourceResult,
};
use serde_json::{json, Map, Value};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

pub const BROWSE_ACTION: &str = "browse";

#[derive(Debug, Clone)]
pub struct Locations {
    inner: ModelResources,
}

impl Locations {
    pub fn new(inner: ModelResources) -> Self {
        Self { inner }
    }

    async fn browse(&self, request: ResourceRequest) -> ResourceResult {
        let location = self.inner.fetch(&request).await?;
        let root = self.location_root(&location).await?;
        let target = resolve(&root, request.query_param("path").unwrap_or_default())?;
        info!(location = request.id.as_deref(), path = %target.display(), "Browsing location");
        browse_directory(&target).await
    }

    async fn location_root(&self, location: &Record) -> Result<PathBuf, ResourceError> {
        let space_id = location
            .get("space")
            .and_then(Value::as_str)
            .ok_or_else(|| ResourceError::Validation("The location has no space.".into()))?;
        let space = self
            .inner
            .stores()
            .client(SPACES)?
            .get(space_id)
            .await?
            .ok_or_else(|| ResourceError::NotFound(format!("There is no space with id {space_id}.")))?;

        let space_path = space.get("path").and_then(Value::as_str).unwrap_or_default();
        let relative = location
            .get("relative_path")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if space_path.is_empty() {
            return Err(ResourceError::Validation(
                "The location's space has no path to browse.".into(),
            ));
        }
        Ok(Path::new(space_path).join(relative))
    }
}

/// Joins `requested` onto `root`, accepting a path that already starts with
/// the root. Any `..` component is refused.
fn resolve(root: &Path, requested: &str) -> Result<PathBuf, ResourceError> {
    let requested = Path::new(requested);
    let target = if requested.starts_with(root) {
        requested.to_path_buf()
    } else if requested.is_absolute() {
        return Err(forbidden());
    } else {
        root.join(requested)
    };
    if target.components().any(|c| c == Component::ParentDir) {
        return Err(forbidden());
    }
    Ok(target)
}

fn forbidden() -> ResourceError {
    ResourceError::Forbidden("You are not authorized to access this resource.".into())
}

fn encode(name: &std::ffi::OsStr) -> String {
    STANDARD.encode(name.as_encoded_bytes())
}

/// `{entries, directories, properties}` for one directory, sorted by name.
async fn browse_directory(path: &Path) -> ResourceResult {
    let mut dir = tokio::fs::read_dir(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            ResourceError::NotFound(format!("Path does not exist: {}", path.display()))
        }
        _ => {
            warn!(path = %path.display(), error = %e, "Unable to browse");
            ResourceError::other(e)
        }
    })?;

    let mut found = Vec::new();
    while let Some(entry) = dir.next_entry().await.map_err(ResourceError::other)? {
        let metadata = entry.metadata().await.map_err(ResourceError::other)?;
        found.push((entry.file_name(), entry.path(), metadata));
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));

    let mut entries = Vec::new();
    let mut directories = Vec::new();
    let mut properties = Map::new();
    for (name, full_path, metadata) in found {
        let encoded = encode(&name);
        if metadata.is_dir() {
            directories.push(encoded.clone());
            if let Some(count) = object_count(&full_path).await {
                properties.insert(encoded.clone(), json!({ "object count": count }));
            }
        } else {
            properties.insert(encoded.clone(), json!({ "size": metadata.len() }));
        }
        entries.push(encoded);
    }

    Ok(json!({
        "entries": entries,
        "directories": directories,
        "properties": properties,
    }))
}

/// Number of entries directly inside `path`, if it can be read.
async fn object_count(path: &Path) -> Option<usize> {
    let mut dir = tokio::fs::read_dir(path).await.ok()?;
    let mut count = 0;
    while let Ok(Some(_)) = dir.next_entry().await {
        count += 1;
    }
    Some(count)
}

#[async_trait]
impl Resource for Locations {
    fn capabilities(&self) -> CapabilitySet {
        self.inner.capabilities()
    }

    fn custom_endpoints(&self) -> Vec<CustomEndpoint> {
        vec![
            CustomEndpoint::new(BROWSE_ACTION, HttpMethod::Get, "{pk}/browse/")
                .summary("Browse a location"),
        ]
    }

    async fn create(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.create(request).await
    }

    async fn new(&self, request: ResourceRequest) -> ResourceResult {
        Resource::new(&self.inner, request).await
    }

    async fn index(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.index(request).await
    }

    async fn show(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.show(request).await
    }

    async fn update(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.update(request).await
    }

    async fn edit(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.edit(request).await
    }

    async fn delete(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.delete(request).await
    }

    async fn search(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.search(request).await
    }

    async fn new_search(&self, request: ResourceRequest) -> ResourceResult {
        self.inner.new_search(request).await
    }

    async fn custom(&self, action: &str, request: ResourceRequest) -> ResourceResult {
        match action {
            BROWSE_ACTION => self.browse(request).await,
            other => Err(ResourceError::UnknownAction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_relative_paths() {
        let root = Path::new("/srv/space/aips");
        assert_eq!(resolve(root, "").unwrap(), PathBuf::from("/srv/space/aips"));
        assert_eq!(
            resolve(root, "2024/batch").unwrap(),
            PathBuf::from("/srv/space/aips/2024/batch")
        );
        assert_eq!(
            resolve(root, "/srv/space/aips/2024").unwrap(),
            PathBuf::from("/srv/space/aips/2024")
        );
    }

    #[test]
    fn test_resolve_refuses_escapes() {
        let root = Path::new("/srv/space/aips");
        assert!(matches!(resolve(root, "../other"), Err(ResourceError::Forbidden(_))));
        assert!(matches!(resolve(root, "/etc"), Err(ResourceError::Forbidden(_))));
    }
}
