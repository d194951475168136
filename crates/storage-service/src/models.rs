//! The collections the storage service exposes and the schemas that guard
//! their payloads.
//!
//! A package is stored in a location; a location is a path inside a space;
//! pipelines produce the packages; files are the rows describing what a
//! package contains.

use crate::schema::{FieldKind, Schema};
use crate::store::ID_FIELD;

pub const LOCATIONS: &str = "locations";
pub const SPACES: &str = "spaces";
pub const PIPELINES: &str = "pipelines";
pub const PACKAGES: &str = "packages";
pub const FILES: &str = "files";

pub const LOCATION_PURPOSES: &[&str] = &[
    "AR", // AIP recovery
    "AS", // AIP storage
    "CP", // currently processing
    "DS", // DIP storage
    "SD", // SWORD deposit
    "SS", // storage service internal
    "BL", // transfer backlog
    "TS", // transfer source
    "RP", // replicator
];

pub const ACCESS_PROTOCOLS: &[&str] = &[
    "ARKIVUM", "DV", "DC", "DSPACE", "FEDORA", "GPG", "FS", "LOM", "NFS", "PIPE_FS", "S3", "SWIFT",
];

pub const PACKAGE_TYPES: &[&str] = &["AIP", "AIC", "SIP", "DIP", "transfer", "file", "deposit"];

pub const PACKAGE_STATUSES: &[&str] = &[
    "PENDING", "STAGING", "UPLOADED", "VERIFIED", "FAIL", "DEL_REQ", "DELETED", "MOVING", "FINALIZE",
];

/// A collection plus the schemas for creating and updating its records.
#[derive(Debug, Clone)]
pub struct Model {
    pub collection: &'static str,
    /// Singular name used in messages, e.g. `location`.
    pub member: &'static str,
    pub create: Schema,
    pub update: Schema,
}

impl Model {
    /// A model whose create and update payloads share one schema.
    pub fn new(collection: &'static str, member: &'static str, schema: Schema) -> Self {
        Self {
            collection,
            member,
            create: schema.clone(),
            update: schema,
        }
    }

    pub fn with_update_schema(mut self, update: Schema) -> Self {
        self.update = update;
        self
    }

    /// Fields a search filter may name: the id plus every create and update
    /// field.
    pub fn searchable_fields(&self) -> Vec<&'static str> {
        let mut fields = vec![ID_FIELD];
        for name in self
            .create
            .field_names()
            .chain(self.update.field_names())
        {
            if !fields.contains(&name) {
                fields.push(name);
            }
        }
        fields
    }
}

pub fn location() -> Model {
    let schema = Schema::new("LocationSchema")
        .field("description", FieldKind::Text { max: Some(256) })
        .required("purpose", FieldKind::OneOf(LOCATION_PURPOSES))
        .field("relative_path", FieldKind::Text { max: None })
        .field("quota", FieldKind::Integer { min: Some(0) })
        .field("enabled", FieldKind::Bool)
        .required("space", FieldKind::Reference(SPACES))
        .field("pipeline", FieldKind::ReferenceList(PIPELINES))
        .field("replicators", FieldKind::ReferenceList(LOCATIONS));
    Model::new(LOCATIONS, "location", schema)
}

/// Spaces pick their access protocol once; updates may only touch the
/// remaining fields.
pub fn space() -> Model {
    let update = Schema::new("SpaceUpdateSchema")
        .field("size", FieldKind::Integer { min: Some(0) })
        .field("path", FieldKind::Text { max: Some(256) })
        .field("staging_path", FieldKind::Text { max: Some(256) });
    let create = Schema::new("SpaceCreateSchema")
        .required("access_protocol", FieldKind::OneOf(ACCESS_PROTOCOLS))
        .extend(&update);
    Model::new(SPACES, "space", create).with_update_schema(update)
}

pub fn pipeline() -> Model {
    let schema = Schema::new("PipelineSchema")
        .field("api_key", FieldKind::Text { max: Some(256) })
        .field("api_username", FieldKind::Text { max: Some(256) })
        .field("description", FieldKind::Text { max: Some(256) })
        .field("enabled", FieldKind::Bool)
        .field("remote_name", FieldKind::Uri);
    Model::new(PIPELINES, "pipeline", schema)
}

/// Packages are created by clients, but their status and stored path belong
/// to the service.
pub fn package() -> Model {
    let create = Schema::new("PackageSchema")
        .required("current_location", FieldKind::Reference(LOCATIONS))
        .required("current_path", FieldKind::Text { max: None })
        .required("package_type", FieldKind::OneOf(PACKAGE_TYPES))
        .field("description", FieldKind::Text { max: Some(256) })
        .field("origin_pipeline", FieldKind::Reference(PIPELINES))
        .field("size", FieldKind::Integer { min: Some(0) })
        .field("related_packages", FieldKind::ReferenceList(PACKAGES));
    let update = Schema::new("PackageSchema")
        .field("description", FieldKind::Text { max: Some(256) })
        .field("status", FieldKind::OneOf(PACKAGE_STATUSES));
    Model {
        collection: PACKAGES,
        member: "package",
        create,
        update,
    }
}

pub fn file() -> Model {
    let schema = Schema::new("FileSchema")
        .required("name", FieldKind::Text { max: None })
        .required("package", FieldKind::Reference(PACKAGES))
        .field("source_id", FieldKind::Text { max: Some(128) })
        .field("checksum", FieldKind::Text { max: Some(128) })
        .field("stored", FieldKind::Bool)
        .field("size", FieldKind::Integer { min: Some(0) });
    Model::new(FILES, "file", schema)
}
