//! # Storage Service
//!
//! A storage service exposed through `remple`: packages are stored in
//! locations, locations are paths within spaces, and pipelines produce the
//! packages.
//!
//! | Collection   | Handler            | Notes |
//! |--------------|--------------------|-------|
//! | `locations`  | [`resources::Locations`] | adds `GET /locations/{id}/browse/` |
//! | `spaces`     | [`resources::ModelResources`] | separate create and update schemas |
//! | `pipelines`  | [`resources::ModelResources`] | |
//! | `packages`   | [`resources::Packages`] | background storage, never deleted |
//! | `files`      | [`resources::ModelResources`] | registered read-only |
//!
//! Records live in per-collection [`store::RecordStore`] actors; see
//! [`lifecycle::StorageService`] for how they are wired and shut down.

pub mod lifecycle;
pub mod models;
pub mod resources;
pub mod schema;
pub mod store;

pub use lifecycle::StorageService;
