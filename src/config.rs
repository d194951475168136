//! API configuration.
//!
//! Loaded from JSON. Unknown keys anywhere in the document are a
//! [`ConfigError::InvalidConfig`], so a misspelled option fails startup instead
//! of being ignored.
//!
//! ```json
//! {
//!   "api_version": "beta",
//!   "service_name": "Storage Service",
//!   "resources": {
//!     "locations": { "searchable": false },
//!     "files": { "read_only": true }
//!   }
//! }
//! ```

use crate::descriptor::ResourceOverrides;
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Environment variable naming a config file for [`ApiConfig::from_env`].
pub const CONFIG_ENV_VAR: &str = "REMPLE_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiConfig {
    /// Prefix of every route name; also the documented API version.
    pub api_version: String,
    pub service_name: String,
    /// Overrides keyed by resource name.
    pub resources: BTreeMap<String, ResourceOverrides>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_version: "v1".to_string(),
            service_name: "Remple Service".to_string(),
            resources: BTreeMap::new(),
        }
    }
}

impl ApiConfig {
    pub fn new(api_version: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            service_name: service_name.into(),
            resources: BTreeMap::new(),
        }
    }

    /// Adds or replaces the overrides for one resource.
    pub fn with_overrides(mut self, resource: impl Into<String>, overrides: ResourceOverrides) -> Self {
        self.resources.insert(resource.into(), overrides);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        info!(path = %path.display(), "Loaded API config");
        Ok(config)
    }

    /// Reads the file named by `REMPLE_CONFIG`, or returns the defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }
}
