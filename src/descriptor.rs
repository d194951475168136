//! Resource descriptors and the registry they live in.
//!
//! A [`ResourceDescriptor`] pairs a collection name with a shared handler and a
//! [`ResourceConfig`]. The config narrows what the handler advertises: it can
//! hide the search routes or the mutating routes, never add routes the handler
//! lacks.

use crate::capability::{Capability, CapabilitySet};
use crate::error::ConfigError;
use crate::resource::Resource;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Per-resource switches applied on top of the handler's capability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceConfig {
    /// When false, `search` and `new_search` get no routes.
    pub searchable: bool,
    /// When true, `create`, `new`, `update`, `edit` and `delete` get no routes.
    pub read_only: bool,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            searchable: true,
            read_only: false,
        }
    }
}

impl ResourceConfig {
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Whether the config lets `capability` through.
    pub fn permits(&self, capability: Capability) -> bool {
        if !self.searchable && capability.is_search() {
            return false;
        }
        if self.read_only && capability.is_mutating() {
            return false;
        }
        true
    }
}

/// Optional overrides for a [`ResourceConfig`], as read from a config file.
///
/// Unknown keys are rejected so a typo cannot silently leave a resource
/// writable or searchable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceOverrides {
    #[serde(default)]
    pub searchable: Option<bool>,
    #[serde(default)]
    pub read_only: Option<bool>,
}

impl ResourceOverrides {
    pub fn apply(&self, config: &mut ResourceConfig) {
        if let Some(searchable) = self.searchable {
            config.searchable = searchable;
        }
        if let Some(read_only) = self.read_only {
            config.read_only = read_only;
        }
    }
}

/// A named handler plus its configuration.
#[derive(Clone)]
pub struct ResourceDescriptor {
    name: Arc<str>,
    handler: Arc<dyn Resource>,
    /// The handler's capability set, read once at registration.
    advertised: CapabilitySet,
    config: ResourceConfig,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<Arc<str>>, handler: Arc<dyn Resource>) -> Self {
        Self::with_config(name, handler, ResourceConfig::default())
    }

    pub fn with_config(
        name: impl Into<Arc<str>>,
        handler: Arc<dyn Resource>,
        config: ResourceConfig,
    ) -> Self {
        Self {
            name: name.into(),
            advertised: handler.capabilities(),
            handler,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    pub fn handler(&self) -> &Arc<dyn Resource> {
        &self.handler
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ResourceConfig {
        &mut self.config
    }

    /// What the handler advertised at registration.
    pub fn advertised_capabilities(&self) -> CapabilitySet {
        self.advertised
    }

    /// What the handler advertises, narrowed by the config. A derived
    /// read-only resource loses `new` and `edit` as well.
    pub fn effective_capabilities(&self) -> CapabilitySet {
        let config = self.config.read_only(self.is_read_only());
        self.advertised
            .filter(|capability| config.permits(capability))
    }

    /// Read-only by configuration, or because the handler cannot create,
    /// update or delete anything.
    pub fn is_read_only(&self) -> bool {
        self.config.read_only
            || ![Capability::Create, Capability::Update, Capability::Delete]
                .into_iter()
                .any(|c| self.advertised.contains(c))
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("name", &self.name)
            .field("capabilities", &self.advertised)
            .field("config", &self.config)
            .finish()
    }
}

/// The set of resources a router is built from.
///
/// Registration order is preserved and becomes the route table order.
/// Duplicate names are accepted here and rejected by
/// [`RouteTableBuilder`](crate::RouteTableBuilder), so the error surfaces at
/// startup in one place.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    descriptors: Vec<ResourceDescriptor>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: ResourceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ResourceDescriptor> {
        self.descriptors.iter_mut().find(|d| d.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Checks names are well-formed and unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for descriptor in &self.descriptors {
            let name = descriptor.name();
            if !is_valid_name(name) {
                return Err(ConfigError::InvalidResourceName(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateResource(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Collection names become path segments: ASCII letters, digits, `_` and `-`.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
