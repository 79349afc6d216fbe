//! Data types for the manifest crate

use declarative::NAME_FIELD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key of the fallback identifier in a resource's identifier map.
pub const DEFAULT_ENVIRONMENT: &str = "__DEFAULT";

/// Declarative description of a set of resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: Vec<ManifestResource>,
}

/// One declared resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestResource {
    #[serde(rename = "uc_terraform_type", default)]
    pub type_tag: String,
    /// Stable across time and environments; not necessarily a UUID
    #[serde(default)]
    pub manifest_id: String,
    /// Environment name -> remote identifier
    #[serde(rename = "resource_uuids", default)]
    pub resource_ids: BTreeMap<String, String>,
    /// Literal values or symbolic function-call tokens
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ManifestResource {
    pub fn new(type_tag: &str, manifest_id: &str) -> Self {
        Self {
            type_tag: type_tag.to_string(),
            manifest_id: manifest_id.to_string(),
            ..Self::default()
        }
    }

    /// Record the remote identifier for an environment.
    pub fn with_resource_id(mut self, environment: &str, id: &str) -> Self {
        self.resource_ids
            .insert(environment.to_string(), id.to_string());
        self
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Identifier recorded specifically for `environment`.
    pub fn explicit_resource_id(&self, environment: &str) -> Option<&str> {
        self.resource_ids
            .get(environment)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Identifier for `environment`, falling back to `__DEFAULT`.
    pub fn resource_id(&self, environment: &str) -> Option<&str> {
        self.explicit_resource_id(environment).or_else(|| {
            self.resource_ids
                .get(DEFAULT_ENVIRONMENT)
                .map(String::as_str)
                .filter(|id| !id.is_empty())
        })
    }

    /// Value of the `name` attribute when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get(NAME_FIELD).and_then(Value::as_str)
    }
}

impl Manifest {
    pub fn new(resources: Vec<ManifestResource>) -> Self {
        Self { resources }
    }

    /// Find an entry by manifest ID.
    pub fn get(&self, manifest_id: &str) -> Option<&ManifestResource> {
        self.resources.iter().find(|r| r.manifest_id == manifest_id)
    }

    /// Find the entry of `type_tag` whose identifier for `environment` is `id`.
    pub fn find_by_resource_id(
        &self,
        type_tag: &str,
        environment: &str,
        id: &str,
    ) -> Option<&ManifestResource> {
        self.resources
            .iter()
            .find(|r| r.type_tag == type_tag && r.resource_id(environment) == Some(id))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
