//! Terraform provider settings and resource addresses.

use declarative::LiveResource;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default provider version constraint.
pub const DEFAULT_PROVIDER_VERSION: &str = ">= 0.1.8";

/// Terraform provider the generated configuration targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSpec {
    /// Local name, also the resource type prefix
    pub name: String,
    /// Registry source address
    pub source: String,
    /// Version constraint
    pub version: String,
}

impl Default for ProviderSpec {
    fn default() -> Self {
        Self {
            name: "userclouds".to_string(),
            source: "registry.terraform.io/userclouds/userclouds".to_string(),
            version: DEFAULT_PROVIDER_VERSION.to_string(),
        }
    }
}

impl ProviderSpec {
    /// Terraform resource type for a registry type tag.
    pub fn resource_type(&self, type_tag: &str) -> String {
        format!("{}_{type_tag}", self.name)
    }

    /// Provider address as recorded in state.
    pub fn state_address(&self) -> String {
        format!("provider[\"{}\"]", self.source)
    }

    /// Full address of a live resource's block, e.g.
    /// `userclouds_userstore_column.manifestid-email`.
    pub fn resource_address(&self, resource: &LiveResource) -> String {
        format!(
            "{}.{}",
            self.resource_type(&resource.type_tag),
            block_name(resource)
        )
    }

    /// CLI configuration that makes Terraform use a local provider build.
    pub fn terraformrc(&self, dev_dir: &Path) -> String {
        let short = self
            .source
            .strip_prefix("registry.terraform.io/")
            .unwrap_or(&self.source);
        format!(
            "provider_installation {{\n  dev_overrides {{\n    \"{short}\" = \"{}\"\n  }}\n  direct {{}}\n}}\n",
            dev_dir.display()
        )
    }
}

/// Block name for a manifest entry.
pub fn manifest_block_name(manifest_id: &str) -> String {
    format!("manifestid-{manifest_id}")
}

/// Block name for a live resource: its manifest entry when matched,
/// otherwise derived from the remote identifier.
pub fn block_name(resource: &LiveResource) -> String {
    match &resource.manifest_id {
        Some(id) => manifest_block_name(id),
        None => format!("unmatched-{}", resource.remote_id),
    }
}
