//! Terraform state synthesis.
//!
//! Writes a `terraform.tfstate` (format version 4) describing the live
//! resources, so Terraform treats them as already managed instead of trying
//! to import or recreate them. The format is internal to Terraform; field
//! names and constants here mirror what Terraform 1.5 writes.

use crate::error::{Error, Result};
use crate::naming::{ProviderSpec, block_name};
use declarative::{ID_FIELD, LiveResource, Registry, is_unset_reference, join_path};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State file format version.
pub const STATE_VERSION: u32 = 4;
/// Terraform version recorded in generated state.
pub const TERRAFORM_VERSION: &str = "1.5.3";

/// Top level of a `terraform.tfstate` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub version: u32,
    pub terraform_version: String,
    /// Incremented on every modification
    pub serial: u64,
    /// Random identifier fixed when the state is first created
    pub lineage: String,
    pub outputs: Map<String, Value>,
    pub resources: Vec<Resource>,
    pub check_results: Vec<Value>,
}

/// One resource block in state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Module address; empty for the root module
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub provider: String,
    pub instances: Vec<Instance>,
}

/// One instance of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    pub schema_version: u32,
    pub attributes: Map<String, Value>,
    pub sensitive_attributes: Vec<Value>,
    /// Addresses of resources this one depends on
    pub dependencies: Vec<String>,
}

impl State {
    /// State for every non-system live resource, in input order, with
    /// dependencies inferred from reference attributes.
    pub fn synthesize(
        live: &[LiveResource],
        registry: &Registry,
        provider: &ProviderSpec,
    ) -> Result<Self> {
        let mut resources = Vec::new();
        for resource in live.iter().filter(|r| !r.is_system) {
            let mut dependencies = Vec::new();
            for (key, value) in &resource.attributes {
                let found = &mut dependencies;
                collect_dependencies(value, key, resource, registry, live, provider, found)
                    .map_err(|e| e.in_attribute(&resource.describe(), key))?;
            }

            let mut attributes = resource.attributes.clone();
            attributes.insert(ID_FIELD.to_string(), Value::String(resource.remote_id.clone()));

            resources.push(Resource {
                module: String::new(),
                mode: "managed".to_string(),
                resource_type: provider.resource_type(&resource.type_tag),
                name: block_name(resource),
                provider: provider.state_address(),
                instances: vec![Instance {
                    status: String::new(),
                    schema_version: 0,
                    attributes,
                    sensitive_attributes: Vec::new(),
                    dependencies,
                }],
            });
        }
        log::debug!("synthesized state for {} resources", resources.len());

        Ok(Self {
            version: STATE_VERSION,
            terraform_version: TERRAFORM_VERSION.to_string(),
            serial: 1,
            lineage: uuid::Uuid::new_v4().to_string(),
            outputs: Map::new(),
            resources,
            check_results: Vec::new(),
        })
    }

    /// Serialize as Terraform writes it: two-space indented JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn collect_dependencies(
    value: &Value,
    path: &str,
    resource: &LiveResource,
    registry: &Registry,
    live: &[LiveResource],
    provider: &ProviderSpec,
    out: &mut Vec<String>,
) -> Result<()> {
    match value {
        Value::String(id) => {
            let Some(target) = registry.reference_target(&resource.type_tag, path)? else {
                return Ok(());
            };
            if is_unset_reference(id) {
                return Ok(());
            }
            let referenced = live
                .iter()
                .find(|r| r.type_tag == target.type_tag && &r.remote_id == id)
                .ok_or_else(|| Error::UnresolvedDependency {
                    type_tag: target.type_tag.clone(),
                    path: path.to_string(),
                    id: id.clone(),
                })?;
            // System resources are not in the configuration
            if referenced.is_system {
                return Ok(());
            }
            let address = provider.resource_address(referenced);
            if !out.contains(&address) {
                out.push(address);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_dependencies(item, path, resource, registry, live, provider, out)?;
            }
        }
        Value::Object(object) => {
            for (key, item) in object {
                let path = join_path(path, key);
                collect_dependencies(item, &path, resource, registry, live, provider, out)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}
