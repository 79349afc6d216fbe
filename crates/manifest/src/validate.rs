//! Structural validation of manifests.

use crate::error::{Error, Result};
use crate::types::{DEFAULT_ENVIRONMENT, Manifest};
use declarative::Registry;
use std::collections::HashSet;

impl Manifest {
    /// Check every entry against the registry for `environment`.
    ///
    /// Stops at the first malformed entry.
    pub fn validate(&self, registry: &Registry, environment: &str) -> Result<()> {
        let mut seen = HashSet::new();
        for (index, resource) in self.resources.iter().enumerate() {
            let fail = |message: String| Err(Error::Validation { index, message });
            if !registry.contains(&resource.type_tag) {
                return fail(format!(
                    "uc_terraform_type \"{}\" is not a registered resource type",
                    resource.type_tag
                ));
            }
            if resource.manifest_id.is_empty() {
                return fail("manifest_id is required".to_string());
            }
            if let Some(c) = resource.manifest_id.chars().find(|c| !is_manifest_id_char(*c)) {
                return fail(format!(
                    "manifest_id \"{}\" contains {c:?}; use letters, digits, '_' or '-'",
                    resource.manifest_id
                ));
            }
            if !seen.insert(resource.manifest_id.as_str()) {
                return fail(format!(
                    "manifest_id \"{}\" is used by more than one resource",
                    resource.manifest_id
                ));
            }
            if resource.resource_id(environment).is_none() {
                return fail(format!(
                    "resource_uuids must include an identifier for environment \"{environment}\" \
                     or a {DEFAULT_ENVIRONMENT} entry"
                ));
            }
        }
        Ok(())
    }
}

/// Characters allowed in a manifest ID, which ends up in Terraform block
/// labels and references.
pub(crate) fn is_manifest_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
