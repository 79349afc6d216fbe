//! Building a new manifest from live state.

use crate::error::Result;
use crate::rewrite::{ExternValuesDir, RewriteContext};
use crate::types::{DEFAULT_ENVIRONMENT, Manifest, ManifestResource};
use crate::validate::is_manifest_id_char;
use declarative::{LiveResource, Registry};
use std::collections::HashSet;

impl Manifest {
    /// Describe the non-system `live` resources as a manifest for
    /// `environment`.
    ///
    /// Matched resources keep their manifest ID; others get
    /// `<type>_<name>`, or their remote identifier when they have no name or
    /// the ID is already taken. Attributes are rewritten with symbolic tokens,
    /// writing external values into `extern_values` when given.
    pub fn generate(
        live: &[LiveResource],
        registry: &Registry,
        environment: &str,
        extern_values: Option<&ExternValuesDir>,
    ) -> Result<Self> {
        let mut used = HashSet::new();
        let mut resources = Vec::new();
        for resource in live.iter().filter(|r| !r.is_system) {
            let mut manifest_id = match (&resource.manifest_id, resource.name()) {
                (Some(id), _) => id.clone(),
                (None, Some(name)) => {
                    let name: String = name
                        .chars()
                        .map(|c| if is_manifest_id_char(c) { c } else { '_' })
                        .collect();
                    format!("{}_{name}", resource.type_tag)
                }
                (None, None) => resource.remote_id.clone(),
            };
            if used.contains(&manifest_id) {
                log::warn!(
                    "manifest ID {manifest_id} is already taken, using {} instead",
                    resource.remote_id
                );
                manifest_id = resource.remote_id.clone();
            }
            used.insert(manifest_id.clone());

            let mut entry = ManifestResource::new(&resource.type_tag, &manifest_id)
                .with_resource_id(DEFAULT_ENVIRONMENT, &resource.remote_id)
                .with_resource_id(environment, &resource.remote_id);
            entry.attributes = resource.attributes.clone();
            resources.push(entry);
        }

        let mut manifest = Self::new(resources);
        let ctx = RewriteContext {
            registry,
            manifest: &manifest,
            environment,
            live,
            extern_values,
        };
        let rewritten = manifest
            .resources
            .iter()
            .map(|entry| entry.rewrite_with_function_calls(&ctx))
            .collect::<Result<Vec<_>>>()?;
        for (entry, attributes) in manifest.resources.iter_mut().zip(rewritten) {
            entry.attributes = attributes;
        }

        log::info!("generated manifest with {} resources", manifest.len());
        Ok(manifest)
    }
}
