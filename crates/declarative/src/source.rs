//! Live-listing collaborator seam and collection of live resources.

use crate::error::Result;
use crate::live::LiveResource;
use crate::model::RawModel;
use crate::registry::Registry;
use rayon::prelude::*;

/// Provider of raw API models for a resource type.
///
/// Implement this trait to connect the registry to a remote API, a recorded
/// snapshot, or test fixtures.
pub trait LiveSource: Send + Sync {
    /// List every raw model of the given type.
    fn list(&self, type_tag: &str) -> anyhow::Result<Vec<RawModel>>;
}

/// List and normalize the live resources of every registered type.
///
/// Types are fetched in parallel; the result keeps registry order and the
/// order the source returned instances in.
pub fn collect_live_resources(
    registry: &Registry,
    source: &dyn LiveSource,
) -> Result<Vec<LiveResource>> {
    let descriptors: Vec<_> = registry.iter().collect();
    let per_type: Vec<Result<Vec<LiveResource>>> = descriptors
        .par_iter()
        .map(|descriptor| {
            let models = descriptor.list_live(source)?;
            log::debug!(
                "listed {} {} resources",
                models.len(),
                descriptor.type_tag
            );
            models
                .iter()
                .map(|model| LiveResource::normalize(descriptor, model))
                .collect()
        })
        .collect();

    let mut out = Vec::new();
    for resources in per_type {
        out.extend(resources?);
    }
    Ok(out)
}
