//! Catalog of supported resource types.
//!
//! Each [`ResourceTypeDescriptor`] answers three questions about a type:
//! how to list its live instances, which attribute paths reference other
//! resources, and which attribute paths are stored in external files.
//! Attribute paths are dot-separated (`"columns.column"`); sequences do not
//! add a path segment.

use crate::error::{Error, Result};
use crate::model::{RawModel, RawValue};
use crate::source::LiveSource;
use std::collections::{BTreeMap, BTreeSet};

/// Capability that lists the raw models of one resource type.
pub type ListFn = fn(&dyn LiveSource, &ResourceTypeDescriptor) -> anyhow::Result<Vec<RawModel>>;

/// Static description of one resource type.
#[derive(Debug, Clone)]
pub struct ResourceTypeDescriptor {
    pub type_tag: String,
    pub list: ListFn,
    /// Attribute path -> type tag of the referenced resource
    pub references: BTreeMap<String, String>,
    /// Attribute path -> file extension for externally stored values
    pub external: BTreeMap<String, String>,
    /// Attributes never carried into live resources
    pub omit: BTreeSet<String>,
}

impl ResourceTypeDescriptor {
    /// Describe a type listed straight from its collection.
    pub fn new(type_tag: &str) -> Self {
        Self {
            type_tag: type_tag.to_string(),
            list: list_collection,
            references: BTreeMap::new(),
            external: BTreeMap::new(),
            omit: BTreeSet::new(),
        }
    }

    /// Declare that `path` holds the identifier of a `target` resource.
    pub fn reference(mut self, path: &str, target: &str) -> Self {
        self.references.insert(path.to_string(), target.to_string());
        self
    }

    /// Declare that `path` is written to an external file with `extension`.
    pub fn external(mut self, path: &str, extension: &str) -> Self {
        self.external.insert(path.to_string(), extension.to_string());
        self
    }

    /// Declare attributes to drop during normalization.
    pub fn omit(mut self, names: &[&str]) -> Self {
        self.omit.extend(names.iter().map(|n| (*n).to_string()));
        self
    }

    /// Replace the listing capability.
    pub fn lister(mut self, list: ListFn) -> Self {
        self.list = list;
        self
    }

    /// Type tag referenced by `path`, if any.
    pub fn reference_at(&self, path: &str) -> Option<&str> {
        self.references.get(path).map(String::as_str)
    }

    /// File extension for externally stored values at `path`, if any.
    pub fn external_at(&self, path: &str) -> Option<&str> {
        self.external.get(path).map(String::as_str)
    }

    /// List the raw models of this type through `source`.
    pub fn list_live(&self, source: &dyn LiveSource) -> Result<Vec<RawModel>> {
        (self.list)(source, self).map_err(|source| Error::Listing {
            type_tag: self.type_tag.clone(),
            source,
        })
    }
}

/// Default listing: everything the collaborator returns for the type.
pub fn list_collection(
    source: &dyn LiveSource,
    descriptor: &ResourceTypeDescriptor,
) -> anyhow::Result<Vec<RawModel>> {
    source.list(&descriptor.type_tag)
}

/// Listing for retention durations: inherited defaults are not resources of
/// their own and are skipped.
pub fn list_retentions(
    source: &dyn LiveSource,
    descriptor: &ResourceTypeDescriptor,
) -> anyhow::Result<Vec<RawModel>> {
    let models = source.list(&descriptor.type_tag)?;
    Ok(models
        .into_iter()
        .filter(|m| {
            !matches!(
                m.field("use_default").map(|f| &f.value),
                Some(RawValue::Bool(true))
            )
        })
        .collect())
}

/// Read-only set of resource type descriptors, looked up by type tag.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: Vec<ResourceTypeDescriptor>,
}

impl Registry {
    /// Build a registry from descriptors, keeping their order.
    pub fn new(types: Vec<ResourceTypeDescriptor>) -> Self {
        Self { types }
    }

    /// The UserClouds resource catalog.
    pub fn userclouds() -> Self {
        // default_duration is computed from tenant/purpose settings; purpose_name
        // duplicates purpose_id and would drift on renames.
        let retention_omit = ["default_duration", "purpose_name"];

        Self::new(vec![
            ResourceTypeDescriptor::new("userstore_column"),
            ResourceTypeDescriptor::new("userstore_column_soft_deleted_retention_duration")
                .lister(list_retentions)
                .reference("column_id", "userstore_column")
                .reference("purpose_id", "userstore_purpose")
                .omit(&retention_omit),
            ResourceTypeDescriptor::new("userstore_accessor")
                .reference("access_policy", "access_policy")
                .reference("columns.column", "userstore_column")
                .reference("columns.transformer", "transformer")
                .reference("purposes", "userstore_purpose"),
            ResourceTypeDescriptor::new("userstore_mutator")
                .reference("access_policy", "access_policy")
                .reference("columns.column", "userstore_column")
                .reference("columns.normalizer", "transformer"),
            ResourceTypeDescriptor::new("userstore_purpose"),
            ResourceTypeDescriptor::new("access_policy")
                .reference("components.policy", "access_policy")
                .reference("components.template", "access_policy_template"),
            ResourceTypeDescriptor::new("access_policy_template").external("function", ".js"),
            ResourceTypeDescriptor::new("transformer").external("function", ".js"),
        ])
    }

    /// Look up a descriptor by type tag.
    pub fn get(&self, type_tag: &str) -> Option<&ResourceTypeDescriptor> {
        self.types.iter().find(|t| t.type_tag == type_tag)
    }

    /// Look up a descriptor, failing for unregistered tags.
    pub fn lookup(&self, type_tag: &str) -> Result<&ResourceTypeDescriptor> {
        self.get(type_tag)
            .ok_or_else(|| Error::UnknownType(type_tag.to_string()))
    }

    /// Whether `type_tag` is registered.
    pub fn contains(&self, type_tag: &str) -> bool {
        self.get(type_tag).is_some()
    }

    /// Descriptor of the type referenced at `path` of `type_tag`, if the
    /// path is a reference.
    ///
    /// Fails when either type tag is unregistered.
    pub fn reference_target(
        &self,
        type_tag: &str,
        path: &str,
    ) -> Result<Option<&ResourceTypeDescriptor>> {
        match self.lookup(type_tag)?.reference_at(path) {
            Some(target) => self.lookup(target).map(Some),
            None => Ok(None),
        }
    }

    /// Check that every reference map names a registered type.
    pub fn validate(&self) -> Result<()> {
        for descriptor in &self.types {
            for (path, target) in &descriptor.references {
                if !self.contains(target) {
                    return Err(Error::malformed(
                        &descriptor.type_tag,
                        format!("reference at {path} names unknown type {target}"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// All descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceTypeDescriptor> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
