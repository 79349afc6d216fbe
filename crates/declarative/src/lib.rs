//! # Declarative
//!
//! Resource type catalog and live state snapshots for declarative
//! reconciliation.
//!
//! This crate provides the leaf pieces of the reconciliation pipeline:
//!
//! - **Registry**: which resource types exist, which of their attributes
//!   reference other resources, and which are stored in external files
//! - **RawModel**: typed API objects as handed over by a [`LiveSource`]
//! - **LiveResource**: normalized snapshot of one live resource, with
//!   attributes as plain JSON values
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{collect_live_resources, LiveSource, RawModel, Registry};
//!
//! struct Snapshot;
//!
//! impl LiveSource for Snapshot {
//!     fn list(&self, type_tag: &str) -> anyhow::Result<Vec<RawModel>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let registry = Registry::userclouds();
//! let live = collect_live_resources(&registry, &Snapshot)?;
//! ```
//!
//! ## Attribute paths
//!
//! Attribute paths are dot-separated object keys (`"columns.column"`).
//! Sequence elements share the path of the sequence itself, so a reference
//! declared at `"columns.column"` applies to every element of `columns`.

pub mod error;
pub mod live;
pub mod model;
pub mod registry;
pub mod source;

pub use error::{Error, ErrorCategory, Result};
pub use live::{ID_FIELD, LiveResource, NAME_FIELD, SYSTEM_FIELD, VERSION_FIELD};
pub use model::{RawField, RawModel, RawValue};
pub use registry::{
    ListFn, Registry, ResourceTypeDescriptor, list_collection, list_retentions,
};
pub use source::{LiveSource, collect_live_resources};

/// Append `key` to a dotted attribute path.
pub fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Whether a reference attribute holds no reference: empty or the nil UUID.
pub fn is_unset_reference(value: &str) -> bool {
    value.is_empty() || uuid::Uuid::parse_str(value).is_ok_and(|id| id.is_nil())
}
