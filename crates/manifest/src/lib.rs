//! # Manifest
//!
//! Declarative resource manifests and their reconciliation with live state.
//!
//! This crate provides functionality to:
//! - Load, validate and store manifests (JSON or YAML)
//! - Match live resources to manifest entries by identifier, then by name
//! - Rewrite cross-resource references and externally stored values as
//!   symbolic `@NAME(args).path` tokens
//! - Generate a fresh manifest from live state
//!
//! ## Example
//!
//! ```no_run
//! use declarative::{LiveResource, Registry};
//! use manifest::Manifest;
//! use std::path::Path;
//!
//! let registry = Registry::userclouds();
//! let mut manifest = Manifest::load(Path::new("tenant.yaml"))?;
//! manifest.validate(&registry, "prod")?;
//!
//! let mut live = vec![LiveResource::new("userstore_column", "fe20fd48-a006-4ad8-9208-4aad540d8794")];
//! let report = manifest.match_live(&mut live, "prod");
//! for warning in &report.warnings {
//!     println!("{warning}");
//! }
//! # Ok::<(), manifest::Error>(())
//! ```

mod error;
mod generate;
mod invocation;
mod io;
mod matching;
mod rewrite;
mod types;
mod validate;

pub use error::{Error, Result};
pub use invocation::{
    Arg, FILE_FUNCTION, Invocation, InvocationError, MANIFEST_ID_FUNCTION, SYSTEM_OBJECT_FUNCTION,
};
pub use io::Format;
pub use matching::{MatchReport, MatchWarning};
pub use rewrite::{ExternValuesDir, RewriteContext};
pub use types::{DEFAULT_ENVIRONMENT, Manifest, ManifestResource};
