//! # Tfkit
//!
//! Terraform configuration and state generation.
//!
//! Turns a matched manifest and live snapshot into the files Terraform
//! needs to converge the live system:
//!
//! - `main.tf`: one resource block per manifest entry, with symbolic
//!   tokens resolved into resource references, literal IDs and file
//!   contents
//! - `terraform.tfstate`: every non-system live resource, with
//!   dependencies inferred from reference attributes
//!
//! ## Example
//!
//! ```no_run
//! use declarative::Registry;
//! use manifest::Manifest;
//! use std::path::Path;
//! use tfkit::{Artifacts, ConfigContext, ProviderSpec};
//!
//! let manifest = Manifest::load(Path::new("tenant.yaml"))?;
//! let provider = ProviderSpec::default();
//! let ctx = ConfigContext {
//!     manifest: &manifest,
//!     environment: "prod",
//!     live: &[],
//!     manifest_path: Some(Path::new("tenant.yaml")),
//!     provider: &provider,
//! };
//! let artifacts = Artifacts::build(&ctx, &Registry::userclouds(), None)?;
//! artifacts.write_to(Path::new("out"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod artifacts;
mod config;
mod error;
pub mod hcl;
mod naming;
mod state;

pub use artifacts::{Artifacts, CONFIG_FILE, STATE_FILE, TERRAFORMRC_FILE};
pub use config::ConfigContext;
pub use error::{Error, Result};
pub use naming::{DEFAULT_PROVIDER_VERSION, ProviderSpec, block_name, manifest_block_name};
pub use state::{Instance, Resource, STATE_VERSION, State, TERRAFORM_VERSION};
