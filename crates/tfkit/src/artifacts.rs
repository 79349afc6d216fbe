//! The files handed to Terraform.

use crate::config::ConfigContext;
use crate::error::{Error, Result};
use crate::state::State;
use declarative::Registry;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name.
pub const CONFIG_FILE: &str = "main.tf";
/// State file name.
pub const STATE_FILE: &str = "terraform.tfstate";
/// CLI configuration file name, used with `TF_CLI_CONFIG_FILE`.
pub const TERRAFORMRC_FILE: &str = ".terraformrc";

/// Generated configuration, state and optional CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    pub config: String,
    pub state: String,
    pub terraformrc: Option<String>,
}

impl Artifacts {
    /// Build every artifact. `dev_dir` points Terraform at a local provider
    /// build instead of the registry.
    pub fn build(
        ctx: &ConfigContext<'_>,
        registry: &Registry,
        dev_dir: Option<&Path>,
    ) -> Result<Self> {
        let config = ctx.generate_config()?;
        let state = State::synthesize(ctx.live, registry, ctx.provider)?.to_json()?;
        let terraformrc = dev_dir.map(|dir| ctx.provider.terraformrc(dir));
        Ok(Self {
            config,
            state,
            terraformrc,
        })
    }

    /// Write the artifacts into `dir`, creating it if needed. Returns the
    /// paths written.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|source| Error::WriteFile {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files = vec![(CONFIG_FILE, &self.config), (STATE_FILE, &self.state)];
        if let Some(rc) = &self.terraformrc {
            files.push((TERRAFORMRC_FILE, rc));
        }

        let mut written = Vec::with_capacity(files.len());
        for (name, content) in files {
            let path = dir.join(name);
            fs::write(&path, content).map_err(|source| Error::WriteFile {
                path: path.clone(),
                source,
            })?;
            log::debug!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}
