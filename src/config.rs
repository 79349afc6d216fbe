//! `ucconfig.toml` settings.
//!
//! ```toml
//! environment = "prod"
//!
//! [provider]
//! version = ">= 0.1.8"
//! dev_dir = "~/src/terraform-provider-userclouds/bin"
//! ```

use crate::paths;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tfkit::ProviderSpec;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Environment used when the command line names none
    pub environment: Option<String>,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    #[serde(flatten)]
    pub spec: ProviderSpec,
    /// Local provider build; generates a `.terraformrc` with dev overrides
    pub dev_dir: Option<String>,
}

impl Config {
    /// Load the config file, or defaults when it does not exist
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid {}", path.display()))
    }

    /// Environment from the command line, else from the config file
    pub fn environment(&self, cli: Option<&str>) -> Result<String> {
        match cli.or(self.environment.as_deref()) {
            Some(env) if !env.is_empty() => Ok(env.to_string()),
            _ => bail!(
                "No environment given: pass --env, set UCCONFIG_ENV, or set `environment` in {}",
                paths::CONFIG_FILE
            ),
        }
    }

    /// Provider settings with command-line overrides applied
    pub fn provider_spec(&self, version: Option<&str>) -> ProviderSpec {
        let mut spec = self.provider.spec.clone();
        if let Some(version) = version {
            spec.version = version.to_string();
        }
        spec
    }

    /// Local provider build directory, command line first
    pub fn provider_dev_dir(&self, cli: Option<&Path>) -> Option<PathBuf> {
        cli.map(Path::to_path_buf)
            .or_else(|| self.provider.dev_dir.as_deref().map(paths::expand))
    }
}
