//! `ucconfig generate`: write Terraform configuration and state.

use anyhow::{Context as AnyhowContext, Result};
use declarative::Registry;
use manifest::Manifest;
use std::path::PathBuf;
use tfkit::{Artifacts, ConfigContext, TERRAFORMRC_FILE};

use crate::Context;
use crate::cli::GenerateArgs;
use crate::commands::report_match;
use crate::paths;
use crate::snapshot;
use crate::ui;

pub fn run(ctx: &Context, args: &GenerateArgs) -> Result<()> {
    let registry = Registry::userclouds();
    let environment = ctx.config.environment(args.target.env.as_deref())?;

    let mut manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Could not load {}", args.manifest.display()))?;
    manifest
        .validate(&registry, &environment)
        .with_context(|| format!("Invalid manifest {}", args.manifest.display()))?;

    let mut live = snapshot::load_live(&args.live, &registry)?;
    let report = manifest.match_live(&mut live, &environment);
    report_match(ctx, &report);

    let provider = ctx.config.provider_spec(args.provider_version.as_deref());
    let dev_dir = ctx
        .config
        .provider_dev_dir(args.provider_dev_dir.as_deref())
        .map(|dir| paths::absolute(&dir))
        .transpose()?;

    let config = ConfigContext {
        manifest: &manifest,
        environment: &environment,
        live: &live,
        manifest_path: Some(args.manifest.as_path()),
        provider: &provider,
    };
    let artifacts = Artifacts::build(&config, &registry, dev_dir.as_deref())
        .context("Could not generate Terraform files")?;

    let out_dir = output_dir(args.out_dir.as_ref())?;
    let written = artifacts.write_to(&out_dir)?;

    if !ctx.quiet {
        ui::success(&format!(
            "Generated Terraform files for {}",
            ui::count(manifest.len(), "resource")
        ));
        for path in &written {
            ui::dim(&path.display().to_string());
        }
        ui::section("Next steps");
        if artifacts.terraformrc.is_some() {
            ui::kv(
                "env",
                &format!(
                    "TF_CLI_CONFIG_FILE={}",
                    out_dir.join(TERRAFORMRC_FILE).display()
                ),
            );
        }
        ui::kv("plan", &format!("terraform -chdir={} plan", out_dir.display()));
    }
    Ok(())
}

/// The requested directory, or a new temporary directory that outlives
/// the run.
fn output_dir(requested: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = requested {
        return Ok(dir.clone());
    }
    let dir = tempfile::Builder::new()
        .prefix("ucconfig-")
        .tempdir()
        .context("Could not create output directory")?;
    Ok(dir.keep())
}
