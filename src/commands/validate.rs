//! `ucconfig validate`: check a manifest, and how it matches live state.

use anyhow::{Context as AnyhowContext, Result};
use declarative::Registry;
use manifest::Manifest;

use crate::Context;
use crate::cli::ValidateArgs;
use crate::commands::report_match;
use crate::snapshot;
use crate::ui;

pub fn run(ctx: &Context, args: &ValidateArgs) -> Result<()> {
    let registry = Registry::userclouds();
    let environment = ctx.config.environment(args.target.env.as_deref())?;

    let mut manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Could not load {}", args.manifest.display()))?;
    manifest
        .validate(&registry, &environment)
        .with_context(|| format!("Invalid manifest {}", args.manifest.display()))?;

    if !ctx.quiet {
        ui::success(&format!(
            "{} is valid for environment {environment} ({})",
            args.manifest.display(),
            ui::count(manifest.len(), "resource")
        ));
    }

    if let Some(live_path) = &args.live {
        let mut live = snapshot::load_live(live_path, &registry)?;
        let report = manifest.match_live(&mut live, &environment);
        report_match(ctx, &report);
    }
    Ok(())
}
