//! `ucconfig gen-manifest`: describe live resources as a manifest.
//!
//! When the manifest file already exists it is matched against the live
//! resources first, so entries keep their manifest IDs across runs.

use anyhow::{Context as AnyhowContext, Result};
use declarative::Registry;
use manifest::{ExternValuesDir, Manifest};

use crate::Context;
use crate::cli::GenManifestArgs;
use crate::commands::report_match;
use crate::snapshot;
use crate::ui;

pub fn run(ctx: &Context, args: &GenManifestArgs) -> Result<()> {
    let registry = Registry::userclouds();
    let environment = ctx.config.environment(args.target.env.as_deref())?;
    let mut live = snapshot::load_live(&args.live, &registry)?;

    if args.manifest.exists() {
        let mut previous = Manifest::load(&args.manifest)
            .with_context(|| format!("Could not load {}", args.manifest.display()))?;
        let report = previous.match_live(&mut live, &environment);
        report_match(ctx, &report);
    }

    let extern_values = if args.inline_values {
        None
    } else {
        let dir = ExternValuesDir::for_manifest(&args.manifest);
        dir.prepare()?;
        Some(dir)
    };

    let generated = Manifest::generate(&live, &registry, &environment, extern_values.as_ref())
        .context("Could not generate manifest")?;
    generated.save(&args.manifest)?;

    if !ctx.quiet {
        ui::success(&format!(
            "Wrote {} to {}",
            ui::count(generated.len(), "resource"),
            args.manifest.display()
        ));
        if let Some(dir) = &extern_values {
            ui::dim(&format!("external values in {}", dir.absolute_path.display()));
        }
    }
    Ok(())
}
