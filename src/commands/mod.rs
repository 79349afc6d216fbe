pub mod gen_manifest;
pub mod generate;
pub mod types;
pub mod validate;

use crate::Context;
use crate::ui;
use manifest::MatchReport;

/// Summarize a match. The individual warnings are already logged.
fn report_match(ctx: &Context, report: &MatchReport) {
    if ctx.quiet {
        return;
    }
    let matched = ui::count(report.matched, "live resource");
    if report.is_clean() {
        ui::success(&format!("Matched {matched} to the manifest"));
    } else {
        ui::warn(&format!(
            "Matched {matched} to the manifest with {}",
            ui::count(report.warnings.len(), "warning")
        ));
    }
}
