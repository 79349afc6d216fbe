//! `ucconfig types`: show the resource type catalog.

use anyhow::Result;
use colored::Colorize;
use declarative::{Registry, ResourceTypeDescriptor};

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let registry = Registry::userclouds();
    let provider = ctx.config.provider_spec(None);

    ui::header(&format!("Resource Types ({})", registry.len()));
    for descriptor in registry.iter() {
        println!();
        println!(
            "  {} {}",
            descriptor.type_tag.bold(),
            format!("({})", provider.resource_type(&descriptor.type_tag)).dimmed()
        );
        for line in describe(descriptor) {
            println!("    {line}");
        }
    }
    Ok(())
}

/// One line per reference, externally stored attribute and omitted
/// attribute.
fn describe(descriptor: &ResourceTypeDescriptor) -> Vec<String> {
    let mut lines: Vec<String> = descriptor
        .references
        .iter()
        .map(|(path, target)| format!("{path} -> {target}"))
        .collect();
    lines.extend(
        descriptor
            .external
            .iter()
            .map(|(path, extension)| format!("{path} stored in a {extension} file")),
    );
    if !descriptor.omit.is_empty() {
        let omitted: Vec<&str> = descriptor.omit.iter().map(String::as_str).collect();
        lines.push(format!("omits {}", omitted.join(", ")));
    }
    lines
}
