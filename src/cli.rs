use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ucconfig")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Reconcile live tenant resources with a manifest and generate Terraform files",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a manifest describing the live resources
    GenManifest(GenManifestArgs),

    /// Generate Terraform configuration and state from a manifest
    Generate(GenerateArgs),

    /// Check a manifest, optionally against live resources
    Validate(ValidateArgs),

    /// List the supported resource types
    Types,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by commands that read live state.
#[derive(Args, Clone, Debug)]
pub struct TargetArgs {
    /// Target environment (falls back to `environment` in ucconfig.toml)
    #[arg(short, long, env = "UCCONFIG_ENV")]
    pub env: Option<String>,
}

#[derive(Args)]
pub struct GenManifestArgs {
    /// Manifest file to write (.json, .yaml or .yml)
    pub manifest: PathBuf,

    /// Live resource snapshot (JSON object of type -> list of API objects)
    #[arg(short, long)]
    pub live: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Keep long values such as transformer functions inline instead of
    /// writing them to a values directory next to the manifest
    #[arg(long)]
    pub inline_values: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Manifest file to read
    pub manifest: PathBuf,

    /// Live resource snapshot (JSON object of type -> list of API objects)
    #[arg(short, long)]
    pub live: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Directory for main.tf and terraform.tfstate (default: a new
    /// temporary directory that is kept)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Local provider build to use instead of the registry release
    #[arg(long)]
    pub provider_dev_dir: Option<PathBuf>,

    /// Provider version constraint
    #[arg(long)]
    pub provider_version: Option<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Manifest file to check
    pub manifest: PathBuf,

    /// Also match against this live resource snapshot
    #[arg(short, long)]
    pub live: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,
}
