//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (--json, --verbose, --config, --project-root, --state-dir) are inherited by all subcommands
//! - Per-deployment context flags live in `TargetArgs`; unset flags fall back to `STACKPLAN_*` variables

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::application::secrets::DEFAULT_SECRETS_DIR;
use crate::config::DeploymentContext;

/// Directory under the project root holding exports, stack records and saved plans
pub const DEFAULT_STATE_DIR: &str = ".stackplan";

/// Stackplan - environment-driven planner for network, platform and application stacks
#[derive(Parser, Debug)]
#[command(name = "stackplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: <project-root>/stackplan.toml, else built-in environments)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root (default: discovered from the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// State directory (default: <project-root>/.stackplan)
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List valid environments with their sizing
    Environments,

    /// Plan an environment without creating anything
    Plan {
        #[command(flatten)]
        target: TargetArgs,

        /// Show a unified diff against the last saved plan
        #[arg(long)]
        diff: bool,

        /// Save this plan for later diffs
        #[arg(long)]
        save: bool,
    },

    /// Plan, preflight and apply an environment
    Deploy {
        #[command(flatten)]
        target: TargetArgs,

        /// Dry run - plan and resolve imports only
        #[arg(long)]
        dry_run: bool,
    },

    /// List published stack exports
    Exports {
        /// Only this stack
        #[arg(long, value_name = "ID")]
        stack: Option<String>,
    },

    /// Show where an environment's secrets would come from
    Secrets {
        /// Environment name
        #[arg(short, long)]
        environment: String,

        /// Root of the per-environment secret directories
        #[arg(long, value_name = "DIR")]
        secrets_dir: Option<PathBuf>,
    },
}

/// Environment selection plus deployment context
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetArgs {
    /// Environment name (the base environment for --pr deployments)
    #[arg(short, long)]
    pub environment: String,

    /// Ephemeral deployment identifier (e.g. a pull-request number)
    #[arg(long, value_name = "ID")]
    pub pr: Option<String>,

    /// Apex domain for HTTPS
    #[arg(long, value_name = "NAME")]
    pub domain: Option<String>,

    /// DNS hosted zone used for certificate validation
    #[arg(long, value_name = "ID")]
    pub hosted_zone: Option<String>,

    /// Application name; the public host is <app-name>.<domain>
    #[arg(long, value_name = "NAME")]
    pub app_name: Option<String>,

    /// Existing certificate reference to reuse
    #[arg(long, value_name = "REF")]
    pub certificate: Option<String>,

    /// Container image tag (required with --pr)
    #[arg(long, value_name = "TAG")]
    pub image_tag: Option<String>,

    /// Root of the per-environment secret directories
    #[arg(long, value_name = "DIR")]
    pub secrets_dir: Option<PathBuf>,
}

impl TargetArgs {
    pub fn context(&self) -> DeploymentContext {
        DeploymentContext {
            domain: self.domain.clone(),
            hosted_zone: self.hosted_zone.clone(),
            app_name: self.app_name.clone(),
            certificate: self.certificate.clone(),
            ephemeral_id: self.pr.clone(),
            image_tag: self.image_tag.clone(),
        }
    }

    pub fn secrets_dir(&self, project_root: &Path) -> PathBuf {
        secrets_dir_or_default(self.secrets_dir.as_deref(), project_root)
    }
}

/// Relative secret directories resolve against the project root
pub fn secrets_dir_or_default(explicit: Option<&Path>, project_root: &Path) -> PathBuf {
    match explicit {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => project_root.join(dir),
        None => project_root.join(DEFAULT_SECRETS_DIR),
    }
}
