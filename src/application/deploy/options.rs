//! Deploy Options
//!
//! Configuration types for deploy operations.

use std::path::PathBuf;

use crate::application::secrets::DEFAULT_SECRETS_DIR;
use crate::config::DeploymentContext;

/// Options for the deploy use case
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Standing environment name (ephemeral deployments name their base)
    pub environment: String,
    /// Per-invocation context from flags
    pub context: DeploymentContext,
    /// Root of the per-environment secret directories
    pub secrets_dir: PathBuf,
    /// Plan and preflight only; nothing is created or published
    pub dry_run: bool,
}

impl DeployOptions {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            context: DeploymentContext::default(),
            secrets_dir: PathBuf::from(DEFAULT_SECRETS_DIR),
            dry_run: false,
        }
    }

    pub fn with_context(mut self, context: DeploymentContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_secrets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.secrets_dir = dir.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
