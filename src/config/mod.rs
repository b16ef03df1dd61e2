//! Configuration module for Stackplan
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (STACKPLAN_*), deployment context only
//! 3. Project config (stackplan.toml, or --config)
//! 4. Built-in environments (lowest priority)

mod context;
mod loader;
mod resolver;
mod suggest;
mod types;

pub use context::{
    DeploymentContext, ENV_APP_NAME, ENV_CERTIFICATE_ARN, ENV_DOMAIN_NAME, ENV_HOSTED_ZONE_ID,
    ENV_IMAGE_TAG, ENV_PR_ID,
};
pub use loader::{
    builtin, load_or_default, load_with_warnings, parse_with_warnings, validate, ConfigWarning,
    LoadedConfig, BUILTIN_LABEL, CONFIG_FILE_NAME, MAX_AVAILABILITY_ZONES,
};
pub use resolver::{
    availability_zones, resolve, ContainerSettings, DeploymentMode, FirewallSettings,
    FlowLogSettings, Hardening, NetworkSettings, ResolvedEnvironment, ScalingSettings,
    DEFAULT_IMAGE_TAG, EPHEMERAL_CAPACITY,
};
pub use suggest::{closest, levenshtein};
pub use types::{
    Capacity, ConfigDocument, ContainerSpec, EnvironmentSpec, FirewallSpec, FlowLogSpec,
    HealthCheck, LogSpec, NatSpec, NetworkSpec, ScalingSpec, TargetTracking, TaskSizing,
};
