//! Stackplan - environment-driven infrastructure planner
//!
//! Stackplan turns a named environment (plus per-invocation context such as a
//! domain or a pull-request id) into three ordered stacks: network, platform
//! and application. Stacks share values only through named exports, so an
//! ephemeral review deployment can plan just its application stack against a
//! standing environment.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{DeployOptions, DeployUseCase, DeploymentSummary, SecretsResolver};
pub use config::{resolve, ConfigDocument, DeploymentContext, ResolvedEnvironment};
pub use domain::entities::{Property, Resource, ResourceGraph, ResourceKind, StackId, StackPlan};
pub use domain::services::plan;
pub use error::{ErrorCategory, StackplanError, StackplanResult};
