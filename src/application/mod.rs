//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeployUseCase` - Resolve, plan, preflight, apply and summarize one environment
//! - `SecretsResolver` - Decrypt, plaintext, then environment fallback for secrets

pub mod deploy;
pub mod secrets;

pub use deploy::{DeployOptions, DeployUseCase, DeploymentSummary, PlannedDeployment};
pub use secrets::{ResolvedSecrets, SecretSource, SecretsResolver};
