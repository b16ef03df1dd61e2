//! Deploy Module
//!
//! Orchestrates plan and apply for one environment.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`DeployOptions`)
//! - `result` - The deployment summary (`DeploymentSummary`, `FeatureFlags`)
//! - `values` - Apply-time resolution of references and imports
//! - `use_case` - Core use case logic (`DeployUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use stackplan::application::deploy::{DeployOptions, DeployUseCase};
//!
//! let mut use_case = DeployUseCase::new(document, provisioner, exports, decryptor, env);
//! let summary = use_case.execute(&DeployOptions::new("dev"))?;
//! ```

mod options;
mod result;
mod use_case;
mod values;

pub use options::DeployOptions;
pub use result::{application_url, DeploymentSummary, FeatureFlags, PENDING_URL};
pub use use_case::{DeployUseCase, PlannedDeployment};
pub use values::{export_string, publishable_exports, resolve_property, resolve_resource, Created};

#[cfg(test)]
mod tests;
