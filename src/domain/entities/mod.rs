//! Domain Entities
//!
//! - `Resource` / `Property` - one declared infrastructure object
//! - `StackPlan` - resources owned by one stack plus its exports
//! - `ResourceGraph` - all stacks of a deployment with ordering edges
//! - `SecretBundle` - resolved secret material

mod graph;
pub mod outputs;
mod resource;
mod secret_bundle;
mod stack;

pub use graph::ResourceGraph;
pub use outputs::{NetworkOutputs, PlatformOutputs, PublishedExports};
pub use resource::{Property, Resource, ResourceKind};
pub use secret_bundle::{SecretBundle, REQUIRED_KEYS};
pub use stack::{StackId, StackKind, StackPlan};
