//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod decryptor;
pub mod deploy_events;
pub mod env_source;
pub mod exports;
pub mod provisioner;

pub use decryptor::{DecryptError, Decryptor};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use env_source::EnvSource;
pub use exports::{ExportError, ExportLookup, ExportStore};
pub use provisioner::{ProvisionError, ProvisionedResource, Provisioner};
