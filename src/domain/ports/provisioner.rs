//! Provisioner port
//!
//! The seam to a provisioning engine. `apply` hands it one resource at a time
//! with every reference and import already resolved to plain values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Resource, StackId};

/// What the engine reports back for a created resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedResource {
    pub physical_id: String,
    /// Attributes other resources may reference (`arn`, `name`, `dns_name`, ...)
    pub attributes: BTreeMap<String, String>,
}

impl ProvisionedResource {
    /// Attribute lookup; `id` is always the physical id
    pub fn attribute(&self, name: &str) -> Option<&str> {
        if name == "id" {
            return Some(&self.physical_id);
        }
        self.attributes.get(name).map(String::as_str)
    }
}

pub trait Provisioner {
    /// Called once before the first resource of a stack
    fn begin_stack(&mut self, _stack: &StackId) -> Result<(), ProvisionError> {
        Ok(())
    }

    /// Create one resource
    fn create(
        &mut self,
        stack: &StackId,
        resource: &Resource,
    ) -> Result<ProvisionedResource, ProvisionError>;

    /// Called once after the last resource of a stack
    fn finish_stack(&mut self, _stack: &StackId) -> Result<(), ProvisionError> {
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("certificate for '{domain}' failed validation: {message}")]
    CertificateValidation { domain: String, message: String },

    #[error("backend failure: {0}")]
    Backend(String),
}
