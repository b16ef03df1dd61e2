//! Local state provisioner
//!
//! Stands in for a provisioning engine: assigns deterministic physical ids,
//! synthesises the attributes downstream resources reference, and records
//! every applied stack under `<state-dir>/stacks/<stack>.json`. Secret
//! payloads are recorded as digests only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Property, Resource, ResourceKind, StackId};
use crate::domain::ports::{ProvisionError, ProvisionedResource, Provisioner};
use crate::domain::value_objects::ContentHash;
use crate::infrastructure::fs::write_atomic;

pub const STACKS_DIR: &str = "stacks";

/// Hex digits of the physical-id suffix
const ID_SUFFIX_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedResource {
    pub id: String,
    pub kind: String,
    pub physical_id: String,
    pub attributes: BTreeMap<String, String>,
    pub properties: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackRecord {
    pub stack: StackId,
    pub applied_at: DateTime<Utc>,
    pub resources: Vec<RecordedResource>,
}

pub struct LocalStateProvisioner {
    state_dir: PathBuf,
    pending: BTreeMap<StackId, Vec<RecordedResource>>,
    applied: Vec<StackId>,
}

impl LocalStateProvisioner {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            pending: BTreeMap::new(),
            applied: Vec::new(),
        }
    }

    pub fn stack_path(&self, stack: &StackId) -> PathBuf {
        stack_record_path(&self.state_dir, stack)
    }

    /// Stacks written during this run, in order
    pub fn applied(&self) -> &[StackId] {
        &self.applied
    }
}

/// `<state-dir>/stacks/<stack>.json`
pub fn stack_record_path(state_dir: &Path, stack: &StackId) -> PathBuf {
    state_dir
        .join(STACKS_DIR)
        .join(format!("{}.json", stack.as_str()))
}

/// Load a previously recorded stack
pub fn load_stack_record(state_dir: &Path, stack: &StackId) -> std::io::Result<Option<StackRecord>> {
    let path = stack_record_path(state_dir, stack);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// `<prefix>-<12 hex of sha256(stack/resource)>`
pub fn physical_id(stack: &StackId, resource: &Resource) -> String {
    let digest = ContentHash::from_content(&format!("{}/{}", stack, resource.id));
    format!("{}-{}", resource.kind.prefix(), digest.short(ID_SUFFIX_LEN))
}

fn synthesize(stack: &StackId, resource: &Resource) -> Result<ProvisionedResource, ProvisionError> {
    let existing = resource
        .property("existing_reference")
        .and_then(Property::as_str);

    if resource.kind == ResourceKind::Certificate && existing.is_none() {
        let domain = resource
            .property("domain")
            .and_then(Property::as_str)
            .unwrap_or_default();
        if !domain.contains('.') {
            return Err(ProvisionError::CertificateValidation {
                domain: domain.to_string(),
                message: "domain has no registrable suffix".to_string(),
            });
        }
    }

    let physical_id = match existing {
        Some(reference) if resource.kind == ResourceKind::Certificate => reference.to_string(),
        _ => physical_id(stack, resource),
    };

    let name = resource
        .property("name")
        .and_then(Property::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| physical_id.clone());

    let mut attributes = BTreeMap::new();
    let arn = if existing.is_some() {
        physical_id.clone()
    } else {
        format!("arn:stackplan:{}:{}", resource.kind.prefix(), physical_id)
    };
    attributes.insert("arn".to_string(), arn);

    match resource.kind {
        ResourceKind::LoadBalancer => {
            attributes.insert(
                "dns_name".to_string(),
                format!("{}.lb.stackplan.local", physical_id),
            );
        }
        ResourceKind::Registry => {
            attributes.insert(
                "uri".to_string(),
                format!("registry.stackplan.local/{}", name),
            );
        }
        _ => {}
    }
    attributes.insert("name".to_string(), name);

    Ok(ProvisionedResource {
        physical_id,
        attributes,
    })
}

/// Property tree as JSON with secret payloads replaced by their digest
fn recorded_properties(resource: &Resource) -> serde_json::Value {
    fn digest_secrets(value: &Property) -> Property {
        match value {
            Property::Secret(payload) => {
                Property::Str(ContentHash::from_content(payload).to_string())
            }
            Property::List(items) => Property::List(items.iter().map(digest_secrets).collect()),
            Property::Map(map) => Property::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), digest_secrets(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    let map: BTreeMap<&String, Property> = resource
        .properties
        .iter()
        .map(|(k, v)| (k, digest_secrets(v)))
        .collect();
    serde_json::to_value(map).unwrap_or(serde_json::Value::Null)
}

impl Provisioner for LocalStateProvisioner {
    fn begin_stack(&mut self, stack: &StackId) -> Result<(), ProvisionError> {
        self.pending.insert(stack.clone(), Vec::new());
        Ok(())
    }

    fn create(
        &mut self,
        stack: &StackId,
        resource: &Resource,
    ) -> Result<ProvisionedResource, ProvisionError> {
        let created = synthesize(stack, resource)?;
        let kind = serde_json::to_value(resource.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        self.pending
            .entry(stack.clone())
            .or_default()
            .push(RecordedResource {
                id: resource.id.clone(),
                kind,
                physical_id: created.physical_id.clone(),
                attributes: created.attributes.clone(),
                properties: recorded_properties(resource),
            });
        Ok(created)
    }

    fn finish_stack(&mut self, stack: &StackId) -> Result<(), ProvisionError> {
        let record = StackRecord {
            stack: stack.clone(),
            applied_at: Utc::now(),
            resources: self.pending.remove(stack).unwrap_or_default(),
        };
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| ProvisionError::Backend(e.to_string()))?;
        write_atomic(&self.stack_path(stack), content.as_bytes())
            .map_err(|e| ProvisionError::Backend(e.to_string()))?;
        tracing::debug!("recorded {}", self.stack_path(stack).display());
        self.applied.push(stack.clone());
        Ok(())
    }
}
