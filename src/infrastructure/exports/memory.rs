//! In-memory export store for tests and dry runs

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::entities::{PublishedExports, StackId};
use crate::domain::ports::{ExportError, ExportLookup, ExportStore};

#[derive(Debug, Default)]
pub struct InMemoryExportStore {
    stacks: Mutex<BTreeMap<StackId, PublishedExports>>,
}

impl InMemoryExportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with previously published exports
    pub fn with_stack(self, stack: impl Into<StackId>, exports: PublishedExports) -> Self {
        if let Ok(mut stacks) = self.stacks.lock() {
            stacks.insert(stack.into(), exports);
        }
        self
    }
}

impl ExportLookup for InMemoryExportStore {
    fn get(&self, stack: &StackId, output: &str) -> Result<String, ExportError> {
        let stacks = self.stacks.lock().map_err(|e| ExportError::AccessError {
            message: e.to_string(),
        })?;
        stacks
            .get(stack)
            .and_then(|s| s.get(output))
            .map(str::to_string)
            .ok_or_else(|| ExportError::not_found(stack, output))
    }
}

impl ExportStore for InMemoryExportStore {
    fn publish(&self, stack: &StackId, exports: &PublishedExports) -> Result<(), ExportError> {
        let mut stacks = self.stacks.lock().map_err(|e| ExportError::AccessError {
            message: e.to_string(),
        })?;
        stacks.insert(stack.clone(), exports.clone());
        Ok(())
    }

    fn list(&self) -> Result<BTreeMap<StackId, PublishedExports>, ExportError> {
        let stacks = self.stacks.lock().map_err(|e| ExportError::AccessError {
            message: e.to_string(),
        })?;
        Ok(stacks.clone())
    }
}
