//! ExportStore port
//!
//! Named, read-only values one stack publishes for others. Downstream stacks
//! resolve imports through `ExportLookup`; a missing export is a typed
//! failure instead of a dangling name.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::entities::{PublishedExports, StackId};

pub trait ExportLookup {
    /// Resolve one export of one stack
    fn get(&self, stack: &StackId, output: &str) -> Result<String, ExportError>;
}

pub trait ExportStore: ExportLookup + Send + Sync {
    /// Replace everything `stack` has published
    fn publish(&self, stack: &StackId, exports: &PublishedExports) -> Result<(), ExportError>;

    /// All published stacks and their exports
    fn list(&self) -> Result<BTreeMap<StackId, PublishedExports>, ExportError>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("export '{output}' of stack '{stack}' not found")]
    NotFound { stack: String, output: String },

    #[error("Failed to access export store: {message}")]
    AccessError { message: String },

    #[error(
        "export store corrupted: {path}\n  → Fix: remove the file and redeploy the standing environments\n  → Details: {message}"
    )]
    Corrupted { path: PathBuf, message: String },
}

impl ExportError {
    pub fn not_found(stack: &StackId, output: &str) -> Self {
        ExportError::NotFound {
            stack: stack.to_string(),
            output: output.to_string(),
        }
    }
}
