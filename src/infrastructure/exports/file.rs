//! JSON Export Store
//!
//! Persists published exports at `<state-dir>/exports.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{PublishedExports, StackId};
use crate::domain::ports::{ExportError, ExportLookup, ExportStore};
use crate::infrastructure::fs::{with_exclusive_lock, write_atomic};

pub const EXPORTS_FILE: &str = "exports.json";

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredStack {
    published_at: DateTime<Utc>,
    exports: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredExports {
    version: u32,
    #[serde(default)]
    stacks: BTreeMap<StackId, StoredStack>,
}

impl Default for StoredExports {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            stacks: BTreeMap::new(),
        }
    }
}

pub struct FileExportStore {
    path: PathBuf,
}

impl FileExportStore {
    /// Store inside `state_dir`
    pub fn in_dir(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(EXPORTS_FILE),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// When `stack` last published, if ever
    pub fn published_at(&self, stack: &StackId) -> Result<Option<DateTime<Utc>>, ExportError> {
        Ok(self.load()?.stacks.get(stack).map(|s| s.published_at))
    }

    fn load(&self) -> Result<StoredExports, ExportError> {
        if !self.path.exists() {
            return Ok(StoredExports::default());
        }

        let content = fs::read_to_string(&self.path).map_err(access)?;
        serde_json::from_str(&content).map_err(|e| ExportError::Corrupted {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn save(&self, stored: &StoredExports) -> Result<(), ExportError> {
        let content = serde_json::to_string_pretty(stored).map_err(access)?;
        write_atomic(&self.path, content.as_bytes()).map_err(access)
    }
}

impl ExportLookup for FileExportStore {
    fn get(&self, stack: &StackId, output: &str) -> Result<String, ExportError> {
        self.load()?
            .stacks
            .get(stack)
            .and_then(|s| s.exports.get(output).cloned())
            .ok_or_else(|| ExportError::not_found(stack, output))
    }
}

impl ExportStore for FileExportStore {
    fn publish(&self, stack: &StackId, exports: &PublishedExports) -> Result<(), ExportError> {
        with_exclusive_lock(&self.lock_path(), || {
            let mut stored = self.load()?;
            stored.stacks.insert(
                stack.clone(),
                StoredStack {
                    published_at: Utc::now(),
                    exports: exports.values.clone(),
                },
            );
            self.save(&stored)
        })
        .map_err(access)?
    }

    fn list(&self) -> Result<BTreeMap<StackId, PublishedExports>, ExportError> {
        Ok(self
            .load()?
            .stacks
            .into_iter()
            .map(|(id, s)| (id, PublishedExports { values: s.exports }))
            .collect())
    }
}

fn access(err: impl std::fmt::Display) -> ExportError {
    ExportError::AccessError {
        message: err.to_string(),
    }
}
