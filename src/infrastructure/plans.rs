//! Saved plans
//!
//! `plan --save` writes the rendered graph to `<state-dir>/plans/<env>.json`;
//! `plan --diff` compares against it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use similar::{ChangeTag, TextDiff};

use crate::domain::entities::ResourceGraph;
use crate::infrastructure::fs::write_atomic;

pub const PLANS_DIR: &str = "plans";

/// Line diff between two rendered plans
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanDiff {
    pub unified: String,
    pub additions: usize,
    pub deletions: usize,
}

impl PlanDiff {
    pub fn has_changes(&self) -> bool {
        self.additions + self.deletions > 0
    }

    /// e.g. "+5, -3"
    pub fn summary(&self) -> String {
        format!("+{}, -{}", self.additions, self.deletions)
    }
}

pub struct PlanStore {
    dir: PathBuf,
}

impl PlanStore {
    pub fn in_dir(state_dir: &Path) -> Self {
        Self {
            dir: state_dir.join(PLANS_DIR),
        }
    }

    pub fn path_for(&self, environment: &str) -> PathBuf {
        self.dir.join(format!("{}.json", environment))
    }

    pub fn load(&self, environment: &str) -> io::Result<Option<String>> {
        let path = self.path_for(environment);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(path).map(Some)
    }

    pub fn save(&self, environment: &str, rendered: &str) -> io::Result<PathBuf> {
        let path = self.path_for(environment);
        write_atomic(&path, rendered.as_bytes())?;
        Ok(path)
    }
}

/// Canonical pretty JSON of a graph; secret values render as `***`
pub fn render_plan(graph: &ResourceGraph) -> serde_json::Result<String> {
    let mut rendered = serde_json::to_string_pretty(graph)?;
    rendered.push('\n');
    Ok(rendered)
}

pub fn diff_plans(label: &str, old: &str, new: &str) -> PlanDiff {
    let diff = TextDiff::from_lines(old, new);
    let (mut additions, mut deletions) = (0, 0);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => additions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }
    PlanDiff {
        unified: diff
            .unified_diff()
            .header(&format!("a/{}", label), &format!("b/{}", label))
            .to_string(),
        additions,
        deletions,
    }
}
