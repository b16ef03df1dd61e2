//! Stack entity - a unit of ownership
//!
//! Each stack exclusively owns its resources. The only way another stack can
//! see into it is through its named exports.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Property, Resource, ResourceKind};

/// Stack identifier, `<project>-<environment>-<kind>` by convention
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackId(String);

impl StackId {
    pub fn new(project: &str, environment: &str, kind: StackKind) -> Self {
        Self(format!("{}-{}-{}", project, environment, kind.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StackId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StackKind {
    Network,
    Platform,
    Application,
}

impl StackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackKind::Network => "network",
            StackKind::Platform => "platform",
            StackKind::Application => "application",
        }
    }
}

/// Planned contents of one stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackPlan {
    pub id: StackId,
    pub kind: StackKind,
    /// Explicit ordering edges to upstream stacks
    pub depends_on: Vec<StackId>,
    pub resources: Vec<Resource>,
    pub exports: BTreeMap<String, Property>,
}

impl StackPlan {
    pub fn new(id: StackId, kind: StackKind) -> Self {
        Self {
            id,
            kind,
            depends_on: Vec::new(),
            resources: Vec::new(),
            exports: BTreeMap::new(),
        }
    }

    pub fn depends_on(mut self, upstream: &StackId) -> Self {
        if !self.depends_on.contains(upstream) {
            self.depends_on.push(upstream.clone());
        }
        self
    }

    /// Append a resource in declaration order
    pub fn add(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn export(&mut self, name: impl Into<String>, value: impl Into<Property>) {
        self.exports.insert(name.into(), value.into());
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn has_resource(&self, id: &str) -> bool {
        self.resource(id).is_some()
    }

    pub fn count_kind(&self, kind: ResourceKind) -> usize {
        self.resources.iter().filter(|r| r.kind == kind).count()
    }

    /// Every cross-stack import in resources and exports, deduplicated
    pub fn imports(&self) -> Vec<(StackId, String)> {
        let mut found: Vec<(StackId, String)> = Vec::new();
        let mut push = |stack: &StackId, output: &str| {
            if !found.iter().any(|(s, o)| s == stack && o == output) {
                found.push((stack.clone(), output.to_string()));
            }
        };
        for resource in &self.resources {
            for (stack, output) in resource.imports() {
                push(stack, output);
            }
        }
        for value in self.exports.values() {
            value.walk(&mut |p| {
                if let Property::Import { stack, output } = p {
                    push(stack, output);
                }
            });
        }
        found
    }
}
