//! Resource graph - the full plan for one deployment
//!
//! A graph is a set of stacks with explicit ordering edges between them.
//! Planning produces a graph; applying walks it in dependency order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::domain::entities::{Property, StackId, StackPlan};
use crate::domain::value_objects::ContentHash;
use crate::error::{StackplanError, StackplanResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceGraph {
    pub stacks: Vec<StackPlan>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stack: StackPlan) {
        self.stacks.push(stack);
    }

    pub fn stack(&self, id: &StackId) -> Option<&StackPlan> {
        self.stacks.iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &StackId) -> bool {
        self.stack(id).is_some()
    }

    pub fn resource_count(&self) -> usize {
        self.stacks.iter().map(|s| s.resources.len()).sum()
    }

    /// Stacks in dependency order
    ///
    /// Kahn's algorithm; ties are broken by declaration order so the result is
    /// stable across runs.
    pub fn ordered(&self) -> StackplanResult<Vec<&StackPlan>> {
        let index: HashMap<&StackId, usize> = self
            .stacks
            .iter()
            .enumerate()
            .map(|(i, s)| (&s.id, i))
            .collect();
        if index.len() != self.stacks.len() {
            return Err(invalid("duplicate stack id"));
        }

        let mut indegree = vec![0usize; self.stacks.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.stacks.len()];
        for (i, stack) in self.stacks.iter().enumerate() {
            for upstream in &stack.depends_on {
                let &u = index.get(upstream).ok_or_else(|| {
                    invalid(&format!(
                        "stack '{}' depends on unknown stack '{}'",
                        stack.id, upstream
                    ))
                })?;
                indegree[i] += 1;
                dependents[u].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = indegree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| i)
            .collect();
        let mut order = Vec::with_capacity(self.stacks.len());
        while let Some(i) = ready.pop_first() {
            order.push(&self.stacks[i]);
            for &d in &dependents[i] {
                indegree[d] -= 1;
                if indegree[d] == 0 {
                    ready.insert(d);
                }
            }
        }

        if order.len() != self.stacks.len() {
            let stuck: Vec<&str> = indegree
                .iter()
                .enumerate()
                .filter(|(_, d)| **d > 0)
                .map(|(i, _)| self.stacks[i].id.as_str())
                .collect();
            return Err(invalid(&format!(
                "dependency cycle between stacks: {}",
                stuck.join(", ")
            )));
        }
        Ok(order)
    }

    /// Structural checks that apply relies on
    ///
    /// - stack ordering is acyclic and complete
    /// - resource ids are unique within a stack
    /// - references and explicit edges point at resources declared earlier
    /// - imports of stacks in this graph name an upstream stack and one of its
    ///   declared exports
    pub fn validate(&self) -> StackplanResult<()> {
        self.ordered()?;

        for stack in &self.stacks {
            let mut declared: BTreeSet<&str> = BTreeSet::new();
            for resource in &stack.resources {
                for required in resource.requires() {
                    if !declared.contains(required) {
                        return Err(invalid(&format!(
                            "{}/{} requires '{}' which is not declared before it",
                            stack.id, resource.id, required
                        )));
                    }
                }
                if !declared.insert(resource.id.as_str()) {
                    return Err(invalid(&format!(
                        "{}: duplicate resource id '{}'",
                        stack.id, resource.id
                    )));
                }
            }

            for value in stack.exports.values() {
                let mut missing = None;
                value.walk(&mut |p| {
                    if let Property::Ref { resource, .. } = p {
                        if !declared.contains(resource.as_str()) {
                            missing = Some(resource.clone());
                        }
                    }
                });
                if let Some(resource) = missing {
                    return Err(invalid(&format!(
                        "{}: export refers to unknown resource '{}'",
                        stack.id, resource
                    )));
                }
            }

            let upstream = self.upstream_of(&stack.id);
            for (source, output) in stack.imports() {
                let Some(source_plan) = self.stack(&source) else {
                    continue;
                };
                if !upstream.contains(&source_plan.id) {
                    return Err(invalid(&format!(
                        "{} imports from '{}' without depending on it",
                        stack.id, source
                    )));
                }
                if !source_plan.exports.contains_key(&output) {
                    return Err(invalid(&format!(
                        "{} imports '{}' which '{}' does not export",
                        stack.id, output, source
                    )));
                }
            }
        }
        Ok(())
    }

    /// Transitive upstream stacks of `id`
    fn upstream_of(&self, id: &StackId) -> BTreeSet<StackId> {
        let mut seen = BTreeSet::new();
        let mut pending = vec![id.clone()];
        while let Some(current) = pending.pop() {
            if let Some(plan) = self.stack(&current) {
                for upstream in &plan.depends_on {
                    if seen.insert(upstream.clone()) {
                        pending.push(upstream.clone());
                    }
                }
            }
        }
        seen
    }

    /// Imports of stacks that are not part of this graph
    ///
    /// These must be resolvable from previously published exports before
    /// anything is created.
    pub fn external_imports(&self) -> BTreeMap<StackId, BTreeSet<String>> {
        let mut external: BTreeMap<StackId, BTreeSet<String>> = BTreeMap::new();
        for stack in &self.stacks {
            for (source, output) in stack.imports() {
                if !self.contains(&source) {
                    external.entry(source).or_default().insert(output);
                }
            }
        }
        external
    }

    /// Digest of the canonical JSON form
    pub fn fingerprint(&self) -> StackplanResult<ContentHash> {
        let json = serde_json::to_vec(self)?;
        Ok(ContentHash::from_bytes(&json))
    }
}

fn invalid(message: &str) -> StackplanError {
    StackplanError::InvalidGraph {
        message: message.to_string(),
    }
}
