use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use crate::config::error::ConfigError;
use crate::kernel::component::ComponentKey;
use crate::registry::{ComponentEntry, Constructor, Destructor};

/// Dependency graph over component keys.
///
/// Nodes remember the order they were added in; that order breaks ties during
/// the topological sort so the same configuration always starts the same way.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Nodes in insertion order
    nodes: Vec<ComponentKey>,
    /// Node -> position in `nodes`
    index: HashMap<ComponentKey, usize>,
    /// Edges in the graph (node -> dependencies)
    edges: HashMap<ComponentKey, Vec<ComponentKey>>,
}

impl DependencyGraph {
    /// Create a new dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph. Adding an existing node is a no-op.
    pub fn add_node(&mut self, key: &ComponentKey) {
        if !self.index.contains_key(key) {
            self.index.insert(key.clone(), self.nodes.len());
            self.nodes.push(key.clone());
        }
    }

    /// Add an edge to the graph (`node` depends on `dependency`)
    pub fn add_edge(&mut self, node: &ComponentKey, dependency: &ComponentKey) {
        self.add_node(node);
        self.add_node(dependency);

        let deps = self.edges.entry(node.clone()).or_default();
        if !deps.contains(dependency) {
            deps.push(dependency.clone());
        }
    }

    /// Check if the graph contains a node
    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.index.contains_key(key)
    }

    /// Get the dependencies of a node
    pub fn dependencies_of(&self, key: &ComponentKey) -> &[ComponentKey] {
        self.edges.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if the graph contains cycles
    pub fn has_cycles(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Find one cycle, returned as a closed path (`a -> b -> a`).
    pub fn find_cycle(&self) -> Option<Vec<ComponentKey>> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        for node in &self.nodes {
            if !visited.contains(node) {
                if let Some(cycle) = self.cycle_dfs(node, &mut visited, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    /// DFS to find a cycle; `stack` holds the current path
    fn cycle_dfs(
        &self,
        node: &ComponentKey,
        visited: &mut HashSet<ComponentKey>,
        stack: &mut Vec<ComponentKey>,
    ) -> Option<Vec<ComponentKey>> {
        visited.insert(node.clone());
        stack.push(node.clone());

        for dep in self.dependencies_of(node) {
            if let Some(start) = stack.iter().position(|k| k == dep) {
                let mut cycle = stack[start..].to_vec();
                cycle.push(dep.clone());
                return Some(cycle);
            }
            if !visited.contains(dep) {
                if let Some(cycle) = self.cycle_dfs(dep, visited, stack) {
                    return Some(cycle);
                }
            }
        }

        stack.pop();
        None
    }

    /// Topologically sort the graph, dependencies first.
    ///
    /// Kahn's algorithm over node positions: whenever several nodes are ready,
    /// the one added earliest goes next.
    pub fn topological_sort(&self) -> Result<Vec<ComponentKey>, ConfigError> {
        let mut remaining: Vec<usize> = self
            .nodes
            .iter()
            .map(|key| self.dependencies_of(key).len())
            .collect();

        // dependency position -> positions of its dependents
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (pos, key) in self.nodes.iter().enumerate() {
            for dep in self.dependencies_of(key) {
                dependents[self.index[dep]].push(pos);
            }
        }

        let mut ready: BTreeSet<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(pos, _)| pos)
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(pos) = ready.pop_first() {
            sorted.push(self.nodes[pos].clone());
            for &dependent in &dependents[pos] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if sorted.len() == self.nodes.len() {
            return Ok(sorted);
        }

        let cycle = self.find_cycle().unwrap_or_else(|| {
            // Kahn left nodes behind, so a cycle exists; fall back to the leftovers
            self.nodes
                .iter()
                .filter(|key| !sorted.contains(key))
                .cloned()
                .collect()
        });
        Err(ConfigError::DependencyCycle {
            cycle: cycle.iter().map(ToString::to_string).collect(),
        })
    }
}

/// A resolved binding: either a direct link to another component or a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Component(ComponentKey),
    Value(Value),
}

impl Binding {
    pub fn as_component(&self) -> Option<&ComponentKey> {
        match self {
            Binding::Component(key) => Some(key),
            Binding::Value(_) => None,
        }
    }
}

/// A fully specified component definition.
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    key: ComponentKey,
    entry: ComponentEntry,
    bindings: BTreeMap<String, Binding>,
}

impl ComponentSpec {
    pub fn new(key: ComponentKey, entry: ComponentEntry, bindings: BTreeMap<String, Binding>) -> Self {
        Self { key, entry, bindings }
    }

    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    /// Name of the registry entry this component is built with.
    pub fn factory(&self) -> &str {
        self.entry.name()
    }

    pub fn constructor(&self) -> &Arc<dyn Constructor> {
        self.entry.constructor()
    }

    pub fn destructor(&self) -> Option<&Arc<dyn Destructor>> {
        self.entry.destructor()
    }

    pub fn bindings(&self) -> &BTreeMap<String, Binding> {
        &self.bindings
    }

    /// Distinct components this one depends on, in binding-name order.
    pub fn dependencies(&self) -> Vec<&ComponentKey> {
        let mut deps: Vec<&ComponentKey> = Vec::new();
        for key in self.bindings.values().filter_map(Binding::as_component) {
            if !deps.contains(&key) {
                deps.push(key);
            }
        }
        deps
    }
}

/// Component specs in start order: every dependency precedes its dependents.
#[derive(Debug, Clone, Default)]
pub struct ResolvedGraph {
    specs: Vec<ComponentSpec>,
    index: HashMap<ComponentKey, usize>,
}

impl ResolvedGraph {
    /// Build from specs already in topological order.
    pub(crate) fn from_sorted(specs: Vec<ComponentSpec>) -> Self {
        let index = specs
            .iter()
            .enumerate()
            .map(|(pos, spec)| (spec.key().clone(), pos))
            .collect();
        Self { specs, index }
    }

    pub fn get(&self, key: &ComponentKey) -> Option<&ComponentSpec> {
        self.index.get(key).map(|pos| &self.specs[*pos])
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.index.contains_key(key)
    }

    /// Position of `key` in start order.
    pub fn position(&self, key: &ComponentKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.specs.iter()
    }

    /// Keys in start order.
    pub fn order(&self) -> Vec<ComponentKey> {
        self.specs.iter().map(|spec| spec.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
