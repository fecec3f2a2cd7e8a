use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::graph::ResolvedGraph;
use crate::kernel::component::{ComponentKey, Instance};

/// The running set of components produced by [`init`](crate::system::init).
///
/// Keeps the graph it was built from and the exact order components started in,
/// which [`halt`](crate::system::halt) walks backwards.
pub struct LiveSystem {
    pub(crate) graph: ResolvedGraph,
    pub(crate) instances: HashMap<ComponentKey, Instance>,
    pub(crate) started: Vec<ComponentKey>,
}

impl LiveSystem {
    pub(crate) fn new(graph: ResolvedGraph) -> Self {
        Self {
            graph,
            instances: HashMap::new(),
            started: Vec::new(),
        }
    }

    pub fn graph(&self) -> &ResolvedGraph {
        &self.graph
    }

    /// Keys in the order their constructors completed.
    pub fn started(&self) -> &[ComponentKey] {
        &self.started
    }

    pub fn get(&self, key: &ComponentKey) -> Option<&Instance> {
        self.instances.get(key)
    }

    /// Get an instance downcast to its concrete type.
    pub fn get_concrete<T: Any + Send + Sync>(&self, key: &ComponentKey) -> Option<Arc<T>> {
        self.instances
            .get(key)
            .and_then(|instance| Arc::downcast::<T>(instance.clone()).ok())
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.instances.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.started.len()
    }

    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }
}

impl fmt::Debug for LiveSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveSystem")
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}
