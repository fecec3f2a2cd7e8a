//! # Keel Component Registry
//!
//! Maps a factory name to the constructor/destructor pair that brings a
//! component up and down. Configuration declarations refer to entries by name;
//! the expander resolves those names against a [`ComponentRegistry`].
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::component::{BoxError, ComponentContext, ComponentKey, Instance};

/// Builds a component from its context.
#[async_trait]
pub trait Constructor: Send + Sync {
    async fn construct(&self, context: ComponentContext) -> Result<Instance, BoxError>;
}

/// Releases a component built by the matching [`Constructor`].
#[async_trait]
pub trait Destructor: Send + Sync {
    async fn destruct(&self, key: ComponentKey, instance: Instance) -> Result<(), BoxError>;
}

#[async_trait]
impl<F, Fut> Constructor for F
where
    F: Fn(ComponentContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Instance, BoxError>> + Send + 'static,
{
    async fn construct(&self, context: ComponentContext) -> Result<Instance, BoxError> {
        (self)(context).await
    }
}

#[async_trait]
impl<F, Fut> Destructor for F
where
    F: Fn(ComponentKey, Instance) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn destruct(&self, key: ComponentKey, instance: Instance) -> Result<(), BoxError> {
        (self)(key, instance).await
    }
}

/// A registered constructor/destructor pair.
#[derive(Clone)]
pub struct ComponentEntry {
    name: String,
    constructor: Arc<dyn Constructor>,
    destructor: Option<Arc<dyn Destructor>>,
}

impl ComponentEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructor(&self) -> &Arc<dyn Constructor> {
        &self.constructor
    }

    pub fn destructor(&self) -> Option<&Arc<dyn Destructor>> {
        self.destructor.as_ref()
    }

    pub fn has_destructor(&self) -> bool {
        self.destructor.is_some()
    }
}

impl fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("name", &self.name)
            .field("has_destructor", &self.has_destructor())
            .finish()
    }
}

/// Named factories available to a configuration.
#[derive(Default, Debug, Clone)]
pub struct ComponentRegistry {
    entries: BTreeMap<String, ComponentEntry>,
}

impl ComponentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a factory without a destructor. Re-registering a name replaces
    /// the previous entry.
    pub fn register<C>(&mut self, name: impl Into<String>, constructor: C) -> &mut Self
    where
        C: Constructor + 'static,
    {
        self.insert(name.into(), Arc::new(constructor), None)
    }

    /// Register a factory together with its destructor.
    pub fn register_with_destructor<C, D>(&mut self, name: impl Into<String>, constructor: C, destructor: D) -> &mut Self
    where
        C: Constructor + 'static,
        D: Destructor + 'static,
    {
        self.insert(name.into(), Arc::new(constructor), Some(Arc::new(destructor)))
    }

    fn insert(
        &mut self,
        name: String,
        constructor: Arc<dyn Constructor>,
        destructor: Option<Arc<dyn Destructor>>,
    ) -> &mut Self {
        if self.entries.contains_key(&name) {
            log::warn!("Replacing registered component factory '{}'", name);
        }
        self.entries.insert(
            name.clone(),
            ComponentEntry {
                name,
                constructor,
                destructor,
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&ComponentEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered factory names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
