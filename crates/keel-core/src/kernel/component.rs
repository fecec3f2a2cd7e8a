use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kernel::constants::KEY_SEPARATOR;
use crate::kernel::error::{ContextError, InvalidKey};

/// Error type constructors and destructors report.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A constructed component. Dependents receive a clone of the same `Arc`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Hierarchical identifier of a component slot, written `namespace/name` or `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentKey {
    namespace: Option<String>,
    name: String,
}

impl ComponentKey {
    /// Create a namespaced key. No validation is performed; use [`ComponentKey::parse`]
    /// for untrusted text.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Create a key without a namespace.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Parse the textual form of a key.
    pub fn parse(text: &str) -> Result<Self, InvalidKey> {
        let invalid = |reason| InvalidKey {
            text: text.to_string(),
            reason,
        };

        if text.is_empty() {
            return Err(invalid("key is empty"));
        }
        if text.chars().any(char::is_whitespace) {
            return Err(invalid("key contains whitespace"));
        }

        let mut segments = text.split(KEY_SEPARATOR);
        let first = segments.next().unwrap_or_default();
        match (segments.next(), segments.next()) {
            (None, _) => Ok(Self::named(first)),
            (Some(name), None) => {
                if first.is_empty() || name.is_empty() {
                    Err(invalid("namespace and name must both be non-empty"))
                } else {
                    Ok(Self::new(first, name))
                }
            }
            (Some(_), Some(_)) => Err(invalid("key has more than one separator")),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}{}{}", ns, KEY_SEPARATOR, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for ComponentKey {
    type Err = InvalidKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ComponentKey {
    type Error = InvalidKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ComponentKey> for String {
    fn from(key: ComponentKey) -> Self {
        key.to_string()
    }
}

/// Everything a constructor can see: its own key, the literal values bound to it
/// and the already-constructed instances of its dependencies.
#[derive(Clone)]
pub struct ComponentContext {
    key: ComponentKey,
    values: BTreeMap<String, Value>,
    dependencies: BTreeMap<String, (ComponentKey, Instance)>,
}

impl ComponentContext {
    pub fn new(key: ComponentKey) -> Self {
        Self {
            key,
            values: BTreeMap::new(),
            dependencies: BTreeMap::new(),
        }
    }

    /// Bind a literal value under `name`.
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Bind a constructed dependency under `name`.
    pub fn with_dependency(mut self, name: impl Into<String>, key: ComponentKey, instance: Instance) -> Self {
        self.dependencies.insert(name.into(), (key, instance));
        self
    }

    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    /// Decode the literal bound to `name`.
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> Result<T, ContextError> {
        let raw = match self.values.get(name) {
            Some(raw) => raw,
            None => return Err(self.missing_or_wrong_kind(name, "value")),
        };
        serde_json::from_value(raw.clone()).map_err(|source| ContextError::InvalidValue {
            component: self.key.to_string(),
            binding: name.to_string(),
            source,
        })
    }

    /// Decode the literal bound to `name`, falling back to `default` when it is
    /// absent or malformed.
    pub fn value_or<T: DeserializeOwned>(&self, name: &str, default: T) -> T {
        self.value(name).unwrap_or(default)
    }

    pub fn raw_value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// All literal bindings as a JSON object.
    pub fn values_as_json(&self) -> Value {
        Value::Object(self.values.clone().into_iter().collect())
    }

    /// Fetch the dependency bound to `name`, downcast to its concrete type.
    pub fn dependency<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ContextError> {
        let (_, instance) = match self.dependencies.get(name) {
            Some(entry) => entry,
            None => return Err(self.missing_or_wrong_kind(name, "dependency")),
        };
        Arc::downcast::<T>(instance.clone()).map_err(|_| ContextError::TypeMismatch {
            component: self.key.to_string(),
            binding: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// The untyped instance bound to `name`.
    pub fn dependency_instance(&self, name: &str) -> Option<&Instance> {
        self.dependencies.get(name).map(|(_, instance)| instance)
    }

    /// The key a dependency binding points to.
    pub fn dependency_key(&self, name: &str) -> Option<&ComponentKey> {
        self.dependencies.get(name).map(|(key, _)| key)
    }

    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    fn missing_or_wrong_kind(&self, name: &str, expected: &'static str) -> ContextError {
        let found = if self.values.contains_key(name) {
            Some("value")
        } else if self.dependencies.contains_key(name) {
            Some("dependency")
        } else {
            None
        };
        match found {
            Some(found) => ContextError::WrongBindingKind {
                component: self.key.to_string(),
                binding: name.to_string(),
                found,
                expected,
            },
            None => ContextError::MissingBinding {
                component: self.key.to_string(),
                binding: name.to_string(),
            },
        }
    }
}

impl fmt::Debug for ComponentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentContext")
            .field("key", &self.key)
            .field("values", &self.values)
            .field(
                "dependencies",
                &self
                    .dependencies
                    .iter()
                    .map(|(name, (key, _))| (name.as_str(), key.to_string()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
