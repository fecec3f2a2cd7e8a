//! Expansion of a raw [`SystemConfig`] into a [`ResolvedGraph`].
//!
//! Expansion happens in two phases. First every enabled declaration is
//! indexed by key. Then each declaration's bindings are resolved against that
//! index: references become direct graph edges, param placeholders are filled
//! from the merged params, and literals pass through unchanged. The resulting
//! edges are sorted so every dependency precedes its dependents.
use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::{Map, Value};

use crate::config::document::{ComponentDecl, SystemConfig};
use crate::config::error::ConfigError;
use crate::config::graph::{Binding, ComponentSpec, DependencyGraph, ResolvedGraph};
use crate::config::params::RuntimeParams;
use crate::kernel::component::ComponentKey;
use crate::registry::ComponentRegistry;

const REF_FIELD: &str = "ref";
const PARAM_FIELD: &str = "param";
const DEFAULT_FIELD: &str = "default";

/// Resolve `raw` into a start-ordered graph.
///
/// `params` override the configuration's own `params` table. Fails without side
/// effects on undeclared or disabled references, unregistered factories,
/// missing params, malformed keys and dependency cycles.
pub fn expand(
    raw: &SystemConfig,
    params: &RuntimeParams,
    registry: &ComponentRegistry,
) -> Result<ResolvedGraph, ConfigError> {
    let mut effective: RuntimeParams = raw
        .params
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    effective.merge(params);

    // Phase one: index declarations
    let mut declared: HashMap<ComponentKey, &ComponentDecl> = HashMap::new();
    let mut disabled: HashSet<ComponentKey> = HashSet::new();
    let mut order: Vec<ComponentKey> = Vec::new();

    for decl in &raw.components {
        let key = ComponentKey::parse(&decl.key)?;
        if declared.contains_key(&key) || disabled.contains(&key) {
            return Err(ConfigError::DuplicateKey { key: key.to_string() });
        }
        if decl.enabled {
            declared.insert(key.clone(), decl);
            order.push(key);
        } else {
            log::debug!("Skipping disabled component '{}'", key);
            disabled.insert(key);
        }
    }

    // Phase two: resolve bindings into edges
    let mut graph = DependencyGraph::new();
    let mut specs: HashMap<ComponentKey, ComponentSpec> = HashMap::new();

    for key in &order {
        let decl = declared[key];
        let factory = decl.factory_name();
        let entry = registry.get(factory).ok_or_else(|| ConfigError::UnknownFactory {
            component: key.to_string(),
            factory: factory.to_string(),
        })?;

        graph.add_node(key);
        let mut bindings = BTreeMap::new();
        for (name, value) in &decl.config {
            let resolver = BindingResolver {
                component: key,
                binding: name,
                params: &effective,
            };
            let binding = resolver.resolve(value)?;
            if let Binding::Component(target) = &binding {
                if !declared.contains_key(target) {
                    return Err(if disabled.contains(target) {
                        ConfigError::DisabledReference {
                            component: key.to_string(),
                            binding: name.clone(),
                            target: target.to_string(),
                        }
                    } else {
                        ConfigError::UndeclaredReference {
                            component: key.to_string(),
                            binding: name.clone(),
                            target: target.to_string(),
                        }
                    });
                }
                graph.add_edge(key, target);
            }
            bindings.insert(name.clone(), binding);
        }

        specs.insert(key.clone(), ComponentSpec::new(key.clone(), entry.clone(), bindings));
    }

    let sorted = graph.topological_sort()?;
    log::debug!(
        "Expanded {} component(s): {}",
        sorted.len(),
        sorted.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    );

    let ordered = sorted
        .iter()
        .filter_map(|key| specs.remove(key))
        .collect();
    Ok(ResolvedGraph::from_sorted(ordered))
}

/// Resolves one binding value of one component.
struct BindingResolver<'a> {
    component: &'a ComponentKey,
    binding: &'a str,
    params: &'a RuntimeParams,
}

impl BindingResolver<'_> {
    fn resolve(&self, value: &Value) -> Result<Binding, ConfigError> {
        if let Some(target) = self.reference_target(value)? {
            let key = ComponentKey::parse(target).map_err(|e| self.malformed(e.to_string()))?;
            return Ok(Binding::Component(key));
        }
        self.substitute(value).map(Binding::Value)
    }

    /// `Some(target)` when `value` is a `{ "ref": ... }` placeholder.
    fn reference_target<'v>(&self, value: &'v Value) -> Result<Option<&'v str>, ConfigError> {
        let Some(object) = value.as_object() else {
            return Ok(None);
        };
        let Some(target) = object.get(REF_FIELD) else {
            return Ok(None);
        };
        if object.len() != 1 {
            return Err(self.malformed("a reference may not carry other fields"));
        }
        target
            .as_str()
            .map(Some)
            .ok_or_else(|| self.malformed("reference target must be a string"))
    }

    /// Fill param placeholders anywhere inside a literal.
    fn substitute(&self, value: &Value) -> Result<Value, ConfigError> {
        match value {
            Value::Object(object) => {
                if object.contains_key(REF_FIELD) {
                    return Err(self.malformed("references are only allowed as top-level bindings"));
                }
                if object.contains_key(PARAM_FIELD) {
                    return self.param_value(object);
                }
                let mut resolved = Map::with_capacity(object.len());
                for (field, inner) in object {
                    resolved.insert(field.clone(), self.substitute(inner)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.substitute(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn param_value(&self, object: &Map<String, Value>) -> Result<Value, ConfigError> {
        if object.keys().any(|field| field != PARAM_FIELD && field != DEFAULT_FIELD) {
            return Err(self.malformed("a param placeholder only accepts 'param' and 'default'"));
        }
        let name = object
            .get(PARAM_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| self.malformed("param name must be a string"))?;

        if let Some(value) = self.params.get(name) {
            return Ok(value.clone());
        }
        if let Some(default) = object.get(DEFAULT_FIELD) {
            return Ok(default.clone());
        }
        Err(ConfigError::MissingParam {
            component: self.component.to_string(),
            binding: self.binding.to_string(),
            param: name.to_string(),
        })
    }

    fn malformed(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::MalformedBinding {
            component: self.component.to_string(),
            binding: self.binding.to_string(),
            reason: reason.into(),
        }
    }
}
