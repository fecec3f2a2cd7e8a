use std::collections::BTreeMap;
use std::ffi::OsString;

use serde_json::Value;

use crate::config::error::ConfigError;

/// Environment-specific values merged into a configuration at expansion time
/// (ports, credentials, feature switches).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeParams {
    values: BTreeMap<String, Value>,
}

impl RuntimeParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on top of `self`; values from `other` win.
    pub fn merge(&mut self, other: &RuntimeParams) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Parse `name=value` pairs as given on the command line.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut params = Self::new();
        for pair in pairs {
            let text = pair.as_ref();
            let (name, raw) = text.split_once('=').ok_or_else(|| ConfigError::InvalidParam {
                text: text.to_string(),
                reason: "expected name=value",
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::InvalidParam {
                    text: text.to_string(),
                    reason: "param name is empty",
                });
            }
            params.insert(name, parse_value(raw));
        }
        Ok(params)
    }

    /// Collect params from variables starting with `prefix`.
    ///
    /// `KEEL_DB_URL=...` with prefix `KEEL_` becomes param `db-url`.
    pub fn from_vars<I>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::new();
        for (var, raw) in vars {
            let Some(stripped) = var.strip_prefix(prefix) else {
                continue;
            };
            if stripped.is_empty() {
                continue;
            }
            let name = stripped.to_lowercase().replace('_', "-");
            params.insert(name, parse_value(&raw));
        }
        params
    }

    /// [`from_vars`](Self::from_vars) over raw OS strings. Entries that are not
    /// valid Unicode are skipped.
    pub fn from_os_vars<I>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let unicode = vars.into_iter().filter_map(|(var, raw)| {
            let var = match var.into_string() {
                Ok(var) => var,
                Err(var) => {
                    log::debug!("Skipping non-Unicode environment variable {:?}", var);
                    return None;
                }
            };
            match raw.into_string() {
                Ok(raw) => Some((var, raw)),
                Err(_) => {
                    if var.starts_with(prefix) {
                        log::warn!("Ignoring environment variable '{}': value is not valid Unicode", var);
                    }
                    None
                }
            }
        });
        Self::from_vars(prefix, unicode)
    }

    /// [`from_os_vars`](Self::from_os_vars) over the process environment.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_os_vars(prefix, std::env::vars_os())
    }
}

impl FromIterator<(String, Value)> for RuntimeParams {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Values that parse as JSON (numbers, booleans, quoted strings, arrays) keep
/// their type; everything else is taken as a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
