//! Property Source Module
//!
//! Immutable key/value lookup with typed conversion, loaded from environment
//! variables and JSON property files.

use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ConfigError;

// == Typed Conversion ==
/// Conversion from a raw property string into a typed value.
///
/// Returns `None` when the raw value cannot be converted.
pub trait FromProperty: Sized {
    /// Converts a trimmed, non-empty raw value.
    fn from_property(raw: &str) -> Option<Self>;
}

impl FromProperty for bool {
    fn from_property(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Some(true),
            "false" | "off" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

macro_rules! impl_from_property_via_parse {
    ($($ty:ty),*) => {
        $(
            impl FromProperty for $ty {
                fn from_property(raw: &str) -> Option<Self> {
                    raw.parse().ok()
                }
            }
        )*
    };
}

impl_from_property_via_parse!(u16, u32, u64, i32, i64, usize);

impl FromProperty for String {
    fn from_property(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromProperty for PathBuf {
    fn from_property(raw: &str) -> Option<Self> {
        Some(PathBuf::from(raw))
    }
}

// == Properties ==
/// Read-only snapshot of configuration properties keyed by dotted names
/// such as `spring.redis.port`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    // == Constructors ==
    /// Creates an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property, returning the extended set.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Loads properties from the process environment.
    ///
    /// See [`Properties::from_vars`] for the key mapping.
    pub fn from_env() -> Self {
        Self::from_vars(env::vars_os())
    }

    /// Builds properties from environment-style variables.
    ///
    /// Names are relaxed-bound: lowercased, with `_` mapped to `.`, so
    /// `SPRING_REDIS_PORT` becomes `spring.redis.port`. When several names
    /// map to the same key, the closest spelling wins: `spring.redis.port`,
    /// then `spring_redis_port`, then `SPRING.REDIS.PORT`, then
    /// `SPRING_REDIS_PORT`. Variables that are not valid UTF-8 are skipped.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let mut ranked: HashMap<String, (u8, String)> = HashMap::new();

        for (name, value) in vars {
            let (name, value) = match (name.into().into_string(), value.into().into_string()) {
                (Ok(name), Ok(value)) => (name, value),
                (name, _) => {
                    debug!(
                        name = %name.unwrap_or_else(|raw| raw.to_string_lossy().into_owned()),
                        "Skipping environment variable that is not valid UTF-8"
                    );
                    continue;
                }
            };

            let key = relaxed_key(&name);
            let rank = binding_rank(&name, &key);
            match ranked.get(&key) {
                Some((existing, _)) if *existing <= rank => {}
                _ => {
                    ranked.insert(key, (rank, value));
                }
            }
        }

        let values = ranked
            .into_iter()
            .map(|(key, (_, value))| (key, value))
            .collect();
        Self { values }
    }

    /// Parses a JSON property document.
    ///
    /// Nested objects flatten into dotted keys and arrays into `key[i]`;
    /// `null` leaves are skipped.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(json)?;
        let root = match document {
            Value::Object(root) => root,
            other => return Err(ConfigError::NotAnObject(json_type_name(&other))),
        };

        let mut values = HashMap::new();
        for (key, value) in &root {
            flatten_into(&mut values, key.clone(), value);
        }
        Ok(Self { values })
    }

    /// Reads and parses a JSON property file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Combines two property sets; entries of `overrides` win.
    pub fn merge(mut self, overrides: Properties) -> Self {
        self.values.extend(overrides.values);
        self
    }

    // == Lookup ==
    /// Returns the raw value of a property, if present.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the typed value of a property.
    ///
    /// Empty values count as absent. Values that cannot be converted are
    /// logged and also treated as absent, so lookups never fail.
    pub fn get<T: FromProperty>(&self, key: &str) -> Option<T> {
        let raw = self.raw(key)?.trim();
        if raw.is_empty() {
            return None;
        }

        let converted = T::from_property(raw);
        if converted.is_none() {
            warn!(
                key,
                value = raw,
                "Ignoring property value that cannot be converted to {}",
                std::any::type_name::<T>()
            );
        }
        converted
    }

    /// Returns the typed value of a property or `default` when absent.
    pub fn get_or<T: FromProperty>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Returns true if the property is set, regardless of its value.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of properties in the set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no properties are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn relaxed_key(name: &str) -> String {
    name.to_ascii_lowercase().replace('_', ".")
}

/// Lower is closer to the dotted key.
fn binding_rank(name: &str, key: &str) -> u8 {
    if name == key {
        0
    } else if name == name.to_ascii_lowercase() {
        1
    } else if !name.contains('_') {
        2
    } else {
        3
    }
}

fn flatten_into(values: &mut HashMap<String, String>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            values.insert(key, b.to_string());
        }
        Value::Number(n) => {
            values.insert(key, n.to_string());
        }
        Value::String(s) => {
            values.insert(key, s.clone());
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(values, format!("{key}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (child, item) in map {
                flatten_into(values, format!("{key}.{child}"), item);
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
