//! Environment override resolution
//!
//! Walks a config tree alongside its schema, substituting values from
//! `<PREFIX>_<TYPE>_<FIELD>[_<NESTEDFIELD>...]` environment variables. Each
//! field resolves independently of its siblings, so partial overrides (one
//! leaf from the environment, its sibling from the file) are expected. A
//! value that fails to parse keeps the prior value and emits a warning;
//! it never aborts a load.

pub mod coerce;
pub mod key;

use crate::schema::{FieldKind, Schema};
use toml::value::Table;
use toml::Value;
use tracing::warn;

/// Environment override policy: key prefix plus a global enable switch.
///
/// The prefix is normalized once at construction (uppercased, `.`/`-`
/// mapped to `_`), fixed for the registry's lifetime.
#[derive(Debug, Clone)]
pub struct EnvOverrides {
    prefix: String,
    enabled: bool,
}

impl EnvOverrides {
    pub fn new(prefix: &str, enabled: bool) -> Self {
        Self {
            prefix: key::normalize_segment(prefix),
            enabled,
        }
    }

    /// Whether override application is enabled at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The variable name for a field path.
    pub fn key_for(&self, path: &[String]) -> String {
        key::env_key(&self.prefix, path)
    }

    /// Whether the variable for a field path is currently set.
    ///
    /// Always false when overrides are disabled; a set-but-malformed value
    /// still counts as set.
    pub fn is_set(&self, path: &[String]) -> bool {
        self.enabled && std::env::var(self.key_for(path)).is_ok()
    }

    /// Apply environment overrides to `instance`.
    ///
    /// `root` is the type-name segment. `defaults` supplies a fresh nested
    /// block when the instance omits one entirely, so variables can populate
    /// fields the file never mentioned.
    pub fn apply(
        &self,
        instance: &Table,
        defaults: &Table,
        schema: &Schema,
        root: &str,
    ) -> Table {
        if !self.enabled {
            return instance.clone();
        }
        let mut path = vec![root.to_string()];
        self.apply_at(instance, defaults, schema, &mut path)
    }

    fn apply_at(
        &self,
        instance: &Table,
        defaults: &Table,
        schema: &Schema,
        path: &mut Vec<String>,
    ) -> Table {
        let mut result = instance.clone();
        for field in schema.fields {
            path.push(field.name.to_string());
            match &field.kind {
                FieldKind::Nested(nested) => {
                    let nested_defaults = match defaults.get(field.name) {
                        Some(Value::Table(t)) => t.clone(),
                        _ => Table::new(),
                    };
                    let base = match instance.get(field.name) {
                        Some(Value::Table(t)) => t.clone(),
                        _ => nested_defaults.clone(),
                    };
                    let resolved = self.apply_at(&base, &nested_defaults, nested, path);
                    result.insert(field.name.to_string(), Value::Table(resolved));
                }
                FieldKind::Opaque => {}
                kind => {
                    let env_key = self.key_for(path);
                    if let Ok(raw) = std::env::var(&env_key) {
                        match coerce::coerce(&raw, kind) {
                            Ok(value) => {
                                result.insert(field.name.to_string(), value);
                            }
                            Err(e) => warn!(
                                key = %env_key,
                                raw = %raw,
                                expected = e.expected,
                                "Ignoring unparseable environment override"
                            ),
                        }
                    }
                }
            }
            path.pop();
        }
        result
    }
}
