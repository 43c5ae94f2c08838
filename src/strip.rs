//! Override stripping for write-back
//!
//! Reconstructs the tree that belongs on disk when some leaves are being
//! forced by the environment: those leaves keep the persisted-base value,
//! every other leaf follows the runtime instance (which may carry caller
//! updates). Recurses the same way as the resolver, so the two walks stay
//! in agreement about which variable names a schema produces.

use crate::env::EnvOverrides;
use crate::schema::{FieldKind, Schema};
use toml::value::Table;
use toml::Value;

/// Build the persistable tree from a runtime instance and a freshly
/// recomputed base (file merged with defaults, no environment influence).
///
/// Starts from `base`, so keys only the file knows are preserved; schema
/// leaves are then overwritten with runtime values unless their environment
/// variable is currently set.
pub fn strip_overrides(
    runtime: &Table,
    base: &Table,
    schema: &Schema,
    env: &EnvOverrides,
    root: &str,
) -> Table {
    let mut path = vec![root.to_string()];
    strip_at(runtime, base, schema, env, &mut path)
}

fn strip_at(
    runtime: &Table,
    base: &Table,
    schema: &Schema,
    env: &EnvOverrides,
    path: &mut Vec<String>,
) -> Table {
    let mut result = base.clone();
    for field in schema.fields {
        path.push(field.name.to_string());
        match &field.kind {
            FieldKind::Nested(nested) => {
                let runtime_inner = match runtime.get(field.name) {
                    Some(Value::Table(t)) => t.clone(),
                    _ => Table::new(),
                };
                let base_inner = match base.get(field.name) {
                    Some(Value::Table(t)) => t.clone(),
                    _ => Table::new(),
                };
                let stripped = strip_at(&runtime_inner, &base_inner, nested, env, path);
                result.insert(field.name.to_string(), Value::Table(stripped));
            }
            FieldKind::Opaque => {
                if let Some(value) = runtime.get(field.name) {
                    result.insert(field.name.to_string(), value.clone());
                }
            }
            _ => {
                if !env.is_set(path) {
                    if let Some(value) = runtime.get(field.name) {
                        result.insert(field.name.to_string(), value.clone());
                    }
                }
            }
        }
        path.pop();
    }
    result
}
