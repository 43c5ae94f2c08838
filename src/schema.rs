//! Config type descriptors
//!
//! Explicit, per-type traversal metadata: each registrable type carries a
//! hand-written list of field descriptors with a closed set of field kinds.
//! The merger, the environment resolver, and the stripper walk these
//! descriptors instead of reflecting over struct fields.

use serde::de::DeserializeOwned;
use serde::Serialize;
use toml::value::Table;
use toml::Value;

/// Field shapes the resolution engine understands.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Char,
    Str,
    /// Unit-variant enum, matched against the serialized variant names.
    Enum(&'static [&'static str]),
    /// Nested structured block with its own schema.
    Nested(&'static Schema),
    /// Open-ended value (map, array): merged wholesale, never overridden
    /// from the environment.
    Opaque,
}

impl FieldKind {
    /// Human-readable shape name for warnings and schema errors.
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Bool => "boolean",
            FieldKind::Int => "integer",
            FieldKind::Float => "float",
            FieldKind::Char => "character",
            FieldKind::Str => "string",
            FieldKind::Enum(_) => "enum variant",
            FieldKind::Nested(_) => "table",
            FieldKind::Opaque => "value",
        }
    }
}

/// A single named field and its declared shape.
#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Traversal description for one structured configuration type.
#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [Field],
}

/// A registrable configuration type.
///
/// `NAME` is the type identifier: the first environment-path segment and the
/// label used in error messages. `schema()` describes the fields the engine
/// walks; anything not listed there is untouched by environment overrides.
pub trait ConfigType:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
    /// Type identifier, e.g. `"server"`.
    const NAME: &'static str;

    /// Field descriptors for this type.
    fn schema() -> &'static Schema;

    /// Semantic validation applied after load and update.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Check a schema against the serialized defaults tree.
///
/// Every declared field must have a default of the declared shape; a field
/// without one makes the type impossible to resolve and is fatal at
/// registration.
pub fn verify(schema: &Schema, defaults: &Table) -> Result<(), String> {
    for field in schema.fields {
        let value = defaults
            .get(field.name)
            .ok_or_else(|| format!("field '{}' has no default value", field.name))?;
        match (&field.kind, value) {
            (FieldKind::Bool, Value::Boolean(_)) => {}
            (FieldKind::Int, Value::Integer(_)) => {}
            (FieldKind::Float, Value::Float(_)) => {}
            (FieldKind::Char, Value::String(s)) if s.chars().count() == 1 => {}
            (FieldKind::Str, Value::String(_)) => {}
            (FieldKind::Enum(variants), Value::String(s)) => {
                if !variants.contains(&s.as_str()) {
                    return Err(format!(
                        "field '{}' defaults to '{}', which is not a declared variant",
                        field.name, s
                    ));
                }
            }
            (FieldKind::Nested(nested), Value::Table(table)) => {
                verify(nested, table).map_err(|e| format!("in '{}': {}", field.name, e))?;
            }
            (FieldKind::Opaque, _) => {}
            (kind, value) => {
                return Err(format!(
                    "field '{}' defaults to a {} where a {} is declared",
                    field.name,
                    value.type_str(),
                    kind.expected()
                ));
            }
        }
    }
    Ok(())
}
