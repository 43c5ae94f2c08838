//! Default construction and structural merging
//!
//! The two bottom layers of resolution: a complete default tree serialized
//! from `T::default()`, and a pure recursive merge that overlays loaded file
//! contents on top of it.

use crate::error::ConfigError;
use crate::schema::ConfigType;
use toml::value::Table;
use toml::Value;

/// Serialize `T::default()` into a TOML table.
///
/// Failure means the type cannot produce a complete default tree; that is a
/// schema error, surfaced at registration and never recovered at runtime.
pub fn default_tree<T: ConfigType>() -> Result<Table, ConfigError> {
    let value = Value::try_from(T::default()).map_err(|e| ConfigError::Schema {
        name: T::NAME,
        reason: format!("default value does not serialize: {}", e),
    })?;
    match value {
        Value::Table(table) => Ok(table),
        other => Err(ConfigError::Schema {
            name: T::NAME,
            reason: format!(
                "default value serializes to a {}, expected a table",
                other.type_str()
            ),
        }),
    }
}

/// Serialize a config value into a TOML table.
pub fn to_tree<T: ConfigType>(value: &T) -> Result<Table, ConfigError> {
    let tree = Value::try_from(value).map_err(|source| ConfigError::Encode {
        name: T::NAME,
        source,
    })?;
    match tree {
        Value::Table(table) => Ok(table),
        other => Err(ConfigError::Schema {
            name: T::NAME,
            reason: format!(
                "value serializes to a {}, expected a table",
                other.type_str()
            ),
        }),
    }
}

/// Merge a loaded (possibly partial) tree over a defaults tree.
///
/// Loaded scalars win, tables merge recursively, absent keys fall back to
/// the default. A shape mismatch between the two sides (scalar where the
/// default is a table, or the reverse) falls back to the default. Keys only
/// the loaded side knows are carried through, so hand-added entries survive
/// the self-healing write.
pub fn merge(loaded: &Table, defaults: &Table) -> Table {
    let mut result = defaults.clone();
    for (key, loaded_value) in loaded {
        match (loaded_value, defaults.get(key)) {
            (Value::Table(loaded_inner), Some(Value::Table(default_inner))) => {
                result.insert(
                    key.clone(),
                    Value::Table(merge(loaded_inner, default_inner)),
                );
            }
            (Value::Table(_), Some(_)) | (_, Some(Value::Table(_))) => {
                // shape mismatch: the default stands
            }
            (value, _) => {
                result.insert(key.clone(), value.clone());
            }
        }
    }
    result
}
