//! Raw environment value coercion
//!
//! Type-directed parsing of environment strings into TOML values. A value
//! that fails to coerce yields no override; the caller warns and keeps the
//! prior value.

use crate::schema::FieldKind;
use thiserror::Error;
use toml::Value;

/// A raw value that could not be coerced to its declared field kind.
#[derive(Debug, Error)]
#[error("'{raw}' is not a valid {expected}")]
pub struct CoerceError {
    pub raw: String,
    pub expected: &'static str,
}

/// Parse a raw environment string into a TOML value of the declared kind.
///
/// Booleans accept `true`/`1` and `false`/`0` case-insensitively. Enum
/// variants match case-insensitively and canonicalize to the declared
/// variant name. Strings are taken verbatim; everything else is trimmed
/// before parsing. Nested and opaque kinds are never coerced.
pub fn coerce(raw: &str, kind: &FieldKind) -> Result<Value, CoerceError> {
    let err = || CoerceError {
        raw: raw.to_string(),
        expected: kind.expected(),
    };
    match kind {
        FieldKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Boolean(true)),
            "false" | "0" => Ok(Value::Boolean(false)),
            _ => Err(err()),
        },
        FieldKind::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| err()),
        FieldKind::Float => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| err()),
        FieldKind::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::String(c.to_string())),
                _ => Err(err()),
            }
        }
        FieldKind::Str => Ok(Value::String(raw.to_string())),
        FieldKind::Enum(variants) => variants
            .iter()
            .find(|v| v.eq_ignore_ascii_case(raw.trim()))
            .map(|v| Value::String((*v).to_string()))
            .ok_or_else(err),
        FieldKind::Nested(_) | FieldKind::Opaque => Err(err()),
    }
}
