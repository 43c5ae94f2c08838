//! Strata: Layered Configuration Resolution
//!
//! Reconciles persisted configuration files with compile-time defaults and
//! process-environment overrides, without letting the layers bleed into
//! each other across repeated load/update/save cycles: environment values
//! win in memory but never reach the file, caller updates persist, and
//! partial or malformed files degrade gracefully to defaults.

pub mod env;
pub mod error;
pub mod logging;
pub mod merge;
pub mod paths;
pub mod registry;
pub mod schema;
pub mod strip;

pub use error::ConfigError;
pub use registry::{ConfigRegistry, RegistryOptions};
pub use schema::{ConfigType, Field, FieldKind, Schema};
