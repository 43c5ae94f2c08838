//! Config registry and the load/update/save pipeline
//!
//! Process state for registered configuration types: one entry per type,
//! holding the backing file path and the atomically published resolved
//! value. Loading merges file contents over defaults, self-heals the file,
//! then applies environment overrides; saving strips overridden leaves
//! against a base recomputed from disk, so environment data never reaches
//! the file no matter how many load/update cycles have run.

use crate::env::EnvOverrides;
use crate::error::ConfigError;
use crate::merge;
use crate::schema::{self, ConfigType, Schema};
use crate::strip;
use parking_lot::{Mutex, RwLock};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toml::value::Table;
use toml::Value;
use tracing::{debug, warn};

/// Registry-wide options, fixed at construction.
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Environment key prefix, e.g. `APP` for `APP_SERVER_PORT`.
    pub env_prefix: String,
    /// Globally enable or disable environment overrides.
    pub env_overrides: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            env_prefix: "STRATA".to_string(),
            env_overrides: true,
        }
    }
}

struct Entry {
    name: &'static str,
    path: PathBuf,
    schema: &'static Schema,
    defaults: Table,
    current: RwLock<Option<Arc<dyn Any + Send + Sync>>>,
    io: Mutex<()>,
    load: fn(&ConfigRegistry) -> Result<(), ConfigError>,
}

/// Registry of configuration types and their resolved values.
///
/// An explicit object rather than process-wide state: construct one at
/// startup and pass it to whichever components need configuration access.
/// Safe to share across threads; values are published by atomic replacement
/// so readers always observe a fully-formed instance.
pub struct ConfigRegistry {
    env: EnvOverrides,
    entries: RwLock<HashMap<TypeId, Arc<Entry>>>,
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigRegistry {
    /// Create a registry with default options.
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    /// Create a registry with explicit environment override options.
    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            env: EnvOverrides::new(&options.env_prefix, options.env_overrides),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a config type with its backing file path.
    ///
    /// No I/O happens here; call `load` (or `load_all`) to populate the
    /// value. Schema problems (a field with no usable default, a defaults
    /// tree that does not round-trip) are fatal here rather than at runtime.
    pub fn register<T: ConfigType>(&self, path: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let defaults = merge::default_tree::<T>()?;
        schema::verify(T::schema(), &defaults).map_err(|reason| ConfigError::Schema {
            name: T::NAME,
            reason,
        })?;
        Value::Table(defaults.clone())
            .try_into::<T>()
            .map_err(|e| ConfigError::Schema {
                name: T::NAME,
                reason: format!("default value does not round-trip: {}", e),
            })?;

        let mut entries = self.entries.write();
        if entries.contains_key(&TypeId::of::<T>()) || entries.values().any(|e| e.name == T::NAME)
        {
            return Err(ConfigError::AlreadyRegistered(T::NAME));
        }
        entries.insert(
            TypeId::of::<T>(),
            Arc::new(Entry {
                name: T::NAME,
                path: path.into(),
                schema: T::schema(),
                defaults,
                current: RwLock::new(None),
                io: Mutex::new(()),
                load: Self::load_erased::<T>,
            }),
        );
        Ok(())
    }

    /// Load (or reload) a config type: read the backing file, merge over
    /// defaults, self-heal the file, apply environment overrides, validate,
    /// and publish the result.
    pub fn load<T: ConfigType>(&self) -> Result<Arc<T>, ConfigError> {
        let entry = self.entry::<T>()?;
        let _io = entry.io.lock();
        self.load_entry::<T>(&entry)
    }

    fn load_entry<T: ConfigType>(&self, entry: &Entry) -> Result<Arc<T>, ConfigError> {
        let parsed = read_tree(&entry.path, entry.name);
        let mut merged = merge::merge(&parsed, &entry.defaults);

        // A tree that parses as TOML but does not decode into the type is
        // treated like an unparseable file.
        if let Err(e) = Value::Table(merged.clone()).try_into::<T>() {
            warn!(
                config = entry.name,
                path = %entry.path.display(),
                error = %e,
                "Config file does not match the expected shape; using defaults"
            );
            merged = entry.defaults.clone();
        }

        write_tree(&entry.path, &merged, entry.name)?;

        let resolved = self
            .env
            .apply(&merged, &entry.defaults, entry.schema, entry.name);
        let value: T = match Value::Table(resolved).try_into() {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    config = entry.name,
                    error = %e,
                    "Environment overrides produced an undecodable value; ignoring them for this load"
                );
                Value::Table(merged)
                    .try_into()
                    .map_err(|e| ConfigError::Schema {
                        name: entry.name,
                        reason: format!("merged value does not decode: {}", e),
                    })?
            }
        };

        value
            .validate()
            .map_err(|reason| ConfigError::Validation {
                name: entry.name,
                reason,
            })?;

        debug!(config = entry.name, path = %entry.path.display(), "Loaded configuration");
        let arc = Arc::new(value);
        *entry.current.write() = Some(arc.clone());
        Ok(arc)
    }

    fn load_erased<T: ConfigType>(registry: &ConfigRegistry) -> Result<(), ConfigError> {
        registry.load::<T>().map(|_| ())
    }

    /// Load every registered type, in type-name order. Stops at the first
    /// failure.
    pub fn load_all(&self) -> Result<(), ConfigError> {
        let loaders: Vec<fn(&ConfigRegistry) -> Result<(), ConfigError>> = {
            let entries = self.entries.read();
            let mut items: Vec<_> = entries.values().map(|e| (e.name, e.load)).collect();
            items.sort_by_key(|(name, _)| *name);
            items.into_iter().map(|(_, load)| load).collect()
        };
        for load in loaders {
            load(self)?;
        }
        Ok(())
    }

    /// Current resolved value for a config type.
    ///
    /// Errors on an unregistered or never-loaded type; it never silently
    /// falls back to defaults.
    pub fn get<T: ConfigType>(&self) -> Result<Arc<T>, ConfigError> {
        let entry = self.entry::<T>()?;
        let current = entry
            .current
            .read()
            .clone()
            .ok_or(ConfigError::NotLoaded(T::NAME))?;
        Ok(downcast::<T>(current))
    }

    /// Apply a transform to the current value, publish the result, and
    /// persist it. Leaves currently forced by the environment keep their
    /// on-disk value; everything else is written through.
    pub fn update<T: ConfigType>(
        &self,
        transform: impl FnOnce(&mut T),
    ) -> Result<Arc<T>, ConfigError> {
        let entry = self.entry::<T>()?;
        let _io = entry.io.lock();

        let current = entry
            .current
            .read()
            .clone()
            .ok_or(ConfigError::NotLoaded(T::NAME))?;
        let mut next = (*downcast::<T>(current)).clone();
        transform(&mut next);
        next.validate().map_err(|reason| ConfigError::Validation {
            name: entry.name,
            reason,
        })?;

        let arc = Arc::new(next);
        *entry.current.write() = Some(arc.clone());
        self.save_entry::<T>(&entry, &arc)?;
        Ok(arc)
    }

    /// Persist the current value, stripping environment-forced leaves.
    pub fn save<T: ConfigType>(&self) -> Result<(), ConfigError> {
        let entry = self.entry::<T>()?;
        let _io = entry.io.lock();
        let current = entry
            .current
            .read()
            .clone()
            .ok_or(ConfigError::NotLoaded(T::NAME))?;
        self.save_entry::<T>(&entry, &downcast::<T>(current))
    }

    fn save_entry<T: ConfigType>(&self, entry: &Entry, value: &Arc<T>) -> Result<(), ConfigError> {
        let runtime = merge::to_tree::<T>(value)?;
        // The base is recomputed from disk every time, never a cached
        // snapshot, so external edits between load and save survive under
        // environment-overridden leaves.
        let parsed = read_tree(&entry.path, entry.name);
        let base = merge::merge(&parsed, &entry.defaults);
        let stripped = strip::strip_overrides(&runtime, &base, entry.schema, &self.env, entry.name);
        write_tree(&entry.path, &stripped, entry.name)
    }

    fn entry<T: ConfigType>(&self) -> Result<Arc<Entry>, ConfigError> {
        self.entries
            .read()
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or(ConfigError::NotRegistered(T::NAME))
    }
}

fn downcast<T: ConfigType>(value: Arc<dyn Any + Send + Sync>) -> Arc<T> {
    match value.downcast::<T>() {
        Ok(value) => value,
        Err(_) => unreachable!("registry entry holds the registered type"),
    }
}

/// Read and parse a backing file. Missing, empty, or unparseable content is
/// treated as entirely absent so hand-edited files degrade to defaults.
fn read_tree(path: &Path, name: &'static str) -> Table {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    config = name,
                    path = %path.display(),
                    error = %e,
                    "Failed to read config file; using defaults"
                );
            }
            return Table::new();
        }
    };
    if content.trim().is_empty() {
        return Table::new();
    }
    match toml::from_str::<Table>(&content) {
        Ok(table) => table,
        Err(e) => {
            warn!(
                config = name,
                path = %path.display(),
                error = %e,
                "Failed to parse config file; using defaults"
            );
            Table::new()
        }
    }
}

/// Serialize and write a tree to its backing file, creating parent
/// directories on demand. Write failures are propagated: a failed persist
/// must be visible, since in-memory state may now diverge from disk.
fn write_tree(path: &Path, tree: &Table, name: &'static str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    let rendered = toml::to_string_pretty(tree).map_err(|source| ConfigError::Encode {
        name,
        source,
    })?;
    std::fs::write(path, rendered).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
