//! Standard configuration file locations
//!
//! XDG-aware helpers for where an application's config files conventionally
//! live. The registry itself is path-agnostic; callers resolve a location
//! here and pass it to `register`.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Per-application configuration directory, e.g. `~/.config/<app>` on
/// Linux. `None` when no home directory can be determined.
pub fn project_config_dir(app: &str) -> Option<PathBuf> {
    ProjectDirs::from("", "", app).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Conventional backing file path for a named config type:
/// `<config-dir>/<name>.toml`.
pub fn config_file_path(app: &str, name: &str) -> Option<PathBuf> {
    project_config_dir(app).map(|dir| dir.join(format!("{}.toml", name)))
}
