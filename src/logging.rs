//! Logging System
//!
//! Structured logging bootstrap using the `tracing` crate, plus a
//! ready-made `LoggingConfig` config type so applications can manage their
//! logging settings through the registry like any other section.

use crate::error::ConfigError;
use crate::schema::{ConfigType, Field, FieldKind, Schema};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file, both
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (if output is "file")
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stdout".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("strata.log")
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

static LOGGING_SCHEMA: Schema = Schema {
    fields: &[
        Field {
            name: "level",
            kind: FieldKind::Enum(&["trace", "debug", "info", "warn", "error", "off"]),
        },
        Field {
            name: "format",
            kind: FieldKind::Enum(&["json", "text"]),
        },
        Field {
            name: "output",
            kind: FieldKind::Enum(&["stdout", "stderr", "file", "both"]),
        },
        Field {
            name: "file",
            kind: FieldKind::Str,
        },
        Field {
            name: "color",
            kind: FieldKind::Bool,
        },
        Field {
            name: "modules",
            kind: FieldKind::Opaque,
        },
    ],
};

impl ConfigType for LoggingConfig {
    const NAME: &'static str = "logging";

    fn schema() -> &'static Schema {
        &LOGGING_SCHEMA
    }

    fn validate(&self) -> Result<(), String> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];
        if !LEVELS.contains(&self.level.as_str()) {
            return Err(format!("invalid log level '{}'", self.level));
        }
        if self.format != "json" && self.format != "text" {
            return Err(format!(
                "invalid log format '{}' (must be 'json' or 'text')",
                self.format
            ));
        }
        parse_output_destinations(&self.output).map(|_| ())
    }
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. Environment variables (STRATA_LOG, STRATA_LOG_FORMAT, etc.)
/// 2. Configuration
/// 3. Defaults
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ConfigError> {
    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;

    let base_subscriber = Registry::default().with(filter);
    let use_color = config.map(|c| c.color).unwrap_or(true);

    let get_file_writer = || -> Result<std::fs::File, ConfigError> {
        let log_file = config
            .map(|c| c.file.clone())
            .unwrap_or_else(default_log_file);

        if let Some(parent) = log_file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                    path: log_file.clone(),
                    source,
                })?;
            }
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|source| ConfigError::Write {
                path: log_file.clone(),
                source,
            })
    };

    // Support stdout (default) or file output; stderr and multiple outputs
    // require more complex type handling and can be added later.
    if format == "json" {
        // JSON format
        if output.file {
            let file_writer = get_file_writer()?;
            base_subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(file_writer),
                )
                .init();
        } else {
            base_subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    } else {
        // Text format
        if output.file {
            let file_writer = get_file_writer()?;
            base_subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(false)
                        .with_writer(file_writer),
                )
                .init();
        } else {
            base_subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(use_color)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }

    Ok(())
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, ConfigError> {
    // STRATA_LOG takes precedence over anything configured.
    if let Ok(filter) = EnvFilter::try_from_env("STRATA_LOG") {
        return Ok(filter);
    }

    let level = config.map(|c| c.level.as_str()).unwrap_or("info");
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(level);

    if let Some(config) = config {
        for (module, module_level) in &config.modules {
            let directive = format!("{}={}", module, module_level);
            filter = filter.add_directive(directive.parse().map_err(|e| {
                ConfigError::Validation {
                    name: LoggingConfig::NAME,
                    reason: format!("invalid log directive: {}", e),
                }
            })?);
        }
    }

    if let Ok(modules_str) = std::env::var("STRATA_LOG_MODULES") {
        for module_spec in modules_str.split(',') {
            let parts: Vec<&str> = module_spec.split('=').collect();
            if parts.len() == 2 {
                let directive = format!("{}={}", parts[0].trim(), parts[1].trim());
                filter = filter.add_directive(directive.parse().map_err(|e| {
                    ConfigError::Validation {
                        name: LoggingConfig::NAME,
                        reason: format!("invalid log directive from env: {}", e),
                    }
                })?);
            }
        }
    }

    Ok(filter)
}

/// Determine output format from config or environment
fn determine_format(config: Option<&LoggingConfig>) -> Result<String, ConfigError> {
    if let Ok(format) = std::env::var("STRATA_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    if format != "json" && format != "text" {
        return Err(ConfigError::Validation {
            name: LoggingConfig::NAME,
            reason: format!("invalid log format: {} (must be 'json' or 'text')", format),
        });
    }

    Ok(format.to_string())
}

/// Output destinations
struct OutputDestinations {
    #[allow(dead_code)] // Planned for future use (see comment in init_logging)
    stdout: bool,
    #[allow(dead_code)] // Planned for future use (see comment in init_logging)
    stderr: bool,
    file: bool,
}

/// Determine output destinations from config or environment
fn determine_output(config: Option<&LoggingConfig>) -> Result<OutputDestinations, ConfigError> {
    if let Ok(output) = std::env::var("STRATA_LOG_OUTPUT") {
        return parse_output_destinations(&output).map_err(|reason| ConfigError::Validation {
            name: LoggingConfig::NAME,
            reason,
        });
    }

    let output = config.map(|c| c.output.as_str()).unwrap_or("stdout");
    parse_output_destinations(output).map_err(|reason| ConfigError::Validation {
        name: LoggingConfig::NAME,
        reason,
    })
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations, String> {
    match output {
        "stdout" => Ok(OutputDestinations {
            stdout: true,
            stderr: false,
            file: false,
        }),
        "stderr" => Ok(OutputDestinations {
            stdout: false,
            stderr: true,
            file: false,
        }),
        "file" => Ok(OutputDestinations {
            stdout: false,
            stderr: false,
            file: true,
        }),
        "both" => Ok(OutputDestinations {
            stdout: true,
            stderr: true,
            file: false,
        }),
        _ => Err(format!(
            "invalid log output: {} (must be 'stdout', 'stderr', 'file', or 'both')",
            output
        )),
    }
}
