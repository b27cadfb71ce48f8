//! CLI-facing configuration layer.
//!
//! Type-safe environment parsing covering the handful of defaults
//! `sloth-cli` actually needs: default output format, default plugin search
//! paths, and default log level. An optional `sloth.toml` file (parsed with
//! `toml`) supplies the same fields; explicit CLI flags always win over
//! both.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "SLOTH_";

/// Errors encountered while parsing environment variables or config files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: expected {expected}, got '{value}'")]
    InvalidValue {
        var: String,
        expected: String,
        value: String,
    },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Persisted defaults, normally loaded from `sloth.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Default output encoder (`prometheus`, `kubernetes`, or `openslo`).
    pub default_format: Option<String>,
    /// Default plugin discovery directories.
    #[serde(default)]
    pub plugins_path: Vec<PathBuf>,
    /// Default log level (`trace`/`debug`/`info`/`warn`/`error`).
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Loads a `FileConfig` from a TOML file, returning an empty config if
    /// the file does not exist.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Type-safe reader for `SLOTH_*` environment variables.
///
/// Collects parse errors instead of failing on the first one, so all
/// problems can be reported together (same approach as the daemon's
/// `EnvParser`).
#[derive(Debug, Default)]
pub struct EnvOverrides {
    errors: Vec<ConfigError>,
}

impl EnvOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn var_name(name: &str) -> String {
        format!("{ENV_PREFIX}{name}")
    }

    /// Reads `SLOTH_LOG_LEVEL`, validating against the known tracing levels.
    pub fn log_level(&mut self, default: &str) -> String {
        let var = Self::var_name("LOG_LEVEL");
        match env::var(&var) {
            Ok(value) => {
                let lower = value.to_lowercase();
                match lower.as_str() {
                    "trace" | "debug" | "info" | "warn" | "error" => lower,
                    _ => {
                        self.errors.push(ConfigError::InvalidValue {
                            var,
                            expected: "one of trace/debug/info/warn/error".to_string(),
                            value,
                        });
                        default.to_string()
                    }
                }
            }
            Err(_) => default.to_string(),
        }
    }

    /// Reads `SLOTH_DEFAULT_FORMAT` verbatim (validated downstream by the
    /// encoder selection logic, which knows the full set of formats).
    pub fn default_format(&self) -> Option<String> {
        env::var(Self::var_name("DEFAULT_FORMAT")).ok()
    }

    /// Reads `SLOTH_PLUGINS_PATH` as a `:`-delimited list of directories.
    pub fn plugins_path(&self) -> Vec<PathBuf> {
        match env::var(Self::var_name("PLUGINS_PATH")) {
            Ok(value) if !value.is_empty() => {
                value.split(':').map(PathBuf::from).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Resolves the effective configuration by layering, lowest to highest
/// priority: built-in defaults, `sloth.toml`, environment variables. CLI
/// flags are applied on top of this by `sloth-cli` itself, since they need
/// `clap`'s `Option<T>` "was this flag given" semantics.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub default_format: String,
    pub plugins_path: Vec<PathBuf>,
    pub log_level: String,
}

impl ResolvedConfig {
    pub fn resolve(file: &FileConfig) -> (Self, Vec<ConfigError>) {
        let mut env_overrides = EnvOverrides::new();
        let log_level = env_overrides.log_level(file.log_level.as_deref().unwrap_or("info"));

        let mut plugins_path = file.plugins_path.clone();
        plugins_path.extend(env_overrides.plugins_path());

        let default_format = env_overrides
            .default_format()
            .or_else(|| file.default_format.clone())
            .unwrap_or_else(|| "prometheus".to_string());

        let errors = env_overrides.errors;
        (
            Self {
                default_format,
                plugins_path,
                log_level,
            },
            errors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_uses_builtin_defaults_when_nothing_set() {
        let file = FileConfig::default();
        let (resolved, errors) = ResolvedConfig::resolve(&file);
        assert!(errors.is_empty());
        assert_eq!(resolved.default_format, "prometheus");
        assert_eq!(resolved.log_level, "info");
        assert!(resolved.plugins_path.is_empty());
    }

    #[test]
    fn resolve_prefers_file_config_over_builtin() {
        let file = FileConfig {
            default_format: Some("kubernetes".to_string()),
            plugins_path: vec![PathBuf::from("/opt/sloth/plugins")],
            log_level: Some("debug".to_string()),
        };
        let (resolved, errors) = ResolvedConfig::resolve(&file);
        assert!(errors.is_empty());
        assert_eq!(resolved.default_format, "kubernetes");
        assert_eq!(resolved.log_level, "debug");
        assert_eq!(resolved.plugins_path, vec![PathBuf::from("/opt/sloth/plugins")]);
    }

    #[test]
    fn missing_file_config_loads_as_default() {
        let path = std::path::Path::new("/nonexistent/sloth.toml");
        let config = FileConfig::load(path).unwrap();
        assert!(config.default_format.is_none());
    }
}
