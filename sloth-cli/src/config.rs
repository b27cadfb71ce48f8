//! Locates the CLI's `sloth.toml` configuration file, using a
//! `directories`-based convention for locating per-user config.

use std::path::PathBuf;

use directories::ProjectDirs;

/// `<config dir>/sloth/sloth.toml`, falling back to `./sloth.toml` in the
/// current directory when no platform config directory can be resolved.
pub fn default_path() -> PathBuf {
    ProjectDirs::from("dev", "sloth", "sloth")
        .map(|dirs| dirs.config_dir().join("sloth.toml"))
        .unwrap_or_else(|| PathBuf::from("sloth.toml"))
}
