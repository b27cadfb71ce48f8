//! Directory-based plugin discovery.
//!
//! Each configured directory is scanned recursively for `plugin.toml` files,
//! each is parsed, and the result is folded into a single [`Registry`] —
//! duplicate ids from different source paths are rejected rather than
//! silently shadowed.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::PluginError;
use crate::manifest::PluginManifest;
use crate::registry::Registry;

/// Scans `dirs` in order for `plugin.toml` files and registers each one
/// found. A directory that does not exist is skipped rather than treated
/// as an error, since `--plugins-path` is a repeatable, optional flag.
pub fn discover(dirs: &[PathBuf]) -> Result<Registry, PluginError> {
    let mut registry = Registry::new();
    for dir in dirs {
        if !dir.exists() {
            debug!(path = %dir.display(), "plugin directory does not exist, skipping");
            continue;
        }
        scan_dir(dir, &mut registry)?;
    }
    Ok(registry)
}

fn scan_dir(dir: &Path, registry: &mut Registry) -> Result<(), PluginError> {
    let pattern = dir.join("**").join("plugin.toml");
    let pattern = pattern.to_string_lossy().into_owned();

    let entries = glob::glob(&pattern).map_err(|e| PluginError::ManifestInvalid {
        path: dir.to_path_buf(),
        message: format!("invalid discovery pattern: {e}"),
    })?;

    for entry in entries {
        let path = entry.map_err(|e| PluginError::DiscoveryIo {
            path: dir.to_path_buf(),
            source: std::io::Error::new(e.error().kind(), e.to_string()),
        })?;
        register_manifest_at(&path, registry)?;
    }
    Ok(())
}

fn register_manifest_at(path: &Path, registry: &mut Registry) -> Result<(), PluginError> {
    let content = std::fs::read_to_string(path).map_err(|e| PluginError::DiscoveryIo {
        path: path.to_path_buf(),
        source: e,
    })?;

    let manifest = PluginManifest::parse(&content).map_err(|e| PluginError::ManifestInvalid {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let id = manifest.id.clone();
    match registry.register_from_manifest(manifest, path.to_path_buf()) {
        Ok(()) => {
            debug!(id = %id, path = %path.display(), "registered plugin");
            Ok(())
        }
        Err(err @ PluginError::DuplicateId { .. }) => Err(err),
        Err(other) => {
            warn!(path = %path.display(), error = %other, "failed to register plugin manifest");
            Err(other)
        }
    }
}
