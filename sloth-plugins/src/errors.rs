//! Plugin discovery and invocation errors (`PluginError`).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin manifest at {path:?} and {other_path:?} both declare id '{id}'")]
    DuplicateId {
        id: String,
        path: PathBuf,
        other_path: PathBuf,
    },

    #[error("plugin manifest at {path:?} is malformed: {message}")]
    ManifestInvalid { path: PathBuf, message: String },

    #[error("failed to read plugin discovery directory {path:?}")]
    DiscoveryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("plugin '{id}' invocation failed: {message}")]
    InvocationFailed { id: String, message: String },
}
