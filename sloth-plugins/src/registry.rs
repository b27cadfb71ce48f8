//! The in-memory plugin registry assembled by [`crate::discovery::discover`].

use indexmap::IndexMap;
use sloth_common::types::{PluginSliResult, PluginSloMeta};
use std::path::PathBuf;

use crate::builtin::BuiltinKind;
use crate::errors::PluginError;
use crate::manifest::PluginManifest;

/// A producer callable by plugin id. Built-in kinds are the only
/// implementors today; the trait exists so a future out-of-tree producer
/// (a real subprocess or WASM kind) can be registered without changing
/// callers of [`Registry::invoke`].
pub trait SliProducer: Send + Sync {
    fn produce(
        &self,
        id: &str,
        options: &IndexMap<String, String>,
        meta: &PluginSloMeta,
    ) -> Result<PluginSliResult, PluginError>;
}

impl SliProducer for BuiltinKind {
    fn produce(
        &self,
        id: &str,
        options: &IndexMap<String, String>,
        meta: &PluginSloMeta,
    ) -> Result<PluginSliResult, PluginError> {
        BuiltinKind::produce(self, id, options, meta)
    }
}

/// A plugin as discovered on disk: its kind and the default options carried
/// in its manifest.
#[derive(Debug, Clone)]
pub struct RegisteredPlugin {
    pub id: String,
    pub kind: BuiltinKind,
    pub default_options: IndexMap<String, String>,
    pub source_path: PathBuf,
}

/// The full set of plugins known to a generator run, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    producers: IndexMap<String, RegisteredPlugin>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            producers: IndexMap::new(),
        }
    }

    /// Registers a plugin, per spec idempotent-registration conventions:
    /// the same id re-registered from the same path is not an error
    /// (matches re-scanning the same directory twice); a different path is.
    pub fn register(
        &mut self,
        id: String,
        kind: BuiltinKind,
        default_options: IndexMap<String, String>,
        source_path: PathBuf,
    ) -> Result<(), PluginError> {
        if let Some(existing) = self.producers.get(&id) {
            if existing.source_path != source_path {
                return Err(PluginError::DuplicateId {
                    id,
                    path: existing.source_path.clone(),
                    other_path: source_path,
                });
            }
            return Ok(());
        }
        self.producers.insert(
            id.clone(),
            RegisteredPlugin {
                id,
                kind,
                default_options,
                source_path,
            },
        );
        Ok(())
    }

    pub fn register_from_manifest(
        &mut self,
        manifest: PluginManifest,
        source_path: PathBuf,
    ) -> Result<(), PluginError> {
        let kind = BuiltinKind::parse(&manifest.kind).ok_or_else(|| PluginError::ManifestInvalid {
            path: source_path.clone(),
            message: format!("unknown plugin kind '{}'", manifest.kind),
        })?;
        self.register(manifest.id, kind, manifest.options, source_path)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.producers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.producers.keys().map(|k| k.as_str())
    }

    /// Invokes the named plugin, merging `call_options` over the manifest's
    /// `default_options` with `call_options` winning on conflict.
    pub fn invoke(
        &self,
        id: &str,
        call_options: &IndexMap<String, String>,
        meta: &PluginSloMeta,
    ) -> Result<PluginSliResult, PluginError> {
        let plugin = self
            .producers
            .get(id)
            .ok_or_else(|| PluginError::InvocationFailed {
                id: id.to_string(),
                message: "no plugin registered under this id".to_string(),
            })?;

        let mut merged = plugin.default_options.clone();
        for (k, v) in call_options {
            merged.insert(k.clone(), v.clone());
        }

        plugin.kind.produce(id, &merged, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_invoke_round_trips() {
        let mut registry = Registry::new();
        let mut defaults = IndexMap::new();
        defaults.insert("good_metric".to_string(), "http_ok".to_string());
        defaults.insert("total_metric".to_string(), "http_total".to_string());
        registry
            .register(
                "http-ratio".to_string(),
                BuiltinKind::StaticGoodTotal,
                defaults,
                PathBuf::from("/plugins/http-ratio/plugin.toml"),
            )
            .unwrap();

        let meta = PluginSloMeta {
            service: "svc".into(),
            name: "latency".into(),
            objective: 99.9,
            window_days: 30,
        };
        let result = registry
            .invoke("http-ratio", &IndexMap::new(), &meta)
            .unwrap();
        assert!(matches!(result, PluginSliResult::Events { .. }));
    }

    #[test]
    fn call_site_options_override_defaults() {
        let mut registry = Registry::new();
        let mut defaults = IndexMap::new();
        defaults.insert("good_metric".to_string(), "default_good".to_string());
        defaults.insert("total_metric".to_string(), "default_total".to_string());
        registry
            .register(
                "p".to_string(),
                BuiltinKind::StaticGoodTotal,
                defaults,
                PathBuf::from("/plugins/p/plugin.toml"),
            )
            .unwrap();

        let mut overrides = IndexMap::new();
        overrides.insert("good_metric".to_string(), "override_good".to_string());

        let meta = PluginSloMeta {
            service: "svc".into(),
            name: "x".into(),
            objective: 99.0,
            window_days: 30,
        };
        let result = registry.invoke("p", &overrides, &meta).unwrap();
        match result {
            PluginSliResult::Events { good_query, .. } => {
                assert!(good_query.contains("override_good"));
            }
            _ => panic!("expected Events"),
        }
    }

    #[test]
    fn duplicate_id_from_different_path_is_rejected() {
        let mut registry = Registry::new();
        registry
            .register(
                "dup".to_string(),
                BuiltinKind::RawTemplate,
                IndexMap::new(),
                PathBuf::from("/a/plugin.toml"),
            )
            .unwrap();
        let err = registry
            .register(
                "dup".to_string(),
                BuiltinKind::RawTemplate,
                IndexMap::new(),
                PathBuf::from("/b/plugin.toml"),
            )
            .unwrap_err();
        assert!(matches!(err, PluginError::DuplicateId { .. }));
    }

    #[test]
    fn invoking_unknown_id_fails() {
        let registry = Registry::new();
        let meta = PluginSloMeta {
            service: "svc".into(),
            name: "x".into(),
            objective: 99.0,
            window_days: 30,
        };
        let err = registry.invoke("missing", &IndexMap::new(), &meta).unwrap_err();
        assert!(matches!(err, PluginError::InvocationFailed { .. }));
    }
}
