//! Resolves a normalized [`Sli`] into a window-parameterised error-ratio
//! query.

use sloth_common::types::{PluginSliResult, PluginSloMeta};
use sloth_plugins::Registry;

use crate::errors::CompileError;
use crate::model::Sli;

/// The maximum depth of plugin → plugin re-entry before a recursion error
/// is raised.
pub const MAX_PLUGIN_RECURSION_DEPTH: u32 = 10;

/// An [`Sli`] fully resolved to PromQL templates, still parameterised by
/// the literal `{{.window}}` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledSli {
    Events { good_query: String, total_query: String },
    Raw { error_ratio_query: String },
}

impl CompiledSli {
    /// Substitutes `{{.window}}` with `window` in every template this
    /// variant carries, failing if a template did not actually contain the
    /// placeholder.
    pub fn substitute_window(&self, slo_id: &str, window: &str) -> Result<CompiledSli, CompileError> {
        match self {
            CompiledSli::Events { good_query, total_query } => Ok(CompiledSli::Events {
                good_query: substitute(slo_id, good_query, window)?,
                total_query: substitute(slo_id, total_query, window)?,
            }),
            CompiledSli::Raw { error_ratio_query } => Ok(CompiledSli::Raw {
                error_ratio_query: substitute(slo_id, error_ratio_query, window)?,
            }),
        }
    }
}

fn substitute(slo_id: &str, template: &str, window: &str) -> Result<String, CompileError> {
    if !template.contains("{{.window}}") {
        return Err(CompileError::TemplateExecutionFailed {
            slo_id: slo_id.to_string(),
        });
    }
    Ok(template.replace("{{.window}}", window))
}

/// Resolves `sli` into a [`CompiledSli`], invoking the plugin registry and
/// re-entering compilation on its result when `sli` is a `Plugin` variant.
pub fn compile(
    slo_id: &str,
    sli: &Sli,
    meta: &PluginSloMeta,
    registry: &Registry,
) -> Result<CompiledSli, CompileError> {
    compile_inner(slo_id, sli, meta, registry, 0)
}

fn compile_inner(
    slo_id: &str,
    sli: &Sli,
    meta: &PluginSloMeta,
    registry: &Registry,
    depth: u32,
) -> Result<CompiledSli, CompileError> {
    match sli {
        Sli::Events { good_query, total_query } => Ok(CompiledSli::Events {
            good_query: good_query.clone(),
            total_query: total_query.clone(),
        }),
        Sli::Raw { error_ratio_query } => Ok(CompiledSli::Raw {
            error_ratio_query: error_ratio_query.clone(),
        }),
        Sli::Plugin { id, options } => {
            if depth >= MAX_PLUGIN_RECURSION_DEPTH {
                return Err(CompileError::RecursionLimitExceeded {
                    slo_id: slo_id.to_string(),
                    plugin_id: id.clone(),
                    limit: MAX_PLUGIN_RECURSION_DEPTH,
                });
            }
            if !registry.contains(id) {
                return Err(CompileError::UnknownPlugin {
                    slo_id: slo_id.to_string(),
                    plugin_id: id.clone(),
                });
            }

            let result = registry
                .invoke(id, options, meta)
                .map_err(|source| CompileError::Plugin {
                    slo_id: slo_id.to_string(),
                    plugin_id: id.clone(),
                    source,
                })?;

            let resolved_sli = match result {
                PluginSliResult::Events { good_query, total_query } => {
                    Sli::Events { good_query, total_query }
                }
                PluginSliResult::Raw { error_ratio_query } => Sli::Raw { error_ratio_query },
                PluginSliResult::Plugin { id, options } => Sli::Plugin { id, options },
            };

            compile_inner(slo_id, &resolved_sli, meta, registry, depth + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use sloth_plugins::builtin::BuiltinKind;

    fn meta() -> PluginSloMeta {
        PluginSloMeta {
            service: "svc".into(),
            name: "latency".into(),
            objective: 99.9,
            window_days: 30,
        }
    }

    #[test]
    fn raw_sli_compiles_verbatim() {
        let sli = Sli::Raw {
            error_ratio_query: "sum(rate(errors[{{.window}}]))".to_string(),
        };
        let registry = Registry::new();
        let compiled = compile("svc-latency", &sli, &meta(), &registry).unwrap();
        match compiled {
            CompiledSli::Raw { error_ratio_query } => {
                assert_eq!(error_ratio_query, "sum(rate(errors[{{.window}}]))");
            }
            _ => panic!("expected Raw"),
        }
    }

    #[test]
    fn plugin_sli_resolves_through_registry() {
        let mut registry = Registry::new();
        let mut defaults = IndexMap::new();
        defaults.insert("good_metric".to_string(), "http_ok".to_string());
        defaults.insert("total_metric".to_string(), "http_total".to_string());
        registry
            .register(
                "http-ratio".to_string(),
                BuiltinKind::StaticGoodTotal,
                defaults,
                "/plugins/http-ratio/plugin.toml".into(),
            )
            .unwrap();

        let sli = Sli::Plugin {
            id: "http-ratio".to_string(),
            options: IndexMap::new(),
        };
        let compiled = compile("svc-latency", &sli, &meta(), &registry).unwrap();
        assert!(matches!(compiled, CompiledSli::Events { .. }));
    }

    #[test]
    fn unknown_plugin_id_is_a_compile_error() {
        let registry = Registry::new();
        let sli = Sli::Plugin {
            id: "missing".to_string(),
            options: IndexMap::new(),
        };
        let err = compile("svc-latency", &sli, &meta(), &registry).unwrap_err();
        assert!(matches!(err, CompileError::UnknownPlugin { .. }));
    }

    #[test]
    fn window_substitution_fails_without_placeholder() {
        let compiled = CompiledSli::Raw {
            error_ratio_query: "sum(rate(errors[5m]))".to_string(),
        };
        let err = compiled.substitute_window("svc-latency", "30d").unwrap_err();
        assert!(matches!(err, CompileError::TemplateExecutionFailed { .. }));
    }

    /// Builds a registry with a chain of `len` `plugin_chain` producers
    /// (`p0 -> p1 -> ... -> p{len-1}`) terminating in a `raw_template`
    /// producer at `p{len-1}`, so `len` total plugin invocations are needed
    /// to reach a terminal SLI.
    fn chained_registry(len: u32) -> Registry {
        let mut registry = Registry::new();
        for i in 0..len {
            if i + 1 == len {
                let mut opts = IndexMap::new();
                opts.insert(
                    "error_ratio_query".to_string(),
                    "sum(rate(errors[{{.window}}]))".to_string(),
                );
                registry
                    .register(format!("p{i}"), BuiltinKind::RawTemplate, opts, "/p".into())
                    .unwrap();
            } else {
                let mut opts = IndexMap::new();
                opts.insert("chain_to".to_string(), format!("p{}", i + 1));
                registry
                    .register(format!("p{i}"), BuiltinKind::PluginChain, opts, "/p".into())
                    .unwrap();
            }
        }
        registry
    }

    #[test]
    fn plugin_chain_of_depth_ten_is_accepted() {
        let registry = chained_registry(10);
        let sli = Sli::Plugin {
            id: "p0".to_string(),
            options: IndexMap::new(),
        };
        let compiled = compile("svc-latency", &sli, &meta(), &registry).unwrap();
        assert!(matches!(compiled, CompiledSli::Raw { .. }));
    }

    #[test]
    fn plugin_chain_of_depth_eleven_is_rejected() {
        let registry = chained_registry(11);
        let sli = Sli::Plugin {
            id: "p0".to_string(),
            options: IndexMap::new(),
        };
        let err = compile("svc-latency", &sli, &meta(), &registry).unwrap_err();
        assert!(matches!(err, CompileError::RecursionLimitExceeded { .. }));
    }

    #[test]
    fn window_substitution_replaces_every_occurrence() {
        let compiled = CompiledSli::Events {
            good_query: "sum(rate(good[{{.window}}]))".to_string(),
            total_query: "sum(rate(total[{{.window}}]))".to_string(),
        };
        let result = compiled.substitute_window("svc-latency", "1h").unwrap();
        match result {
            CompiledSli::Events { good_query, total_query } => {
                assert_eq!(good_query, "sum(rate(good[1h]))");
                assert_eq!(total_query, "sum(rate(total[1h]))");
            }
            _ => panic!("expected Events"),
        }
    }
}
