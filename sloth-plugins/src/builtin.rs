//! Built-in producer kinds.
//!
//! Each kind is a pure function of `(merged_options, meta)`; none perform
//! I/O or hold state, so invoking the same plugin twice with the same
//! inputs always produces the same result.

use indexmap::IndexMap;
use sloth_common::types::{PluginSliResult, PluginSloMeta};

use crate::errors::PluginError;

/// The fixed catalogue of built-in producer kinds. New kinds are a closed
/// set by design — arbitrary code execution is exactly what this crate
/// replaces with manifests (see the crate-level docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    /// Emits an `Events{good, total}` SLI from two option-supplied query
    /// templates, verbatim.
    RatioTemplate,
    /// Emits a `Raw{error_ratio_query}` SLI from one option-supplied query
    /// template, verbatim.
    RawTemplate,
    /// Emits an `Events{good, total}` SLI built from bare metric names
    /// (`good_metric`, `total_metric`) wrapped in `sum(rate(<metric>[{{.window}}]))`.
    StaticGoodTotal,
    /// Delegates to another registered plugin id (option `chain_to`), with
    /// every other merged option forwarded as that plugin's call-site
    /// options. The only built-in kind that can recurse; exists so the
    /// compiler's plugin-recursion bound (depth 10) is actually exercisable
    /// rather than dead code.
    PluginChain,
}

impl BuiltinKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "ratio_template" => Some(Self::RatioTemplate),
            "raw_template" => Some(Self::RawTemplate),
            "static_good_total" => Some(Self::StaticGoodTotal),
            "plugin_chain" => Some(Self::PluginChain),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RatioTemplate => "ratio_template",
            Self::RawTemplate => "raw_template",
            Self::StaticGoodTotal => "static_good_total",
            Self::PluginChain => "plugin_chain",
        }
    }

    /// Produces an SLI from this kind's merged options. `_meta` is threaded
    /// through for producer kinds (plugin authors writing real out-of-tree
    /// producers) that want to parameterise on service/objective/window;
    /// none of the built-ins currently need it.
    pub fn produce(
        &self,
        id: &str,
        options: &IndexMap<String, String>,
        _meta: &PluginSloMeta,
    ) -> Result<PluginSliResult, PluginError> {
        match self {
            Self::RatioTemplate => {
                let good = required(id, options, "good_query")?;
                let total = required(id, options, "total_query")?;
                Ok(PluginSliResult::Events {
                    good_query: good,
                    total_query: total,
                })
            }
            Self::RawTemplate => {
                let error_ratio = required(id, options, "error_ratio_query")?;
                Ok(PluginSliResult::Raw {
                    error_ratio_query: error_ratio,
                })
            }
            Self::StaticGoodTotal => {
                let good_metric = required(id, options, "good_metric")?;
                let total_metric = required(id, options, "total_metric")?;
                Ok(PluginSliResult::Events {
                    good_query: format!("sum(rate({good_metric}[{{{{.window}}}}]))"),
                    total_query: format!("sum(rate({total_metric}[{{{{.window}}}}]))"),
                })
            }
            Self::PluginChain => {
                let target = required(id, options, "chain_to")?;
                let mut forwarded = options.clone();
                forwarded.shift_remove("chain_to");
                Ok(PluginSliResult::Plugin {
                    id: target,
                    options: forwarded,
                })
            }
        }
    }
}

fn required(
    id: &str,
    options: &IndexMap<String, String>,
    key: &str,
) -> Result<String, PluginError> {
    options
        .get(key)
        .cloned()
        .ok_or_else(|| PluginError::InvocationFailed {
            id: id.to_string(),
            message: format!("missing required option '{key}'"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> PluginSloMeta {
        PluginSloMeta {
            service: "svc".into(),
            name: "latency".into(),
            objective: 99.9,
            window_days: 30,
        }
    }

    #[test]
    fn static_good_total_wraps_metric_names() {
        let mut opts = IndexMap::new();
        opts.insert("good_metric".to_string(), "http_ok".to_string());
        opts.insert("total_metric".to_string(), "http_total".to_string());
        let result = BuiltinKind::StaticGoodTotal
            .produce("id", &opts, &meta())
            .unwrap();
        match result {
            PluginSliResult::Events { good_query, total_query } => {
                assert_eq!(good_query, "sum(rate(http_ok[{{.window}}]))");
                assert_eq!(total_query, "sum(rate(http_total[{{.window}}]))");
            }
            _ => panic!("expected Events"),
        }
    }

    #[test]
    fn ratio_template_requires_both_queries() {
        let mut opts = IndexMap::new();
        opts.insert("good_query".to_string(), "good".to_string());
        let err = BuiltinKind::RatioTemplate
            .produce("id", &opts, &meta())
            .unwrap_err();
        assert!(matches!(err, PluginError::InvocationFailed { .. }));
    }

    #[test]
    fn parses_all_known_kind_strings() {
        assert_eq!(BuiltinKind::parse("ratio_template"), Some(BuiltinKind::RatioTemplate));
        assert_eq!(BuiltinKind::parse("raw_template"), Some(BuiltinKind::RawTemplate));
        assert_eq!(
            BuiltinKind::parse("static_good_total"),
            Some(BuiltinKind::StaticGoodTotal)
        );
        assert_eq!(BuiltinKind::parse("plugin_chain"), Some(BuiltinKind::PluginChain));
        assert_eq!(BuiltinKind::parse("unknown"), None);
    }

    #[test]
    fn plugin_chain_delegates_to_target_id_with_forwarded_options() {
        let mut opts = IndexMap::new();
        opts.insert("chain_to".to_string(), "other".to_string());
        opts.insert("good_query".to_string(), "good".to_string());
        let result = BuiltinKind::PluginChain.produce("id", &opts, &meta()).unwrap();
        match result {
            PluginSliResult::Plugin { id, options } => {
                assert_eq!(id, "other");
                assert!(!options.contains_key("chain_to"));
                assert_eq!(options.get("good_query"), Some(&"good".to_string()));
            }
            _ => panic!("expected Plugin"),
        }
    }
}
