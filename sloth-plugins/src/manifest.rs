//! On-disk plugin manifest format (`plugin.toml`).

use indexmap::IndexMap;
use serde::Deserialize;

/// One `plugin.toml` file registers exactly one plugin id.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    /// Stable id referenced from an SLO's `sli.plugin.id` field.
    pub id: String,
    /// Which built-in producer kind backs this plugin.
    pub kind: String,
    /// Default options merged under (and overridden by) the per-SLO
    /// `sli.plugin.options` map at invocation time.
    #[serde(default)]
    pub options: IndexMap<String, String>,
}

impl PluginManifest {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_manifest() {
        let manifest = PluginManifest::parse(
            r#"
            id = "custom-ratio"
            kind = "ratio_template"

            [options]
            good_query = "sum(rate(foo_good[{{.window}}]))"
            total_query = "sum(rate(foo_total[{{.window}}]))"
            "#,
        )
        .unwrap();
        assert_eq!(manifest.id, "custom-ratio");
        assert_eq!(manifest.kind, "ratio_template");
        assert_eq!(manifest.options.len(), 2);
    }

    #[test]
    fn rejects_manifest_missing_required_fields() {
        let result = PluginManifest::parse("kind = \"raw_template\"");
        assert!(result.is_err());
    }
}
