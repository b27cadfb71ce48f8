//! The Kubernetes custom-resource dialect loader: a cluster-scoped resource
//! whose `spec` field equals the native dialect's body, plus standard
//! `metadata`.

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::errors::ParseError;
use crate::model::K8sObjectMeta;
use crate::model::SloGroup;

fn matches_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?m)^apiVersion:\s*["']?sloth\.slok\.dev/v1["']?\s*$"#).expect("static pattern")
    })
}

pub fn matches(document: &str) -> bool {
    matches_pattern().is_match(document) && document.contains("kind: PrometheusServiceLevel")
        && document.contains("metadata:")
}

#[derive(Debug, Deserialize)]
struct K8sDocument {
    metadata: K8sMetadata,
    spec: serde_yaml_ng::Value,
}

#[derive(Debug, Default, Deserialize)]
struct K8sMetadata {
    name: String,
    namespace: Option<String>,
    #[serde(default)]
    labels: IndexMap<String, String>,
    #[serde(default)]
    annotations: IndexMap<String, String>,
}

/// Parses the envelope, then re-dispatches `spec` through the native
/// dialect's body parser (the native dialect's document shape minus the
/// `apiVersion`/`kind` envelope, which the native loader does not actually
/// read past the pre-check).
pub fn load(path: &str, document: &str) -> Result<SloGroup, ParseError> {
    load_with_default_window(path, document, super::native::DEFAULT_TIME_WINDOW_DAYS)
}

/// [`load`], defaulting any SLO that omits `timeWindow` to
/// `default_window_days`.
pub fn load_with_default_window(
    path: &str,
    document: &str,
    default_window_days: u32,
) -> Result<SloGroup, ParseError> {
    let parsed: K8sDocument = serde_yaml_ng::from_str(document).map_err(|source| ParseError::Yaml {
        path: path.to_string(),
        source,
    })?;

    let spec_yaml = serde_yaml_ng::to_string(&parsed.spec).map_err(|source| ParseError::Yaml {
        path: path.to_string(),
        source,
    })?;
    // The native loader's `matches` requires the envelope lines; reusing
    // its `load` directly on the bare spec is safe since it never
    // re-validates the envelope itself, only deserialises the body shape.
    let group = super::native::load_with_default_window(path, &spec_yaml, default_window_days)?;

    Ok(group.with_k8s_meta(K8sObjectMeta {
        name: parsed.metadata.name,
        namespace: parsed.metadata.namespace,
        labels: parsed.metadata.labels,
        annotations: parsed.metadata.annotations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
apiVersion: sloth.slok.dev/v1
kind: PrometheusServiceLevel
metadata:
  name: "myapp-slo"
  namespace: "monitoring"
  labels:
    team: "sre"
spec:
  service: "myapp"
  slos:
    - name: "requests-availability"
      objective: 99.9
      sli:
        raw:
          errorRatioQuery: sum(rate(errors[{{.window}}]))/sum(rate(total[{{.window}}]))
"#;

    #[test]
    fn matches_recognises_k8s_documents() {
        assert!(matches(DOC));
    }

    #[test]
    fn loads_spec_and_preserves_object_metadata() {
        let group = load("myapp-slo.yaml", DOC).unwrap();
        assert_eq!(group.service, "myapp");
        assert_eq!(group.slos.len(), 1);
        let meta = group.k8s_meta.unwrap();
        assert_eq!(meta.name, "myapp-slo");
        assert_eq!(meta.namespace.as_deref(), Some("monitoring"));
        assert_eq!(meta.labels.get("team").map(String::as_str), Some("sre"));
    }
}
