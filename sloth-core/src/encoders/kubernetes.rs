//! Wraps the Prometheus rule groups in a Kubernetes `PrometheusRule` v1
//! custom resource, carrying the original object metadata preserved by the
//! Kubernetes loader.

use serde::Serialize;

use crate::errors::EncodingError;
use crate::model::{K8sObjectMeta, SloRuleSet};

#[derive(Debug, Serialize)]
struct PrometheusRule {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    metadata: PrometheusRuleMetadata,
    spec: PrometheusRuleSpec,
}

#[derive(Debug, Serialize)]
struct PrometheusRuleMetadata {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(skip_serializing_if = "indexmap::IndexMap::is_empty")]
    labels: indexmap::IndexMap<String, String>,
    #[serde(skip_serializing_if = "indexmap::IndexMap::is_empty")]
    annotations: indexmap::IndexMap<String, String>,
}

#[derive(Debug, Serialize)]
struct PrometheusRuleSpec {
    groups: serde_yaml_ng::Value,
}

/// Encodes `rule_sets` as a single `PrometheusRule` resource. `meta` is the
/// object metadata carried from the original Kubernetes input document, if
/// any; when absent (the document came from the native or OpenSLO
/// dialects), a metadata block is synthesised from the service name.
pub fn encode(rule_sets: &[SloRuleSet], meta: Option<&K8sObjectMeta>, fallback_name: &str) -> Result<String, EncodingError> {
    let inner_yaml = super::prometheus::encode(rule_sets)?;
    let inner_value: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(&inner_yaml).map_err(|e| EncodingError::Serialize {
            format: "kubernetes".to_string(),
            message: e.to_string(),
        })?;
    let groups = inner_value
        .get("groups")
        .cloned()
        .unwrap_or(serde_yaml_ng::Value::Sequence(vec![]));

    let metadata = match meta {
        Some(m) => PrometheusRuleMetadata {
            name: m.name.clone(),
            namespace: m.namespace.clone(),
            labels: m.labels.clone(),
            annotations: m.annotations.clone(),
        },
        None => PrometheusRuleMetadata {
            name: fallback_name.to_string(),
            namespace: None,
            labels: Default::default(),
            annotations: Default::default(),
        },
    };

    let resource = PrometheusRule {
        api_version: "monitoring.coreos.com/v1".to_string(),
        kind: "PrometheusRule".to_string(),
        metadata,
        spec: PrometheusRuleSpec { groups },
    };

    serde_yaml_ng::to_string(&resource).map_err(|e| EncodingError::Serialize {
        format: "kubernetes".to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RuleGroup;

    #[test]
    fn wraps_empty_rule_sets_with_synthesised_metadata() {
        let output = encode(&[], None, "svc-x").unwrap();
        assert!(output.contains("PrometheusRule"));
        assert!(output.contains("name: svc-x"));
    }

    #[test]
    fn preserves_original_object_metadata() {
        let mut labels = indexmap::IndexMap::new();
        labels.insert("team".to_string(), "sre".to_string());
        let meta = K8sObjectMeta {
            name: "myapp-slo".to_string(),
            namespace: Some("monitoring".to_string()),
            labels,
            annotations: Default::default(),
        };
        let set = SloRuleSet {
            slo_id: "svc-x".to_string(),
            sli_recordings: RuleGroup { name: "g".to_string(), rules: vec![] },
            meta_recordings: RuleGroup { name: "g2".to_string(), rules: vec![] },
            alerts: RuleGroup { name: "g3".to_string(), rules: vec![] },
        };
        let output = encode(&[set], Some(&meta), "fallback").unwrap();
        assert!(output.contains("namespace: monitoring"));
        assert!(output.contains("team: sre"));
    }
}
