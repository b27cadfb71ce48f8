//! The Prometheus rules YAML encoder: a single document conforming to the
//! Prometheus `groups:` schema, one group per rule set per SLO.

use serde::Serialize;

use crate::errors::EncodingError;
use crate::model::{Rule, RuleGroup, SloRuleSet};

#[derive(Debug, Serialize)]
struct Document {
    groups: Vec<EncodedGroup>,
}

#[derive(Debug, Serialize)]
struct EncodedGroup {
    name: String,
    rules: Vec<EncodedRule>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EncodedRule {
    Recording {
        record: String,
        expr: String,
        #[serde(skip_serializing_if = "indexmap::IndexMap::is_empty")]
        labels: indexmap::IndexMap<String, String>,
    },
    Alert {
        alert: String,
        expr: String,
        #[serde(rename = "for", skip_serializing_if = "Option::is_none")]
        for_duration: Option<String>,
        #[serde(skip_serializing_if = "indexmap::IndexMap::is_empty")]
        labels: indexmap::IndexMap<String, String>,
        #[serde(skip_serializing_if = "indexmap::IndexMap::is_empty")]
        annotations: indexmap::IndexMap<String, String>,
    },
}

fn encode_group(group: &RuleGroup) -> EncodedGroup {
    EncodedGroup {
        name: group.name.clone(),
        rules: group.rules.iter().map(encode_rule).collect(),
    }
}

fn encode_rule(rule: &Rule) -> EncodedRule {
    match rule {
        Rule::Recording { name, expression, labels } => EncodedRule::Recording {
            record: name.clone(),
            expr: expression.clone(),
            labels: sorted_map(labels),
        },
        Rule::Alert {
            name,
            expression,
            for_duration,
            labels,
            annotations,
        } => EncodedRule::Alert {
            alert: name.clone(),
            expr: expression.clone(),
            for_duration: for_duration.clone(),
            labels: sorted_map(labels),
            annotations: sorted_map(annotations),
        },
    }
}

fn sorted_map(labels: &sloth_common::types::Labels) -> indexmap::IndexMap<String, String> {
    labels
        .sorted_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Renders every SLO's rule sets as one Prometheus rules document, SLOs in
/// the order given.
pub fn encode(rule_sets: &[SloRuleSet]) -> Result<String, EncodingError> {
    let groups = rule_sets
        .iter()
        .flat_map(|set| set.groups().into_iter().map(encode_group))
        .collect();

    let document = Document { groups };
    serde_yaml_ng::to_string(&document).map_err(|e| EncodingError::Serialize {
        format: "prometheus".to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RuleGroup as Rg};
    use sloth_common::types::Labels;

    #[test]
    fn encodes_one_group_per_rule_set_entry() {
        let mut labels = Labels::new();
        labels.insert("sloth_id", "svc-x");
        let recording = Rule::Recording {
            name: "slo:objective:ratio".to_string(),
            expression: "0.999".to_string(),
            labels,
        };
        let set = SloRuleSet {
            slo_id: "svc-x".to_string(),
            sli_recordings: Rg {
                name: "sloth-slo-sli-recordings-svc-x".to_string(),
                rules: vec![],
            },
            meta_recordings: Rg {
                name: "sloth-slo-meta-recordings-svc-x".to_string(),
                rules: vec![recording],
            },
            alerts: Rg {
                name: "sloth-slo-alerts-svc-x".to_string(),
                rules: vec![],
            },
        };
        let output = encode(&[set]).unwrap();
        assert!(output.contains("sloth-slo-meta-recordings-svc-x"));
        assert!(output.contains("record: slo:objective:ratio"));
    }
}
