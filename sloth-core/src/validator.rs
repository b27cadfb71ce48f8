//! Enforces the structural invariants of a normalized [`SloGroup`]: objective
//! range, supported window, identity uniqueness, name shape, and reserved
//! label collisions.

use std::collections::HashSet;

use regex::Regex;
use std::sync::OnceLock;

use crate::errors::ValidationError;
use crate::model::{Sli, Slo, SloGroup, RESERVED_LABELS};

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("static pattern"))
}

/// Validates every SLO in `group`, collecting every failure rather than
/// stopping at the first: failures are per-SLO and non-fatal to the rest
/// of the group.
pub fn validate_group(group: &SloGroup) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for slo in &group.slos {
        let identity = (slo.service.clone(), slo.name.clone());
        if !seen.insert(identity) {
            errors.push(ValidationError::DuplicateIdentity {
                service: slo.service.clone(),
                name: slo.name.clone(),
            });
        }
        errors.extend(validate_slo(slo));
    }

    errors
}

/// Validates a single SLO in isolation (everything except identity
/// uniqueness, which is a group-level property).
pub fn validate_slo(slo: &Slo) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !(slo.objective > 0.0 && slo.objective < 100.0) {
        errors.push(ValidationError::ObjectiveOutOfRange {
            slo_id: slo.id.clone(),
            objective: slo.objective,
        });
    }

    if !crate::model::SUPPORTED_WINDOW_DAYS.contains(&slo.time_window_days) {
        errors.push(ValidationError::UnsupportedWindow {
            slo_id: slo.id.clone(),
            days: slo.time_window_days,
        });
    }

    if !valid_name(&slo.name) {
        errors.push(ValidationError::InvalidName {
            slo_id: slo.id.clone(),
            name: slo.name.clone(),
        });
    }
    if !valid_name(&slo.service) {
        errors.push(ValidationError::InvalidName {
            slo_id: slo.id.clone(),
            name: slo.service.clone(),
        });
    }

    for (key, _) in slo.labels.sorted_iter() {
        if RESERVED_LABELS.contains(&key) {
            errors.push(ValidationError::ReservedLabel {
                slo_id: slo.id.clone(),
                label: key.to_string(),
            });
        }
    }

    for query in sli_queries(&slo.sli) {
        if let Err(message) = check_balanced(query) {
            errors.push(ValidationError::InvalidPromql {
                slo_id: slo.id.clone(),
                message,
            });
        }
    }

    errors
}

fn valid_name(name: &str) -> bool {
    name.len() <= 63 && name_pattern().is_match(name)
}

/// The literal query templates this SLI carries, pre-substitution. Plugin
/// SLIs are skipped: their query text doesn't exist until the plugin
/// resolves.
fn sli_queries(sli: &Sli) -> Vec<&str> {
    match sli {
        Sli::Events { good_query, total_query } => vec![good_query.as_str(), total_query.as_str()],
        Sli::Raw { error_ratio_query } => vec![error_ratio_query.as_str()],
        Sli::Plugin { .. } => vec![],
    }
}

/// A syntactic sanity check, not a PromQL grammar: every `(`, `[`, `{`
/// closes in the same order it opened. Deliberately lightweight: full
/// parsing is deferred to query evaluation time, and this catches the
/// overwhelmingly common authoring mistake (a dropped or mismatched
/// delimiter) without embedding a PromQL parser.
fn check_balanced(query: &str) -> Result<(), String> {
    let mut stack = Vec::new();
    for ch in query.chars() {
        match ch {
            '(' | '[' | '{' => stack.push(ch),
            ')' => {
                if stack.pop() != Some('(') {
                    return Err(format!("unbalanced ')' in query: {query}"));
                }
            }
            ']' => {
                if stack.pop() != Some('[') {
                    return Err(format!("unbalanced ']' in query: {query}"));
                }
            }
            '}' => {
                if stack.pop() != Some('{') {
                    return Err(format!("unbalanced '}}' in query: {query}"));
                }
            }
            _ => {}
        }
    }
    if stack.is_empty() {
        Ok(())
    } else {
        Err(format!("unclosed delimiter(s) {stack:?} in query: {query}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertMeta, Sli};
    use sloth_common::types::Labels;

    fn base_slo(service: &str, name: &str) -> Slo {
        Slo {
            id: format!("{service}-{name}"),
            name: name.to_string(),
            service: service.to_string(),
            description: String::new(),
            time_window_days: 30,
            objective: 99.9,
            sli: Sli::Raw {
                error_ratio_query: "sum(rate(errors[{{.window}}]))".to_string(),
            },
            labels: Labels::new(),
            page_alert: AlertMeta::default(),
            ticket_alert: AlertMeta::default(),
        }
    }

    #[test]
    fn rejects_objective_at_boundaries() {
        let mut slo = base_slo("svc", "latency");
        slo.objective = 100.0;
        assert!(validate_slo(&slo)
            .iter()
            .any(|e| matches!(e, ValidationError::ObjectiveOutOfRange { .. })));

        slo.objective = 0.0;
        assert!(validate_slo(&slo)
            .iter()
            .any(|e| matches!(e, ValidationError::ObjectiveOutOfRange { .. })));

        slo.objective = 99.9999;
        assert!(validate_slo(&slo).is_empty());
    }

    #[test]
    fn rejects_unsupported_window() {
        let mut slo = base_slo("svc", "latency");
        slo.time_window_days = 31;
        assert!(validate_slo(&slo)
            .iter()
            .any(|e| matches!(e, ValidationError::UnsupportedWindow { .. })));
    }

    #[test]
    fn rejects_reserved_label() {
        let mut slo = base_slo("svc", "latency");
        slo.labels.insert("sloth_slo", "whatever");
        assert!(validate_slo(&slo)
            .iter()
            .any(|e| matches!(e, ValidationError::ReservedLabel { .. })));
    }

    #[test]
    fn rejects_unbalanced_promql() {
        let mut slo = base_slo("svc", "latency");
        slo.sli = Sli::Raw {
            error_ratio_query: "sum(rate(errors[{{.window}}])/sum(rate(total[{{.window}}]))".to_string(),
        };
        assert!(validate_slo(&slo)
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidPromql { .. })));
    }

    #[test]
    fn accepts_balanced_promql() {
        let mut slo = base_slo("svc", "latency");
        slo.sli = Sli::Events {
            good_query: "sum(rate(good{job=\"x\"}[{{.window}}]))".to_string(),
            total_query: "sum(rate(total{job=\"x\"}[{{.window}}]))".to_string(),
        };
        assert!(validate_slo(&slo).is_empty());
    }

    #[test]
    fn rejects_duplicate_identity_within_group() {
        let group = SloGroup::new("svc", vec![base_slo("svc", "latency"), base_slo("svc", "latency")]);
        let errors = validate_group(&group);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateIdentity { .. })));
    }

    #[test]
    fn rejects_malformed_name() {
        let slo = base_slo("svc", "Latency_Bad");
        assert!(validate_slo(&slo)
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidName { .. })));
    }
}
