//! SLO compilation core: loads SLO specifications in any of three
//! dialects, validates and compiles them, and generates Prometheus
//! recording and alerting rules implementing multi-window multi-burn-rate
//! error-budget alerting.
//!
//! This crate performs no I/O and does not log (errors are always
//! returned, never printed); both are left to the CLI boundary.

pub mod compiler;
pub mod encoders;
pub mod errors;
pub mod loaders;
pub mod model;
pub mod rules;
pub mod validator;
pub mod windows;

use sloth_common::types::PluginSloMeta;
use sloth_plugins::Registry;

use errors::{AggregateError, SlothError, ValidationError};
use model::{Slo, SloGroup, SloRuleSet};

/// The outcome of compiling and generating rules for a whole group: rule
/// sets in input order for every SLO that succeeded, plus every failure
/// collected along the way. Emitted order always matches input order,
/// regardless of the order in which individual SLOs finished processing.
pub struct GroupResult {
    pub rule_sets: Vec<SloRuleSet>,
    pub error: Option<AggregateError>,
    /// Set when a group-level validation failure (a duplicate
    /// `(service, name)` identity) made the whole group fail: `rule_sets`
    /// is empty, and callers must not treat any SLO in the input group as
    /// emittable through any other path either — including an encoder like
    /// OpenSLO's that re-derives its output directly from the group's SLOs
    /// rather than from `rule_sets`.
    pub fatal: bool,
}

/// Validates, compiles, and generates rules for every SLO in `group`, in
/// input order. A single-SLO group's only failure is returned directly by
/// the caller inspecting `GroupResult::error`'s first entry; a multi-SLO
/// group continues past per-SLO failures so one bad SLO never blocks the
/// rest — UNLESS the group itself fails validation (a duplicate
/// `(service, name)` identity), which is fatal to the whole group: per
/// spec, a duplicate yields "ValidationError, no output", so no SLO in the
/// group is compiled and `rule_sets` is empty.
pub fn process_group(group: &SloGroup, registry: &Registry) -> GroupResult {
    let validation_errors = validator::validate_group(group);

    let has_group_level_failure = validation_errors
        .iter()
        .any(|e| matches!(e, ValidationError::DuplicateIdentity { .. }));

    if has_group_level_failure {
        let failures = validation_errors
            .into_iter()
            .map(|e| {
                let id = validation_error_slo_id(&e).unwrap_or_else(|| group.service.clone());
                (id, SlothError::Validation(e))
            })
            .collect();
        return GroupResult {
            rule_sets: Vec::new(),
            error: AggregateError::from_failures(failures),
            fatal: true,
        };
    }

    let mut failures: Vec<(String, SlothError)> = Vec::new();
    let mut rule_sets = Vec::new();

    for slo in &group.slos {
        if has_per_slo_validation_error(&validation_errors, slo) {
            // Already recorded below in validation_errors_for_group.
            continue;
        }
        match process_one(slo, registry) {
            Ok(rule_set) => rule_sets.push(rule_set),
            Err(err) => failures.push((slo.id.clone(), err)),
        }
    }

    for err in validation_errors_for_group(&validation_errors, group) {
        failures.push(err);
    }

    GroupResult {
        rule_sets,
        error: AggregateError::from_failures(failures),
        fatal: false,
    }
}

fn validation_errors_for_group(
    errors: &[ValidationError],
    group: &SloGroup,
) -> Vec<(String, SlothError)> {
    errors
        .iter()
        .map(|e| {
            let id = validation_error_slo_id(e).unwrap_or_else(|| group.service.clone());
            (id, SlothError::Validation(clone_validation_error(e)))
        })
        .collect()
}

fn has_per_slo_validation_error(errors: &[ValidationError], slo: &Slo) -> bool {
    errors
        .iter()
        .any(|e| validation_error_slo_id(e).as_deref() == Some(slo.id.as_str()))
}

fn validation_error_slo_id(error: &ValidationError) -> Option<String> {
    match error {
        ValidationError::ObjectiveOutOfRange { slo_id, .. }
        | ValidationError::UnsupportedWindow { slo_id, .. }
        | ValidationError::InvalidName { slo_id, .. }
        | ValidationError::ReservedLabel { slo_id, .. }
        | ValidationError::MissingSli { slo_id }
        | ValidationError::MissingWindowPlaceholder { slo_id }
        | ValidationError::InvalidPromql { slo_id, .. } => Some(slo_id.clone()),
        ValidationError::DuplicateIdentity { .. } => None,
    }
}

/// `thiserror` enums don't derive `Clone` here (their `#[source]` members
/// don't all implement it); since we only ever need the error's rendered
/// message downstream, rebuild an equivalent variant from its fields.
fn clone_validation_error(error: &ValidationError) -> ValidationError {
    match error {
        ValidationError::ObjectiveOutOfRange { slo_id, objective } => {
            ValidationError::ObjectiveOutOfRange {
                slo_id: slo_id.clone(),
                objective: *objective,
            }
        }
        ValidationError::UnsupportedWindow { slo_id, days } => ValidationError::UnsupportedWindow {
            slo_id: slo_id.clone(),
            days: *days,
        },
        ValidationError::InvalidName { slo_id, name } => ValidationError::InvalidName {
            slo_id: slo_id.clone(),
            name: name.clone(),
        },
        ValidationError::DuplicateIdentity { service, name } => ValidationError::DuplicateIdentity {
            service: service.clone(),
            name: name.clone(),
        },
        ValidationError::ReservedLabel { slo_id, label } => ValidationError::ReservedLabel {
            slo_id: slo_id.clone(),
            label: label.clone(),
        },
        ValidationError::MissingSli { slo_id } => ValidationError::MissingSli {
            slo_id: slo_id.clone(),
        },
        ValidationError::MissingWindowPlaceholder { slo_id } => {
            ValidationError::MissingWindowPlaceholder { slo_id: slo_id.clone() }
        }
        ValidationError::InvalidPromql { slo_id, message } => ValidationError::InvalidPromql {
            slo_id: slo_id.clone(),
            message: message.clone(),
        },
    }
}

/// Compiles and generates rules for one already-validated SLO.
pub fn process_one(slo: &Slo, registry: &Registry) -> Result<SloRuleSet, SlothError> {
    let meta = PluginSloMeta {
        service: slo.service.clone(),
        name: slo.name.clone(),
        objective: slo.objective,
        window_days: slo.time_window_days,
    };

    let compiled = compiler::compile(&slo.id, &slo.sli, &meta, registry).map_err(SlothError::Compile)?;

    rules::generate(slo, &compiled).map_err(SlothError::Generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{AlertMeta, Sli};
    use sloth_common::types::Labels;

    fn valid_slo(service: &str, name: &str) -> Slo {
        Slo {
            id: format!("{service}-{name}"),
            name: name.to_string(),
            service: service.to_string(),
            description: String::new(),
            time_window_days: 30,
            objective: 99.9,
            sli: Sli::Raw {
                error_ratio_query: "sum(rate(e[{{.window}}]))/sum(rate(t[{{.window}}]))".to_string(),
            },
            labels: Labels::new(),
            page_alert: AlertMeta::default(),
            ticket_alert: AlertMeta::default(),
        }
    }

    #[test]
    fn processes_a_valid_group_with_no_failures() {
        let group = SloGroup::new("svc", vec![valid_slo("svc", "latency")]);
        let registry = Registry::new();
        let result = process_group(&group, &registry);
        assert_eq!(result.rule_sets.len(), 1);
        assert!(result.error.is_none());
        assert!(!result.fatal);
    }

    #[test]
    fn unknown_plugin_fails_its_slo_but_others_still_emit() {
        let mut broken = valid_slo("svc", "broken");
        broken.sli = Sli::Plugin {
            id: "missing".to_string(),
            options: Default::default(),
        };
        let group = SloGroup::new("svc", vec![valid_slo("svc", "latency"), broken]);
        let registry = Registry::new();
        let result = process_group(&group, &registry);
        assert_eq!(result.rule_sets.len(), 1);
        assert!(result.error.is_some());
        let failures = result.error.unwrap();
        assert_eq!(failures.failures().len(), 1);
        assert_eq!(failures.failures()[0].0, "svc-broken");
    }

    #[test]
    fn duplicate_identity_is_fatal_to_the_whole_group() {
        let group = SloGroup::new(
            "svc",
            vec![valid_slo("svc", "latency"), valid_slo("svc", "latency")],
        );
        let registry = Registry::new();
        let result = process_group(&group, &registry);
        assert!(result.rule_sets.is_empty());
        assert!(result.fatal);
        assert!(result.error.is_some());
        let failures = result.error.unwrap();
        assert!(failures
            .failures()
            .iter()
            .any(|(_, err)| matches!(err, SlothError::Validation(ValidationError::DuplicateIdentity { .. }))));
    }

    #[test]
    fn duplicate_identity_blocks_even_an_otherwise_valid_third_slo() {
        let group = SloGroup::new(
            "svc",
            vec![
                valid_slo("svc", "latency"),
                valid_slo("svc", "latency"),
                valid_slo("svc", "other"),
            ],
        );
        let registry = Registry::new();
        let result = process_group(&group, &registry);
        assert!(result.rule_sets.is_empty());
    }
}
