//! The rules generator: turns one compiled SLI plus its SLO metadata into
//! SLI recording rules, metadata recording rules, and multi-window
//! multi-burn-rate alerts.

use sloth_common::types::Labels;

use crate::compiler::CompiledSli;
use crate::errors::GenerationError;
use crate::model::{AlertMeta, Rule, RuleGroup, Slo, SloRuleSet};
use crate::windows::{burn_rate_table, full_window_literal, SHORT_WINDOWS};

/// Which family of metric a compiled SLI records at each window: the
/// "ok" ratio for Events SLIs, or the error ratio directly for Raw SLIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricKind {
    EventsOk,
    Error,
}

impl MetricKind {
    fn metric_prefix(&self) -> &'static str {
        match self {
            MetricKind::EventsOk => "sloth_sli_events_ok:ratio_rate",
            MetricKind::Error => "sloth_sli_error:ratio_rate",
        }
    }

    fn metric_name(&self, window: &str) -> String {
        format!("{}{}", self.metric_prefix(), window)
    }
}

/// Builds the `{sloth_id="...",sloth_service="...",sloth_slo="..."}`
/// selector every emitted vector selector in this generator carries.
fn identity_selector(slo: &Slo) -> String {
    format!(
        r#"{{sloth_id="{}",sloth_service="{}",sloth_slo="{}"}}"#,
        slo.id, slo.service, slo.name
    )
}

/// The PromQL term for "the error ratio at window W", in terms of whichever
/// metric this SLI kind actually records.
fn error_ratio_term(kind: MetricKind, window: &str, selector: &str) -> String {
    let metric = kind.metric_name(window);
    match kind {
        MetricKind::EventsOk => format!("1 - {metric}{selector}"),
        MetricKind::Error => format!("{metric}{selector}"),
    }
}

/// Renders a ratio derived from the objective (e.g. `1.0 - objective / 100.0`)
/// as a clean decimal literal. The arithmetic that derives these ratios
/// accumulates binary floating-point error invisible at the precision an
/// objective is ever specified to (`99.9` becomes `0.0009999999999998899`,
/// not `0.001`); rounding to 12 decimal places and trimming absorbs that
/// noise while keeping every digit an objective can actually carry.
fn format_ratio(value: f64) -> String {
    let mut formatted = format!("{value:.12}");
    if formatted.contains('.') {
        while formatted.ends_with('0') {
            formatted.pop();
        }
        if formatted.ends_with('.') {
            formatted.pop();
        }
    }
    formatted
}

/// Identity labels plus the SLO's own sorted user labels, as every emitted
/// rule carries.
fn base_labels(slo: &Slo) -> Labels {
    let mut labels = Labels::new();
    labels.insert("sloth_id", slo.id.clone());
    labels.insert("sloth_service", slo.service.clone());
    labels.insert("sloth_slo", slo.name.clone());
    for (k, v) in slo.labels.sorted_iter() {
        labels.insert(k, v);
    }
    labels
}

fn metric_kind_of(sli: &CompiledSli) -> MetricKind {
    match sli {
        CompiledSli::Events { .. } => MetricKind::EventsOk,
        CompiledSli::Raw { .. } => MetricKind::Error,
    }
}

/// Generates every rule group for one SLO. `compiled` must already have
/// been produced by [`crate::compiler::compile`] for this SLO's SLI.
pub fn generate(slo: &Slo, compiled: &CompiledSli) -> Result<SloRuleSet, GenerationError> {
    let kind = metric_kind_of(compiled);
    let sli_recordings = generate_sli_recordings(slo, compiled)?;
    let meta_recordings = generate_meta_recordings(slo, kind)?;
    let alerts = generate_alerts(slo, kind)?;

    Ok(SloRuleSet {
        slo_id: slo.id.clone(),
        sli_recordings,
        meta_recordings,
        alerts,
    })
}

fn generate_sli_recordings(
    slo: &Slo,
    compiled: &CompiledSli,
) -> Result<RuleGroup, GenerationError> {
    let kind = metric_kind_of(compiled);
    let selector = identity_selector(slo);
    let mut rules = Vec::with_capacity(SHORT_WINDOWS.len() + 1);

    for window in SHORT_WINDOWS {
        let substituted = compiled
            .substitute_window(&slo.id, window)
            .map_err(|e| GenerationError::Internal {
                slo_id: slo.id.clone(),
                message: e.to_string(),
            })?;
        let expression = match &substituted {
            CompiledSli::Events { good_query, total_query } => {
                format!("({good_query}) / ({total_query})")
            }
            CompiledSli::Raw { error_ratio_query } => error_ratio_query.clone(),
        };

        let mut labels = base_labels(slo);
        labels.insert("sloth_window", window.to_string());

        rules.push(Rule::Recording {
            name: kind.metric_name(window),
            expression,
            labels,
        });
    }

    let full_window = full_window_literal(slo.time_window_days);
    let full_window_seconds = (slo.time_window_days as u64) * 86400;
    let terms: Vec<String> = SHORT_WINDOWS
        .iter()
        .map(|w| {
            let weight = window_seconds(w) as f64 / full_window_seconds as f64;
            format!("({}{} * {weight})", kind.metric_name(w), selector)
        })
        .collect();
    let expression = terms.join(" + ");

    let mut labels = base_labels(slo);
    labels.insert("sloth_window", full_window.clone());
    rules.push(Rule::Recording {
        name: kind.metric_name(&full_window),
        expression,
        labels,
    });

    Ok(RuleGroup {
        name: format!("sloth-slo-sli-recordings-{}", slo.id),
        rules,
    })
}

fn window_seconds(window: &str) -> u64 {
    let (value, unit) = window.split_at(window.len() - 1);
    let value: u64 = value.parse().expect("window literal has a numeric prefix");
    match unit {
        "m" => value * 60,
        "h" => value * 3600,
        "d" => value * 86400,
        other => panic!("unsupported window unit '{other}'"),
    }
}

fn generate_meta_recordings(slo: &Slo, kind: MetricKind) -> Result<RuleGroup, GenerationError> {
    let selector = identity_selector(slo);
    let full_window = full_window_literal(slo.time_window_days);
    let objective_ratio = format_ratio(slo.objective / 100.0);
    let error_budget_ratio = format_ratio(1.0 - slo.objective / 100.0);

    let labels = base_labels(slo);

    let mut rules = vec![
        Rule::Recording {
            name: "slo:current_burn_rate:ratio".to_string(),
            expression: format!(
                "({}) / {error_budget_ratio}",
                error_ratio_term(kind, "5m", &selector)
            ),
            labels: labels.clone(),
        },
        Rule::Recording {
            name: "slo:error_budget:ratio".to_string(),
            expression: error_budget_ratio.clone(),
            labels: labels.clone(),
        },
        Rule::Recording {
            name: "slo:objective:ratio".to_string(),
            expression: objective_ratio,
            labels: labels.clone(),
        },
        Rule::Recording {
            name: "slo:period_burn_rate:ratio".to_string(),
            expression: format!(
                "({}) / {error_budget_ratio}",
                error_ratio_term(kind, &full_window, &selector)
            ),
            labels: labels.clone(),
        },
        Rule::Recording {
            name: "slo:period_error_budget_remaining:ratio".to_string(),
            expression: format!(
                "1 - (({}) / {error_budget_ratio})",
                error_ratio_term(kind, &full_window, &selector)
            ),
            labels: labels.clone(),
        },
        Rule::Recording {
            name: "slo:time_period:days".to_string(),
            expression: format!("{}", slo.time_window_days),
            labels: labels.clone(),
        },
    ];

    let mut info_labels = labels;
    info_labels.insert("sloth_mode", "generator");
    info_labels.insert("sloth_spec", "sloth.slok.dev/v1");
    info_labels.insert("sloth_version", env!("CARGO_PKG_VERSION"));
    info_labels.insert("sloth_objective", format!("{}", slo.objective));
    rules.push(Rule::Recording {
        name: "sloth_slo_info".to_string(),
        expression: "1".to_string(),
        labels: info_labels,
    });

    Ok(RuleGroup {
        name: format!("sloth-slo-meta-recordings-{}", slo.id),
        rules,
    })
}

fn generate_alerts(slo: &Slo, kind: MetricKind) -> Result<RuleGroup, GenerationError> {
    let table = burn_rate_table(&slo.id, slo.time_window_days)?;
    let selector = identity_selector(slo);

    let page_tiers: Vec<_> = table
        .iter()
        .filter(|t| matches!(t.severity, crate::windows::Severity::Page))
        .collect();
    let ticket_tiers: Vec<_> = table
        .iter()
        .filter(|t| matches!(t.severity, crate::windows::Severity::Ticket))
        .collect();

    let mut rules = Vec::with_capacity(2);
    if !slo.page_alert.disable {
        rules.push(build_alert_rule(
            slo,
            "page",
            &page_tiers,
            &slo.page_alert,
            &selector,
            kind,
        ));
    }
    if !slo.ticket_alert.disable {
        rules.push(build_alert_rule(
            slo,
            "ticket",
            &ticket_tiers,
            &slo.ticket_alert,
            &selector,
            kind,
        ));
    }

    Ok(RuleGroup {
        name: format!("sloth-slo-alerts-{}", slo.id),
        rules,
    })
}

fn build_alert_rule(
    slo: &Slo,
    severity: &str,
    tiers: &[&crate::windows::BurnRateTier],
    meta: &AlertMeta,
    selector: &str,
    kind: MetricKind,
) -> Rule {
    let conditions: Vec<String> = tiers
        .iter()
        .map(|tier| {
            format!(
                "(({}) > {} and ({}) > {})",
                error_ratio_term(kind, tier.long_window, selector),
                tier.factor,
                error_ratio_term(kind, tier.short_window, selector),
                tier.factor
            )
        })
        .collect();
    let expression = conditions.join(" or ");

    let mut labels = base_labels(slo);
    labels.insert("severity", severity.to_string());
    for (k, v) in meta.labels.sorted_iter() {
        labels.insert(k, v);
    }

    let mut annotations = Labels::new();
    for (k, v) in meta.annotations.sorted_iter() {
        annotations.insert(k, v);
    }

    let name = meta
        .name
        .clone()
        .unwrap_or_else(|| format!("{}-{}", slo.id, severity));

    Rule::Alert {
        name,
        expression,
        for_duration: None,
        labels,
        annotations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sli;

    fn events_slo() -> Slo {
        Slo {
            id: "svc-latency".to_string(),
            name: "latency".to_string(),
            service: "svc".to_string(),
            description: String::new(),
            time_window_days: 30,
            objective: 99.9,
            sli: Sli::Events {
                good_query: "sum(rate(good[{{.window}}]))".to_string(),
                total_query: "sum(rate(total[{{.window}}]))".to_string(),
            },
            labels: Labels::new(),
            page_alert: AlertMeta::default(),
            ticket_alert: AlertMeta::default(),
        }
    }

    #[test]
    fn events_sli_emits_exactly_eight_recording_rules() {
        let slo = events_slo();
        let compiled = CompiledSli::Events {
            good_query: "sum(rate(good[{{.window}}]))".to_string(),
            total_query: "sum(rate(total[{{.window}}]))".to_string(),
        };
        let group = generate_sli_recordings(&slo, &compiled).unwrap();
        assert_eq!(group.rules.len(), 8);
        let windows: Vec<String> = group
            .rules
            .iter()
            .filter_map(|r| match r {
                Rule::Recording { labels, .. } => labels.get("sloth_window").map(|s| s.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(
            windows,
            vec!["5m", "30m", "1h", "2h", "6h", "1d", "3d", "30d"]
        );
    }

    #[test]
    fn error_budget_ratio_is_complement_of_objective() {
        let slo = events_slo();
        let group = generate_meta_recordings(&slo, MetricKind::EventsOk).unwrap();
        let budget = group
            .rules
            .iter()
            .find(|r| r.name() == "slo:error_budget:ratio")
            .unwrap();
        match budget {
            Rule::Recording { expression, .. } => {
                assert_eq!(expression, "0.001");
            }
            _ => panic!("expected Recording"),
        }
    }

    #[test]
    fn objective_ratio_is_rendered_as_a_clean_decimal() {
        let slo = events_slo();
        let group = generate_meta_recordings(&slo, MetricKind::EventsOk).unwrap();
        let objective = group
            .rules
            .iter()
            .find(|r| r.name() == "slo:objective:ratio")
            .unwrap();
        match objective {
            Rule::Recording { expression, .. } => {
                assert_eq!(expression, "0.999");
            }
            _ => panic!("expected Recording"),
        }
    }

    #[test]
    fn alerts_carry_identity_selectors_and_correct_factors() {
        let slo = events_slo();
        let group = generate_alerts(&slo, MetricKind::EventsOk).unwrap();
        assert_eq!(group.rules.len(), 2);
        let page = &group.rules[0];
        match page {
            Rule::Alert { expression, labels, .. } => {
                assert!(expression.contains("14.4"));
                assert!(expression.contains("6"));
                assert!(expression.contains(r#"sloth_id="svc-latency""#));
                assert_eq!(labels.get("severity"), Some("page"));
            }
            _ => panic!("expected Alert"),
        }
    }

    #[test]
    fn disabled_alert_is_not_emitted() {
        let mut slo = events_slo();
        slo.ticket_alert.disable = true;
        let group = generate_alerts(&slo, MetricKind::EventsOk).unwrap();
        assert_eq!(group.rules.len(), 1);
    }
}
