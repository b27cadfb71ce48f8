//! The native dialect loader: `apiVersion: sloth.slok.dev/v1`,
//! `kind: PrometheusServiceLevel`.

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use sloth_common::types::Labels;

use crate::errors::ParseError;
use crate::model::{AlertMeta, Slo, SloGroup, Sli};

fn matches_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?m)^apiVersion:\s*["']?sloth\.slok\.dev/v1["']?\s*$"#).expect("static pattern")
    })
}

/// Cheap syntactic pre-check: looks for the dialect's `apiVersion` marker
/// without parsing the whole document.
pub fn matches(document: &str) -> bool {
    matches_pattern().is_match(document) && document.contains("kind: PrometheusServiceLevel")
}

#[derive(Debug, Deserialize)]
struct NativeDocument {
    service: String,
    #[serde(default)]
    labels: IndexMap<String, String>,
    slos: Vec<NativeSlo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NativeSlo {
    name: String,
    #[serde(default)]
    description: String,
    time_window: Option<String>,
    objective: f64,
    sli: NativeSli,
    #[serde(default)]
    labels: IndexMap<String, String>,
    #[serde(default)]
    alerting: NativeAlerting,
}

/// The fallback time window, in whole days, used when an SLO's `timeWindow`
/// field is absent. Overridable per-invocation via `--default-slo-period`;
/// 30 matches the native dialect's historical implicit default.
pub const DEFAULT_TIME_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Deserialize)]
struct NativeSli {
    events: Option<NativeEvents>,
    raw: Option<NativeRaw>,
    plugin: Option<NativePlugin>,
}

#[derive(Debug, Deserialize)]
struct NativeEvents {
    #[serde(rename = "errorQuery")]
    error_query: Option<String>,
    #[serde(rename = "goodQuery")]
    good_query: Option<String>,
    #[serde(rename = "totalQuery")]
    total_query: String,
}

#[derive(Debug, Deserialize)]
struct NativeRaw {
    #[serde(rename = "errorRatioQuery")]
    error_ratio_query: String,
}

#[derive(Debug, Deserialize)]
struct NativePlugin {
    id: String,
    #[serde(default)]
    options: IndexMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NativeAlerting {
    #[serde(default)]
    page_alert: NativeAlertMeta,
    #[serde(default)]
    ticket_alert: NativeAlertMeta,
}

#[derive(Debug, Default, Deserialize)]
struct NativeAlertMeta {
    #[serde(default)]
    disable: bool,
    name: Option<String>,
    #[serde(default)]
    labels: IndexMap<String, String>,
    #[serde(default)]
    annotations: IndexMap<String, String>,
}

impl From<NativeAlertMeta> for AlertMeta {
    fn from(value: NativeAlertMeta) -> Self {
        AlertMeta {
            disable: value.disable,
            name: value.name,
            labels: value.labels.into_iter().collect(),
            annotations: value.annotations.into_iter().collect(),
        }
    }
}

/// Parses days from a `"<N>d"` literal; any other unit is rejected rather
/// than guessed at, since `timeWindow` is constrained to whole days.
fn parse_days(path: &str, time_window: &str) -> Result<u32, ParseError> {
    let days_str = time_window.strip_suffix('d').ok_or_else(|| ParseError::Schema {
        path: path.to_string(),
        message: format!("timeWindow '{time_window}' must be expressed in whole days, e.g. '30d'"),
    })?;
    days_str.parse().map_err(|_| ParseError::Schema {
        path: path.to_string(),
        message: format!("timeWindow '{time_window}' is not a whole number of days"),
    })
}

/// Parses `document` under the native dialect, defaulting any SLO that
/// omits `timeWindow` to `default_window_days`; callers that don't care
/// pass [`DEFAULT_TIME_WINDOW_DAYS`].
pub fn load_with_default_window(
    path: &str,
    document: &str,
    default_window_days: u32,
) -> Result<SloGroup, ParseError> {
    let parsed: NativeDocument = serde_yaml_ng::from_str(document).map_err(|source| ParseError::Yaml {
        path: path.to_string(),
        source,
    })?;

    let mut slos = Vec::with_capacity(parsed.slos.len());
    for native_slo in parsed.slos {
        let time_window_days = match &native_slo.time_window {
            Some(window) => parse_days(path, window)?,
            None => default_window_days,
        };
        // The SLO's own labels win over the group's default labels on conflict.
        let mut labels: Labels = parsed.labels.clone().into_iter().collect();
        for (k, v) in native_slo.labels {
            labels.insert(k, v);
        }

        let sli = resolve_sli(path, &native_slo.sli)?;

        slos.push(Slo {
            id: format!("{}-{}", parsed.service, native_slo.name),
            name: native_slo.name,
            service: parsed.service.clone(),
            description: native_slo.description,
            time_window_days,
            objective: native_slo.objective,
            sli,
            labels,
            page_alert: native_slo.alerting.page_alert.into(),
            ticket_alert: native_slo.alerting.ticket_alert.into(),
        });
    }

    Ok(SloGroup::new(parsed.service, slos))
}

/// [`load_with_default_window`] using [`DEFAULT_TIME_WINDOW_DAYS`].
pub fn load(path: &str, document: &str) -> Result<SloGroup, ParseError> {
    load_with_default_window(path, document, DEFAULT_TIME_WINDOW_DAYS)
}

fn resolve_sli(path: &str, sli: &NativeSli) -> Result<Sli, ParseError> {
    if let Some(events) = &sli.events {
        let good_query = events
            .good_query
            .clone()
            .or_else(|| events.error_query.as_ref().map(|q| format!("({}) - ({q})", events.total_query)))
            .ok_or_else(|| ParseError::Schema {
                path: path.to_string(),
                message: "events SLI must supply either goodQuery or errorQuery".to_string(),
            })?;
        return Ok(Sli::Events {
            good_query,
            total_query: events.total_query.clone(),
        });
    }
    if let Some(raw) = &sli.raw {
        return Ok(Sli::Raw {
            error_ratio_query: raw.error_ratio_query.clone(),
        });
    }
    if let Some(plugin) = &sli.plugin {
        return Ok(Sli::Plugin {
            id: plugin.id.clone(),
            options: plugin.options.clone(),
        });
    }
    Err(ParseError::Schema {
        path: path.to_string(),
        message: "sli must populate exactly one of events, raw, or plugin".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
apiVersion: sloth.slok.dev/v1
kind: PrometheusServiceLevel
service: "myapp"
labels:
  owner: "sre"
slos:
  - name: "requests-availability"
    objective: 99.9
    description: "Common SLO based on availability for HTTP request responses."
    sli:
      events:
        errorQuery: sum(rate(http_request_duration_seconds_count{job="myapp",code=~"(5..|429)"}[{{.window}}]))
        totalQuery: sum(rate(http_request_duration_seconds_count{job="myapp"}[{{.window}}]))
    alerting:
      pageAlert:
        labels:
          severity: pageteam
"#;

    #[test]
    fn matches_recognises_native_documents() {
        assert!(matches(DOC));
        assert!(!matches("apiVersion: openslo/v1\nkind: SLO"));
    }

    #[test]
    fn loads_events_sli_with_derived_good_query() {
        let group = load("myapp.yaml", DOC).unwrap();
        assert_eq!(group.service, "myapp");
        assert_eq!(group.slos.len(), 1);
        let slo = &group.slos[0];
        assert_eq!(slo.id, "myapp-requests-availability");
        assert_eq!(slo.time_window_days, 30);
        match &slo.sli {
            Sli::Events { good_query, total_query } => {
                assert!(good_query.contains("http_request_duration_seconds_count"));
                assert!(total_query.contains("{{.window}}"));
            }
            _ => panic!("expected Events"),
        }
        assert_eq!(slo.labels.get("owner"), Some("sre"));
    }

    #[test]
    fn rejects_non_day_time_window() {
        let err = parse_days("x", "30h").unwrap_err();
        assert!(matches!(err, ParseError::Schema { .. }));
    }

    #[test]
    fn default_window_override_applies_only_when_timewindow_is_absent() {
        let group = load_with_default_window("myapp.yaml", DOC, 14).unwrap();
        assert_eq!(group.slos[0].time_window_days, 14);

        let with_window = DOC.replacen("objective: 99.9", "objective: 99.9\n    timeWindow: \"7d\"", 1);
        let group = load_with_default_window("myapp.yaml", &with_window, 14).unwrap();
        assert_eq!(group.slos[0].time_window_days, 7);
    }
}
