//! The OpenSLO dialect loader: `apiVersion: openslo/v1`, `kind: SLO`. One
//! document declares N objectives; each is expanded into a distinct
//! normalized SLO.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use sloth_common::types::Labels;

use crate::errors::ParseError;
use crate::model::{AlertMeta, Slo, SloGroup, Sli};

fn matches_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"(?m)^apiVersion:\s*["']?openslo/v1["']?\s*$"#).expect("static pattern"))
}

pub fn matches(document: &str) -> bool {
    matches_pattern().is_match(document) && document.contains("kind: SLO")
}

#[derive(Debug, Deserialize)]
struct OpenSloDocument {
    metadata: OpenSloMetadata,
    spec: OpenSloSpec,
}

#[derive(Debug, Deserialize)]
struct OpenSloMetadata {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OpenSloSpec {
    service: String,
    #[serde(default)]
    description: String,
    indicator: Option<OpenSloIndicator>,
    #[serde(rename = "timeWindow")]
    time_window: Vec<OpenSloTimeWindow>,
    objectives: Vec<OpenSloObjective>,
}

#[derive(Debug, Deserialize)]
struct OpenSloTimeWindow {
    duration: String,
    #[serde(default, rename = "isRolling")]
    is_rolling: bool,
}

#[derive(Debug, Deserialize)]
struct OpenSloIndicator {
    spec: OpenSloIndicatorSpec,
}

#[derive(Debug, Deserialize)]
struct OpenSloIndicatorSpec {
    #[serde(rename = "ratioMetric")]
    ratio_metric: Option<OpenSloRatioMetric>,
    #[serde(rename = "thresholdMetric")]
    threshold_metric: Option<OpenSloThresholdMetric>,
}

#[derive(Debug, Deserialize)]
struct OpenSloRatioMetric {
    good: Option<OpenSloMetricSource>,
    bad: Option<OpenSloMetricSource>,
    total: OpenSloMetricSource,
}

#[derive(Debug, Deserialize)]
struct OpenSloThresholdMetric {
    #[serde(rename = "queryType")]
    query_type: String,
    source: String,
    query: String,
}

#[derive(Debug, Deserialize)]
struct OpenSloMetricSource {
    #[serde(rename = "metricSource")]
    metric_source: OpenSloMetricSourceInner,
}

#[derive(Debug, Deserialize)]
struct OpenSloMetricSourceInner {
    #[serde(rename = "type")]
    source_type: String,
    spec: OpenSloMetricSourceSpec,
}

#[derive(Debug, Deserialize)]
struct OpenSloMetricSourceSpec {
    query: String,
}

#[derive(Debug, Deserialize)]
struct OpenSloObjective {
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    target: f64,
}

const SUPPORTED_SOURCE_TYPES: &[&str] = &["prometheus", "sloth"];

pub fn load(path: &str, document: &str) -> Result<SloGroup, ParseError> {
    let parsed: OpenSloDocument = serde_yaml_ng::from_str(document).map_err(|source| ParseError::Yaml {
        path: path.to_string(),
        source,
    })?;

    let time_window = parsed.spec.time_window.first().ok_or_else(|| ParseError::Schema {
        path: path.to_string(),
        message: "timeWindow must declare exactly one rolling duration".to_string(),
    })?;
    let days = parse_days_literal(path, &time_window.duration)?;

    let indicator = parsed.spec.indicator.as_ref().ok_or_else(|| ParseError::Schema {
        path: path.to_string(),
        message: "spec.indicator is required".to_string(),
    })?;

    let error_ratio_query = resolve_indicator(path, &indicator.spec)?;
    let labels = Labels::new();

    let mut slos = Vec::with_capacity(parsed.spec.objectives.len());
    let expand = parsed.spec.objectives.len() > 1;
    for (index, objective) in parsed.spec.objectives.iter().enumerate() {
        let id = if expand {
            format!("{}-{}-{}", parsed.spec.service, parsed.metadata.name, index)
        } else {
            format!("{}-{}", parsed.spec.service, parsed.metadata.name)
        };

        slos.push(Slo {
            id,
            name: if expand {
                format!("{}-{}", parsed.metadata.name, index)
            } else {
                parsed.metadata.name.clone()
            },
            service: parsed.spec.service.clone(),
            description: parsed.spec.description.clone(),
            time_window_days: days,
            // OpenSLO expresses objectives as a ratio in (0,1); normalization
            // multiplies by 100.
            objective: objective.target * 100.0,
            sli: Sli::Raw {
                error_ratio_query: error_ratio_query.clone(),
            },
            labels: labels.clone(),
            page_alert: AlertMeta::default(),
            ticket_alert: AlertMeta::default(),
        });
    }

    Ok(SloGroup::new(parsed.spec.service, slos))
}

fn resolve_indicator(path: &str, spec: &OpenSloIndicatorSpec) -> Result<String, ParseError> {
    if let Some(ratio) = &spec.ratio_metric {
        let total_source = &ratio.total.metric_source;
        check_source_type(path, &total_source.source_type)?;

        if let Some(good) = &ratio.good {
            check_source_type(path, &good.metric_source.source_type)?;
            return Ok(format!(
                "1 - (({}) / ({}))",
                good.metric_source.spec.query, total_source.spec.query
            ));
        }
        if let Some(bad) = &ratio.bad {
            check_source_type(path, &bad.metric_source.source_type)?;
            // A `bad` ratio metric maps directly to `bad/total`, with no
            // `1 -` complement, since `bad` already denotes the error count.
            return Ok(format!(
                "({}) / ({})",
                bad.metric_source.spec.query, total_source.spec.query
            ));
        }
        return Err(ParseError::Schema {
            path: path.to_string(),
            message: "ratioMetric must supply either good or bad".to_string(),
        });
    }

    if let Some(threshold) = &spec.threshold_metric {
        check_source_type(path, &threshold.source)?;
        let _ = &threshold.query_type;
        return Ok(threshold.query.clone());
    }

    Err(ParseError::Schema {
        path: path.to_string(),
        message: "indicator must supply either ratioMetric or thresholdMetric".to_string(),
    })
}

fn check_source_type(path: &str, source_type: &str) -> Result<(), ParseError> {
    if SUPPORTED_SOURCE_TYPES.contains(&source_type) {
        Ok(())
    } else {
        Err(ParseError::UnsupportedIndicatorSource {
            path: path.to_string(),
            source_type: source_type.to_string(),
        })
    }
}

fn parse_days_literal(path: &str, duration: &str) -> Result<u32, ParseError> {
    let days_str = duration.strip_suffix('d').ok_or_else(|| ParseError::UnsupportedTimeWindowUnit {
        path: path.to_string(),
        unit: duration.to_string(),
    })?;
    days_str.parse().map_err(|_| ParseError::UnsupportedTimeWindowUnit {
        path: path.to_string(),
        unit: duration.to_string(),
    })
}
