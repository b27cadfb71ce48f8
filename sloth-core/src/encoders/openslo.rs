//! Emits normalized SLOs back out in the OpenSLO dialect, lossy for plugin
//! SLIs: every SLI variant is materialised to a single Raw
//! `errorRatioQuery`, matching what the OpenSLO dialect itself can express
//! (only ratio/threshold indicators).

use serde::Serialize;

use crate::compiler::CompiledSli;
use crate::errors::EncodingError;
use crate::model::Slo;

#[derive(Debug, Serialize)]
struct OpenSloDocument {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    metadata: OpenSloMetadata,
    spec: OpenSloSpec,
}

#[derive(Debug, Serialize)]
struct OpenSloMetadata {
    name: String,
}

#[derive(Debug, Serialize)]
struct OpenSloSpec {
    service: String,
    description: String,
    indicator: OpenSloIndicator,
    #[serde(rename = "timeWindow")]
    time_window: Vec<OpenSloTimeWindow>,
    objectives: Vec<OpenSloObjective>,
}

#[derive(Debug, Serialize)]
struct OpenSloIndicator {
    spec: OpenSloIndicatorSpec,
}

#[derive(Debug, Serialize)]
struct OpenSloIndicatorSpec {
    #[serde(rename = "thresholdMetric")]
    threshold_metric: OpenSloThresholdMetric,
}

#[derive(Debug, Serialize)]
struct OpenSloThresholdMetric {
    #[serde(rename = "queryType")]
    query_type: String,
    source: String,
    query: String,
}

#[derive(Debug, Serialize)]
struct OpenSloTimeWindow {
    duration: String,
    #[serde(rename = "isRolling")]
    is_rolling: bool,
}

#[derive(Debug, Serialize)]
struct OpenSloObjective {
    target: f64,
}

/// Materialises a compiled SLI down to the single error-ratio query the
/// OpenSLO dialect can carry.
fn materialize_error_ratio_query(compiled: &CompiledSli) -> String {
    match compiled {
        CompiledSli::Raw { error_ratio_query } => error_ratio_query.clone(),
        CompiledSli::Events { good_query, total_query } => {
            format!("1 - (({good_query}) / ({total_query}))")
        }
    }
}

fn encode_one(slo: &Slo, compiled: &CompiledSli) -> OpenSloDocument {
    OpenSloDocument {
        api_version: "openslo/v1".to_string(),
        kind: "SLO".to_string(),
        metadata: OpenSloMetadata { name: slo.name.clone() },
        spec: OpenSloSpec {
            service: slo.service.clone(),
            description: slo.description.clone(),
            indicator: OpenSloIndicator {
                spec: OpenSloIndicatorSpec {
                    threshold_metric: OpenSloThresholdMetric {
                        query_type: "promql".to_string(),
                        source: "prometheus".to_string(),
                        query: materialize_error_ratio_query(compiled),
                    },
                },
            },
            time_window: vec![OpenSloTimeWindow {
                duration: format!("{}d", slo.time_window_days),
                is_rolling: true,
            }],
            objectives: vec![OpenSloObjective {
                target: slo.objective / 100.0,
            }],
        },
    }
}

/// Encodes each `(Slo, CompiledSli)` pair as its own OpenSLO document,
/// concatenated with `---` separators in input order.
pub fn encode(slos: &[(Slo, CompiledSli)]) -> Result<String, EncodingError> {
    let mut documents = Vec::with_capacity(slos.len());
    for (slo, compiled) in slos {
        let doc = encode_one(slo, compiled);
        let yaml = serde_yaml_ng::to_string(&doc).map_err(|e| EncodingError::Serialize {
            format: "openslo".to_string(),
            message: e.to_string(),
        })?;
        documents.push(yaml);
    }
    Ok(documents.join("---\n"))
}
