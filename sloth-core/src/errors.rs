//! The five core error kinds, plus the aggregate used when a group of SLOs
//! is processed together. `PluginError` is the sixth kind; it lives in
//! `sloth-plugins` and is re-exported here so callers have one place to
//! match on all six.

use thiserror::Error;

pub use sloth_plugins::PluginError;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{path}: no loader recognised this document as a known SLO spec type")]
    UnknownSpecType { path: String },

    #[error("{path}: YAML syntax error: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("{path}: schema error: {message}")]
    Schema { path: String, message: String },

    #[error("{path}: OpenSLO indicator has unsupported source type '{source_type}' (only 'prometheus' and 'sloth' are accepted)")]
    UnsupportedIndicatorSource { path: String, source_type: String },

    #[error("{path}: OpenSLO time window unit must be days, got '{unit}'")]
    UnsupportedTimeWindowUnit { path: String, unit: String },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{slo_id}: objective {objective} is out of range, must satisfy 0 < objective < 100")]
    ObjectiveOutOfRange { slo_id: String, objective: f64 },

    #[error("{slo_id}: time window of {days} days is not in the supported set {{7, 14, 28, 30, 90}}")]
    UnsupportedWindow { slo_id: String, days: u32 },

    #[error("{slo_id}: name '{name}' does not match [a-z0-9]([-a-z0-9]*[a-z0-9])? or exceeds 63 characters")]
    InvalidName { slo_id: String, name: String },

    #[error("duplicate SLO identity (service={service}, name={name}) within one group")]
    DuplicateIdentity { service: String, name: String },

    #[error("{slo_id}: label '{label}' is reserved for generator use and cannot be user-supplied")]
    ReservedLabel { slo_id: String, label: String },

    #[error("{slo_id}: no SLI variant is populated")]
    MissingSli { slo_id: String },

    #[error("{slo_id}: query does not contain the required '{{{{.window}}}}' placeholder")]
    MissingWindowPlaceholder { slo_id: String },

    #[error("{slo_id}: expression failed syntactic PromQL validation: {message}")]
    InvalidPromql { slo_id: String, message: String },
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{slo_id}: unknown plugin id '{plugin_id}'")]
    UnknownPlugin { slo_id: String, plugin_id: String },

    #[error("{slo_id}: plugin invocation recursion exceeded depth {limit} (id '{plugin_id}')")]
    RecursionLimitExceeded {
        slo_id: String,
        plugin_id: String,
        limit: u32,
    },

    #[error("{slo_id}: plugin '{plugin_id}' invocation failed: {source}")]
    Plugin {
        slo_id: String,
        plugin_id: String,
        #[source]
        source: PluginError,
    },

    #[error("{slo_id}: template execution left '{{{{.window}}}}' unsubstituted")]
    TemplateExecutionFailed { slo_id: String },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{slo_id}: no burn-rate table is defined for a {days}-day window")]
    MissingBurnRateTable { slo_id: String, days: u32 },

    #[error("{slo_id}: {message}")]
    Internal { slo_id: String, message: String },
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("failed to serialise output as {format}: {message}")]
    Serialize { format: String, message: String },
}

/// The error kind discriminator callers switch on.
#[derive(Debug, Error)]
pub enum SlothError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Returned by multi-SLO operations: a group continues past per-SLO
/// failures and returns every failure it hit.
#[derive(Debug, Error)]
#[error("{} SLO(s) failed to process", .0.len())]
pub struct AggregateError(pub Vec<(String, SlothError)>);

impl AggregateError {
    pub fn from_failures(failures: Vec<(String, SlothError)>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self(failures))
        }
    }

    pub fn failures(&self) -> &[(String, SlothError)] {
        &self.0
    }
}
