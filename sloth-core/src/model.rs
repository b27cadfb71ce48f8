//! The normalized SLO data model: the common shape every loader produces
//! and every downstream stage (validator, compiler, rules generator,
//! encoders) consumes. Once constructed an [`Slo`] is immutable; nothing
//! downstream mutates it in place.

use indexmap::IndexMap;
use sloth_common::types::Labels;

/// An ordered collection of SLOs sharing a declared `service`. Identity
/// within a group is `(service, name)`; the validator rejects duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct SloGroup {
    pub service: String,
    pub slos: Vec<Slo>,
    /// Kubernetes object metadata, present only when this group was loaded
    /// from the Kubernetes dialect; carried through so the Kubernetes
    /// encoder can round-trip it onto the emitted `PrometheusRule`.
    pub k8s_meta: Option<K8sObjectMeta>,
}

impl SloGroup {
    pub fn new(service: impl Into<String>, slos: Vec<Slo>) -> Self {
        Self {
            service: service.into(),
            slos,
            k8s_meta: None,
        }
    }

    pub fn with_k8s_meta(mut self, meta: K8sObjectMeta) -> Self {
        self.k8s_meta = Some(meta);
        self
    }
}

/// Metadata carried by the Kubernetes custom-resource dialect.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct K8sObjectMeta {
    pub name: String,
    pub namespace: Option<String>,
    pub labels: IndexMap<String, String>,
    pub annotations: IndexMap<String, String>,
}

/// A normalized Service Level Objective.
#[derive(Debug, Clone, PartialEq)]
pub struct Slo {
    /// `service + "-" + name`, or with a trailing `"-" + index` when
    /// expanded from an OpenSLO document with N objectives.
    pub id: String,
    pub name: String,
    pub service: String,
    pub description: String,
    /// Whole days; the supported set is {7, 14, 28, 30, 90}.
    pub time_window_days: u32,
    /// A percentage in the open interval (0, 100).
    pub objective: f64,
    pub sli: Sli,
    pub labels: Labels,
    pub page_alert: AlertMeta,
    pub ticket_alert: AlertMeta,
}

/// Per-alert metadata (`pageAlertMeta`, `ticketAlertMeta`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlertMeta {
    pub disable: bool,
    pub name: Option<String>,
    pub labels: Labels,
    pub annotations: Labels,
}

/// The tagged SLI variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Sli {
    Events { good_query: String, total_query: String },
    Raw { error_ratio_query: String },
    Plugin { id: String, options: IndexMap<String, String> },
}

impl Sli {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Sli::Events { .. } => "events",
            Sli::Raw { .. } => "raw",
            Sli::Plugin { .. } => "plugin",
        }
    }
}

/// A single emitted rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Recording {
        name: String,
        expression: String,
        labels: Labels,
    },
    Alert {
        name: String,
        expression: String,
        /// `for:` is never set by this generator, but the field exists so
        /// the encoders have a stable shape to render, and so a future rule
        /// type that does use it needs no model change.
        for_duration: Option<String>,
        labels: Labels,
        annotations: Labels,
    },
}

impl Rule {
    pub fn name(&self) -> &str {
        match self {
            Rule::Recording { name, .. } => name,
            Rule::Alert { name, .. } => name,
        }
    }
}

/// One named group of rules, as emitted by the rules generator for one SLO
/// (`sloth-slo-sli-recordings-<id>`, etc.).
#[derive(Debug, Clone, PartialEq)]
pub struct RuleGroup {
    pub name: String,
    pub rules: Vec<Rule>,
}

/// All rule groups produced for a single SLO: SLI recordings, metadata
/// recordings, and alerts, kept separate because each gets its own
/// Prometheus rule group but is generated together.
#[derive(Debug, Clone, PartialEq)]
pub struct SloRuleSet {
    pub slo_id: String,
    pub sli_recordings: RuleGroup,
    pub meta_recordings: RuleGroup,
    pub alerts: RuleGroup,
}

impl SloRuleSet {
    /// All three groups in emission order, as the Prometheus encoder wants
    /// them.
    pub fn groups(&self) -> [&RuleGroup; 3] {
        [&self.sli_recordings, &self.meta_recordings, &self.alerts]
    }
}

pub const RESERVED_LABELS: &[&str] = &[
    "sloth_id",
    "sloth_service",
    "sloth_slo",
    "sloth_window",
    "sloth_target",
    "sloth_objective",
];

pub const SUPPORTED_WINDOW_DAYS: &[u32] = &[7, 14, 28, 30, 90];
