//! Common types shared across the Sloth workspace.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier for a single SLO, derived as `service + "-" + name` (or with a
/// trailing `-<index>` when expanded from a multi-objective OpenSLO
/// document). Opaque to callers; always constructed by `sloth-core`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SloId(pub String);

impl SloId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SloId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A string-to-string label map with deterministic iteration order.
///
/// `IndexMap` preserves insertion order, which is useful for round-tripping
/// loader input, but every consumer that emits text must call
/// [`Labels::sorted_iter`] rather than iterate the map directly so that
/// output stays byte-for-byte reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels(pub IndexMap<String, String>);

impl Labels {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates entries in ascending key order. Every consumer that emits
    /// text must use this rather than iterating the map directly, so output
    /// stays byte-for-byte deterministic across runs.
    pub fn sorted_iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .0
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    /// Merges `other` into `self`. On key conflict, `self` wins, so callers
    /// merge generator-provided labels into user labels and never the other
    /// way around.
    pub fn merge_losing(&mut self, other: &Labels) {
        for (k, v) in other.0.iter() {
            self.0.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

impl FromIterator<(String, String)> for Labels {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Identity and objective metadata passed to an SLI plugin producer:
/// `(ctx, options, sloMeta: {service, name, objective, window})`.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSloMeta {
    pub service: String,
    pub name: String,
    pub objective: f64,
    pub window_days: u32,
}

/// The SLI a plugin producer resolves to. Lives in `sloth-common` (rather
/// than `sloth-core`, where the rest of the SLI model lives) so that
/// `sloth-plugins` does not need to depend on `sloth-core` — avoiding a
/// dependency cycle, since `sloth-core` depends on `sloth-plugins` for the
/// registry.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginSliResult {
    Events { good_query: String, total_query: String },
    Raw { error_ratio_query: String },
    /// Delegates to another registered plugin id. Exists so plugin chains
    /// (a producer that wraps or aliases another producer) are expressible;
    /// the compiler re-enters plugin resolution on this variant and is
    /// responsible for bounding the resulting recursion depth.
    Plugin { id: String, options: IndexMap<String, String> },
}
