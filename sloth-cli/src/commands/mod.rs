//! CLI subcommands.

pub mod generate;
pub mod validate;

#[derive(Debug, Clone, Copy)]
pub enum Format {
    Prometheus,
    Kubernetes,
    Openslo,
}

/// Shared loader options for `generate` and `validate`
/// (`--window-days`, `--default-slo-period`).
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// `--default-slo-period`: the window used for an SLO whose dialect
    /// allows an implicit default (native/Kubernetes) and omits `timeWindow`.
    pub default_window_days: Option<u32>,
    /// `--window-days`: forces every loaded SLO onto this window,
    /// overriding whatever its document declared.
    pub window_days_override: Option<u32>,
}

/// Discovers the plugin registry and loads every SLO group from `paths`,
/// shared setup between `generate` and `validate`.
pub(crate) fn load_groups(
    paths: &[std::path::PathBuf],
    extra_labels: &[(String, String)],
    options: &LoadOptions,
) -> anyhow::Result<Vec<(std::path::PathBuf, sloth_core::model::SloGroup)>> {
    use anyhow::Context;

    let default_window_days = options
        .default_window_days
        .unwrap_or(sloth_core::loaders::native::DEFAULT_TIME_WINDOW_DAYS);

    let mut groups = Vec::new();
    for path in paths {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let path_str = path.display().to_string();
        let loaded = sloth_core::loaders::load_all_with_default_window(
            &path_str,
            &content,
            default_window_days,
        )
        .with_context(|| format!("loading {}", path.display()))?;
        for mut group in loaded {
            apply_extra_labels(&mut group, extra_labels);
            if let Some(days) = options.window_days_override {
                for slo in &mut group.slos {
                    slo.time_window_days = days;
                }
            }
            groups.push((path.clone(), group));
        }
    }
    Ok(groups)
}

/// Merges `--extra-labels` into every SLO in `group`; the SLO's own labels
/// win on conflict.
fn apply_extra_labels(group: &mut sloth_core::model::SloGroup, extra_labels: &[(String, String)]) {
    for slo in &mut group.slos {
        for (key, value) in extra_labels {
            if !slo.labels.contains_key(key) {
                slo.labels.insert(key.clone(), value.clone());
            }
        }
    }
}
