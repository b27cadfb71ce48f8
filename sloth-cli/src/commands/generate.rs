//! `sloth generate`: loads, compiles, and encodes SLO documents.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{error, info};

use sloth_plugins::Registry;

use crate::metrics;
use crate::output::FileSummary;

use super::{Format, LoadOptions};

pub struct Request {
    pub paths: Vec<PathBuf>,
    pub format: Format,
    pub output: Option<PathBuf>,
    pub plugins_path: Vec<PathBuf>,
    pub extra_labels: Vec<(String, String)>,
    pub load_options: LoadOptions,
}

pub fn run(request: Request) -> Result<()> {
    let registry = sloth_plugins::discovery::discover(&request.plugins_path)
        .context("discovering SLI plugins")?;
    info!(count = registry.len(), "discovered SLI plugins");

    let groups = super::load_groups(&request.paths, &request.extra_labels, &request.load_options)?;

    let mut rule_sets = Vec::new();
    let mut compiled_for_openslo = Vec::new();
    let mut summaries = Vec::new();
    let mut any_failed = false;

    for (path, group) in &groups {
        let result = sloth_core::process_group(group, &registry);
        let mut summary = FileSummary::ok(path, result.rule_sets.len());

        if let Some(error) = &result.error {
            any_failed = true;
            summary.slos_failed = error.failures().len();
            for (slo_id, err) in error.failures() {
                error!(slo = %slo_id, error = %err, "SLO failed to process");
                summary.failures.push(format!("{slo_id}: {err}"));
                metrics::record_slo(false);
            }
        }
        for _ in 0..result.rule_sets.len() {
            metrics::record_slo(true);
        }

        if !result.fatal && matches!(request.format, Format::Openslo) {
            for slo in &group.slos {
                let meta = sloth_common::types::PluginSloMeta {
                    service: slo.service.clone(),
                    name: slo.name.clone(),
                    objective: slo.objective,
                    window_days: slo.time_window_days,
                };
                if let Ok(compiled) = sloth_core::compiler::compile(&slo.id, &slo.sli, &meta, &registry) {
                    compiled_for_openslo.push((slo.clone(), compiled));
                }
            }
        }

        summaries.push(summary);
        rule_sets.extend(result.rule_sets);
    }

    let encoded = encode(&request, &rule_sets, &groups, &compiled_for_openslo, &registry)?;

    match &request.output {
        Some(path) => {
            std::fs::write(path, encoded).with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            print!("{encoded}");
        }
    }

    for summary in &summaries {
        summary.print();
    }

    metrics::record_run("generate", !any_failed);
    if any_failed {
        bail!("one or more SLOs failed to process");
    }
    Ok(())
}

fn encode(
    request: &Request,
    rule_sets: &[sloth_core::model::SloRuleSet],
    groups: &[(PathBuf, sloth_core::model::SloGroup)],
    compiled_for_openslo: &[(sloth_core::model::Slo, sloth_core::compiler::CompiledSli)],
    _registry: &Registry,
) -> Result<String> {
    match request.format {
        Format::Prometheus => Ok(sloth_core::encoders::prometheus::encode(rule_sets)?),
        Format::Kubernetes => {
            let meta = groups.iter().find_map(|(_, g)| g.k8s_meta.as_ref());
            let fallback_name = groups
                .first()
                .map(|(_, g)| g.service.clone())
                .unwrap_or_else(|| "sloth".to_string());
            Ok(sloth_core::encoders::kubernetes::encode(rule_sets, meta, &fallback_name)?)
        }
        Format::Openslo => Ok(sloth_core::encoders::openslo::encode(compiled_for_openslo)?),
    }
}
