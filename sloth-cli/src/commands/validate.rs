//! `sloth validate`: same loading/compilation path as `generate`, but
//! never encodes output; exits non-zero if any SLO fails.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::error;

use crate::metrics;
use crate::output::FileSummary;

use super::LoadOptions;

pub struct Request {
    pub paths: Vec<PathBuf>,
    pub plugins_path: Vec<PathBuf>,
    pub extra_labels: Vec<(String, String)>,
    pub load_options: LoadOptions,
}

pub fn run(request: Request) -> Result<()> {
    let registry = sloth_plugins::discovery::discover(&request.plugins_path)
        .context("discovering SLI plugins")?;

    let groups = super::load_groups(&request.paths, &request.extra_labels, &request.load_options)?;

    let mut any_failed = false;
    for (path, group) in &groups {
        let result = sloth_core::process_group(group, &registry);
        let mut summary = FileSummary::ok(path, result.rule_sets.len());

        if let Some(error) = &result.error {
            any_failed = true;
            summary.slos_failed = error.failures().len();
            for (slo_id, err) in error.failures() {
                error!(slo = %slo_id, error = %err, "SLO failed validation");
                summary.failures.push(format!("{slo_id}: {err}"));
                metrics::record_slo(false);
            }
        }
        for _ in 0..result.rule_sets.len() {
            metrics::record_slo(true);
        }

        summary.print();
    }

    metrics::record_run("validate", !any_failed);
    if any_failed {
        bail!("one or more SLOs failed validation");
    }
    Ok(())
}
