//! Sloth - a command-line SLO rules generator.
//!
//! Ingests SLO specifications in the native, Kubernetes, or OpenSLO
//! dialects and emits Prometheus recording and alerting rules.

#![forbid(unsafe_code)]

mod commands;
mod config;
mod metrics;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

#[derive(Parser)]
#[command(name = "sloth")]
#[command(author, version, about = "SLO rules generator for Prometheus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate Prometheus rules from one or more SLO spec files.
    Generate(GenerateArgs),
    /// Validate one or more SLO spec files without emitting output.
    Validate(ValidateArgs),
    /// Print shell completion scripts.
    Completions { shell: clap_complete::Shell },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// SLO specification files to process.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output encoder.
    #[arg(long, value_enum, default_value = "prometheus")]
    format: OutputFormat,

    /// Output file; stdout if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory to scan for SLI plugin manifests. Repeatable.
    #[arg(long = "plugins-path")]
    plugins_path: Vec<PathBuf>,

    /// Extra label to merge into every SLO, `key=value`. Repeatable.
    #[arg(long = "extra-labels", value_parser = parse_key_value)]
    extra_labels: Vec<(String, String)>,

    /// Force every SLO onto this window, overriding what each document
    /// declares. Must be one of the supported windows (7, 14, 28, 30, 90).
    #[arg(long = "window-days", value_parser = parse_window_days)]
    window_days: Option<u32>,

    /// Default time window for an SLO whose document omits `timeWindow`,
    /// e.g. `30d`. Parsed with `humantime`; must be a whole number of days.
    #[arg(long = "default-slo-period", value_parser = parse_default_slo_period)]
    default_slo_period: Option<u32>,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// SLO specification files to check.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Directory to scan for SLI plugin manifests. Repeatable.
    #[arg(long = "plugins-path")]
    plugins_path: Vec<PathBuf>,

    /// Extra label to merge into every SLO, `key=value`. Repeatable.
    #[arg(long = "extra-labels", value_parser = parse_key_value)]
    extra_labels: Vec<(String, String)>,

    /// Force every SLO onto this window, overriding what each document
    /// declares. Must be one of the supported windows (7, 14, 28, 30, 90).
    #[arg(long = "window-days", value_parser = parse_window_days)]
    window_days: Option<u32>,

    /// Default time window for an SLO whose document omits `timeWindow`,
    /// e.g. `30d`. Parsed with `humantime`; must be a whole number of days.
    #[arg(long = "default-slo-period", value_parser = parse_default_slo_period)]
    default_slo_period: Option<u32>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Prometheus,
    Kubernetes,
    Openslo,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("'{raw}' is not in key=value form"))
}

/// Validates `--window-days` against the generator's supported window set
/// rather than deferring to the per-SLO validator, so a typo is reported
/// immediately at the CLI boundary.
fn parse_window_days(raw: &str) -> Result<u32, String> {
    let days: u32 = raw.parse().map_err(|_| format!("'{raw}' is not a whole number of days"))?;
    if sloth_core::windows::is_supported_window_days(days) {
        Ok(days)
    } else {
        Err(format!(
            "'{days}' is not a supported window; must be one of 7, 14, 28, 30, 90"
        ))
    }
}

/// Parses `--default-slo-period` with `humantime`, then requires the result
/// to be a whole number of days (the only granularity SLOs accept).
fn parse_default_slo_period(raw: &str) -> Result<u32, String> {
    let duration: std::time::Duration = raw
        .parse::<humantime::Duration>()
        .map_err(|e| format!("'{raw}' is not a valid duration: {e}"))?
        .into();
    let seconds = duration.as_secs();
    if seconds == 0 || seconds % 86400 != 0 {
        return Err(format!("'{raw}' must be a whole number of days"));
    }
    Ok((seconds / 86400) as u32)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = sloth_common::config::FileConfig::load(&config::default_path())
        .unwrap_or_default();
    let (resolved, config_errors) = sloth_common::config::ResolvedConfig::resolve(&file_config);
    sloth_common::logging::init(&resolved.log_level);

    for err in &config_errors {
        tracing::warn!(error = %err, "ignoring invalid configuration value");
    }
    debug!(?resolved.plugins_path, "resolved configuration");

    match cli.command {
        Command::Generate(args) => commands::generate::run(args_into_request(args, &resolved)),
        Command::Validate(args) => commands::validate::run(validate_args_into_request(args, &resolved)),
        Command::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "sloth", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn args_into_request(args: GenerateArgs, resolved: &sloth_common::config::ResolvedConfig) -> commands::generate::Request {
    let mut plugins_path = resolved.plugins_path.clone();
    plugins_path.extend(args.plugins_path);
    commands::generate::Request {
        paths: args.paths,
        format: match args.format {
            OutputFormat::Prometheus => commands::Format::Prometheus,
            OutputFormat::Kubernetes => commands::Format::Kubernetes,
            OutputFormat::Openslo => commands::Format::Openslo,
        },
        output: args.output,
        plugins_path,
        extra_labels: args.extra_labels,
        load_options: commands::LoadOptions {
            default_window_days: args.default_slo_period,
            window_days_override: args.window_days,
        },
    }
}

fn validate_args_into_request(
    args: ValidateArgs,
    resolved: &sloth_common::config::ResolvedConfig,
) -> commands::validate::Request {
    let mut plugins_path = resolved.plugins_path.clone();
    plugins_path.extend(args.plugins_path);
    commands::validate::Request {
        paths: args.paths,
        plugins_path,
        extra_labels: args.extra_labels,
        load_options: commands::LoadOptions {
            default_window_days: args.default_slo_period,
            window_days_override: args.window_days,
        },
    }
}
