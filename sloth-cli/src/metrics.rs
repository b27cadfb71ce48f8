//! Ambient self-observability for the CLI process itself: counters for
//! runs, SLOs processed, and failures, exposed only as a Prometheus text
//! dump (`sloth metrics` is not a subcommand; this registry exists for
//! embedding callers that want to scrape the process, e.g. under a
//! sidecar).

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry =
        Registry::new_custom(Some("sloth".to_string()), None).expect("sloth registry can be created");

    pub static ref RUNS_TOTAL: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new("runs_total", "Total CLI invocations by subcommand and outcome"),
            &["command", "outcome"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref SLOS_PROCESSED_TOTAL: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new("slos_processed_total", "Total SLOs processed by outcome"),
            &["outcome"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };
}

pub fn record_run(command: &str, succeeded: bool) {
    let outcome = if succeeded { "success" } else { "failure" };
    RUNS_TOTAL.with_label_values(&[command, outcome]).inc();
}

pub fn record_slo(succeeded: bool) {
    let outcome = if succeeded { "success" } else { "failure" };
    SLOS_PROCESSED_TOTAL.with_label_values(&[outcome]).inc();
}
