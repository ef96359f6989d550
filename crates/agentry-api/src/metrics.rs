//! Prometheus counters for the run endpoints
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("agentry_runs_total", "Workflow runs by outcome"),
        &["workflow", "outcome"],
    )
    .expect("static metric definition is valid");
    let _ = REGISTRY.register(Box::new(counter.clone()));
    counter
});

pub fn record_run(workflow: &str, outcome: &str) {
    RUNS_TOTAL.with_label_values(&[workflow, outcome]).inc();
}

pub fn encode() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}
