//! Prometheus metrics for the configuration pipeline.
//!
//! All metrics follow the naming convention: `fcp_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Config updates by outcome (`submitted`, `failed`)
    pub static ref CONFIG_UPDATES: IntCounterVec = IntCounterVec::new(
        Opts::new("fcp_config_updates_total", "Channel config updates by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Propose, sign and submit duration
    pub static ref CONFIG_UPDATE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "fcp_config_update_duration_seconds",
            "Time spent proposing, signing and submitting a config update"
        ).buckets(exponential_buckets(0.01, 2.0, 12).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Config signatures attached to update envelopes
    pub static ref SIGNATURES_CREATED: IntCounter = IntCounter::new(
        "fcp_signatures_created_total",
        "Config signatures attached to update envelopes"
    ).expect("metric creation failed");

    /// Orderers that failed to return a channel config
    pub static ref ORDERER_FETCH_FAILURES: IntCounter = IntCounter::new(
        "fcp_orderer_fetch_failures_total",
        "Orderer attempts that failed to return a channel config block"
    ).expect("metric creation failed");

    /// Config block reloads by outcome (`success`, `failed`)
    pub static ref BLOCK_RELOADS: IntCounterVec = IntCounterVec::new(
        Opts::new("fcp_block_reloads_total", "Current config block reloads by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Post-update refreshes by status (`refreshed`, `pending`)
    pub static ref REFRESH_OUTCOMES: IntCounterVec = IntCounterVec::new(
        Opts::new("fcp_refresh_outcomes_total", "Post-update config refreshes by status"),
        &["status"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(CONFIG_UPDATES.clone()),
        Box::new(CONFIG_UPDATE_DURATION.clone()),
        Box::new(SIGNATURES_CREATED.clone()),
        Box::new(ORDERER_FETCH_FAILURES.clone()),
        Box::new(BLOCK_RELOADS.clone()),
        Box::new(REFRESH_OUTCOMES.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

pub fn record_config_update(submitted: bool) {
    let outcome = if submitted { "submitted" } else { "failed" };
    CONFIG_UPDATES.with_label_values(&[outcome]).inc();
}

pub fn record_signatures(count: usize) {
    SIGNATURES_CREATED.inc_by(count as u64);
}

pub fn record_orderer_fetch_failures(count: usize) {
    ORDERER_FETCH_FAILURES.inc_by(count as u64);
}

pub fn record_block_reload(success: bool) {
    let outcome = if success { "success" } else { "failed" };
    BLOCK_RELOADS.with_label_values(&[outcome]).inc();
}

pub fn record_refresh(status: &str) {
    REFRESH_OUTCOMES.with_label_values(&[status]).inc();
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
