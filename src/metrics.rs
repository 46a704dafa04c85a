//! Per-step metrics for cleaning runs.
//!
//! A batch run has nothing to scrape it, so the Prometheus recorder is only
//! used for in-process rendering: after a run the exposition text is written
//! next to the snapshots, where a textfile collector can pick it up.

use std::fs;
use std::path::Path;
use std::sync::{Once, OnceLock};

use ::metrics::{counter, describe_counter, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

use crate::error::Result;

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metric names follow `chat_cleaner_{name}[_total]`
macro_rules! cleaner_metric {
    (counter, $name:literal) => {
        concat!("chat_cleaner_", $name, "_total")
    };
    (histogram, $name:literal) => {
        concat!("chat_cleaner_", $name)
    };
    (gauge, $name:literal) => {
        concat!("chat_cleaner_", $name)
    };
}

/// Install the Prometheus recorder. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
            register_metrics();
            info!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

fn register_metrics() {
    describe_counter!(
        cleaner_metric!(counter, "runs"),
        "Cleaning runs started"
    );
    describe_counter!(
        cleaner_metric!(counter, "step_rows_in"),
        "Rows handed to a step"
    );
    describe_counter!(
        cleaner_metric!(counter, "step_rows_removed"),
        "Rows dropped by a step"
    );
    describe_histogram!(
        cleaner_metric!(histogram, "step_duration_seconds"),
        "Time spent applying a step and writing its snapshot"
    );
    describe_histogram!(
        cleaner_metric!(histogram, "run_duration_seconds"),
        "Wall time of a full run"
    );
}

pub struct StepMetrics;

impl StepMetrics {
    pub fn record_run_started() {
        counter!(cleaner_metric!(counter, "runs")).increment(1);
    }

    pub fn record_step(step: &'static str, rows_in: usize, rows_out: usize, duration_secs: f64) {
        counter!(cleaner_metric!(counter, "step_rows_in"), "step" => step).increment(rows_in as u64);
        counter!(cleaner_metric!(counter, "step_rows_removed"), "step" => step)
            .increment(rows_in.saturating_sub(rows_out) as u64);
        gauge!(cleaner_metric!(gauge, "step_rows_out"), "step" => step).set(rows_out as f64);
        histogram!(cleaner_metric!(histogram, "step_duration_seconds"), "step" => step)
            .record(duration_secs);
    }

    pub fn record_run_finished(rows_out: usize, duration_secs: f64) {
        gauge!(cleaner_metric!(gauge, "final_rows")).set(rows_out as f64);
        histogram!(cleaner_metric!(histogram, "run_duration_seconds")).record(duration_secs);
    }
}

/// Render the current metrics, if the recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

/// Write the rendered metrics to `path`. Returns false when nothing was recorded.
pub fn write_textfile(path: &Path) -> Result<bool> {
    match render() {
        Some(text) => {
            fs::write(path, text)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
