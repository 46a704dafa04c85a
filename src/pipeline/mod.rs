//! Sequential cleaning pipeline: every step is applied to the whole table and
//! its result is written to disk before the next step starts.

pub mod pipeline_config;
pub mod steps;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::config::Config;
use crate::constants::{MANIFEST_FILE, METRICS_FILE};
use crate::error::Result;
use crate::metrics::{self, StepMetrics};
use crate::table::{load_table, save_table, MessageTable, TableFormat};
use pipeline_config::PipelineConfig;
use steps::{build_step, PipelineStep};

/// Outcome of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub snapshot: PathBuf,
    pub rows_in: usize,
    pub rows_out: usize,
    pub sha256: String,
    pub duration_ms: u128,
}

/// Result of a complete pipeline run, persisted as the run manifest
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub pipeline: String,
    pub input: String,
    pub seed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows_loaded: usize,
    pub rows_final: usize,
    pub steps: Vec<StepReport>,
}

pub struct Pipeline {
    name: String,
    steps: Vec<Box<dyn PipelineStep>>,
    output_dir: PathBuf,
    format: TableFormat,
    seed: u64,
}

impl Pipeline {
    /// Validate the configured sequence and build every step. Lookup files
    /// are loaded here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let pipeline_config = config.pipeline_config();
        pipeline_config.validate()?;

        let seed = config.sampling.seed.unwrap_or_else(rand::random::<u64>);
        info!("Sampling seed: {}", seed);

        let steps = pipeline_config
            .steps
            .iter()
            .map(|step| build_step(step, config, seed))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(
            &pipeline_config,
            steps,
            config.paths.output_dir.clone(),
            config.output.format,
            seed,
        ))
    }

    pub fn new(
        config: &PipelineConfig,
        steps: Vec<Box<dyn PipelineStep>>,
        output_dir: PathBuf,
        format: TableFormat,
        seed: u64,
    ) -> Self {
        Self {
            name: config.name.clone(),
            steps,
            output_dir,
            format,
            seed,
        }
    }

    /// Snapshot path for the step at `position` (0-based)
    pub fn snapshot_path(&self, position: usize, step: &dyn PipelineStep) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.{}",
            position + 1,
            step.snapshot_label(),
            self.format.extension()
        ))
    }

    /// Load `input` and run every step over it
    pub fn run(&self, input: &Path) -> Result<PipelineResult> {
        let table = load_table(input)?;
        self.run_table(table, &input.display().to_string())
    }

    /// Run every step over an already loaded table. Stops at the first
    /// failing step; snapshots written before it stay on disk.
    pub fn run_table(&self, table: MessageTable, input_label: &str) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("cleaning_run", run_id = %run_id, pipeline = %self.name);
        let _enter = span.enter();

        let started_at = Utc::now();
        let t_run = Instant::now();
        StepMetrics::record_run_started();

        info!("Creating directories '{}'...", self.output_dir.display());
        fs::create_dir_all(&self.output_dir)?;

        let rows_loaded = table.len();
        let mut table = table;
        let mut reports = Vec::with_capacity(self.steps.len());

        for (position, step) in self.steps.iter().enumerate() {
            let t_step = Instant::now();
            let rows_in = table.len();

            table = step.apply(table).map_err(|e| {
                error!("Step '{}' failed: {}", step.step_name(), e);
                e
            })?;

            let snapshot = self.snapshot_path(position, &**step);
            save_table(&table, &snapshot)?;
            let sha256 = file_sha256(&snapshot)?;

            let elapsed = t_step.elapsed();
            StepMetrics::record_step(step.step_name(), rows_in, table.len(), elapsed.as_secs_f64());
            info!(
                "Step {} '{}': {} -> {} rows",
                position + 1,
                step.step_name(),
                rows_in,
                table.len()
            );

            reports.push(StepReport {
                step: step.step_name().to_string(),
                snapshot,
                rows_in,
                rows_out: table.len(),
                sha256,
                duration_ms: elapsed.as_millis(),
            });
        }

        StepMetrics::record_run_finished(table.len(), t_run.elapsed().as_secs_f64());

        let result = PipelineResult {
            run_id,
            pipeline: self.name.clone(),
            input: input_label.to_string(),
            seed: self.seed,
            started_at,
            finished_at: Utc::now(),
            rows_loaded,
            rows_final: table.len(),
            steps: reports,
        };

        self.write_manifest(&result)?;
        if metrics::write_textfile(&self.output_dir.join(METRICS_FILE))? {
            info!("Wrote metrics to {}", self.output_dir.join(METRICS_FILE).display());
        }
        info!("Finished data processing...");
        Ok(result)
    }

    fn write_manifest(&self, result: &PipelineResult) -> Result<PathBuf> {
        let path = self.output_dir.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_string_pretty(result)?)?;
        Ok(path)
    }
}

fn file_sha256(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
