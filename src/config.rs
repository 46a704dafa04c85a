use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::*;
use crate::error::{CleanerError, Result};
use crate::pipeline::pipeline_config::PipelineConfig;
use crate::table::TableFormat;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub sampling: SamplingConfig,
    pub output: OutputConfig,
    /// Custom step sequence; the default cleaning sequence when absent
    pub pipeline: Option<PipelineConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub canned_messages: PathBuf,
    pub blacklist: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            canned_messages: PathBuf::from(DEFAULT_CANNED_PATH),
            blacklist: PathBuf::from(DEFAULT_BLACKLIST_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub size: usize,
    /// Fixed seed for reproducible samples; drawn at random when unset
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SAMPLE_SIZE,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: TableFormat,
}

impl Config {
    /// Load configuration from `path`, or from `cleaner.toml` when no path is
    /// given. A missing default file falls back to built-in defaults; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                    Self::default()
                }
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CleanerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `CHAT_CLEANER_*` environment variables (a `.env` file is honoured)
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        dotenv::dotenv().ok();

        if let Ok(v) = std::env::var(ENV_INPUT) {
            self.paths.input = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var(ENV_OUTPUT_DIR) {
            self.paths.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var(ENV_SAMPLE_SIZE) {
            self.sampling.size = v.trim().parse().map_err(|_| {
                CleanerError::Config(format!("{ENV_SAMPLE_SIZE} must be a positive integer, got '{v}'"))
            })?;
        }
        if let Ok(v) = std::env::var(ENV_SEED) {
            self.sampling.seed = Some(v.trim().parse().map_err(|_| {
                CleanerError::Config(format!("{ENV_SEED} must be an unsigned integer, got '{v}'"))
            })?);
        }
        Ok(())
    }

    /// Configured step sequence, falling back to the default cleaning run
    pub fn pipeline_config(&self) -> PipelineConfig {
        self.pipeline
            .clone()
            .unwrap_or_else(|| PipelineConfig::default_cleaning(self.sampling.size))
    }
}
