//! Configuration loading for mofgen.
//! Reads mofgen.toml from the current directory or the path in the MOFGEN_CONFIG env var.

use std::path::{Path, PathBuf};

use anyhow::Context;
use mofgen_codec::DatasetSchema;
use mofgen_common::MofgenError;
use mofgen_generator::{PipelineSettings, RngSeeds, SeedPolicy};
use mofgen_models::{AutoencoderConfig, PredictorConfig};
use mofgen_ranker::RankingConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const CONFIG_ENV_VAR: &str = "MOFGEN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "mofgen.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub autoencoder: AutoencoderConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub seeds: RngSeeds,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    #[serde(default)]
    pub columns: DatasetSchema,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
}

fn default_csv_path() -> PathBuf { PathBuf::from("top_MOFs_screening_csv.csv") }
fn default_test_fraction() -> f64 { 0.2 }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            columns: DatasetSchema::default(),
            test_fraction: default_test_fraction(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    #[serde(default)]
    pub seed_policy: SeedPolicy,
}

fn default_num_samples() -> usize { 200 }

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            num_samples: default_num_samples(),
            seed_policy: SeedPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_candidates_file")]
    pub candidates_file: String,
    #[serde(default = "default_report_file")]
    pub report_file: String,
}

fn default_output_dir() -> PathBuf { PathBuf::from(".") }
fn default_candidates_file() -> String { "generated_top_mofs.csv".to_string() }
fn default_report_file() -> String { "run_report.json".to_string() }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            candidates_file: default_candidates_file(),
            report_file: default_report_file(),
        }
    }
}

impl Config {
    /// Load from `$MOFGEN_CONFIG` or `./mofgen.toml`. A missing file yields
    /// the defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!("Config file not found: {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let config: Config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            Some("json") => Self::from_json(&content)?,
            _ => toml::from_str(&content).with_context(|| format!("parsing {:?}", path))?,
        };
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), MofgenError> {
        if !(0.0..1.0).contains(&self.data.test_fraction) {
            return Err(MofgenError::Config(format!(
                "data.test_fraction must be within 0..1, got {}",
                self.data.test_fraction
            )));
        }
        if self.generation.num_samples == 0 {
            return Err(MofgenError::Config("generation.num_samples must be positive".to_string()));
        }
        let fraction = self.generation.seed_policy.top_fraction;
        if !(0.0..=1.0).contains(&fraction) || fraction == 0.0 {
            return Err(MofgenError::Config(format!(
                "generation.seed_policy.top_fraction must be within (0, 1], got {fraction}"
            )));
        }
        if self.autoencoder.latent_dim == 0 || self.autoencoder.batch_size == 0 {
            return Err(MofgenError::Config(
                "autoencoder.latent_dim and autoencoder.batch_size must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.predictor.dropout) {
            return Err(MofgenError::Config(format!(
                "predictor.dropout must be within 0..1, got {}",
                self.predictor.dropout
            )));
        }
        self.ranking.validate()
    }

    /// Training settings for [`mofgen_generator::TrainedPipeline`].
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            features: self.data.columns.features.clone(),
            test_fraction: self.data.test_fraction,
            autoencoder: self.autoencoder.clone(),
            predictor: self.predictor.clone(),
            ranking: self.ranking.clone(),
            seeds: self.seeds,
        }
    }
}
