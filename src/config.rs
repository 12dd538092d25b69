use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::PROCESS_MATCH_THRESHOLD;

pub const DEFAULT_INPUT_GLOB: &str = "./input/**/*.docx";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub id: String,
    #[serde(default)]
    pub datasources: Option<Vec<Datasource>>,
    #[serde(default)]
    pub outputs: Option<Outputs>,
    #[serde(default)]
    pub review: Option<ReviewSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datasource {
    pub name: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outputs {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewSettings {
    /// YAML catalog replacing the built-in ADGM tables.
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub process_threshold: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read review.yaml: {0}")]
    Read(String),
    #[error("Failed to parse review.yaml: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub fn parse_config(raw: &str) -> Result<ReviewConfig, ConfigError> {
    let cfg: ReviewConfig = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;

    if cfg.id.trim().is_empty() {
        return Err(ConfigError::Invalid("missing id".into()));
    }

    let has_ds_glob = cfg
        .datasources
        .as_ref()
        .and_then(|ds| ds.first())
        .and_then(|d| d.path.as_ref())
        .is_some();
    let has_out_dir = cfg.outputs.as_ref().and_then(|o| o.dir.as_ref()).is_some();
    if !has_ds_glob || !has_out_dir {
        return Err(ConfigError::Invalid("missing datasources.path or outputs.dir".into()));
    }

    if let Some(t) = cfg.review.as_ref().and_then(|r| r.process_threshold) {
        check_threshold(t)?;
    }

    Ok(cfg)
}

/// A process threshold must be a fraction in `[0, 1]`; NaN is rejected.
pub fn check_threshold(t: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&t) {
        Ok(t)
    } else {
        Err(ConfigError::Invalid(format!("process_threshold out of range: {}", t)))
    }
}

/// Read and validate a review.yaml file.
pub fn validate_config(path: &Path) -> Result<ReviewConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
    parse_config(&raw)
}

impl Default for ReviewConfig {
    fn default() -> Self {
        ReviewConfig { id: "adgm-review".to_string(), datasources: None, outputs: None, review: None }
    }
}

impl ReviewConfig {
    pub fn input_glob(&self) -> String {
        self.datasources
            .as_ref()
            .and_then(|d| d.first())
            .and_then(|d| d.path.clone())
            .unwrap_or_else(|| DEFAULT_INPUT_GLOB.to_string())
    }

    pub fn output_dir(&self) -> String {
        self.outputs
            .as_ref()
            .and_then(|o| o.dir.clone())
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
    }

    pub fn catalog_path(&self) -> Option<String> {
        self.review.as_ref().and_then(|r| r.catalog.clone())
    }

    pub fn process_threshold(&self) -> f64 {
        self.review
            .as_ref()
            .and_then(|r| r.process_threshold)
            .unwrap_or(PROCESS_MATCH_THRESHOLD)
    }
}
