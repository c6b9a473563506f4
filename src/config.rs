//! Configuration management for the churn dashboard

use crate::types::assessment::RiskThresholds;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub models: ModelsConfig,
    pub llm: LlmConfig,
    pub risk: RiskThresholds,
    pub charts: ChartsConfig,
    pub logging: LoggingConfig,
}

/// Customer dataset location
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// CSV file with one row per customer
    pub path: PathBuf,
}

/// A named classifier artifact
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelSpec {
    /// Display name used in reports and charts
    pub name: String,
    /// File name relative to `models_dir`
    pub file: String,
    /// Relative weight in the ensemble average
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl ModelSpec {
    pub fn new(name: &str, file: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            weight: default_weight(),
        }
    }
}

/// ML models configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory containing ONNX model files
    pub models_dir: PathBuf,
    /// Models to load, in report order
    #[serde(default = "default_models")]
    pub models: Vec<ModelSpec>,
    /// Number of threads for ONNX inference per model (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

impl ModelsConfig {
    /// Ensemble weights keyed by model name
    pub fn weights(&self) -> HashMap<String, f64> {
        self.models
            .iter()
            .map(|m| (m.name.clone(), m.weight))
            .collect()
    }
}

fn default_onnx_threads() -> usize {
    1
}

fn default_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("XGBoost", "xgb_model.onnx"),
        ModelSpec::new("Random Forest", "rf_model.onnx"),
        ModelSpec::new("K-Nearest Neighbors", "knn_model.onnx"),
    ]
}

/// OpenAI-compatible text generation endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended
    pub base_url: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Model used to explain predictions
    pub explanation_model: String,
    /// Model used to write retention emails
    pub email_model: String,
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

/// Chart output
#[derive(Debug, Clone, Deserialize)]
pub struct ChartsConfig {
    pub enabled: bool,
    /// Directory for generated SVG files
    pub output_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path, overlaid with `CHURN__*`
    /// environment variables (e.g. `CHURN__LLM__BASE_URL`).
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CHURN")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                path: PathBuf::from("data/churn.csv"),
            },
            models: ModelsConfig {
                models_dir: PathBuf::from("models"),
                models: default_models(),
                onnx_threads: 1,
            },
            llm: LlmConfig {
                base_url: "https://api.groq.com/openai/v1".to_string(),
                api_key_env: default_api_key_env(),
                explanation_model: "llama-3.2-3b-preview".to_string(),
                email_model: "llama-3.1-8b-instant".to_string(),
            },
            risk: RiskThresholds::default(),
            charts: ChartsConfig {
                enabled: true,
                output_dir: PathBuf::from("charts"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
