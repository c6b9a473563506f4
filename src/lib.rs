//! Customer Churn Risk Dashboard Library
//!
//! Encodes bank customers into the feature layout of a pre-trained classifier
//! ensemble, averages the models' churn probabilities, charts the result and
//! asks an LLM to explain it and draft a retention email.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod feature_extractor;
pub mod llm;
pub mod models;
pub mod types;
pub mod viz;

pub use config::AppConfig;
pub use dashboard::{ChurnDashboard, CustomerOverrides};
pub use dataset::CustomerDataset;
pub use feature_extractor::{FeatureEncoder, FeatureVector};
pub use llm::LlmClient;
pub use models::inference::{ChurnClassifier, InferenceEngine};
pub use types::{assessment::ChurnAssessment, customer::CustomerRecord};

/// Common result type used throughout the crate
pub type Result<T> = anyhow::Result<T>;
