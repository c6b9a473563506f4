//! Churn classifier loading and ensemble inference

pub mod aggregator;
pub mod inference;
pub mod loader;

pub use aggregator::ScoreAggregator;
pub use inference::{ChurnClassifier, ChurnPrediction, InferenceEngine};
pub use loader::{ModelLoader, OnnxClassifier};
