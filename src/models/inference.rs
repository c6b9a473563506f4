//! Multi-model inference engine for churn prediction

use crate::config::AppConfig;
use crate::feature_extractor::FeatureVector;
use crate::models::aggregator::ScoreAggregator;
use crate::models::loader::ModelLoader;
use crate::types::assessment::ModelScore;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// The one capability the dashboard needs from a trained model.
pub trait ChurnClassifier: Send + Sync {
    /// Display name, e.g. "Random Forest"
    fn name(&self) -> &str;

    /// Probability (0.0 - 1.0) that the customer churns.
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64>;
}

/// Result of model inference
#[derive(Debug, Clone)]
pub struct ChurnPrediction {
    /// Aggregated churn probability (0.0 - 1.0)
    pub probability: f64,
    /// Individual model probabilities, in model order
    pub model_scores: Vec<ModelScore>,
}

impl ChurnPrediction {
    /// Difference between the most and least pessimistic model
    pub fn spread(&self) -> f64 {
        ScoreAggregator::spread(&self.model_scores)
    }
}

/// Runs every loaded classifier and averages their outputs.
pub struct InferenceEngine {
    models: Vec<Box<dyn ChurnClassifier>>,
    /// Score aggregator for combining model outputs
    aggregator: ScoreAggregator,
}

impl InferenceEngine {
    /// Load the configured ONNX models
    pub fn new(config: &AppConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.models.onnx_threads);
        let models = loader
            .load_all_models(&config.models.models_dir, &config.models.models)?
            .into_iter()
            .map(|m| Box::new(m) as Box<dyn ChurnClassifier>)
            .collect();

        let aggregator = ScoreAggregator::new(config.models.weights());
        let engine = Self::with_models(models, aggregator);

        info!(models = ?engine.model_names(), "Inference engine initialized");
        Ok(engine)
    }

    /// Build an engine from already-constructed classifiers
    pub fn with_models(models: Vec<Box<dyn ChurnClassifier>>, aggregator: ScoreAggregator) -> Self {
        Self { models, aggregator }
    }

    /// Get the number of loaded models
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Get loaded model names
    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name().to_string()).collect()
    }

    /// Run every model on the feature vector and aggregate.
    ///
    /// Any model failure aborts the prediction.
    pub fn predict(&self, features: &FeatureVector) -> Result<ChurnPrediction> {
        let mut model_scores = Vec::with_capacity(self.models.len());

        for model in &self.models {
            let probability = model
                .predict_probability(features)
                .with_context(|| format!("Model {} failed", model.name()))?;
            model_scores.push(ModelScore::new(model.name(), probability));
        }

        let probability = self.aggregator.aggregate(&model_scores)?;

        debug!(
            probability,
            model_scores = ?model_scores,
            "Ensemble inference complete"
        );

        Ok(ChurnPrediction {
            probability,
            model_scores,
        })
    }
}
