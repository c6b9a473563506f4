//! Score aggregation for the classifier ensemble

use crate::types::assessment::ModelScore;
use anyhow::{bail, ensure, Result};
use std::collections::HashMap;

/// Combines per-model churn probabilities into a single probability.
///
/// Without weights this is the plain arithmetic mean.
pub struct ScoreAggregator {
    /// Model weights for weighted average
    weights: HashMap<String, f64>,
    /// Weight for models not in the weights map
    default_weight: f64,
}

impl ScoreAggregator {
    /// Create a new score aggregator with model weights.
    pub fn new(weights: HashMap<String, f64>) -> Self {
        Self {
            weights,
            default_weight: 1.0,
        }
    }

    /// Create aggregator with equal weights for all models.
    pub fn equal_weights() -> Self {
        Self::new(HashMap::new())
    }

    /// Aggregate model scores into one probability.
    ///
    /// Weights are normalised to sum to 1 over the models present.
    pub fn aggregate(&self, scores: &[ModelScore]) -> Result<f64> {
        ensure!(!scores.is_empty(), "No model scores to aggregate");

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for score in scores {
            let weight = self
                .weights
                .get(&score.model)
                .copied()
                .unwrap_or(self.default_weight);

            weighted_sum += score.probability * weight;
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            bail!("Model weights sum to {}, cannot aggregate", total_weight);
        }

        Ok((weighted_sum / total_weight).clamp(0.0, 1.0))
    }

    /// Spread between the most and least confident model.
    pub fn spread(scores: &[ModelScore]) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }
        let max = scores.iter().map(|s| s.probability).fold(f64::MIN, f64::max);
        let min = scores.iter().map(|s| s.probability).fold(f64::MAX, f64::min);
        max - min
    }
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::equal_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> Vec<ModelScore> {
        vec![
            ModelScore::new("XGBoost", 0.9),
            ModelScore::new("Random Forest", 0.6),
            ModelScore::new("K-Nearest Neighbors", 0.3),
        ]
    }

    #[test]
    fn test_mean_aggregation() {
        let aggregated = ScoreAggregator::default().aggregate(&scores()).unwrap();
        assert!((aggregated - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_aggregation() {
        let mut weights = HashMap::new();
        weights.insert("XGBoost".to_string(), 2.0);
        weights.insert("Random Forest".to_string(), 1.0);
        weights.insert("K-Nearest Neighbors".to_string(), 1.0);

        let aggregated = ScoreAggregator::new(weights).aggregate(&scores()).unwrap();

        // (0.9*2 + 0.6 + 0.3) / 4 = 0.675
        assert!((aggregated - 0.675).abs() < 1e-12);
    }

    #[test]
    fn test_unweighted_model_uses_default() {
        let mut weights = HashMap::new();
        weights.insert("XGBoost".to_string(), 1.0);

        let aggregated = ScoreAggregator::new(weights).aggregate(&scores()).unwrap();
        assert!((aggregated - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut weights = HashMap::new();
        weights.insert("XGBoost".to_string(), 0.0);

        let single = vec![ModelScore::new("XGBoost", 0.5)];
        assert!(ScoreAggregator::new(weights).aggregate(&single).is_err());
    }

    #[test]
    fn test_empty_scores() {
        assert!(ScoreAggregator::default().aggregate(&[]).is_err());
        assert_eq!(ScoreAggregator::spread(&[]), 0.0);
    }

    #[test]
    fn test_spread() {
        assert!((ScoreAggregator::spread(&scores()) - 0.6).abs() < 1e-12);
    }
}
