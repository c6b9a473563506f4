//! Churn assessment data structures

use crate::feature_extractor::FeatureVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Determine risk level from an averaged churn probability
    pub fn from_probability(probability: f64, thresholds: &RiskThresholds) -> Self {
        if probability > thresholds.high {
            RiskLevel::High
        } else if probability < thresholds.low {
            RiskLevel::Low
        } else {
            RiskLevel::Moderate
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

/// Configurable risk level thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Below this the customer is at low to no risk
    pub low: f64,
    /// Above this the customer is at high risk
    pub high: f64,
    /// Explanations switch from "why they might stay" to "why they may leave" here
    pub explanation_cutoff: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 0.3,
            high: 0.6,
            explanation_cutoff: 0.4,
        }
    }
}

/// Probability produced by one classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub model: String,
    pub probability: f64,
}

impl ModelScore {
    pub fn new(model: impl Into<String>, probability: f64) -> Self {
        Self {
            model: model.into(),
            probability,
        }
    }
}

/// Chart files written for an assessment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartPaths {
    pub gauge: Option<PathBuf>,
    pub model_probabilities: Option<PathBuf>,
}

/// Outcome of one encode → predict → explain → email run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnAssessment {
    /// Unique assessment identifier
    pub assessment_id: String,

    pub customer_id: u64,

    pub surname: String,

    /// Encoded model input
    pub features: FeatureVector,

    /// Individual model probabilities, in configured order
    pub model_scores: Vec<ModelScore>,

    /// Averaged churn probability (0.0 - 1.0)
    pub probability: f64,

    pub risk_level: RiskLevel,

    /// LLM explanation of the prediction
    pub explanation: Option<String>,

    /// LLM retention email
    pub email: Option<String>,

    pub charts: ChartPaths,

    /// Assessment generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl ChurnAssessment {
    pub fn new(
        customer_id: u64,
        surname: String,
        features: FeatureVector,
        model_scores: Vec<ModelScore>,
        probability: f64,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            customer_id,
            surname,
            features,
            model_scores,
            probability,
            risk_level,
            explanation: None,
            email: None,
            charts: ChartPaths::default(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_charts(mut self, charts: ChartPaths) -> Self {
        self.charts = charts;
        self
    }

    pub fn with_outreach(mut self, explanation: String, email: String) -> Self {
        self.explanation = Some(explanation);
        self.email = Some(email);
        self
    }

    /// Human-readable report, one section per dashboard panel.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Customer {} - {}\n",
            self.customer_id, self.surname
        ));
        out.push_str(&format!(
            "The customer has a {:.2}% probability of churning ({} risk).\n\n",
            self.probability * 100.0,
            self.risk_level.label()
        ));

        out.push_str("### Model Probabilities\n");
        for score in &self.model_scores {
            out.push_str(&format!("{} {:.4}\n", score.model, score.probability));
        }
        out.push_str(&format!("Average Probability: {:.4}\n", self.probability));

        if let Some(gauge) = &self.charts.gauge {
            out.push_str(&format!("Gauge chart: {}\n", gauge.display()));
        }
        if let Some(bars) = &self.charts.model_probabilities {
            out.push_str(&format!("Model chart: {}\n", bars.display()));
        }

        if let Some(explanation) = &self.explanation {
            out.push_str("\n---\n\n## Explanation of Prediction\n\n");
            out.push_str(explanation.trim());
            out.push('\n');
        }

        if let Some(email) = &self.email {
            out.push_str("\n---\n\n## Personalized Email to Customer\n\n");
            out.push_str(email.trim());
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::FeatureEncoder;
    use crate::types::customer::CustomerRecord;

    #[test]
    fn test_risk_level_from_probability() {
        let thresholds = RiskThresholds::default();

        assert_eq!(RiskLevel::from_probability(0.1, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.3, &thresholds), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.6, &thresholds), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.61, &thresholds), RiskLevel::High);
    }

    #[test]
    fn test_assessment_serialization() {
        let record = CustomerRecord::new(15634602, "Hargrave", 42);
        let features = FeatureEncoder::new().encode(&record).unwrap();

        let assessment = ChurnAssessment::new(
            record.customer_id,
            record.surname.clone(),
            features,
            vec![ModelScore::new("XGBoost", 0.8), ModelScore::new("K-Nearest Neighbors", 0.6)],
            0.7,
            RiskLevel::High,
        );

        let json = serde_json::to_string(&assessment).unwrap();
        let deserialized: ChurnAssessment = serde_json::from_str(&json).unwrap();

        assert_eq!(assessment.assessment_id, deserialized.assessment_id);
        assert_eq!(assessment.model_scores, deserialized.model_scores);
        assert_eq!(assessment.risk_level, deserialized.risk_level);
        assert!(json.contains("\"risk_level\":\"high\""));
    }

    #[test]
    fn test_render_text_sections() {
        let record = CustomerRecord::new(7, "Onio", 39);
        let features = FeatureEncoder::new().encode(&record).unwrap();

        let assessment = ChurnAssessment::new(
            7,
            "Onio".to_string(),
            features,
            vec![ModelScore::new("XGBoost", 0.25)],
            0.25,
            RiskLevel::Low,
        );

        let text = assessment.render_text();
        assert!(text.contains("7 - Onio"));
        assert!(text.contains("25.00% probability"));
        assert!(!text.contains("Explanation of Prediction"));

        let text = assessment
            .with_outreach("Stable customer.".to_string(), "Dear Onio".to_string())
            .render_text();
        assert!(text.contains("## Explanation of Prediction"));
        assert!(text.contains("Dear Onio"));
    }
}
