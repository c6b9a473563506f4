//! End-to-end dashboard runs against stub classifiers and a mocked LLM API

use churn_risk_dashboard::models::ScoreAggregator;
use churn_risk_dashboard::types::{Geography, RiskLevel};
use churn_risk_dashboard::{
    AppConfig, ChurnClassifier, ChurnDashboard, CustomerDataset, CustomerOverrides,
    FeatureVector, InferenceEngine, LlmClient,
};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Scores Germans higher so overrides visibly move the result
struct GeographyAwareClassifier {
    name: &'static str,
    base: f64,
}

impl ChurnClassifier for GeographyAwareClassifier {
    fn name(&self) -> &str {
        self.name
    }

    fn predict_probability(&self, features: &FeatureVector) -> anyhow::Result<f64> {
        Ok(self.base + 0.3 * features.geography_germany)
    }
}

fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "RowNumber,CustomerId,Surname,CreditScore,Geography,Gender,Age,Tenure,Balance,NumOfProducts,HasCrCard,IsActiveMember,EstimatedSalary,Exited"
    )
    .unwrap();
    writeln!(file, "1,15634602,Hargrave,619,France,Female,42,2,0.0,1,1,1,101348.88,1").unwrap();
    writeln!(file, "2,15647311,Hill,608,Spain,Female,41,1,83807.86,1,0,1,112542.58,0").unwrap();
    writeln!(file, "3,15619304,Onio,502,France,Female,42,8,159660.8,3,1,0,113931.57,1").unwrap();
    writeln!(file, "4,15701354,Boni,699,France,Female,39,1,0.0,2,0,0,93826.63,0").unwrap();
    writeln!(file, "5,15737888,Mitchell,850,Spain,Female,43,2,125510.82,1,1,1,79084.1,0").unwrap();
    file
}

fn engine() -> InferenceEngine {
    InferenceEngine::with_models(
        vec![
            Box::new(GeographyAwareClassifier { name: "XGBoost", base: 0.2 }),
            Box::new(GeographyAwareClassifier { name: "Random Forest", base: 0.1 }),
            Box::new(GeographyAwareClassifier { name: "K-Nearest Neighbors", base: 0.3 }),
        ],
        ScoreAggregator::equal_weights(),
    )
}

fn config(csv: &NamedTempFile) -> AppConfig {
    let mut config = AppConfig::default();
    config.data.path = csv.path().to_path_buf();
    config.charts.enabled = false;
    config
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "total_tokens": 42 }
    }))
}

#[tokio::test]
async fn test_prediction_without_llm() {
    let csv = create_test_csv();
    let config = config(&csv);
    let dataset = CustomerDataset::load(&config.data.path).unwrap();

    let dashboard = ChurnDashboard::new(config, dataset, engine(), None);
    let assessment = dashboard
        .assess(15647311, &CustomerOverrides::default())
        .await
        .unwrap();

    assert_eq!(assessment.surname, "Hill");
    assert!((assessment.probability - 0.2).abs() < 1e-12);
    assert_eq!(assessment.risk_level, RiskLevel::Low);
    assert_eq!(assessment.model_scores.len(), 3);
    assert!(assessment.explanation.is_none());
    assert!(assessment.charts.gauge.is_none());
    assert_eq!(assessment.features.geography_spain, 1.0);
}

#[tokio::test]
async fn test_charts_written_for_assessment() {
    let csv = create_test_csv();
    let chart_dir = tempfile::tempdir().unwrap();
    let mut config = config(&csv);
    config.charts.enabled = true;
    config.charts.output_dir = chart_dir.path().join("charts");
    let dataset = CustomerDataset::load(&config.data.path).unwrap();

    let dashboard = ChurnDashboard::new(config, dataset, engine(), None);
    let assessment = dashboard
        .assess(15701354, &CustomerOverrides::default())
        .await
        .unwrap();

    let gauge = assessment.charts.gauge.as_ref().unwrap();
    let bars = assessment.charts.model_probabilities.as_ref().unwrap();
    assert!(gauge.ends_with("15701354_gauge.svg"));
    assert!(std::fs::read_to_string(gauge).unwrap().contains("<svg"));
    assert!(std::fs::read_to_string(bars).unwrap().contains("<svg"));
}

#[tokio::test]
async fn test_overrides_change_prediction() {
    let csv = create_test_csv();
    let config = config(&csv);
    let dataset = CustomerDataset::load(&config.data.path).unwrap();
    let dashboard = ChurnDashboard::new(config, dataset, engine(), None);

    let overrides = CustomerOverrides {
        geography: Some(Geography::Germany),
        ..Default::default()
    };
    let assessment = dashboard.assess(15647311, &overrides).await.unwrap();

    assert!((assessment.probability - 0.5).abs() < 1e-12);
    assert_eq!(assessment.risk_level, RiskLevel::Moderate);
    assert_eq!(assessment.features.geography_germany, 1.0);

    // The stored record is untouched
    assert_eq!(
        dashboard.dataset().find(15647311).unwrap().geography,
        Geography::Spain
    );
}

#[tokio::test]
async fn test_invalid_override_rejected() {
    let csv = create_test_csv();
    let config = config(&csv);
    let dataset = CustomerDataset::load(&config.data.path).unwrap();
    let dashboard = ChurnDashboard::new(config, dataset, engine(), None);

    let overrides = CustomerOverrides {
        age: Some(0),
        ..Default::default()
    };
    let err = dashboard.assess(15647311, &overrides).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Age 0"));

    assert!(dashboard
        .assess(99, &CustomerOverrides::default())
        .await
        .is_err());
}

#[tokio::test]
async fn test_full_pipeline_with_llm() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "llama-3.2-3b-preview" })))
        .and(body_string_contains("customer named Onio"))
        .respond_with(completion("Onio holds several products and is inactive."))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "llama-3.1-8b-instant" })))
        .and(body_string_contains("several products and is inactive"))
        .respond_with(completion("Dear Onio,\n- Fee-free account for a year"))
        .expect(1)
        .mount(&server)
        .await;

    let csv = create_test_csv();
    let config = config(&csv);
    let dataset = CustomerDataset::load(&config.data.path).unwrap();
    let llm = LlmClient::new(server.uri(), "test-key");

    let dashboard = ChurnDashboard::new(config, dataset, engine(), Some(llm));
    let assessment = dashboard
        .assess(15619304, &CustomerOverrides::default())
        .await
        .unwrap();

    assert_eq!(
        assessment.explanation.as_deref(),
        Some("Onio holds several products and is inactive.")
    );
    assert!(assessment.email.as_deref().unwrap().starts_with("Dear Onio"));

    let report = assessment.render_text();
    assert!(report.contains("## Personalized Email to Customer"));
    assert!(report.contains("Average Probability: 0.2000"));
}

#[tokio::test]
async fn test_llm_failure_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let csv = create_test_csv();
    let config = config(&csv);
    let dataset = CustomerDataset::load(&config.data.path).unwrap();
    let llm = LlmClient::new(server.uri(), "test-key");

    let dashboard = ChurnDashboard::new(config, dataset, engine(), Some(llm));
    let err = dashboard
        .assess(15634602, &CustomerOverrides::default())
        .await
        .unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("Failed to generate explanation"));
    assert!(message.contains("500"));
    assert!(message.contains("model overloaded"));
}
