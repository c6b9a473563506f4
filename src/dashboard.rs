//! One dashboard interaction: select → encode → predict → chart → explain → email

use crate::config::AppConfig;
use crate::dataset::{CustomerDataset, SummaryStatistics};
use crate::feature_extractor::FeatureEncoder;
use crate::llm::{prompts, LlmClient};
use crate::models::inference::InferenceEngine;
use crate::types::assessment::{ChartPaths, ChurnAssessment, RiskLevel};
use crate::types::customer::{CustomerRecord, Gender, Geography};
use crate::viz;
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{debug, info};

/// Edits applied on top of the stored customer before scoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerOverrides {
    pub credit_score: Option<u32>,
    pub geography: Option<Geography>,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub tenure: Option<u32>,
    pub balance: Option<f64>,
    pub num_of_products: Option<u32>,
    pub has_cr_card: Option<bool>,
    pub is_active_member: Option<bool>,
    pub estimated_salary: Option<f64>,
}

impl CustomerOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy of `record` with every set field replaced.
    pub fn apply(&self, record: &CustomerRecord) -> CustomerRecord {
        let mut edited = record.clone();
        if let Some(v) = self.credit_score {
            edited.credit_score = v;
        }
        if let Some(v) = self.geography {
            edited.geography = v;
        }
        if let Some(v) = self.gender {
            edited.gender = v;
        }
        if let Some(v) = self.age {
            edited.age = v;
        }
        if let Some(v) = self.tenure {
            edited.tenure = v;
        }
        if let Some(v) = self.balance {
            edited.balance = v;
        }
        if let Some(v) = self.num_of_products {
            edited.num_of_products = v;
        }
        if let Some(v) = self.has_cr_card {
            edited.has_cr_card = v;
        }
        if let Some(v) = self.is_active_member {
            edited.is_active_member = v;
        }
        if let Some(v) = self.estimated_salary {
            edited.estimated_salary = v;
        }
        edited
    }
}

/// Owns everything loaded at start-up and runs assessments one at a time.
pub struct ChurnDashboard {
    config: AppConfig,
    dataset: CustomerDataset,
    encoder: FeatureEncoder,
    engine: InferenceEngine,
    /// `None` skips explanation and email generation
    llm: Option<LlmClient>,
    churned: SummaryStatistics,
    retained: SummaryStatistics,
}

impl ChurnDashboard {
    pub fn new(
        config: AppConfig,
        dataset: CustomerDataset,
        engine: InferenceEngine,
        llm: Option<LlmClient>,
    ) -> Self {
        let churned = dataset.summary(true);
        let retained = dataset.summary(false);

        info!(
            customers = dataset.len(),
            churned = churned.count(),
            retained = retained.count(),
            models = engine.model_count(),
            llm_enabled = llm.is_some(),
            "Dashboard ready"
        );

        Self {
            config,
            dataset,
            encoder: FeatureEncoder::new(),
            engine,
            llm,
            churned,
            retained,
        }
    }

    pub fn dataset(&self) -> &CustomerDataset {
        &self.dataset
    }

    /// Score one customer and, if an LLM is configured, explain the score
    /// and draft a retention email.
    pub async fn assess(
        &self,
        customer_id: u64,
        overrides: &CustomerOverrides,
    ) -> Result<ChurnAssessment> {
        let start_time = Instant::now();

        let stored = self.dataset.find(customer_id)?;
        let record = overrides.apply(stored);
        if !overrides.is_empty() {
            debug!(customer_id, overrides = ?overrides, "Applied field overrides");
        }
        record
            .validate()
            .with_context(|| format!("Invalid input for customer {}", customer_id))?;

        let features = self.encoder.encode(&record)?;
        let prediction = self.engine.predict(&features)?;
        let risk_level = RiskLevel::from_probability(prediction.probability, &self.config.risk);

        info!(
            customer_id,
            probability = prediction.probability,
            spread = prediction.spread(),
            risk_level = ?risk_level,
            "Churn probability computed"
        );

        let mut assessment = ChurnAssessment::new(
            record.customer_id,
            record.surname.clone(),
            features,
            prediction.model_scores,
            prediction.probability,
            risk_level,
        );

        if self.config.charts.enabled {
            let charts = self.render_charts(&assessment)?;
            assessment = assessment.with_charts(charts);
        }

        if let Some(llm) = &self.llm {
            let (explanation, email) = self.generate_outreach(llm, &assessment).await?;
            assessment = assessment.with_outreach(explanation, email);
        }

        info!(
            customer_id,
            assessment_id = %assessment.assessment_id,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Assessment complete"
        );

        Ok(assessment)
    }

    fn render_charts(&self, assessment: &ChurnAssessment) -> Result<ChartPaths> {
        let dir = &self.config.charts.output_dir;
        let gauge = dir.join(format!("{}_gauge.svg", assessment.customer_id));
        let bars = dir.join(format!("{}_models.svg", assessment.customer_id));

        viz::create_gauge_chart(assessment.probability, &self.config.risk, &gauge)?;
        viz::create_model_probability_chart(&assessment.model_scores, &bars)?;

        Ok(ChartPaths {
            gauge: Some(gauge),
            model_probabilities: Some(bars),
        })
    }

    async fn generate_outreach(
        &self,
        llm: &LlmClient,
        assessment: &ChurnAssessment,
    ) -> Result<(String, String)> {
        let explanation_prompt = prompts::explanation_prompt(
            &assessment.surname,
            assessment.probability,
            &assessment.features,
            &self.churned,
            &self.retained,
            &self.config.risk,
        );
        debug!(prompt = %explanation_prompt, "Explanation prompt");

        let explanation = llm
            .complete(&self.config.llm.explanation_model, &explanation_prompt)
            .await
            .context("Failed to generate explanation")?;

        let email_prompt = prompts::email_prompt(
            &assessment.surname,
            assessment.probability,
            &assessment.features,
            &explanation,
        );
        debug!(prompt = %email_prompt, "Email prompt");

        let email = llm
            .complete(&self.config.llm.email_model, &email_prompt)
            .await
            .context("Failed to generate retention email")?;

        Ok((explanation, email))
    }
}
