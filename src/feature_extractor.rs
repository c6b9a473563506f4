//! Feature encoding for churn model inference.
//!
//! Turns a customer record into the feature layout the classifiers were
//! trained on: raw numeric columns, one-hot categoricals, and a handful of
//! engineered columns.

use crate::types::customer::{CustomerRecord, Gender, Geography};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Number of columns the classifiers expect.
pub const FEATURE_COUNT: usize = 18;

/// Column names in training order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "CreditScore",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
    "Geography_France",
    "Geography_Germany",
    "Geography_Spain",
    "Gender_Female",
    "Gender_Male",
    "CLV",
    "TenureAgeRatio",
    "AgeGroup_MiddleAge",
    "AgeGroup_Senior",
    "AgeGroup_Elderly",
];

/// Divisor applied to Balance × EstimatedSalary for the value proxy.
const CLV_SCALE: f64 = 100_000.0;

/// Encoded model input for a single customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(rename = "CreditScore")]
    pub credit_score: f64,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Tenure")]
    pub tenure: f64,
    #[serde(rename = "Balance")]
    pub balance: f64,
    #[serde(rename = "NumOfProducts")]
    pub num_of_products: f64,
    #[serde(rename = "HasCrCard")]
    pub has_cr_card: f64,
    #[serde(rename = "IsActiveMember")]
    pub is_active_member: f64,
    #[serde(rename = "EstimatedSalary")]
    pub estimated_salary: f64,
    #[serde(rename = "Geography_France")]
    pub geography_france: f64,
    #[serde(rename = "Geography_Germany")]
    pub geography_germany: f64,
    #[serde(rename = "Geography_Spain")]
    pub geography_spain: f64,
    #[serde(rename = "Gender_Female")]
    pub gender_female: f64,
    #[serde(rename = "Gender_Male")]
    pub gender_male: f64,
    /// Balance × EstimatedSalary / 100000
    #[serde(rename = "CLV")]
    pub clv: f64,
    #[serde(rename = "TenureAgeRatio")]
    pub tenure_age_ratio: f64,
    #[serde(rename = "AgeGroup_MiddleAge")]
    pub age_group_middle_age: f64,
    #[serde(rename = "AgeGroup_Senior")]
    pub age_group_senior: f64,
    #[serde(rename = "AgeGroup_Elderly")]
    pub age_group_elderly: f64,
}

impl FeatureVector {
    /// Values in training order, as the `f32` tensor the ONNX models take.
    pub fn to_vec(&self) -> Vec<f32> {
        self.values().iter().map(|&v| v as f32).collect()
    }

    /// Values in training order.
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.credit_score,
            self.age,
            self.tenure,
            self.balance,
            self.num_of_products,
            self.has_cr_card,
            self.is_active_member,
            self.estimated_salary,
            self.geography_france,
            self.geography_germany,
            self.geography_spain,
            self.gender_female,
            self.gender_male,
            self.clv,
            self.tenure_age_ratio,
            self.age_group_middle_age,
            self.age_group_senior,
            self.age_group_elderly,
        ]
    }

    /// `(column, value)` pairs in training order.
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        FEATURE_NAMES.iter().copied().zip(self.values()).collect()
    }
}

/// Feature encoder that transforms customer records into model input features.
///
/// Stateless; features are produced in the exact order expected by the
/// ONNX models.
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Create a new feature encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode a customer record.
    ///
    /// Only fails for `Age == 0`, which would make the tenure ratio undefined.
    /// Range checks beyond that are [`CustomerRecord::validate`]'s job.
    pub fn encode(&self, record: &CustomerRecord) -> Result<FeatureVector> {
        ensure!(
            record.age > 0,
            "Cannot encode customer {}: Age must be positive",
            record.customer_id
        );

        let age = record.age as f64;
        let tenure = record.tenure as f64;

        Ok(FeatureVector {
            credit_score: record.credit_score as f64,
            age,
            tenure,
            balance: record.balance,
            num_of_products: record.num_of_products as f64,
            has_cr_card: indicator(record.has_cr_card),
            is_active_member: indicator(record.is_active_member),
            estimated_salary: record.estimated_salary,
            geography_france: indicator(record.geography == Geography::France),
            geography_germany: indicator(record.geography == Geography::Germany),
            geography_spain: indicator(record.geography == Geography::Spain),
            gender_female: indicator(record.gender == Gender::Female),
            gender_male: indicator(record.gender == Gender::Male),
            clv: record.balance * record.estimated_salary / CLV_SCALE,
            tenure_age_ratio: tenure / age,
            // No bucket below 31: the models were trained without a "young" column.
            age_group_middle_age: indicator(record.age > 30 && record.age <= 45),
            age_group_senior: indicator(record.age > 45 && record.age <= 65),
            age_group_elderly: indicator(record.age > 65),
        })
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}
