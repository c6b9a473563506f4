//! Type definitions for the churn dashboard

pub mod assessment;
pub mod customer;

pub use assessment::{ChurnAssessment, ModelScore, RiskLevel, RiskThresholds};
pub use customer::{CustomerRecord, Gender, Geography};
