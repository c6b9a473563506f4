//! Prompt construction for prediction explanations and retention emails

use crate::dataset::SummaryStatistics;
use crate::feature_extractor::FeatureVector;
use crate::types::assessment::RiskThresholds;

/// Top features of the XGBoost model, by importance.
pub const FEATURE_IMPORTANCES: [(&str, f64); 12] = [
    ("NumOfProducts", 0.323888),
    ("IsActiveMember", 0.164146),
    ("Age", 0.109550),
    ("Geography_Germany", 0.091373),
    ("Balance", 0.052786),
    ("Geography_France", 0.046463),
    ("Geography_Spain", 0.036855),
    ("CreditScore", 0.035005),
    ("EstimatedSalary", 0.032655),
    ("HasCrCard", 0.031940),
    ("Tenure", 0.030054),
    ("Gender_Male", 0.000000),
];

/// Bank name used in retention emails.
pub const BANK_NAME: &str = "HS Bank";

/// Probability as a percentage with one decimal, e.g. `0.4567` -> `45.7`.
pub fn format_percentage(probability: f64) -> String {
    format!("{:.1}", probability * 100.0)
}

/// Customer feature values, one `name: value` line each.
pub fn render_customer_info(features: &FeatureVector) -> String {
    features
        .named_values()
        .into_iter()
        .map(|(name, value)| format!("  {}: {}", name, format_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Feature importance table as a right-aligned two-column listing.
pub fn render_feature_importances() -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>20} | Importance\n", "Feature"));
    out.push_str(&format!("{}\n", "-".repeat(40)));
    for (feature, importance) in FEATURE_IMPORTANCES {
        out.push_str(&format!("{:>20} | {:.6}\n", feature, importance));
    }
    out
}

/// Prompt asking for a three sentence, non-technical explanation of the prediction.
pub fn explanation_prompt(
    surname: &str,
    probability: f64,
    features: &FeatureVector,
    churned: &SummaryStatistics,
    retained: &SummaryStatistics,
    thresholds: &RiskThresholds,
) -> String {
    let cutoff = format_percentage(thresholds.explanation_cutoff);
    let low = format_percentage(thresholds.low);
    let high = format_percentage(thresholds.high);

    format!(
        "You are an expert data scientist at a bank, where you specialize in interpreting and explaining predictions of machine learning models.

Your machine learning model has predicted that a customer named {surname} has a {percent}% chance of churning. This prediction is based on the information provided below.

Here is the customer's information:
{info}

Here are the machine learning model's top 10 most important features for predicting churn:

{importances}
Here are summary statistics for the churned customers:
{churned}
Here are summary statistics for the non-churned customers:
{retained}
- If the customer has over a {cutoff}% risk of churning, generate a 3 sentence explanation of why they are at risk of churning.
- If the customer has less than a {cutoff}% risk of churning, generate a 3 sentence explanation of why they might not be at risk of churning.
- Your explanation should be based on the customer's information, the summary statistics of churned and non-churned customers, and the most important features provided.
- Your explanation should not list out the customer's information, but instead focus on the most important features and why they are important.
- You should explain the model's predictions in a way that is easy for a non-expert to understand.
- Any prediction percent under {low}% is considered a low to no risk of churning.
- Any prediction percent over {high}% is considered a high risk of churning.
- Don't mention the data directly, instead explain it and why it is important. For example: \"I predicted that the customer has a low risk of churning because they have multiple products and are older in age.\"
- You can compare the customer's information to the summary statistics to understand the customer's risk of churning.

Don't mention the probability of churning, or the machine learning model. Also do not say anything like \"Based on the machine learning model's predictions and the top 10 most important features\". Only explain the prediction, not the model itself.
",
        surname = surname,
        percent = format_percentage(probability),
        info = render_customer_info(features),
        importances = render_feature_importances(),
        churned = churned.render_table(),
        retained = retained.render_table(),
        cutoff = cutoff,
        low = low,
        high = high,
    )
}

/// Prompt asking for a retention email with bullet-point incentives.
pub fn email_prompt(
    surname: &str,
    probability: f64,
    features: &FeatureVector,
    explanation: &str,
) -> String {
    format!(
        "You are a manager at {bank}. You are responsible for ensuring customers stay with the bank and are incentivized with various offers.

You noticed a customer named {surname} has a {percent}% chance of churning. This customer's information is:
{info}

Here is an explanation as to why the customer might be at risk of churning:
{explanation}

Generate an email to send to the customer based on the customer's information to ask them to stay if they are at risk of churning, or offering them incentives so that they become more loyal to the bank.

Make sure to list out a set of incentives to stay based on their information, in bullet point format. Don't ever mention the probability of churning, or the machine learning model to the customer.
",
        bank = BANK_NAME,
        surname = surname,
        percent = format_percentage(probability),
        info = render_customer_info(features),
        explanation = explanation.trim(),
    )
}
