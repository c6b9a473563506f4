//! Churn dataset loading and descriptive statistics

use crate::types::customer::CustomerRecord;
use anyhow::{bail, ensure, Context, Result};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Separator between id and surname in selection labels.
const OPTION_SEPARATOR: &str = " - ";

/// Columns summarised for the explanation prompt.
const SUMMARY_COLUMNS: [&str; 8] = [
    "CreditScore",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
];

/// The full customer table, loaded once.
#[derive(Debug, Clone)]
pub struct CustomerDataset {
    records: Vec<CustomerRecord>,
}

impl CustomerDataset {
    /// Load every row of a churn CSV.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
        let mut records = Vec::new();

        for (line, result) in reader.deserialize().enumerate() {
            let record: CustomerRecord = result
                .with_context(|| format!("Failed to parse customer row {}", line + 1))?;
            records.push(record);
        }

        let dataset = Self::from_records(records)?;
        info!(
            path = %path.display(),
            customers = dataset.len(),
            "Loaded customer dataset"
        );
        Ok(dataset)
    }

    /// Build a dataset from already-parsed records.
    pub fn from_records(records: Vec<CustomerRecord>) -> Result<Self> {
        ensure!(!records.is_empty(), "Dataset contains no customers");

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.customer_id) {
                bail!("Duplicate CustomerId {} in dataset", record.customer_id);
            }
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Selection labels (`"{CustomerId} - {Surname}"`) in file order.
    pub fn customer_options(&self) -> Vec<String> {
        self.records.iter().map(CustomerRecord::option_label).collect()
    }

    /// Split a selection label back into id and surname.
    pub fn parse_option(option: &str) -> Result<(u64, String)> {
        let (id, surname) = option
            .split_once(OPTION_SEPARATOR)
            .with_context(|| format!("Customer option '{}' is not '<id> - <surname>'", option))?;

        let id = id
            .trim()
            .parse()
            .with_context(|| format!("Invalid customer id in option '{}'", option))?;

        Ok((id, surname.trim().to_string()))
    }

    /// Look up a customer by id.
    pub fn find(&self, customer_id: u64) -> Result<&CustomerRecord> {
        self.records
            .iter()
            .find(|r| r.customer_id == customer_id)
            .with_context(|| format!("Customer {} not found in dataset", customer_id))
    }

    /// Descriptive statistics for customers with the given churn label.
    pub fn summary(&self, exited: bool) -> SummaryStatistics {
        let group: Vec<&CustomerRecord> = self
            .records
            .iter()
            .filter(|r| r.exited == Some(exited))
            .collect();

        debug!(exited, rows = group.len(), "Summarising customer group");

        let columns = SUMMARY_COLUMNS
            .iter()
            .map(|&name| {
                let values: Vec<f64> = group.iter().map(|r| column_value(r, name)).collect();
                ColumnSummary::describe(name, &values)
            })
            .collect();

        SummaryStatistics { columns }
    }
}

fn column_value(record: &CustomerRecord, column: &str) -> f64 {
    match column {
        "CreditScore" => record.credit_score as f64,
        "Age" => record.age as f64,
        "Tenure" => record.tenure as f64,
        "Balance" => record.balance,
        "NumOfProducts" => record.num_of_products as f64,
        "HasCrCard" => record.has_cr_card as u8 as f64,
        "IsActiveMember" => record.is_active_member as u8 as f64,
        "EstimatedSalary" => record.estimated_salary,
        _ => f64::NAN,
    }
}

/// count / mean / std / min / quartiles / max for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: &'static str,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnSummary {
    pub fn describe(name: &'static str, values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                name,
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                p25: f64::NAN,
                p50: f64::NAN,
                p75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        } else {
            f64::NAN
        };

        Self {
            name,
            count,
            mean,
            std,
            min: sorted[0],
            p25: percentile(&sorted, 0.25),
            p50: percentile(&sorted, 0.50),
            p75: percentile(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }

    fn stats(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.p25),
            ("50%", self.p50),
            ("75%", self.p75),
            ("max", self.max),
        ]
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Per-column statistics for one group of customers.
#[derive(Debug, Clone)]
pub struct SummaryStatistics {
    pub columns: Vec<ColumnSummary>,
}

impl SummaryStatistics {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of customers in the group.
    pub fn count(&self) -> usize {
        self.columns.first().map(|c| c.count).unwrap_or(0)
    }

    /// Render as a fixed-width table: one row per statistic, one column per field.
    pub fn render_table(&self) -> String {
        let widths: Vec<usize> = self.columns.iter().map(|c| c.name.len().max(14)).collect();

        let mut out = String::new();
        out.push_str(&format!("{:<6}", ""));
        for (column, width) in self.columns.iter().zip(&widths) {
            out.push_str(&format!(" {:>width$}", column.name, width = *width));
        }
        out.push('\n');

        let rows: Vec<[(&str, f64); 8]> = self.columns.iter().map(ColumnSummary::stats).collect();
        for stat in 0..8 {
            let label = rows.first().map(|r| r[stat].0).unwrap_or("");
            out.push_str(&format!("{:<6}", label));
            for (row, width) in rows.iter().zip(&widths) {
                out.push_str(&format!(" {:>width$}", format_stat(row[stat].1), width = *width));
            }
            out.push('\n');
        }

        out
    }
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", value)
    }
}
