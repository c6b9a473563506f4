//! Command-line interface definitions and argument parsing

use crate::dashboard::CustomerOverrides;
use crate::dataset::CustomerDataset;
use crate::types::customer::{Gender, Geography};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Customer churn risk dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to config/config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Customer CSV, overriding the configured path
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Directory with ONNX models, overriding the configured path
    #[arg(long, global = true)]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List selectable customers as "<id> - <surname>"
    List {
        /// Show at most this many customers
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Score a customer, explain the score and draft a retention email
    Assess(AssessArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct AssessArgs {
    /// Customer option as printed by `list`, e.g. "15634602 - Hargrave"
    #[arg(long, conflicts_with = "customer_id", required_unless_present = "customer_id")]
    pub customer: Option<String>,

    /// Customer id
    #[arg(long)]
    pub customer_id: Option<u64>,

    #[arg(long)]
    pub credit_score: Option<u32>,

    /// France, Germany or Spain
    #[arg(long)]
    pub geography: Option<Geography>,

    /// Male or Female
    #[arg(long)]
    pub gender: Option<Gender>,

    #[arg(long)]
    pub age: Option<u32>,

    /// Years with the bank
    #[arg(long)]
    pub tenure: Option<u32>,

    #[arg(long)]
    pub balance: Option<f64>,

    #[arg(long)]
    pub num_products: Option<u32>,

    #[arg(long)]
    pub has_credit_card: Option<bool>,

    #[arg(long)]
    pub is_active_member: Option<bool>,

    #[arg(long)]
    pub estimated_salary: Option<f64>,

    /// Stop after prediction; skip explanation and email
    #[arg(long)]
    pub no_llm: bool,

    /// Do not write charts
    #[arg(long)]
    pub no_charts: bool,

    /// Print the assessment as JSON
    #[arg(long)]
    pub json: bool,
}

impl AssessArgs {
    /// Selected customer id and, when given as an option label, the surname it carried.
    pub fn selection(&self) -> crate::Result<(u64, Option<String>)> {
        match (&self.customer, self.customer_id) {
            (Some(option), _) => {
                let (id, surname) = CustomerDataset::parse_option(option)?;
                Ok((id, Some(surname)))
            }
            (None, Some(id)) => Ok((id, None)),
            (None, None) => anyhow::bail!("Select a customer with --customer or --customer-id"),
        }
    }

    pub fn overrides(&self) -> CustomerOverrides {
        CustomerOverrides {
            credit_score: self.credit_score,
            geography: self.geography,
            gender: self.gender,
            age: self.age,
            tenure: self.tenure,
            balance: self.balance,
            num_of_products: self.num_products,
            has_cr_card: self.has_credit_card,
            is_active_member: self.is_active_member,
            estimated_salary: self.estimated_salary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assess_with_option() {
        let args = Args::try_parse_from([
            "churn-dashboard",
            "assess",
            "--customer",
            "15634602 - Hargrave",
            "--geography",
            "germany",
            "--has-credit-card",
            "false",
            "--no-llm",
        ])
        .unwrap();

        let Command::Assess(assess) = args.command else {
            panic!("expected assess");
        };
        assert_eq!(assess.selection().unwrap(), (15634602, Some("Hargrave".to_string())));
        assert!(assess.no_llm);

        let overrides = assess.overrides();
        assert_eq!(overrides.geography, Some(Geography::Germany));
        assert_eq!(overrides.has_cr_card, Some(false));
        assert_eq!(overrides.age, None);
    }

    #[test]
    fn test_parse_assess_with_id_and_global_flags() {
        let args = Args::try_parse_from([
            "churn-dashboard",
            "assess",
            "--customer-id",
            "42",
            "--data",
            "other.csv",
            "--json",
        ])
        .unwrap();

        assert_eq!(args.data, Some(PathBuf::from("other.csv")));
        let Command::Assess(assess) = args.command else {
            panic!("expected assess");
        };
        assert_eq!(assess.selection().unwrap(), (42, None));
        assert!(assess.overrides().is_empty());
    }

    #[test]
    fn test_customer_selection_required() {
        assert!(Args::try_parse_from(["churn-dashboard", "assess"]).is_err());
        assert!(Args::try_parse_from([
            "churn-dashboard",
            "assess",
            "--customer",
            "1 - A",
            "--customer-id",
            "1"
        ])
        .is_err());
    }

    #[test]
    fn test_invalid_geography_rejected() {
        assert!(Args::try_parse_from([
            "churn-dashboard",
            "assess",
            "--customer-id",
            "1",
            "--geography",
            "Italy"
        ])
        .is_err());
    }

    #[test]
    fn test_list_limit() {
        let args = Args::try_parse_from(["churn-dashboard", "list", "-n", "5"]).unwrap();
        assert!(matches!(args.command, Command::List { limit: Some(5) }));
    }
}
