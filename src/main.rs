//! Churn Risk Dashboard - Main Entry Point
//!
//! Loads the customer table and classifier ensemble once, then scores the
//! selected customer and prints the dashboard report.

use anyhow::{bail, Context, Result};
use churn_risk_dashboard::{
    cli::{Args, AssessArgs, Command},
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    ChurnDashboard, CustomerDataset, InferenceEngine, LlmClient,
};
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args)?;
    init_logging(&config.logging)?;
    info!("Starting Churn Risk Dashboard");

    if let Some(data) = &args.data {
        config.data.path = data.clone();
    }
    if let Some(models_dir) = &args.models_dir {
        config.models.models_dir = models_dir.clone();
    }

    match &args.command {
        Command::List { limit } => run_list(&config, *limit),
        Command::Assess(assess) => run_assess(config, assess).await,
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    match &args.config {
        Some(path) => AppConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => AppConfig::load(),
        None => Ok(AppConfig::default()),
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("churn_risk_dashboard={}", logging.level)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => builder.json().init(),
        _ => builder.init(),
    }

    Ok(())
}

fn run_list(config: &AppConfig, limit: Option<usize>) -> Result<()> {
    let dataset = CustomerDataset::load(&config.data.path)?;
    let options = dataset.customer_options();
    let shown = limit.unwrap_or(options.len());

    for option in options.iter().take(shown) {
        println!("{}", option);
    }
    if shown < options.len() {
        println!("... {} more", options.len() - shown);
    }

    Ok(())
}

async fn run_assess(mut config: AppConfig, assess: &AssessArgs) -> Result<()> {
    if assess.no_charts {
        config.charts.enabled = false;
    }

    let dataset = CustomerDataset::load(&config.data.path)?;
    let (customer_id, selected_surname) = assess.selection()?;

    let stored_surname = &dataset.find(customer_id)?.surname;
    if let Some(surname) = selected_surname {
        if &surname != stored_surname {
            bail!(
                "Customer {} is {}, not {}",
                customer_id,
                stored_surname,
                surname
            );
        }
    }

    // Models load once, before any remote call
    let engine = InferenceEngine::new(&config)?;

    let llm = if assess.no_llm {
        warn!("LLM disabled: skipping explanation and email");
        None
    } else {
        Some(LlmClient::from_config(&config.llm)?)
    };

    let dashboard = ChurnDashboard::new(config, dataset, engine, llm);
    let assessment = dashboard.assess(customer_id, &assess.overrides()).await?;

    if assess.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print!("{}", assessment.render_text());
    }

    Ok(())
}
