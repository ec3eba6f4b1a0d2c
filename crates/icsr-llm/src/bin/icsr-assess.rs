//! Command-line case form for AI-assisted causality assessment.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use icsr_core::CaseData;
use icsr_llm::form::{self, Report, CONFIGURATION_ERROR_EXIT};
use icsr_llm::{GatewayError, LlmGateway, Settings};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "icsr-assess")]
#[command(about = "AI-assisted ICSR causality assessment and drug interaction check")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess causality for every drug-event pair in a case
    Assess {
        /// Case file (JSON)
        #[arg(long)]
        case: PathBuf,
        /// Also check the case's drugs for interactions
        #[arg(long)]
        with_interactions: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check drugs for drug-drug interactions
    Interactions {
        /// Take suspect drugs and concomitant medications from a case file
        #[arg(long)]
        case: Option<PathBuf>,
        /// Drug name (repeatable)
        #[arg(long = "drug")]
        drugs: Vec<String>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report whether the provider API key is configured
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::from(CONFIGURATION_ERROR_EXIT);
        }
    };

    if let Some(code) = form::startup_exit_code(&settings) {
        eprint!("{}", form::configuration_error_display());
        return ExitCode::from(code);
    }

    if let Commands::CheckConfig = cli.command {
        println!("API key configured; model: {}", settings.model());
        return ExitCode::SUCCESS;
    }

    let gateway = match settings
        .into_gateway_config()
        .map_err(GatewayError::from)
        .and_then(|config| LlmGateway::new(&config))
    {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::from(CONFIGURATION_ERROR_EXIT);
        }
    };

    match run(cli.command, &gateway).await {
        Ok(report) => {
            print!("{}", report.stdout);
            eprint!("{}", report.stderr);
            if report.failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(command: Commands, gateway: &LlmGateway) -> Result<Report> {
    let report = match command {
        Commands::Assess {
            case,
            with_interactions,
            json,
        } => {
            let case = load_case(&case)?;
            form::assess(gateway, &case, with_interactions, json).await?
        }
        Commands::Interactions { case, drugs, json } => {
            let case = case.as_deref().map(load_case).transpose()?;
            form::interactions(gateway, case.as_ref(), &drugs, json).await?
        }
        // Answered in main before a gateway exists
        Commands::CheckConfig => Report::default(),
    };
    Ok(report)
}

fn load_case(path: &Path) -> Result<CaseData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read case file {}", path.display()))?;
    let case: CaseData = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid case file", path.display()))?;
    Ok(case.cleaned())
}
