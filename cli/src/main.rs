//! rxbatch: bulk prescription generator
//!
//! Reads a patients spreadsheet and a formulas spreadsheet, logs in to the
//! prescription web application once, and generates one prescription per
//! patient row.
//!
//! Usage:
//!   rxbatch run
//!   rxbatch run --patients pacientes.xlsx --formulas formulas.xlsx --username dra.lopez
//!   rxbatch run --config config/rxbatch.toml --headless --report run.json
//!   rxbatch check-config --config config/rxbatch.toml

mod console;
mod narrator;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rxbatch_config::RunConfig;
use rxbatch_contracts::outcome::RunId;
use rxbatch_core::{LocationHeuristic, Orchestrator, PrescriptionPipeline, RunInputs};
use rxbatch_records::SpreadsheetStore;
use rxbatch_report::RunReport;
use rxbatch_webdriver::{WebDriverActor, WebDriverOptions};

use crate::console::Console;
use crate::narrator::Narrator;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Generate prescriptions in bulk from spreadsheets.
#[derive(Parser)]
#[command(
    name = "rxbatch",
    about = "Bulk prescription generator",
    long_about = "Reads patients and formulas spreadsheets and drives the prescription\n\
                  web application through a WebDriver browser, one patient at a time."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process every patient in the patients spreadsheet.
    Run(RunArgs),
    /// Print the effective configuration and exit.
    CheckConfig {
        /// TOML configuration file. Built-in defaults when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// TOML configuration file. Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Patients spreadsheet. Prompted for when omitted.
    #[arg(long)]
    patients: Option<PathBuf>,
    /// Formulas spreadsheet. Prompted for when omitted.
    #[arg(long)]
    formulas: Option<PathBuf>,
    /// Login name. Prompted for when omitted; the password always is.
    #[arg(long)]
    username: Option<String>,
    /// Generate without downloading the documents.
    #[arg(long)]
    no_download: bool,
    /// Run the browser without a window.
    #[arg(long)]
    headless: bool,
    /// Write the run report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug to see every remote step.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run(args).await,
        Command::CheckConfig { config } => check_config(config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("rxbatch: {:#}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn check_config(path: Option<&Path>) -> anyhow::Result<()> {
    let config = RunConfig::load(path)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = RunConfig::load(args.config.as_deref())?;
    if args.headless {
        config.remote.headless = true;
    }
    if args.no_download {
        config.download.enabled = false;
    }
    if config.download.enabled {
        config.download.directory = absolute(&config.download.directory)?;
    }

    print_banner(&config);

    let settings = config.pipeline_settings();
    let store = SpreadsheetStore::new(
        config.columns.patients.clone(),
        config.columns.formulas.clone(),
    );
    let orchestrator = Orchestrator::new(store, PrescriptionPipeline::new(settings.clone()));
    let detector = Box::new(LocationHeuristic::new(
        config.remote.login_url.clone(),
        config.remote.login_marker.clone(),
    ));
    let options = WebDriverOptions::from_config(&config);
    let inputs = RunInputs {
        patients_path: args.patients,
        formulas_path: args.formulas,
        username: args.username,
    };

    let mut console = Console::open();
    let mut narrator = Narrator::new(RunReport::new(RunId::new(), settings.download_dir.clone()));

    let outcome = orchestrator
        .run(
            inputs,
            &mut console,
            || WebDriverActor::connect(options),
            detector,
            &mut narrator,
        )
        .await;
    console.close();

    let report = narrator.into_report();
    if !report.is_empty() || outcome.is_ok() {
        let summary = report.summarize();
        println!();
        println!("{}", summary);
        if !summary.is_clean() {
            println!("Some prescriptions failed; rerun those patients after checking the log.");
        }
    }
    if let Some(path) = &args.report {
        report.export_json(path)?;
        println!("Report written to {}", path.display());
    }

    let totals = outcome.context("run aborted")?;
    tracing::info!(
        patients = totals.patients,
        formulas = totals.formulas,
        "run finished"
    );
    Ok(())
}

/// Browsers need an absolute download directory.
fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot resolve the working directory")?;
    Ok(cwd.join(path))
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner(config: &RunConfig) {
    println!();
    println!("rxbatch: bulk prescription generator");
    println!("====================================");
    println!("  Application: {}", config.remote.form_url);
    println!("  WebDriver:   {}", config.remote.webdriver_url);
    if config.download.enabled {
        println!("  Downloads:   {}", config.download.directory.display());
    } else {
        println!("  Downloads:   disabled");
    }
    println!();
}
