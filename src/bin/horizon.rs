//! Horizon CLI - Command-line interface for Horizon Analytics
//!
//! Commands:
//! - metrics: Mood metrics for a period compared with the previous period
//! - sleep: Sleep metrics for a period compared with the previous period
//! - validate: Validate log entries against the rating scale
//! - config: Print the effective engine configuration as TOML

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use horizon_analytics::config::EngineConfig;
use horizon_analytics::logging;
use horizon_analytics::types::Period;
use horizon_analytics::{AnalyticsEngine, AnalyticsError, InMemoryStore, ReportEncoder};
use horizon_analytics::{ENGINE_VERSION, PRODUCER_NAME};

/// Horizon - temporal behavioral analytics for mood and sleep journals
#[derive(Parser)]
#[command(name = "horizon")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Compute mood and sleep analytics from journal logs", long_about = None)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mood metrics for a period and its previous period
    Metrics {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Sleep metrics for a period and its previous period
    Sleep {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Validate log entries
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

#[derive(clap::Args)]
struct RequestArgs {
    /// Log document path (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// User whose logs are analysed
    #[arg(short, long)]
    user: String,

    /// First day of the period (YYYY-MM-DD)
    #[arg(long)]
    start: String,

    /// Last day of the period (YYYY-MM-DD)
    #[arg(long)]
    end: String,

    /// Output format
    #[arg(long, default_value = "json-pretty")]
    output_format: OutputFormat,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HorizonCliError> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    logging::init(&config.logging);

    match cli.command {
        Commands::Metrics { request } => cmd_metrics(&request, config),
        Commands::Sleep { request } => cmd_sleep(&request, config),
        Commands::Validate { input, json } => cmd_validate(&input, &config, json),
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn cmd_metrics(request: &RequestArgs, config: EngineConfig) -> Result<(), HorizonCliError> {
    let period = Period::parse(&request.start, &request.end)?;
    let store = load_store(&request.input)?;
    let engine = AnalyticsEngine::new(store, config)?;
    log_policy(engine.config());

    let comparison = engine.metrics(&request.user, period.start(), period.end())?;
    let output =
        ReportEncoder::new().encode_to_json(&comparison, is_pretty(&request.output_format))?;
    println!("{output}");
    Ok(())
}

fn cmd_sleep(request: &RequestArgs, config: EngineConfig) -> Result<(), HorizonCliError> {
    let period = Period::parse(&request.start, &request.end)?;
    let store = load_store(&request.input)?;
    let engine = AnalyticsEngine::new(store, config)?;
    log_policy(engine.config());

    let comparison = engine.sleep_metrics(&request.user, period.start(), period.end())?;
    let output =
        ReportEncoder::new().encode_to_json(&comparison, is_pretty(&request.output_format))?;
    println!("{output}");
    Ok(())
}

fn cmd_validate(input: &Path, config: &EngineConfig, json: bool) -> Result<(), HorizonCliError> {
    let store = load_store(input)?;
    let failures = store.validate_entries(&config.rating_scale);

    let report = ValidationReport {
        total_entries: store.entry_count(),
        valid_entries: store.entry_count() - failures.len(),
        invalid_entries: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                entry_id: f.entry_id,
                error: f.error.to_string(),
            })
            .collect(),
    };

    for err in &report.errors {
        tracing::warn!(
            index = err.index,
            entry_id = err.entry_id,
            error = %err.error,
            "Invalid entry"
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total entries:   {}", report.total_entries);
        println!("Valid entries:   {}", report.valid_entries);
        println!("Invalid entries: {}", report.invalid_entries);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Entry {} (index {}): {}", err.entry_id, err.index, err.error);
            }
        }
    }

    if report.invalid_entries > 0 {
        Err(HorizonCliError::ValidationFailed(report.invalid_entries))
    } else {
        Ok(())
    }
}

// Helper functions

fn load_store(input: &Path) -> Result<InMemoryStore, HorizonCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let store = InMemoryStore::from_json(&input_data)?;
    tracing::debug!(
        producer = PRODUCER_NAME,
        entries = store.entry_count(),
        sleep_logs = store.sleep_log_count(),
        "Loaded log document"
    );
    Ok(store)
}

fn log_policy(config: &EngineConfig) {
    tracing::debug!(
        window = ?config.moving_average,
        categories = config.categories.len(),
        "Using engine configuration"
    );
}

fn is_pretty(format: &OutputFormat) -> bool {
    matches!(format, OutputFormat::JsonPretty)
}

// Error types

#[derive(Debug)]
enum HorizonCliError {
    Io(io::Error),
    Analytics(AnalyticsError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for HorizonCliError {
    fn from(e: io::Error) -> Self {
        HorizonCliError::Io(e)
    }
}

impl From<AnalyticsError> for HorizonCliError {
    fn from(e: AnalyticsError) -> Self {
        HorizonCliError::Analytics(e)
    }
}

impl From<serde_json::Error> for HorizonCliError {
    fn from(e: serde_json::Error) -> Self {
        HorizonCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HorizonCliError> for CliError {
    fn from(e: HorizonCliError) -> Self {
        match e {
            HorizonCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HorizonCliError::Analytics(e) => {
                let (code, hint) = match &e {
                    AnalyticsError::InvalidRange { .. } => {
                        ("INVALID_RANGE", "The end date must not precede the start date")
                    }
                    AnalyticsError::NoPreviousPeriod { .. } => {
                        ("NO_PREVIOUS_PERIOD", "Start the period later so it can be compared")
                    }
                    AnalyticsError::DateParseError(_) => {
                        ("DATE_PARSE_ERROR", "Dates use the YYYY-MM-DD format")
                    }
                    AnalyticsError::StoreUnavailable(_) => {
                        ("STORE_UNAVAILABLE", "Retry once the log store is reachable")
                    }
                    AnalyticsError::ConfigError(_) => {
                        ("CONFIG_ERROR", "Run 'horizon config' to see a valid configuration")
                    }
                    AnalyticsError::JsonError(_) => {
                        ("JSON_ERROR", "Input must be a document with entries and sleepLogs")
                    }
                    AnalyticsError::InvalidEntry(_) => {
                        ("INVALID_ENTRY", "Run 'horizon validate' for details")
                    }
                    AnalyticsError::EncodingError(_) => ("ENCODING_ERROR", "Report a bug"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            HorizonCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HorizonCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} entries failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_entries: usize,
    valid_entries: usize,
    invalid_entries: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    entry_id: i64,
    error: String,
}
