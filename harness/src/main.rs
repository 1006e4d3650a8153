#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]
#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use books_harness::client::HttpBooksClient;
use books_harness::config::Config;
use books_harness::generator::TestDataSet;
use books_harness::suite::{Case, Category, Runner, Selection};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const CONFIG_ERROR: u8 = 2;
const INTERRUPTED: u8 = 130;

/// Automated test harness for the Books REST API.
#[derive(Debug, Parser)]
#[command(name = "books-harness", version, about)]
struct Cli {
    /// YAML configuration file; `BOOKS_*` environment variables override it.
    #[arg(long, global = true, value_name = "PATH", default_value = "config.yaml")]
    config: String,

    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run test cases against the configured service.
    Run {
        /// Only run cases in this category (repeatable).
        #[arg(long = "category", value_enum)]
        categories: Vec<Category>,

        /// Only run this case (repeatable). See `list` for names.
        #[arg(long = "case")]
        cases: Vec<Case>,

        /// Seed for generated data; overrides `generator.seed`.
        #[arg(long)]
        seed: Option<u64>,

        /// Where to write the JSON report (default: `<reports.dir>/report-<run id>.json`).
        #[arg(long, value_name = "PATH")]
        json_report: Option<PathBuf>,
    },
    /// Write a generated test data set to a JSON file.
    GenerateData {
        #[arg(long, value_name = "PATH", default_value = "test_data/test_books.json")]
        out: PathBuf,

        #[arg(long)]
        seed: Option<u64>,
    },
    /// Load and validate the configuration, then print it.
    CheckConfig,
    /// Print every case with its category.
    List,
}

fn init_tracing(level: &str, verbose: u8) {
    let level = match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn pick_seed(cli_seed: Option<u64>, config: &Config) -> u64 {
    cli_seed
        .or(config.generator.seed)
        .unwrap_or_else(rand::random)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if matches!(cli.command, Command::List) {
        for case in Case::ALL {
            println!("{:<40} {}", case.name(), case.category());
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Fail fast on configuration before anything talks to the network
    let config = match Config::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_tracing("error", cli.verbose);
            tracing::error!(path = %cli.config, error = %e, "invalid configuration");
            return Ok(ExitCode::from(CONFIG_ERROR));
        }
    };
    init_tracing(&config.logging.level, cli.verbose);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        timeout_secs = config.api.timeout_secs,
        max_attempts = config.retry.max_attempts,
        "books-harness starting up"
    );

    match cli.command {
        Command::List => Ok(ExitCode::SUCCESS),
        Command::CheckConfig => {
            let rendered = serde_json::to_string_pretty(&config)?;
            println!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
        Command::GenerateData { out, seed } => {
            let seed = pick_seed(seed, &config);
            let data = TestDataSet::generate(seed);
            data.save(&out)?;
            println!("wrote {} payloads to {} (seed {seed})", data.len(), out.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            categories,
            cases,
            seed,
            json_report,
        } => {
            let seed = pick_seed(seed, &config);
            let selection = Selection { categories, cases };
            let client =
                HttpBooksClient::from_config(&config).context("failed to build HTTP client")?;
            let runner = Runner::new(&client, &config);

            let report = tokio::select! {
                report = runner.run(&selection, seed) => report,
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!("interrupted, no report written");
                    return Ok(ExitCode::from(INTERRUPTED));
                }
            };

            let path = json_report
                .unwrap_or_else(|| report.default_path(&PathBuf::from(&config.reports.dir)));
            report
                .write_json(&path)
                .with_context(|| format!("failed to write report to {}", path.display()))?;

            print!("{}", report.summary());
            Ok(ExitCode::from(report.exit_code()))
        }
    }
}
