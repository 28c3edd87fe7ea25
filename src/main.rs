//! gc-harness - Verify a collector's response to explicit GC requests.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gc_harness::config::{ConfigError, ConfigLoader, HarnessConfig};
use gc_harness::display;
use gc_harness::process::ProcessRunner;
use gc_harness::scenario::{select_scenarios, RunReport, ScenarioDriver};

/// Exit code when configuration or scenario selection is wrong.
const EXIT_SETUP_ERROR: u8 = 2;

#[derive(Parser)]
#[command(
    name = "gc-harness",
    about = "Verify a collector's response to explicit GC requests",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios and check their logs.
    Run {
        /// Config file (default: ./.gc-harness.toml, then the user config dir).
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Runtime launcher to use instead of the configured one.
        #[arg(long)]
        java: Option<String>,
        /// Class path holding the probe.
        #[arg(long)]
        classpath: Option<String>,
        /// Per-process timeout in seconds (0 waits forever).
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Only run the named scenario (repeatable).
        #[arg(short, long = "scenario")]
        scenarios: Vec<String>,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        /// Do not truncate command lines.
        #[arg(long)]
        raw: bool,
    },
    /// List configured scenarios and their launch lines.
    List {
        /// Config file (default: ./.gc-harness.toml, then the user config dir).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<HarnessConfig, ConfigError> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    loader.load()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            java,
            classpath,
            timeout,
            scenarios,
            json,
            raw,
        } => {
            let mut config = match load_config(config) {
                Ok(config) => config,
                Err(e) => {
                    display::print_error(&e.to_string());
                    return ExitCode::from(EXIT_SETUP_ERROR);
                }
            };
            if java.is_some() {
                config.java = java;
            }
            if classpath.is_some() {
                config.classpath = classpath;
            }
            if let Some(secs) = timeout {
                config.timeout_secs = secs;
            }

            let selected = match select_scenarios(config.effective_scenarios(), &scenarios) {
                Ok(selected) => selected,
                Err(e) => {
                    display::print_error(&e.to_string());
                    return ExitCode::from(EXIT_SETUP_ERROR);
                }
            };

            let mut runner = ProcessRunner::new();
            if let Some(limit) = config.timeout() {
                runner = runner.with_timeout(limit);
            }
            let driver = ScenarioDriver::new(runner, config);

            tracing::info!(count = selected.len(), "Starting gc-harness run");

            let report = if json {
                let report = driver.run_all(&selected).await;
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{text}"),
                    Err(e) => display::print_error(&format!("Failed to encode report: {e}")),
                }
                report
            } else {
                let mut outcomes = Vec::with_capacity(selected.len());
                for scenario in &selected {
                    let command = driver.launch_spec(scenario).display_command();
                    display::print_scenario_start(&scenario.name, &command, raw);
                    let outcome = driver.run_scenario(scenario).await;
                    display::print_outcome(&outcome);
                    outcomes.push(outcome);
                }
                let report = RunReport::new(outcomes);
                display::print_summary(&report);
                report
            };

            if report.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Commands::List { config } => {
            let config = match load_config(config) {
                Ok(config) => config,
                Err(e) => {
                    display::print_error(&e.to_string());
                    return ExitCode::from(EXIT_SETUP_ERROR);
                }
            };
            let scenarios = config.effective_scenarios();
            let driver = ScenarioDriver::new(ProcessRunner::new(), config);
            for scenario in &scenarios {
                display::print_scenario(scenario, &driver.launch_spec(scenario).display_command());
            }
            ExitCode::SUCCESS
        }
    }
}
