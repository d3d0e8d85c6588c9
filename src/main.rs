//! pacemon-failover - scheduled failover automation for Pacemaker-managed
//! HA database clusters
//!
//! This binary is meant to be invoked by cron; each invocation performs at
//! most one failover decision run and exits.
//!
//! Usage:
//!   pacemon-failover [OPTIONS] run [--override]
//!   pacemon-failover [OPTIONS] status [--file <path>] [--health-check]
//!
//! Options:
//!   --config <path>  Path to configuration file
//!   --override       Act now regardless of the schedule (health checks still apply)
//!   -f, --file       Parse a saved status report instead of querying the cluster
//!   --health-check   Evaluate cluster health after printing the status
//!   -v, --verbose    Enable verbose output
//!
//! Example cron entry (daily, early morning):
//!   17 5 * * * /usr/local/bin/pacemon-failover --config /etc/pacemon-failover/failover.yaml run

use std::env;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pacemon_failover::services::health::evaluate_cluster_health;
use pacemon_failover::services::parser::parse_status;
use pacemon_failover::services::CommandRunner;
use pacemon_failover::{
    AppConfig, Decision, EmailNotifier, FailoverEngine, SystemCommandRunner,
};

enum CliCommand {
    Run,
    Status,
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let mut command: Option<CliCommand> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut override_schedule = false;
    let mut status_file: Option<PathBuf> = None;
    let mut health_check = false;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--override" => {
                override_schedule = true;
            }
            "--file" | "-f" => {
                if i + 1 < args.len() {
                    status_file = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--health-check" => {
                health_check = true;
            }
            "--verbose" | "-v" => {
                verbose = true;
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            "--version" | "-V" => {
                println!("pacemon-failover {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "run" => {
                command = Some(CliCommand::Run);
            }
            "status" => {
                command = Some(CliCommand::Status);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(command) = command else {
        print_help();
        std::process::exit(1);
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    init_logging(&config, verbose);

    let exit_code = match command {
        CliCommand::Run => run_failover(&config, override_schedule).await,
        CliCommand::Status => show_status(&config, status_file.as_deref(), health_check).await,
    };

    std::process::exit(exit_code);
}

/// Perform one failover decision run and notify the outcome.
async fn run_failover(config: &AppConfig, override_schedule: bool) -> i32 {
    // Pre-flight: no cluster interaction and no email until the
    // configuration names the expected primary.
    let settings = match config.engine_settings(override_schedule) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };
    let kind = match config.cluster_kind() {
        Ok(kind) => kind,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    let runner = SystemCommandRunner::new(config.command_timeout());
    let engine = FailoverEngine::new(settings, kind, &runner);
    let notifier = EmailNotifier::new(config.email.clone());
    let today = Local::now().date_naive();

    match engine.run(today).await {
        Ok(report) => {
            if report.decision == Decision::NoAction {
                info!("no action required for this run");
                return 0;
            }

            let primary = report.primary.as_deref().unwrap_or("unknown");
            info!(decision = %report.decision, %primary, "failover run completed");

            if let Some(status) = &report.status {
                let body = EmailNotifier::success_body(primary, status);
                if let Err(e) = notifier.notify(body).await {
                    warn!(error = %e, "failed to send success notification");
                }
            }

            0
        }
        Err(failure) => {
            error!(error = %failure.error, "failover run failed");

            let body = EmailNotifier::failure_body(&failure.error, failure.status.as_ref());
            if let Err(e) = notifier.notify(body).await {
                warn!(error = %e, "failed to send failure notification");
            }

            1
        }
    }
}

/// Print the current (or a saved) cluster status, optionally evaluating
/// its health.
async fn show_status(config: &AppConfig, file: Option<&Path>, health_check: bool) -> i32 {
    let raw = if let Some(path) = file {
        match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("failed to read {}: {e}", path.display());
                return 1;
            }
        }
    } else {
        let runner = SystemCommandRunner::new(config.command_timeout());
        match runner.run(&config.status_command).await {
            Ok(output) => output.stdout,
            Err(e) => {
                eprintln!("{e}");
                return 1;
            }
        }
    };

    let status = match parse_status(&raw) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    println!("{status}");

    if health_check {
        match evaluate_cluster_health(&status) {
            Ok(()) => println!("Cluster health: OK"),
            Err(e) => {
                eprintln!("Cluster health: {e}");
                return 1;
            }
        }
    }

    0
}

/// Initialize the logging/tracing infrastructure.
fn init_logging(config: &AppConfig, verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

fn print_help() {
    println!("pacemon-failover - scheduled failover automation for Pacemaker-managed clusters");
    println!();
    println!("Usage:");
    println!("  pacemon-failover [OPTIONS] run [--override]");
    println!("  pacemon-failover [OPTIONS] status [--file <path>] [--health-check]");
    println!();
    println!("Commands:");
    println!("  run                 Perform one failover decision run");
    println!("  status              Print the cluster status in human-readable form");
    println!();
    println!("Options:");
    println!("  --config <path>     Path to configuration file");
    println!("  --override          Act now regardless of the schedule (health checks still apply)");
    println!("  -f, --file <path>   Parse a saved status report instead of querying the cluster");
    println!("  --health-check      Evaluate cluster health after printing the status");
    println!("  -v, --verbose       Enable verbose output");
    println!("  -h, --help          Show this help message");
    println!("  -V, --version       Show the version");
    println!();
    println!("Example cron entry (daily, early morning):");
    println!("  17 5 * * * /usr/local/bin/pacemon-failover --config /etc/pacemon-failover/failover.yaml run");
}
