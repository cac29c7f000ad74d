//! serman - Install Windows services from templated configurations.
//!
//! Renders a WinSW service configuration from a template, deploys the
//! wrapper executable next to it and asks the wrapper to register and
//! start the service.
//!
//!   serman install web.xml port=8080,env=prod
//!   serman install web.xml port=8081 --overwrite
//!   serman uninstall web

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::io::BufRead;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{ServiceManager, WrapperVerb};
use cli::{strip_pause_flag, Cli, Commands};
use domain::AppError;
use infrastructure::{load_settings, SystemProcessRunner};

/// Exit code for failures the user can act on.
const EXIT_EXPECTED_FAILURE: i32 = -1;
/// Exit code for argument errors and unexpected faults.
const EXIT_FAILURE: i32 = 1;

fn main() {
    let (args, pause) = strip_pause_flag(std::env::args_os());
    if pause {
        wait_for_debugger();
    }

    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(exit_code(&e.into()));
        }
    };

    setup_logging(cli.verbose);

    if let Err(err) = run(cli) {
        match expected_failure(&err) {
            Some(expected) => println!("{expected}"),
            None => eprintln!("{} {err:?}", "Error:".red().bold()),
        }
        std::process::exit(exit_code(&err));
    }
}

/// The user-actionable failure behind `err`, if any.
fn expected_failure(err: &anyhow::Error) -> Option<&AppError> {
    err.downcast_ref::<AppError>().filter(|e| e.is_expected())
}

/// Process exit code for a failed invocation.
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(parse) = err.downcast_ref::<clap::Error>() {
        return if parse.use_stderr() { EXIT_FAILURE } else { 0 };
    }

    if expected_failure(err).is_some() {
        EXIT_EXPECTED_FAILURE
    } else {
        EXIT_FAILURE
    }
}

/// Main application logic.
fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings().context("Failed to load serman settings")?;
    tracing::debug!(?settings, "Resolved settings");

    let runner = SystemProcessRunner;
    let manager = ServiceManager::new(settings, &runner);

    match cli.command {
        Commands::Install {
            config,
            key_values,
            overwrite,
        } => {
            let report = manager.install(&config, key_values, overwrite)?;
            let mark = if report.install.success() && report.start.success() {
                "✓".green()
            } else {
                "!".yellow()
            };
            println!(
                "{} Service installed in {} ({} environment variable(s) exported)",
                mark,
                report.layout.bin_dir.display(),
                report.env.exported
            );
        }
        Commands::Uninstall { id } => {
            manager.uninstall(&id)?;
        }
        Commands::Stop { id } => {
            manager.control(&id, WrapperVerb::Stop)?;
        }
        Commands::Restart { id } => {
            manager.control(&id, WrapperVerb::Restart)?;
        }
        Commands::Status { id } => {
            manager.control(&id, WrapperVerb::Status)?;
        }
        Commands::Paths { id } => {
            let layout = manager.layout(&id)?;
            println!("{}", format!("📂 Paths for {id}").bold());
            println!("  bin:     {}", layout.bin_dir.display());
            println!("  data:    {}", layout.data_dir.display());
            println!("  config:  {}", layout.target_config.display());
            println!("  wrapper: {}", layout.target_wrapper.display());
        }
    }

    Ok(())
}

/// Block until a line is read from stdin so a debugger can attach.
fn wait_for_debugger() {
    eprintln!(
        "Waiting for debugger (pid {}). Press Enter to continue...",
        std::process::id()
    );
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
