//! Machine-wide environment variable export.
//!
//! Every variable is attempted; a failure is reported and the remaining
//! variables are still exported.

use std::ffi::OsStr;

use colored::Colorize;

use crate::domain::PersistentVar;
use crate::infrastructure::ProcessRunner;

/// Tool that writes machine-scoped environment variables.
const SETX: &str = "setx";

/// Outcome of exporting a batch of variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub exported: usize,
    pub failed: Vec<String>,
}

/// Export each variable with `setx NAME VALUE /M`.
pub fn persist_env(runner: &dyn ProcessRunner, vars: &[PersistentVar]) -> PersistSummary {
    let mut summary = PersistSummary::default();

    for var in vars {
        println!("Exporting environment variable {}={}...", var.name, var.value);

        match runner.run(OsStr::new(SETX), &[var.name.as_str(), var.value.as_str(), "/M"]) {
            Ok(outcome) => {
                outcome.display();
                if outcome.success() {
                    summary.exported += 1;
                } else {
                    tracing::warn!(name = %var.name, code = ?outcome.code, "setx reported failure");
                    summary.failed.push(var.name.clone());
                }
            }
            Err(e) => {
                tracing::warn!(name = %var.name, error = %e, "Failed to export environment variable");
                summary.failed.push(var.name.clone());
            }
        }
    }

    if !summary.failed.is_empty() {
        println!(
            "{} Could not export: {}",
            "Warning:".yellow().bold(),
            summary.failed.join(", ")
        );
    }

    summary
}
