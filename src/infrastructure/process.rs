//! External process execution.
//!
//! Children run to completion; their output is captured and replayed to
//! the console afterwards.

use std::ffi::OsStr;
use std::process::Command;

use colored::Colorize;

use crate::domain::{AppError, Result};

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, `None` if the child was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Print stdout lines verbatim, then stderr lines in red.
    pub fn display(&self) {
        for line in self.stdout.lines() {
            println!("{line}");
        }
        for line in self.stderr.lines() {
            println!("{}", line.red());
        }
    }
}

/// Runs a program to completion.
pub trait ProcessRunner {
    /// Run `program` with `args` and wait for it to exit.
    ///
    /// # Errors
    /// Returns `Io` if the process cannot be launched.
    fn run(&self, program: &OsStr, args: &[&str]) -> Result<ProcessOutcome>;
}

/// Runs real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &OsStr, args: &[&str]) -> Result<ProcessOutcome> {
        tracing::debug!(program = %program.to_string_lossy(), ?args, "Spawning process");

        let output = Command::new(program).args(args).output().map_err(|e| {
            AppError::io(format!("Failed to run {}", program.to_string_lossy()), e)
        })?;

        let outcome = ProcessOutcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(code = ?outcome.code, "Process exited");

        Ok(outcome)
    }
}
