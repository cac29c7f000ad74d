//! Wrapper executable deployment and invocation.

use std::fmt;
use std::fs;
use std::path::Path;

use colored::Colorize;

use crate::domain::{AppError, Result, ServiceLayout};
use crate::infrastructure::{ProcessOutcome, ProcessRunner};

/// Commands understood by the wrapper executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperVerb {
    Install,
    Start,
    Stop,
    Restart,
    Status,
    Uninstall,
}

impl WrapperVerb {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Status => "status",
            Self::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for WrapperVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create the service directories and copy the wrapper into place.
///
/// Without `overwrite`, both directories are checked before anything is
/// created so a refused install leaves the filesystem untouched.
///
/// # Errors
/// Returns `AlreadyExists` if a directory or the wrapper is already present
/// and `overwrite` is false, `WrapperNotFound` if `wrapper_source` is
/// missing, and `Io` if creating or copying fails.
pub fn deploy_wrapper(layout: &ServiceLayout, wrapper_source: &Path, overwrite: bool) -> Result<()> {
    if !overwrite {
        for dir in [&layout.bin_dir, &layout.data_dir] {
            if dir.exists() {
                return Err(AppError::AlreadyExists { path: dir.clone() });
            }
        }
    }

    if !wrapper_source.is_file() {
        return Err(AppError::WrapperNotFound {
            path: wrapper_source.to_path_buf(),
        });
    }

    for dir in [&layout.bin_dir, &layout.data_dir] {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::io(format!("Failed to create directory: {}", dir.display()), e)
        })?;
        tracing::debug!(path = %dir.display(), "Directory ready");
    }

    if !overwrite && layout.target_wrapper.exists() {
        return Err(AppError::AlreadyExists {
            path: layout.target_wrapper.clone(),
        });
    }

    fs::copy(wrapper_source, &layout.target_wrapper).map_err(|e| {
        AppError::io(
            format!("Failed to copy wrapper to {}", layout.target_wrapper.display()),
            e,
        )
    })?;

    tracing::info!(path = %layout.target_wrapper.display(), "Wrapper deployed");

    Ok(())
}

/// Run the deployed wrapper with `verb` and echo its output.
///
/// A non-zero exit code is reported as a warning, not an error.
///
/// # Errors
/// Returns `Io` if the wrapper cannot be launched.
pub fn invoke_wrapper(
    runner: &dyn ProcessRunner,
    wrapper: &Path,
    verb: WrapperVerb,
) -> Result<ProcessOutcome> {
    println!("Executing {} {verb}...", wrapper.display());

    let outcome = runner.run(wrapper.as_os_str(), &[verb.as_str()])?;
    outcome.display();

    if !outcome.success() {
        let code = outcome
            .code
            .map_or_else(|| "none".to_string(), |c| c.to_string());
        tracing::warn!(%verb, code = %code, "Wrapper exited unsuccessfully");
        println!(
            "{} {} {verb} exited with code {code}",
            "Warning:".yellow().bold(),
            wrapper.display()
        );
    }

    Ok(outcome)
}
