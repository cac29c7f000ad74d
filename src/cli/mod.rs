//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{parse_key_values, VariableMap};

/// Flag stripped from argv before parsing; blocks until Enter is pressed.
pub const PAUSE_ON_START: &str = "--pause-on-start";

/// serman - Install Windows services from templated WinSW configurations.
#[derive(Parser, Debug)]
#[command(name = "serman")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a service.
    Install {
        /// The service configuration file to install.
        config: PathBuf,

        /// Comma-separated key=value pairs used to fill in the configuration template.
        #[arg(default_value = "", value_parser = parse_key_values, value_name = "KEY_VALUES")]
        key_values: VariableMap,

        /// Overwrite the existing service directory.
        #[arg(long)]
        overwrite: bool,
    },

    /// Uninstall a service.
    Uninstall {
        /// The service ID to uninstall.
        id: String,
    },

    /// Stop an installed service.
    Stop {
        /// Service ID.
        id: String,
    },

    /// Restart an installed service.
    Restart {
        /// Service ID.
        id: String,
    },

    /// Show the status of an installed service.
    Status {
        /// Service ID.
        id: String,
    },

    /// Show where a service is (or would be) deployed.
    Paths {
        /// Service ID.
        id: String,
    },
}

/// Remove every `--pause-on-start` from `args`, reporting whether one was present.
pub fn strip_pause_flag(args: impl IntoIterator<Item = OsString>) -> (Vec<OsString>, bool) {
    let mut paused = false;
    let args = args
        .into_iter()
        .filter(|arg| {
            let is_flag = arg == PAUSE_ON_START;
            paused |= is_flag;
            !is_flag
        })
        .collect();
    (args, paused)
}
