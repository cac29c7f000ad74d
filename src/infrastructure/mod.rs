//! Infrastructure layer - external adapters (processes, templates, settings).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod process;
pub mod template;

pub use config::load_settings;
pub use process::{ProcessOutcome, ProcessRunner, SystemProcessRunner};
pub use template::render_template;
