//! Domain-level error types for serman.
//!
//! Errors are split into two classes. Expected failures (an existing
//! install, a missing source file) are reported to the user as a plain
//! message. Everything else is a fault and surfaces with its full cause
//! chain.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Service directory or wrapper already present and `--overwrite` not given.
    #[error("Service directory already exists: {}. Consider use --overwrite to force install.", path.display())]
    AlreadyExists { path: PathBuf },

    /// Source service configuration file does not exist.
    #[error("Service configuration file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// Wrapper executable to deploy does not exist.
    #[error("Service wrapper executable not found: {}", path.display())]
    WrapperNotFound { path: PathBuf },

    /// No deployed wrapper for the requested service.
    #[error("Service '{id}' is not installed: {} does not exist", path.display())]
    NotInstalled { id: String, path: PathBuf },

    /// Service id is empty or not usable as a path segment.
    #[error("Invalid service id '{id}': {reason}")]
    InvalidServiceId { id: String, reason: &'static str },

    /// Template could not be compiled or rendered.
    #[error("Template error in {}: {message}", path.display())]
    Template {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<minijinja::Error>,
    },

    /// Rendered configuration is not well-formed XML.
    #[error("XML parse error: {message}")]
    XmlParse {
        message: String,
        #[source]
        source: Option<roxmltree::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create a template error for the given source file.
    pub fn template(path: impl Into<PathBuf>, err: minijinja::Error) -> Self {
        Self::Template {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an XML parse error.
    pub fn xml_parse(err: roxmltree::Error) -> Self {
        Self::XmlParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Whether this failure is part of normal operation and should be shown
    /// to the user as a plain message rather than a diagnostic.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists { .. }
                | Self::SourceNotFound { .. }
                | Self::WrapperNotFound { .. }
                | Self::NotInstalled { .. }
                | Self::InvalidServiceId { .. }
        )
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
