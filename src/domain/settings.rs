//! Deployment roots and wrapper location.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Name of the wrapper executable shipped alongside serman.
pub const DEFAULT_WRAPPER: &str = "winsw.exe";

/// Where services are deployed and which wrapper is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Root directory holding one bin directory per service.
    #[serde(default = "default_service_bin")]
    pub service_bin: PathBuf,

    /// Root directory holding one data directory per service.
    #[serde(default = "default_service_data")]
    pub service_data: PathBuf,

    /// Wrapper executable to deploy. Relative paths are resolved against
    /// the directory serman runs from.
    #[serde(default = "default_wrapper")]
    pub wrapper: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_bin: default_service_bin(),
            service_data: default_service_data(),
            wrapper: default_wrapper(),
        }
    }
}

impl Settings {
    /// Anchor a relative wrapper path at `base_dir`.
    #[must_use]
    pub fn anchored_at(mut self, base_dir: &Path) -> Self {
        if self.wrapper.is_relative() {
            self.wrapper = base_dir.join(&self.wrapper);
        }
        self
    }
}

fn default_service_bin() -> PathBuf {
    env_dir("ProgramFiles", r"C:\Program Files").join("serman")
}

fn default_service_data() -> PathBuf {
    env_dir("ProgramData", r"C:\ProgramData").join("serman")
}

fn default_wrapper() -> PathBuf {
    PathBuf::from(DEFAULT_WRAPPER)
}

fn env_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(fallback), PathBuf::from)
}
