//! Service identity and on-disk layout.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use super::error::{AppError, Result};
use super::settings::Settings;

/// Characters Windows does not allow in file names, besides separators.
const RESERVED_CHARS: [char; 7] = [':', '<', '>', '"', '|', '?', '*'];

/// Identifier of a managed service, used as a directory and file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceId(String);

impl ServiceId {
    /// Validate a service id.
    ///
    /// # Errors
    /// Returns `InvalidServiceId` unless the id is a single plain file
    /// name on every platform.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        let reason = if id.trim().is_empty() {
            Some("must not be empty")
        } else if id == "." || id == ".." {
            Some("must not be a relative path component")
        } else if id.contains(['/', '\\']) {
            Some("must not contain path separators")
        } else if id.contains(RESERVED_CHARS) || id.chars().any(char::is_control) {
            Some("must not contain drive prefixes or reserved characters")
        } else if !is_single_normal_component(&id) {
            Some("must be a single file name")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(AppError::InvalidServiceId { id, reason }),
            None => Ok(Self(id)),
        }
    }

    /// Derive the id from a service configuration file name (without extension).
    ///
    /// # Errors
    /// Returns `InvalidServiceId` if the path has no usable file stem.
    pub fn from_config_path(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(stem)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_single_normal_component(id: &str) -> bool {
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Every location serman touches for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLayout {
    /// Directory holding the wrapper and its configuration.
    pub bin_dir: PathBuf,
    /// Directory for the service's logs and data.
    pub data_dir: PathBuf,
    /// Rendered configuration consumed by the wrapper.
    pub target_config: PathBuf,
    /// Deployed copy of the wrapper executable.
    pub target_wrapper: PathBuf,
}

impl ServiceLayout {
    /// Resolve the layout for `id` under the configured roots.
    #[must_use]
    pub fn resolve(settings: &Settings, id: &ServiceId) -> Self {
        let bin_dir = settings.service_bin.join(id.as_str());
        let data_dir = settings.service_data.join(id.as_str());
        let target_config = bin_dir.join(format!("{id}.xml"));
        let target_wrapper = bin_dir.join(format!("{id}.exe"));

        Self {
            bin_dir,
            data_dir,
            target_config,
            target_wrapper,
        }
    }
}
