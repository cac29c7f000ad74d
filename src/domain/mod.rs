//! Domain layer - core types for service deployment.
//!
//! This layer contains pure domain models and error types
//! without any external dependencies (processes, filesystem).

pub mod error;
pub mod service;
pub mod settings;
pub mod variables;

pub use error::{AppError, Result};
pub use service::{ServiceId, ServiceLayout};
pub use settings::Settings;
pub use variables::{parse_key_values, PersistentVar, VariableMap, DIR_KEY};
