//! Configuration System
//!
//! Layered configuration: built-in defaults, the user's global file, an
//! explicit `--config` file, then `ITAFACILE__SECTION__KEY` environment
//! variables. Later layers win.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::library::LibraryConfig;
pub use crate::logging::LoggingConfig;
pub use crate::provider::ProviderConfig;

mod loader;
mod merge;
mod sources;

pub use loader::ConfigLoader;
pub use sources::global_file::global_config_path;

pub const APP_NAME: &str = "itafacile";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItafacileConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Provider(String),
    Library(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Library(msg) => write!(f, "Library: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ItafacileConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.library.validate() {
            errors.push(ValidationError::Library(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Data directory: explicit override, then `[library] data_dir`, then the
    /// platform data directory.
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf, ApiError> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.library.data_dir {
            return Ok(dir.clone());
        }
        default_data_dir()
    }
}

/// Platform data directory, e.g. `$XDG_DATA_HOME/itafacile`.
pub fn default_data_dir() -> Result<PathBuf, ApiError> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            ApiError::ConfigError(
                "Could not determine a data directory (is HOME set?); pass --data-dir".to_string(),
            )
        })
}

pub(crate) fn validation_failure(errors: &[ValidationError]) -> ApiError {
    let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    ApiError::ConfigError(format!(
        "Configuration validation failed:\n{}",
        error_msgs.join("\n")
    ))
}
