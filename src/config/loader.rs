//! Configuration loader: stacks the sources and deserializes the result.

use super::merge::builder_with_defaults;
use super::sources::{environment, explicit_file, global_file};
use super::{validation_failure, ItafacileConfig};
use crate::error::ApiError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, then environment.
    pub fn load() -> Result<ItafacileConfig, ApiError> {
        Self::load_with(None)
    }

    /// Defaults, global file, explicit file when given, then environment.
    pub fn load_with(explicit: Option<&Path>) -> Result<ItafacileConfig, ApiError> {
        let mut builder = builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            debug!(config_path = %path.display(), "Loading explicit configuration");
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = environment::add_to_builder(builder)?;

        let config: ItafacileConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| validation_failure(&errors))?;
        Ok(config)
    }

    /// Defaults plus a single file, ignoring the global file and environment.
    pub fn load_from_file(path: &Path) -> Result<ItafacileConfig, ApiError> {
        let builder = explicit_file::add_to_builder(builder_with_defaults()?, path)?;
        let config: ItafacileConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| validation_failure(&errors))?;
        Ok(config)
    }
}
