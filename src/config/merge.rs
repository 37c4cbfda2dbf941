//! Merge rules: built-in defaults every layer overrides.

use crate::provider::{DEFAULT_FALLBACK_MODEL, DEFAULT_GEMINI_BASE_URL, DEFAULT_PRIMARY_MODEL};
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the default values applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("provider.base_url", DEFAULT_GEMINI_BASE_URL)?
        .set_default("provider.primary_model", DEFAULT_PRIMARY_MODEL)?
        .set_default("provider.fallback_model", DEFAULT_FALLBACK_MODEL)?
        .set_default("provider.connect_timeout_secs", 10_i64)?
        .set_default("provider.request_timeout_secs", 120_i64)?
        .set_default("library.max_entries", 20_i64)?
        .set_default("library.import_max_entries", 50_i64)?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
