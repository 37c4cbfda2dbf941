//! Credential resolution: stored value, then build-time value, then process environment.

use crate::error::{GenerationError, GenerationErrorKind, StorageError};
use crate::library::CredentialStore;
use std::fmt;

/// Compile-time credential, if one was exported while building.
pub const BUILD_TIME_CREDENTIAL: Option<&str> = option_env!("ITAFACILE_API_KEY");

/// Process environment variables checked, in order.
pub const CREDENTIAL_ENV_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Stored,
    BuildTime,
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Stored => f.write_str("stored"),
            CredentialSource::BuildTime => f.write_str("build-time"),
            CredentialSource::Environment => f.write_str("environment"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub source: CredentialSource,
    pub value: String,
}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("source", &self.source)
            .field("value", &mask_credential(&self.value))
            .finish()
    }
}

/// Ordered credential candidates; the first non-blank one wins.
#[derive(Clone, Default)]
pub struct CredentialChain {
    candidates: Vec<(CredentialSource, Option<String>)>,
}

impl CredentialChain {
    pub fn new(
        stored: Option<String>,
        build_time: Option<String>,
        environment: Option<String>,
    ) -> Self {
        Self {
            candidates: vec![
                (CredentialSource::Stored, stored),
                (CredentialSource::BuildTime, build_time),
                (CredentialSource::Environment, environment),
            ],
        }
    }

    /// Chain over the stored credential, the compile-time value and the environment.
    pub fn from_environment(store: &CredentialStore) -> Result<Self, StorageError> {
        let stored = store.get()?;
        let environment = CREDENTIAL_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|v| !v.trim().is_empty());
        Ok(Self::new(
            stored,
            BUILD_TIME_CREDENTIAL.map(str::to_string),
            environment,
        ))
    }

    pub fn resolve(&self) -> Result<ResolvedCredential, GenerationError> {
        self.candidates
            .iter()
            .find_map(|(source, value)| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| ResolvedCredential {
                        source: *source,
                        value: v.to_string(),
                    })
            })
            .ok_or_else(|| {
                GenerationError::new(
                    GenerationErrorKind::MissingCredential,
                    "no credential in store, build configuration or environment",
                )
            })
    }
}

/// Show only the last four characters of a credential.
pub fn mask_credential(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
