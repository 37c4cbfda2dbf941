//! Error types for the Itafacile lesson generator.

use std::fmt;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: String, message: String },

    #[error("Store operation failed: {0}")]
    Backend(String),

    #[error("Failed to encode value for key {key}: {message}")]
    Encode { key: String, message: String },

    #[error("Failed to decode value for key {key}: {message}")]
    Decode { key: String, message: String },
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Provider, configuration and storage errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Library error: {0}")]
    LibraryError(#[from] LibraryError),

    #[error("{0}")]
    GenerationFailed(#[from] GenerationError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Library and backup errors. None of these leave the stored library partially updated.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Il file non sembra valido: è atteso un elenco di lezioni.")]
    NotAnArray,

    #[error("Errore nella lettura del file: {0}")]
    InvalidJson(String),

    #[error("Lesson not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Storage(#[from] StorageError),
}

/// User-facing category of a failed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationErrorKind {
    MissingCredential,
    RateLimited,
    InvalidCredential,
    NetworkError,
    MalformedResponse,
    Unknown,
}

impl GenerationErrorKind {
    /// Short localized message shown to the learner.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationErrorKind::MissingCredential => {
                "Chiave API mancante. Salvala con `itafacile key set` oppure esporta la variabile API_KEY."
            }
            GenerationErrorKind::RateLimited => {
                "⚠️ Limite traffico gratuito raggiunto. Attendi 1 minuto e riprova."
            }
            GenerationErrorKind::InvalidCredential => {
                "🔑 Chiave API non valida. Controllala con `itafacile key set`."
            }
            GenerationErrorKind::NetworkError => "📡 Errore di connessione. Controlla internet.",
            GenerationErrorKind::MalformedResponse => {
                "Risposta del modello non valida. Riprova tra poco."
            }
            GenerationErrorKind::Unknown => "Impossibile creare la lezione. Riprova tra poco.",
        }
    }
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationErrorKind::MissingCredential => "missing_credential",
            GenerationErrorKind::RateLimited => "rate_limited",
            GenerationErrorKind::InvalidCredential => "invalid_credential",
            GenerationErrorKind::NetworkError => "network_error",
            GenerationErrorKind::MalformedResponse => "malformed_response",
            GenerationErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classified generation failure; displays as the localized message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    /// Raw diagnostic text of the underlying failure
    pub detail: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.user_message())
    }
}

impl std::error::Error for GenerationError {}
