//! Error classification: map a raw failure to a user-facing category.

use crate::error::{ApiError, GenerationError, GenerationErrorKind};

const RATE_LIMIT_MARKERS: &[&str] = &["429", "quota", "exhausted"];
const CREDENTIAL_MARKERS: &[&str] = &["403", "key"];
const NETWORK_MARKERS: &[&str] = &["fetch", "network", "connect", "timed out"];

/// Classify a failure description, case-insensitively.
///
/// Checks run in order: rate limit, credential, network. Anything else is `Unknown`.
pub fn classify(raw: &str) -> GenerationErrorKind {
    let text = raw.to_lowercase();
    let contains_any = |markers: &[&str]| markers.iter().any(|m| text.contains(m));

    if contains_any(RATE_LIMIT_MARKERS) {
        GenerationErrorKind::RateLimited
    } else if contains_any(CREDENTIAL_MARKERS) {
        GenerationErrorKind::InvalidCredential
    } else if contains_any(NETWORK_MARKERS) {
        GenerationErrorKind::NetworkError
    } else {
        GenerationErrorKind::Unknown
    }
}

/// Classify a provider error. Typed rate-limit and auth failures win over text matching.
pub fn classify_api_error(err: &ApiError) -> GenerationError {
    let detail = err.to_string();
    let kind = match err {
        ApiError::ProviderRateLimit(_) => GenerationErrorKind::RateLimited,
        ApiError::ProviderAuthFailed(_) => GenerationErrorKind::InvalidCredential,
        ApiError::GenerationFailed(inner) => inner.kind,
        _ => classify(&detail),
    };
    GenerationError::new(kind, detail)
}

/// Whether a failed attempt should move on to the next model.
pub fn is_rate_limited(err: &ApiError) -> bool {
    classify_api_error(err).kind == GenerationErrorKind::RateLimited
}
