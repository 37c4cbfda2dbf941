//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, LibraryError};

/// Map domain/service errors to a string for CLI output.
///
/// Generation failures are already phrased for the learner; the classified
/// kind is appended so scripts can tell them apart.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::GenerationFailed(err) => format!("{} [{}]", err.user_message(), err.kind),
        ApiError::LibraryError(LibraryError::NotFound(topic)) => {
            format!("Nessuna lezione salvata per \"{}\".", topic)
        }
        other => other.to_string(),
    }
}
