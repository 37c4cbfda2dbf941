//! Shared presentation: headings, json encoding and the key status report.

use crate::error::{ApiError, StorageError};
use crate::generation::credential::{mask_credential, ResolvedCredential};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| {
        ApiError::StorageError(StorageError::Encode {
            key: "output".to_string(),
            message: e.to_string(),
        })
    })
}

/// Key status: where the key comes from, masked, plus optional check lines.
pub fn format_key_status(resolved: Option<&ResolvedCredential>, checks: &[(String, bool)]) -> String {
    let mut out = match resolved {
        Some(credential) => format!(
            "Chiave API: {} (origine: {})",
            mask_credential(&credential.value),
            credential.source
        ),
        None => "Chiave API: non configurata".to_string(),
    };
    for (label, ok) in checks {
        let mark = if *ok {
            format!("{}", "✓".green())
        } else {
            format!("{}", "✗".red())
        };
        out.push_str(&format!("\n{} {}", mark, label));
    }
    out
}
