//! Error types for locale negotiation and bundle resolution

use thiserror::Error;

/// Errors that can occur during bundle resolution.
#[derive(Debug, Error)]
pub enum LocalizationError {
    /// Invalid locale string
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Every fallback step for every candidate came back absent
    #[error("No resource for bundle {bundle} (requested locale {locale})")]
    ResolutionFailure { bundle: String, locale: String },

    /// Invalid startup configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
