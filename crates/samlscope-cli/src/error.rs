//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input acquisition error (no input, unreadable input).
    #[error("input error: {0}")]
    Input(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the SAML inspection pipeline.
    #[error(transparent)]
    Saml(#[from] samlscope_core::SamlError),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
