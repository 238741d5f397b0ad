//! Error types for the Blackbox dashboard
//!
//! Every engine and template operation reports failures synchronously through
//! [`Error`]. None of them is fatal: after a rejected operation the engine is
//! still usable and, for the validate-then-commit operations, untouched.

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the dashboard engine and template service
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Not Found
    // ==========================================================================
    #[error("Widget instance not found: {0}")]
    InstanceNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    // ==========================================================================
    // Refusals
    // ==========================================================================
    #[error("Widget instance is locked: {0}")]
    Locked(String),

    #[error("Template '{0}' is built-in and read-only")]
    BuiltinTemplate(String),

    // ==========================================================================
    // Validation
    // ==========================================================================
    #[error("Unknown widget type: {0}")]
    InvalidType(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid dashboard state: {0}")]
    InvalidState(String),

    #[error("Template import rejected: {0}")]
    ImportRejected(String),

    // ==========================================================================
    // I/O
    // ==========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Stable error code string (for CLI and JSON output)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InstanceNotFound(_) | Self::TemplateNotFound(_) => "NOT_FOUND",
            Self::Locked(_) => "LOCKED",
            Self::BuiltinTemplate(_) => "BUILTIN_READ_ONLY",
            Self::InvalidType(_) => "INVALID_TYPE",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::ImportRejected(_) => "IMPORT_REJECTED",
            Self::Io(_) => "OS_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the operation was refused before touching any state.
    ///
    /// Everything except storage failures is a rejection; an I/O or
    /// serialization error may surface after an in-memory commit succeeded.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Serialization(_))
    }
}
