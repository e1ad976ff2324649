//! Unified error handling for vturls.
//!
//! A single `thiserror`-based enum covers every failure the crate can
//! surface, plus a coarse `ErrorCategory` used for reporting.
//!
//! Failures fall into two tiers:
//!   * Transport-level problems (connection errors, non-2xx statuses) never
//!     appear here individually. The rotating executor absorbs them and only
//!     reports `ExhaustedRetries` once the lookup deadline has passed.
//!   * Per-lookup problems (`DecodeFailure`, a body read `Network` error)
//!     are reported for the affected domain and the batch moves on.
//!
//! `VtUrlsError::is_fatal` tells the batch runner which of the two applies.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// High-level classification for structured reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Parse,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Network => "network",
            ErrorCategory::Parse => "parse",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Primary application error type.
#[derive(Error, Debug)]
pub enum VtUrlsError {
    // ------------------------ Input / Validation ----------------------------
    #[error("Configuration error: {message}")]
    InvalidConfiguration { message: String },

    #[error("Invalid input '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    // ----------------------------- Network ----------------------------------
    #[error("all credentials failed after {deadline:?} ({attempts} attempts)")]
    ExhaustedRetries { attempts: usize, deadline: Duration },

    #[error("Network error during {operation} for '{target}': {source}")]
    Network {
        operation: String,
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Lookup for '{target}' was cancelled")]
    Cancelled { target: String },

    // ---------------------------- Parsing -----------------------------------
    #[error("Failed to decode domain report for '{domain}': {source}")]
    DecodeFailure {
        domain: String,
        #[source]
        source: serde_json::Error,
    },

    // ----------------------------- I/O / FS ---------------------------------
    #[error("I/O error during {operation} on {path}: {source}")]
    Io {
        path: String,
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl VtUrlsError {
    /// Categorize the error for structured output.
    pub fn category(&self) -> ErrorCategory {
        use VtUrlsError::*;
        match self {
            InvalidConfiguration { .. } | InvalidInput { .. } => ErrorCategory::Input,
            ExhaustedRetries { .. } | Network { .. } | Cancelled { .. } => ErrorCategory::Network,
            DecodeFailure { .. } => ErrorCategory::Parse,
            Io { .. } => ErrorCategory::Internal,
        }
    }

    /// Whether this error must stop the whole batch rather than just the
    /// current domain.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            VtUrlsError::InvalidConfiguration { .. }
                | VtUrlsError::ExhaustedRetries { .. }
                | VtUrlsError::Cancelled { .. }
        )
    }

    // ---------------------------- Constructors -----------------------------

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn invalid_input(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn exhausted(attempts: usize, deadline: Duration) -> Self {
        Self::ExhaustedRetries { attempts, deadline }
    }

    pub fn network(
        operation: impl Into<String>,
        target: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            operation: operation.into(),
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn cancelled(target: impl Into<String>) -> Self {
        Self::Cancelled {
            target: target.into(),
        }
    }

    pub fn decode(domain: impl Into<String>, source: serde_json::Error) -> Self {
        Self::DecodeFailure {
            domain: domain.into(),
            source,
        }
    }

    pub fn io(path: impl Into<String>, operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }
}

/// Public result alias.
pub type Result<T> = std::result::Result<T, VtUrlsError>;

impl From<ConfigError> for VtUrlsError {
    fn from(e: ConfigError) -> Self {
        VtUrlsError::InvalidConfiguration {
            message: e.to_string(),
        }
    }
}

/// Extension trait for enriching IO results with path + operation context.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, io::Error> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| VtUrlsError::io(path.into(), operation.into(), e))
    }
}
