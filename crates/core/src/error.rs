//! Error types for ngoscope operations.
//!
//! This module defines the main error type [`NgoscopeError`]. The extraction
//! pipeline recovers fetch, decode and validation failures locally (they shrink
//! the evidence for one tier), so only configuration problems and invalid root
//! URLs normally reach callers.
//!
//! # Example
//!
//! ```rust
//! use ngoscope_core::{NgoscopeError, Result};
//!
//! fn parse_year(text: &str) -> Result<i32> {
//!     text.trim().parse().map_err(|_| NgoscopeError::ValidationError {
//!         field: "year_founded".to_string(),
//!         reason: format!("{text:?} is not a year"),
//!     })
//! }
//! # assert!(parse_year("19").is_ok());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for extraction operations.
///
/// The first three variants after the HTTP wrapper form the taxonomy the
/// pipeline reasons about: [`FetchError`](NgoscopeError::FetchError) (network,
/// timeout or render failure), [`DecodeError`](NgoscopeError::DecodeError)
/// (malformed structured metadata or undecodable PDF) and
/// [`ValidationError`](NgoscopeError::ValidationError) (an extracted value
/// failed its field's sanity checks).
#[derive(Error, Debug)]
pub enum NgoscopeError {
    /// HTTP request errors from reqwest.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request or decode timeout.
    ///
    /// Returned when a render, document fetch or decode exceeds its budget.
    #[error("Timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// A page or document could not be fetched or rendered.
    #[error("Failed to fetch {url}: {reason}")]
    FetchError { url: String, reason: String },

    /// Structured metadata or a linked document could not be decoded.
    #[error("Failed to decode: {0}")]
    DecodeError(String),

    /// An extracted value failed field-specific sanity checks.
    #[error("Rejected {field} candidate: {reason}")]
    ValidationError { field: String, reason: String },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, most commonly an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Pipeline or locale configuration errors.
    ///
    /// Returned when a locale pattern does not compile or a config value is out of range.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Per-domain override errors.
    ///
    /// Returned when an override file cannot be parsed or written.
    #[error("Override error: {0}")]
    OverrideError(String),
}

impl NgoscopeError {
    /// Whether this error only degrades a single evidence tier.
    pub fn is_recoverable(&self) -> bool {
        match self {
            #[cfg(feature = "fetch")]
            NgoscopeError::HttpError(_) => true,
            NgoscopeError::Timeout { .. }
            | NgoscopeError::FetchError { .. }
            | NgoscopeError::DecodeError(_)
            | NgoscopeError::ValidationError { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias for NgoscopeError.
pub type Result<T> = std::result::Result<T, NgoscopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NgoscopeError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_validation_error_names_field() {
        let err = NgoscopeError::ValidationError {
            field: "year_founded".to_string(),
            reason: "1492 outside 1800..=2026".to_string(),
        };
        assert!(err.to_string().contains("year_founded"));
        assert!(err.to_string().contains("1492"));
    }

    #[test]
    fn test_timeout_error() {
        let err = NgoscopeError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_recoverable_taxonomy() {
        assert!(NgoscopeError::DecodeError("bad json".into()).is_recoverable());
        assert!(
            NgoscopeError::FetchError { url: "https://a.org".into(), reason: "404".into() }.is_recoverable()
        );
        assert!(!NgoscopeError::ConfigError("bad regex".into()).is_recoverable());
        assert!(!NgoscopeError::InvalidUrl("x".into()).is_recoverable());
    }
}
