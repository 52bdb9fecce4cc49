//! Error types for the OpenStack client core
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use std::fmt;
use thiserror::Error;

/// Which field-group rule a pair of options fields violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRule {
    /// Exactly one of the two fields must be set (`xor`)
    ExactlyOne,
    /// At least one of the two fields must be set (`or`)
    AtLeastOne,
}

impl fmt::Display for GroupRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactlyOne => f.write_str("Exactly one"),
            Self::AtLeastOne => f.write_str("At least one"),
        }
    }
}

/// The main error type for the OpenStack client core
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Marshaling Errors
    // ============================================================================
    #[error("Missing input for argument [{argument}]{}", info_suffix(.info))]
    MissingInput {
        argument: String,
        info: Option<String>,
    },

    #[error("Missing input for argument [{first}/{second}]: {rule} of {first} and {second} must be provided")]
    FieldGroup {
        first: String,
        second: String,
        rule: GroupRule,
    },

    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    // ============================================================================
    // Decoding Errors
    // ============================================================================
    #[error("Expected {expected} but got {actual}")]
    UnexpectedType { expected: String, actual: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Expected HTTP response code {expected:?} when accessing [{method} {url}], but got {actual} instead: {body}")]
    UnexpectedResponseCode {
        method: String,
        url: String,
        expected: Vec<u16>,
        actual: u16,
        body: String,
    },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Endpoint Catalog Errors
    // ============================================================================
    #[error("No suitable endpoint could be found in the service catalog")]
    EndpointNotFound,

    #[error("Unexpected availability in endpoint query: {value}")]
    InvalidAvailability { value: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

fn info_suffix(info: &Option<String>) -> String {
    match info {
        Some(info) => format!(": {info}"),
        None => String::new(),
    }
}

impl Error {
    /// Create a missing input error for a single argument
    pub fn missing_input(argument: impl Into<String>) -> Self {
        Self::MissingInput {
            argument: argument.into(),
            info: None,
        }
    }

    /// Create a missing input error with extra information
    pub fn missing_input_with_info(argument: impl Into<String>, info: impl Into<String>) -> Self {
        Self::MissingInput {
            argument: argument.into(),
            info: Some(info.into()),
        }
    }

    /// Create a field group error
    pub fn field_group(first: impl Into<String>, second: impl Into<String>, rule: GroupRule) -> Self {
        Self::FieldGroup {
            first: first.into(),
            second: second.into(),
            rule,
        }
    }

    /// Create an invalid options error
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    /// Create an unexpected type error
    pub fn unexpected_type(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::UnexpectedType {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for errors raised while validating an options struct
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput { .. } | Self::FieldGroup { .. })
    }

    /// True if the server answered with the given status code
    pub fn is_status(&self, code: u16) -> bool {
        match self {
            Self::UnexpectedResponseCode { actual, .. } => *actual == code,
            _ => false,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::UnexpectedResponseCode { actual, .. } => is_retryable_status(*actual),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503 | 504)
}

/// Result type alias for the client core
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::missing_input("Name");
        assert_eq!(err.to_string(), "Missing input for argument [Name]");

        let err = Error::missing_input_with_info("Limit", "Required query parameter not set");
        assert_eq!(
            err.to_string(),
            "Missing input for argument [Limit]: Required query parameter not set"
        );

        let err = Error::field_group("Password", "Token", GroupRule::ExactlyOne);
        assert_eq!(
            err.to_string(),
            "Missing input for argument [Password/Token]: Exactly one of Password and Token must be provided"
        );

        let err = Error::field_group("F1", "F2", GroupRule::AtLeastOne);
        assert!(err.to_string().contains("At least one of F1 and F2"));
    }

    #[test]
    fn test_is_missing_input() {
        assert!(Error::missing_input("x").is_missing_input());
        assert!(Error::field_group("a", "b", GroupRule::AtLeastOne).is_missing_input());
        assert!(!Error::invalid_options("bad").is_missing_input());
        assert!(!Error::Cancelled.is_missing_input());
    }

    #[test]
    fn test_is_status() {
        let err = Error::UnexpectedResponseCode {
            method: "GET".to_string(),
            url: "http://example.com/servers".to_string(),
            expected: vec![200],
            actual: 404,
            body: String::new(),
        };
        assert!(err.is_status(404));
        assert!(!err.is_status(500));
        assert!(!Error::EndpointNotFound.is_status(404));
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());

        let status = |actual| Error::UnexpectedResponseCode {
            method: "GET".to_string(),
            url: String::new(),
            expected: vec![200],
            actual,
            body: String::new(),
        };
        assert!(status(429).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(500).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!Error::missing_input("x").is_retryable());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
