//! Custom error types for rustpubmed.
//!
//! Every fallible library call returns `Result<T, PubmedError>`. Problems with a
//! single record are not errors; they surface as [`crate::projector::SkipReason`].

use thiserror::Error;

/// Main error type for rustpubmed operations.
#[derive(Debug, Error)]
pub enum PubmedError {
    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// E-utilities answered with a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from API
        message: String,
    },

    /// Malformed JSON or XML response body
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet writer error
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Every attempt of a retried operation failed
    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetryExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        last_error: Box<PubmedError>,
    },
}

impl PubmedError {
    /// True for transport-level failures (connect, timeout, interrupted body).
    pub fn is_network(&self) -> bool {
        matches!(self, PubmedError::Network(_))
    }
}

/// Result type alias using `PubmedError`
pub type Result<T> = std::result::Result<T, PubmedError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| PubmedError::Parse(msg.to_string()))
    }
}
