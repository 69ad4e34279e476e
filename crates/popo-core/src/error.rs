//! Error types for the bulletin service.

use crate::record::FieldName;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Acquisition errors
    #[error("Browser session unavailable: {0}")]
    SessionUnavailable(String),

    #[error("No bulletin article found for {0}")]
    ArticleNotFound(NaiveDate),

    #[error("Full report not found")]
    FullReportNotFound,

    #[error("Could not find {0} data")]
    FieldNotFound(FieldName),

    #[error("Could not recognize {field} data: {detail}")]
    FieldNotRecognized { field: FieldName, detail: String },

    // Browsing errors
    #[error("Element not found: {locator}")]
    ElementNotFound { locator: String },

    #[error("Element is not a link")]
    NotALink,

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Unknown browsing context: {0}")]
    UnknownContext(String),

    // Request errors
    #[error("Deadline exceeded while acquiring bulletin for {date}")]
    DeadlineExceeded { date: NaiveDate },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    // Infrastructure errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
