//! Error types for gallery-report

use thiserror::Error;

use crate::alert::{Alert, Severity};

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Main error type for report export
#[derive(Error, Debug)]
pub enum ReportError {
    /// Nothing is both selected and visible
    #[error("No visible items are selected")]
    SelectionEmpty,

    /// More items selected than the configured ceiling allows
    #[error("Selected {actual} items but the limit is {limit}")]
    LimitExceeded { limit: usize, actual: usize },

    /// An image or mask could not be fetched or decoded
    #[error("Could not load asset {url}: {message}")]
    AssetLoad { url: String, message: String },

    /// Any other failure; aborts the whole job
    #[error("Report generation failed: {0}")]
    JobFailure(String),
}

impl ReportError {
    /// Map the error to a user-facing alert.
    pub fn to_alert(&self) -> Alert {
        match self {
            ReportError::SelectionEmpty => Alert::new(
                "Nothing to export",
                "Select at least one visible item before generating a report.",
                Severity::Warning,
            ),
            ReportError::LimitExceeded { limit, actual } => Alert::new(
                "Too many items",
                format!(
                    "A report can hold at most {} items; {} are selected. Narrow the selection and try again.",
                    limit, actual
                ),
                Severity::Warning,
            ),
            ReportError::AssetLoad { url, .. } => Alert::new(
                "Image unavailable",
                format!("Could not load {}.", url),
                Severity::Warning,
            ),
            ReportError::JobFailure(_) => Alert::new(
                "Report failed",
                "Something went wrong while generating the report. Please try again.",
                Severity::Error,
            ),
        }
    }
}

/// Errors from the item record store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Malformed record data: {0}")]
    Parse(String),

    #[error("Store request failed: {0}")]
    Request(String),
}

/// Errors from fetching or decoding one image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Errors from loading report configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<SourceError> for ReportError {
    fn from(err: SourceError) -> Self {
        ReportError::JobFailure(err.to_string())
    }
}

impl From<ConfigError> for ReportError {
    fn from(err: ConfigError) -> Self {
        ReportError::JobFailure(err.to_string())
    }
}

impl From<image::ImageError> for AssetError {
    fn from(err: image::ImageError) -> Self {
        AssetError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::Fetch(err.to_string())
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}
