//! Custom error types for the analysis pipeline.
//!
//! Every stage maps its failures onto one [`AnalysisError`] kind so the CLI
//! can print a single human-readable message and exit non-zero.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input file (or a discoverable input in a directory) does not exist.
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input exists but cannot be read as a supported tabular format.
    #[error("Unsupported or unreadable file '{}': {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    /// Column layout is malformed (duplicate or blank header names).
    #[error("Schema error: {0}")]
    Schema(String),

    /// A chart could not be rendered or its output location is not writable.
    #[error("Failed to render chart '{}': {reason}", path.display())]
    Render { path: PathBuf, reason: String },

    /// The report could not be written.
    #[error("Failed to write report '{}': {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Failure inside a polars or plotters helper without a more specific kind.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The error under any context layers.
    pub fn root_cause(&self) -> &AnalysisError {
        match self {
            Self::WithContext { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Stable code for the error kind, used in logs and JSON output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::Render { .. } => "RENDER_ERROR",
            Self::Write { .. } => "WRITE_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    pub(crate) fn render(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Render {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<anyhow::Error> for AnalysisError {
    fn from(error: anyhow::Error) -> Self {
        // keep a typed error when the helper just passed one through
        match error.downcast::<polars::error::PolarsError>() {
            Ok(polars_error) => AnalysisError::Polars(polars_error),
            Err(other) => AnalysisError::Internal(format!("{other:#}")),
        }
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}
