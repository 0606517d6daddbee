//! Error types for the text metrics crate.

use thiserror::Error;

/// Errors that can occur while measuring text.
#[derive(Error, Debug)]
pub enum MeasureError {
    /// A request asked for a measurement mode this crate does not implement.
    #[error("unsupported measurement mode: {0}")]
    UnsupportedMode(String),

    /// A font description string could not be interpreted by the backend.
    #[error("invalid font string {font:?}: {reason}")]
    InvalidFontString { font: String, reason: String },

    /// The glyph-measurement primitive failed.
    #[error("glyph measurement failed: {0}")]
    Primitive(String),

    /// A wire request could not be decoded.
    #[error("invalid measurement request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error while reading configuration or fonts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The measurement worker has been stopped.
    #[error("measurement worker is not running")]
    WorkerStopped,
}

impl MeasureError {
    /// Build an [`MeasureError::InvalidFontString`].
    pub fn invalid_font(font: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFontString {
            font: font.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for measurement operations.
pub type MeasureResult<T> = Result<T, MeasureError>;
