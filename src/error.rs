//! Error types for every stage of the rendering and export pipeline.
//!
//! Each component owns a small enum so callers can match on the stage that
//! failed; [`Error`] wraps them all for code that drives the whole pipeline.

use thiserror::Error;

/// Failures of the encoder adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Content is empty")]
    EmptyContent,

    #[error("Content does not fit in a QR code at error correction level {level}")]
    PayloadTooLarge { level: char },
}

/// Failures while rasterizing or compositing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Failed to decode logo image: {0}")]
    LogoDecodeFailed(String),
}

/// Failures while serializing a raster into an artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

/// Failures while importing a history file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Malformed history JSON: {0}")]
    MalformedJson(String),

    #[error("History file must contain a JSON array")]
    NotAnArray,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        ExportError::SerializationFailed(err.to_string())
    }
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        ExportError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::SerializationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::MalformedJson(err.to_string())
    }
}
