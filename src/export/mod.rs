//! The export encoder.
//!
//! Every format is derived from one composited [`RasterImage`]: PNG is the
//! canonical lossless encoding, SVG embeds that PNG, and PDF places the same
//! pixels on an A4 page. No format re-renders the code itself.

pub mod pdf;
pub mod png;
pub mod svg;

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::QrConfig;
use crate::error::ExportError;
use crate::raster::RasterImage;

/// Formats a user can ask for.
///
/// `Eps` is recognised so that requests for it fail with
/// [`ExportError::UnsupportedFormat`] instead of a parse error.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
    Pdf,
    Eps,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Eps => "eps",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Eps => "application/postscript",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            "pdf" => Ok(ExportFormat::Pdf),
            "eps" => Ok(ExportFormat::Eps),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// The exported bytes together with how they should be delivered.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("filename", &self.filename)
            .field("mime", &self.mime)
            .finish()
    }
}

/// `qr-code-<unixTimestampMillis>.<ext>`
pub fn artifact_filename(format: ExportFormat, at: DateTime<Utc>) -> String {
    format!("qr-code-{}.{}", at.timestamp_millis(), format.extension())
}

/// Serializes `raster` in `format`, stamped with the current time.
pub fn export(raster: &RasterImage, config: &QrConfig, format: ExportFormat) -> Result<Artifact, ExportError> {
    export_at(raster, config, format, Utc::now())
}

/// Serializes `raster` in `format`, using `at` for the filename and any
/// timestamp written into the document.
///
/// # Errors
///
/// - [`ExportError::UnsupportedFormat`] for [`ExportFormat::Eps`].
/// - [`ExportError::SerializationFailed`] if an encoder fails.
pub fn export_at(
    raster: &RasterImage,
    config: &QrConfig,
    format: ExportFormat,
    at: DateTime<Utc>,
) -> Result<Artifact, ExportError> {
    let bytes = match format {
        ExportFormat::Png => png::encode_png(raster)?,
        ExportFormat::Svg => svg::to_svg_string(raster, config)?.into_bytes(),
        ExportFormat::Pdf => pdf::to_pdf_bytes(raster, config, at)?,
        ExportFormat::Eps => {
            return Err(ExportError::UnsupportedFormat(format.extension().to_string()));
        }
    };
    let artifact = Artifact {
        bytes,
        filename: artifact_filename(format, at),
        mime: format.mime(),
    };
    tracing::info!(
        format = %format,
        filename = %artifact.filename,
        size = artifact.bytes.len(),
        "Exported artifact"
    );
    Ok(artifact)
}
