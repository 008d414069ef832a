//! Adapter over the external QR encoder.
//!
//! Turns a content string into a [`BitMatrix`]: a square grid of dark and
//! light modules whose side is `4 * version + 17`. Everything downstream
//! works from this matrix alone.

use qrcode::{types::Color as Module, EcLevel, QrCode};

use crate::config::ErrorCorrection;
use crate::error::EncodingError;

/// Width of a finder pattern, in modules.
pub const FINDER_SIZE: usize = 7;

/// A square grid of modules (`true` = dark), immutable once built.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BitMatrix {
    side: usize,
    modules: Vec<bool>,
}

impl BitMatrix {
    /// Builds a matrix from row-major modules.
    ///
    /// # Panics
    ///
    /// Panics if `modules.len()` is not `side * side`.
    pub fn from_modules(side: usize, modules: Vec<bool>) -> Self {
        assert_eq!(modules.len(), side * side, "Module count must be side squared");
        Self { side, modules }
    }

    /// The width and height of this matrix, measured in modules.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Returns the color of the module at the given coordinates; `false` outside the matrix.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.side && y < self.side && self.modules[y * self.side + x]
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }

    /// Whether the cell belongs to one of the three finder patterns (the "eyes").
    pub fn is_finder(&self, x: usize, y: usize) -> bool {
        if self.side < FINDER_SIZE {
            return false;
        }
        let far = self.side - FINDER_SIZE;
        (x < FINDER_SIZE && y < FINDER_SIZE)
            || (x >= far && y < FINDER_SIZE)
            || (x < FINDER_SIZE && y >= far)
    }
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// Encodes `content` at the given error correction level.
///
/// The encoder picks the smallest version that fits; callers must not assume
/// a fixed matrix size.
///
/// # Errors
///
/// - [`EncodingError::EmptyContent`] if `content` is empty or whitespace only.
/// - [`EncodingError::PayloadTooLarge`] if the encoder rejects the content.
///
/// # Example
///
/// ```rust
/// use qr_studio::{config::ErrorCorrection, encoder::encode};
///
/// let matrix = encode("https://example.com", ErrorCorrection::M).unwrap();
/// assert_eq!((matrix.side() - 17) % 4, 0);
/// ```
pub fn encode(content: &str, level: ErrorCorrection) -> Result<BitMatrix, EncodingError> {
    if content.trim().is_empty() {
        return Err(EncodingError::EmptyContent);
    }
    let code = QrCode::with_error_correction_level(content.as_bytes(), level.into()).map_err(|err| {
        tracing::debug!(error = %err, level = %level, "Encoder rejected content");
        EncodingError::PayloadTooLarge { level: level.as_char() }
    })?;
    let side = code.width();
    let modules = code.to_colors().into_iter().map(|m| m == Module::Dark).collect();
    Ok(BitMatrix::from_modules(side, modules))
}
