//! Pass C: append a caption band under the code.

use image::imageops;
use image::{GrayImage, RgbaImage};

use super::font::{draw_text, text_width, GLYPH_SIZE};
use crate::color::Color;
use crate::raster::RasterImage;

/// Fixed part of the band height.
pub const BASE_PADDING: u32 = 40;
/// Smallest label font size, in pixels.
pub const MIN_FONT_SIZE: u32 = 16;

/// Band geometry for a given target size.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LabelMetrics {
    pub padding: u32,
    pub font_size: u32,
}

impl LabelMetrics {
    /// `font_size = max(16, target / 25)`.
    pub fn for_target(target: u32) -> Self {
        Self {
            padding: BASE_PADDING,
            font_size: MIN_FONT_SIZE.max(target / 25),
        }
    }

    /// Height added below the code.
    pub fn extra_height(&self) -> u32 {
        self.padding + self.font_size
    }

    /// Integer magnification applied to the 8×8 glyphs, rounded to the
    /// nearest step so drawn text is within 4px of `font_size`.
    pub fn glyph_scale(&self) -> u32 {
        ((self.font_size + GLYPH_SIZE / 2) / GLYPH_SIZE).max(1)
    }
}

/// Returns a taller raster with `text` centred in a new band at the bottom.
///
/// The whole canvas is filled with `background` first and the previous image
/// is copied over the top rows unchanged, so there is no seam between the
/// code and the band.
pub fn apply_label(raster: &RasterImage, text: &str, color: Color, background: Color) -> RasterImage {
    let (width, height) = raster.dimensions();
    let metrics = LabelMetrics::for_target(raster.target_size());
    let extra = metrics.extra_height();

    let mut pixels = RgbaImage::from_pixel(width, height + extra, background.to_rgba());
    imageops::replace(&mut pixels, raster.pixels(), 0, 0);
    let mut mask = GrayImage::new(width, height + extra);
    imageops::replace(&mut mask, raster.foreground_mask(), 0, 0);

    let scale = metrics.glyph_scale();
    let glyph_height = GLYPH_SIZE * scale;
    let x = (i64::from(width) - i64::from(text_width(text, scale))) / 2;
    let y = i64::from(height) + (i64::from(extra) - i64::from(glyph_height)) / 2;
    draw_text(&mut pixels, text, x, y, scale, color.to_rgba());

    tracing::debug!(label = text, extra, scale, "Appended label band");
    RasterImage::new(pixels, mask, raster.target_size())
}
