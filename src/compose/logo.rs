//! Pass B: centre a logo on a protective patch.

use image::imageops::{self, FilterType};
use image::{GrayImage, Rgba, RgbaImage};

use crate::color::Color;
use crate::raster::{RasterImage, UNCOVERED};
use crate::error::RenderError;

/// Canvas width the patch padding is specified against.
const REFERENCE_WIDTH: u32 = 512;
/// Patch padding at the reference width.
const REFERENCE_PADDING: u32 = 4;

/// Where the logo and its patch land on the canvas.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LogoPlacement {
    pub side: u32,
    pub x: u32,
    pub y: u32,
    pub padding: u32,
}

impl LogoPlacement {
    /// `side = floor(width * percent / 100)`, centred on a `width × height` canvas.
    pub fn compute(width: u32, height: u32, percent: u32) -> Self {
        let side = (u64::from(width) * u64::from(percent) / 100) as u32;
        let side = side.min(width).min(height);
        let padding = ((REFERENCE_PADDING * width) as f32 / REFERENCE_WIDTH as f32)
            .round()
            .max(1.0) as u32;
        Self {
            side,
            x: (width - side) / 2,
            y: (height - side) / 2,
            padding,
        }
    }

    /// Patch rectangle `(x, y, w, h)` clipped to the canvas.
    fn patch(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let x0 = self.x.saturating_sub(self.padding);
        let y0 = self.y.saturating_sub(self.padding);
        let x1 = (self.x + self.side + self.padding).min(width);
        let y1 = (self.y + self.side + self.padding).min(height);
        (x0, y0, x1 - x0, y1 - y0)
    }
}

/// Decodes PNG or JPEG logo bytes.
pub fn decode_logo(bytes: &[u8]) -> Result<RgbaImage, RenderError> {
    if bytes.is_empty() {
        return Err(RenderError::LogoDecodeFailed("logo image is empty".into()));
    }
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|err| RenderError::LogoDecodeFailed(err.to_string()))
}

/// Paints an opaque `patch` square slightly larger than the logo, then draws
/// `logo` scaled to `percent` of the canvas width in its centre.
///
/// The patch and logo are no longer part of the dark-module coverage.
pub fn apply_logo(raster: &RasterImage, logo: &RgbaImage, percent: u32, patch: Color) -> RasterImage {
    let (width, height) = raster.dimensions();
    let placement = LogoPlacement::compute(width, height, percent);
    let mut pixels = raster.pixels().clone();
    let mut mask: GrayImage = raster.foreground_mask().clone();

    let (px, py, pw, ph) = placement.patch(width, height);
    let fill: Rgba<u8> = patch.opaque().to_rgba();
    for y in py..py + ph {
        for x in px..px + pw {
            pixels.put_pixel(x, y, fill);
            mask.put_pixel(x, y, UNCOVERED);
        }
    }

    if placement.side > 0 && logo.width() > 0 && logo.height() > 0 {
        let scaled = imageops::resize(logo, placement.side, placement.side, FilterType::Lanczos3);
        imageops::overlay(&mut pixels, &scaled, i64::from(placement.x), i64::from(placement.y));
    }

    tracing::debug!(
        side = placement.side,
        x = placement.x,
        y = placement.y,
        padding = placement.padding,
        "Placed logo"
    );
    RasterImage::new(pixels, mask, raster.target_size())
}
