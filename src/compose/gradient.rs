//! Pass A: recolor the dark modules with a two-stop gradient.

use image::{GrayImage, RgbaImage};

use crate::color::Color;
use crate::config::{Gradient, GradientKind};
use crate::raster::RasterImage;

/// Gradient color at pixel `(x, y)` of a `width × height` canvas.
///
/// Linear gradients run along the diagonal from the top-left to the
/// bottom-right corner; radial gradients start at the centre and reach the
/// end color at half the shorter side.
pub fn gradient_color(gradient: &Gradient, x: u32, y: u32, width: u32, height: u32) -> Color {
    let (w, h) = (width as f32, height as f32);
    let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
    let t = match gradient.kind {
        GradientKind::Linear => {
            let len_sq = w * w + h * h;
            if len_sq == 0.0 { 0.0 } else { (px * w + py * h) / len_sq }
        }
        GradientKind::Radial => {
            let radius = w.min(h) / 2.0;
            let (dx, dy) = (px - w / 2.0, py - h / 2.0);
            if radius == 0.0 { 0.0 } else { (dx * dx + dy * dy).sqrt() / radius }
        }
    };
    gradient.color_start.lerp(gradient.color_end, t)
}

/// Source-over compositing of straight-alpha colors.
pub(crate) fn over(src: Color, dst: Color) -> Color {
    let sa = f32::from(src.a) / 255.0;
    let da = f32::from(dst.a) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Color::TRANSPARENT;
    }
    let mix = |s: u8, d: u8| -> u8 {
        ((f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a).round() as u8
    };
    Color::rgba(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        (out_a * 255.0).round() as u8,
    )
}

/// Fills the foreground silhouette with `gradient`, leaving every other pixel
/// as `background`.
///
/// The coverage mask acts as the alpha of the gradient layer. The background
/// is composited underneath only afterwards, so it can never overwrite a
/// gradient pixel; pass [`Color::TRANSPARENT`] to keep the background clear.
pub fn apply_gradient(raster: &RasterImage, gradient: &Gradient, background: Color) -> RasterImage {
    let (width, height) = raster.dimensions();
    let mask = raster.foreground_mask();
    let mut pixels = RgbaImage::new(width, height);

    for (x, y, pixel) in pixels.enumerate_pixels_mut() {
        let coverage = f32::from(mask.get_pixel(x, y)[0]) / 255.0;
        let mut layer = gradient_color(gradient, x, y, width, height);
        layer.a = (f32::from(layer.a) * coverage).round() as u8;
        *pixel = over(layer, background).to_rgba();
    }

    let mask: GrayImage = mask.clone();
    RasterImage::new(pixels, mask, raster.target_size())
}
