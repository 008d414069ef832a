//! Bitmap text drawn with the embedded 8×8 font.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};

/// Side of one glyph cell before scaling.
pub const GLYPH_SIZE: u32 = 8;

/// Bitmap rows for `c`; characters the font lacks render as `?`.
pub fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Width in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Paints `text` with its top-left corner at `(x, y)`, each font pixel
/// becoming a `scale × scale` block. Pixels outside the image are clipped.
pub fn draw_text(img: &mut RgbaImage, text: &str, x: i64, y: i64, scale: u32, color: Rgba<u8>) {
    let step = i64::from(GLYPH_SIZE * scale);
    let scale = i64::from(scale);
    let (width, height) = (i64::from(img.width()), i64::from(img.height()));

    for (i, c) in text.chars().enumerate() {
        let origin_x = x + i as i64 * step;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..8 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let bx = origin_x + col as i64 * scale;
                let by = y + row as i64 * scale;
                for py in by.max(0)..(by + scale).min(height) {
                    for px in bx.max(0)..(bx + scale).min(width) {
                        img.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_glyph_falls_back() {
        assert_eq!(glyph('\u{2603}'), glyph('?'));
        assert_ne!(glyph('A'), [0; 8]);
        assert_eq!(glyph(' '), [0; 8]);
        assert_ne!(glyph('é'), glyph('?'));
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("Scan Me", 2), 7 * 16);
        assert_eq!(text_width("", 3), 0);
    }

    #[test]
    fn test_draw_stays_in_box() {
        let mut img = RgbaImage::from_pixel(100, 40, Rgba([255, 255, 255, 255]));
        draw_text(&mut img, "Hi", 10, 5, 2, Rgba([0, 0, 0, 255]));
        let mut painted = 0;
        for (x, y, px) in img.enumerate_pixels() {
            if px[0] == 0 {
                painted += 1;
                assert!((10..10 + 32).contains(&x) && (5..5 + 16).contains(&y));
            }
        }
        assert!(painted > 0);
    }

    #[test]
    fn test_draw_clips_offscreen() {
        let mut img = RgbaImage::new(8, 8);
        draw_text(&mut img, "WWWW", -20, -4, 3, Rgba([1, 2, 3, 255]));
        draw_text(&mut img, "W", 100, 100, 3, Rgba([1, 2, 3, 255]));
    }
}
