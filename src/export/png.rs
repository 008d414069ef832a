//! Lossless PNG serialization, the canonical artifact format.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;

use crate::error::ExportError;
use crate::raster::RasterImage;

/// Encodes the raster at its native resolution as RGBA PNG.
pub fn encode_png(raster: &RasterImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    raster
        .pixels()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Wraps PNG bytes in a `data:image/png;base64,` URL.
pub fn data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Rgba, RgbaImage};

    fn fixture() -> RasterImage {
        let mut pixels = RgbaImage::from_pixel(4, 3, Rgba([255, 255, 255, 255]));
        pixels.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        pixels.put_pixel(2, 2, Rgba([10, 20, 30, 0]));
        RasterImage::new(pixels, GrayImage::new(4, 3), 4)
    }

    #[test]
    fn test_lossless() {
        let raster = fixture();
        let bytes = encode_png(&raster).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(&decoded, raster.pixels());
    }

    #[test]
    fn test_data_url() {
        assert_eq!(data_url(b"abc"), "data:image/png;base64,YWJj");
    }
}
