//! The synchronous render pipeline:
//! config → encoder → rasterizer → compositor → export encoder.

use image::RgbaImage;

use crate::compose;
use crate::config::QrConfig;
use crate::encoder::encode;
use crate::error::Result;
use crate::export::{self, Artifact, ExportFormat};
use crate::raster::{rasterize, RasterImage};

/// Renders the final composited raster for `config`, decoding any logo inline.
///
/// # Errors
///
/// Any encoding or render failure is returned; a failed render never yields
/// a blank image.
pub fn render(config: &QrConfig) -> Result<RasterImage> {
    let config = config.normalized();
    let base = render_base(&config)?;
    Ok(compose::compose(&base, &config)?)
}

/// Like [`render`], with the logo already decoded by the caller.
pub fn render_with_logo(config: &QrConfig, logo: Option<&RgbaImage>) -> Result<RasterImage> {
    let config = config.normalized();
    let base = render_base(&config)?;
    Ok(compose::compose_with_logo(&base, &config, logo)?)
}

fn render_base(config: &QrConfig) -> Result<RasterImage> {
    config.check_target_size()?;
    let matrix = encode(&config.content, config.error_correction)?;
    let raster = rasterize(&matrix, config)?;
    tracing::debug!(
        kind = config.content_kind.label(),
        level = %config.error_correction,
        side = matrix.side(),
        "Rendered base raster"
    );
    Ok(raster)
}

/// Renders `config` and exports it in `format`.
pub fn generate(config: &QrConfig, format: ExportFormat) -> Result<Artifact> {
    let raster = render(config)?;
    Ok(export::export(&raster, config, format)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::compose::gradient::gradient_color;
    use crate::compose::label::LabelMetrics;
    use crate::compose::logo::LogoPlacement;
    use crate::config::{ErrorCorrection, Gradient, GradientKind, Logo};
    use crate::error::{EncodingError, Error, RenderError};
    use image::Rgba;
    use std::io::Cursor;

    fn example() -> QrConfig {
        QrConfig {
            error_correction: ErrorCorrection::M,
            target_size_pixels: 512,
            ..QrConfig::new("https://example.com")
        }
    }

    #[test]
    fn test_plain_scenario() {
        let artifact = generate(&example(), ExportFormat::Png).unwrap();
        let img = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (512, 512));
        let mut seen_black = false;
        for px in img.pixels() {
            assert_eq!(px[3], 255);
            match px.0 {
                [0, 0, 0, 255] => seen_black = true,
                [255, 255, 255, 255] => {}
                other => panic!("unexpected pixel {other:?}"),
            }
        }
        assert!(seen_black);
    }

    #[test]
    fn test_same_config_same_png() {
        let config = QrConfig {
            gradient: Some(Gradient::default()),
            label: Some("Scan Me".into()),
            ..example()
        };
        let a = crate::export::png::encode_png(&render(&config).unwrap()).unwrap();
        let b = crate::export::png::encode_png(&render(&config).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gradient_scenario() {
        let flat = render(&example()).unwrap();
        let gradient = Gradient {
            kind: GradientKind::Linear,
            color_start: "#3b82f6".parse().unwrap(),
            color_end: "#8b5cf6".parse().unwrap(),
        };
        let config = QrConfig { gradient: Some(gradient), ..example() };
        let styled = render(&config).unwrap();

        for (x, y, px) in flat.pixels().enumerate_pixels() {
            let out = styled.pixel(x, y);
            if flat.is_foreground(x, y) {
                assert_eq!(out, gradient_color(&gradient, x, y, 512, 512));
            } else {
                assert_eq!(Color::from(*px), out);
            }
        }
    }

    #[test]
    fn test_label_scenario() {
        let plain = render(&example()).unwrap();
        let config = QrConfig { label: Some("Scan Me".into()), ..example() };
        let labelled = render(&config).unwrap();
        let metrics = LabelMetrics::for_target(512);
        assert_eq!(labelled.height(), 512 + metrics.padding + metrics.font_size);
        for (x, y, px) in plain.pixels().enumerate_pixels() {
            assert_eq!(labelled.pixels().get_pixel(x, y), px);
        }
        let band_has_ink = (512..labelled.height())
            .any(|y| (0..512).any(|x| labelled.pixel(x, y) == Color::BLACK));
        assert!(band_has_ink);
    }

    #[test]
    fn test_logo_scenario() {
        let logo = RgbaImage::from_pixel(20, 20, Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        logo.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
        let config = QrConfig {
            error_correction: ErrorCorrection::H,
            logo: Some(Logo::new(bytes, 25)),
            ..example()
        };
        let out = render(&config).unwrap();
        let p = LogoPlacement::compute(512, 512, 25);
        assert_eq!(p.side, 128);
        assert!(p.x + p.side <= 512 && p.y + p.side <= 512);
        assert_eq!(p.x, (512 - p.side) / 2);
        let centre = out.pixel(256, 256);
        assert!(centre.r > 200 && centre.g < 50);

        let decoded = crate::compose::logo::decode_logo(&config.logo.as_ref().unwrap().image_bytes).unwrap();
        assert_eq!(render_with_logo(&config, Some(&decoded)).unwrap(), out);
    }

    #[test]
    fn test_every_size_matches_target() {
        for level in [ErrorCorrection::L, ErrorCorrection::M, ErrorCorrection::Q, ErrorCorrection::H] {
            for size in [256, 333, 1000, 2048] {
                let config = QrConfig {
                    error_correction: level,
                    target_size_pixels: size,
                    ..QrConfig::new("The quick brown fox jumps over the lazy dog")
                };
                assert_eq!(render(&config).unwrap().dimensions(), (size, size));
            }
        }
    }

    #[test]
    fn test_failures_are_labelled() {
        assert!(matches!(
            render(&QrConfig::new("  ")),
            Err(Error::Encoding(EncodingError::EmptyContent))
        ));
        let tiny = QrConfig { target_size_pixels: 64, ..example() };
        assert!(matches!(
            render(&tiny),
            Err(Error::Render(RenderError::InvalidDimensions(_)))
        ));
        let bad_logo = QrConfig { logo: Some(Logo::new(vec![0; 10], 20)), ..example() };
        assert!(matches!(
            generate(&bad_logo, ExportFormat::Svg),
            Err(Error::Render(RenderError::LogoDecodeFailed(_)))
        ));
    }
}
