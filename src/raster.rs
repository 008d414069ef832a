//! The base rasterizer and the raster value every later stage consumes.

use image::{GrayImage, Luma, RgbaImage};

use crate::color::Color;
use crate::config::{ModuleShape, QrConfig};
use crate::encoder::BitMatrix;
use crate::error::RenderError;

/// Mask value for a pixel covered by a dark module.
pub const COVERED: Luma<u8> = Luma([255]);
pub const UNCOVERED: Luma<u8> = Luma([0]);

/// An RGBA pixel grid plus the coverage mask of the dark modules it shows.
///
/// Stages never mutate a raster they were given; each returns a new one.
#[derive(Clone, PartialEq, Debug)]
pub struct RasterImage {
    pixels: RgbaImage,
    foreground: GrayImage,
    target_size: u32,
}

impl RasterImage {
    /// # Panics
    ///
    /// Panics if the mask and the pixels differ in size.
    pub fn new(pixels: RgbaImage, foreground: GrayImage, target_size: u32) -> Self {
        assert_eq!(pixels.dimensions(), foreground.dimensions(), "Mask must match pixel grid");
        Self {
            pixels,
            foreground,
            target_size,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// The side length requested by the configuration that produced this raster.
    pub fn target_size(&self) -> u32 {
        self.target_size
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Coverage of the dark modules: 255 where a module was painted, 0 elsewhere.
    pub fn foreground_mask(&self) -> &GrayImage {
        &self.foreground
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        Color::from(*self.pixels.get_pixel(x, y))
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.foreground.get_pixel(x, y)[0] > 0
    }

    pub fn into_parts(self) -> (RgbaImage, GrayImage, u32) {
        (self.pixels, self.foreground, self.target_size)
    }
}

/// Pixel geometry of a rasterized matrix.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Layout {
    /// Pixels per module.
    pub cell: u32,
    /// Offset of the first module from the canvas edge, on both axes.
    pub offset: u32,
    /// Matrix side in modules.
    pub side: u32,
}

impl Layout {
    /// Fits `side` modules plus `margin` quiet-zone modules on each side into
    /// a `target` pixel square, centring the code.
    pub fn compute(side: usize, margin: u32, target: u32) -> Result<Self, RenderError> {
        if side == 0 {
            return Err(RenderError::InvalidDimensions("matrix side is zero".into()));
        }
        if target == 0 {
            return Err(RenderError::InvalidDimensions("target size is zero".into()));
        }
        let side = u32::try_from(side)
            .map_err(|_| RenderError::InvalidDimensions(format!("matrix side {side} too large")))?;
        let total = side + 2 * margin;
        let cell = target / total;
        if cell == 0 {
            return Err(RenderError::InvalidDimensions(format!(
                "{total} modules do not fit in {target}px"
            )));
        }
        let offset = (target - side * cell) / 2;
        Ok(Self { cell, offset, side })
    }

    /// Module coordinates and in-cell pixel position for canvas pixel `(x, y)`.
    fn locate(&self, x: u32, y: u32) -> Option<(usize, usize, u32, u32)> {
        let span = self.side * self.cell;
        let qx = x.checked_sub(self.offset).filter(|&v| v < span)?;
        let qy = y.checked_sub(self.offset).filter(|&v| v < span)?;
        Some((
            (qx / self.cell) as usize,
            (qy / self.cell) as usize,
            qx % self.cell,
            qy % self.cell,
        ))
    }
}

/// Whether the pixel at `(px, py)` inside a `cell`-sized module is painted for `shape`.
///
/// Coverage is sampled at the pixel centre. Every shape covers the centre of
/// the cell, so a dark module always paints at least one pixel.
pub fn shape_covers(shape: ModuleShape, px: u32, py: u32, cell: u32, corner_radius: u32) -> bool {
    let c = cell as f32;
    let x = px as f32 + 0.5;
    let y = py as f32 + 0.5;
    match shape {
        ModuleShape::Square => true,
        ModuleShape::Dots => {
            let r = c / 2.0;
            let (dx, dy) = (x - r, y - r);
            dx * dx + dy * dy <= r * r
        }
        ModuleShape::Rounded => {
            let r = c * corner_radius as f32 / 40.0;
            if r <= 0.0 {
                return true;
            }
            let dx = (r - x).max(x - (c - r)).max(0.0);
            let dy = (r - y).max(y - (c - r)).max(0.0);
            dx * dx + dy * dy <= r * r
        }
    }
}

/// Renders `matrix` into a `target_size_pixels` square.
///
/// Dark modules are painted with the foreground color in the shape selected
/// by `module_style` (or `eye_style` inside the finder patterns); light modules
/// and the quiet zone get the background color, or alpha 0 when the
/// background is transparent.
///
/// # Errors
///
/// Returns [`RenderError::InvalidDimensions`] if the matrix is empty, the
/// target size is zero, or the modules cannot fit at one pixel each.
pub fn rasterize(matrix: &BitMatrix, config: &QrConfig) -> Result<RasterImage, RenderError> {
    let target = config.target_size_pixels;
    let layout = Layout::compute(matrix.side(), config.margin, target)?;
    let foreground = config.foreground_color.to_rgba();
    let background = config.effective_background().to_rgba();

    let mut img = RgbaImage::new(target, target);
    let mut mask = GrayImage::new(target, target);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dark = match layout.locate(x, y) {
            Some((mx, my, px, py)) if matrix.get(mx, my) => {
                let shape = if matrix.is_finder(mx, my) {
                    config.eye_style
                } else {
                    config.module_style
                };
                shape_covers(shape, px, py, layout.cell, config.corner_radius)
            }
            _ => false,
        };
        if dark {
            *pixel = foreground;
            mask.put_pixel(x, y, COVERED);
        } else {
            *pixel = background;
        }
    }

    tracing::debug!(
        side = matrix.side(),
        cell = layout.cell,
        offset = layout.offset,
        target,
        "Rasterized matrix"
    );
    Ok(RasterImage::new(img, mask, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorCorrection;
    use crate::encoder::encode;

    fn checker(side: usize) -> BitMatrix {
        let modules = (0..side * side).map(|i| (i % side + i / side) % 2 == 0).collect();
        BitMatrix::from_modules(side, modules)
    }

    #[test]
    fn test_side_equals_target() {
        let matrix = encode("https://example.com", ErrorCorrection::M).unwrap();
        for target in [256, 300, 512, 777, 1024] {
            let config = QrConfig {
                target_size_pixels: target,
                ..QrConfig::new("https://example.com")
            };
            let raster = rasterize(&matrix, &config).unwrap();
            assert_eq!(raster.dimensions(), (target, target));
            assert_eq!(raster.target_size(), target);
        }
    }

    #[test]
    fn test_colors_and_mask_agree() {
        let matrix = encode("HELLO WORLD", ErrorCorrection::L).unwrap();
        let raster = rasterize(&matrix, &QrConfig::new("HELLO WORLD")).unwrap();
        for (x, y, px) in raster.pixels().enumerate_pixels() {
            let expected = if raster.is_foreground(x, y) { Color::BLACK } else { Color::WHITE };
            assert_eq!(Color::from(*px), expected);
        }
    }

    #[test]
    fn test_quiet_zone_is_background() {
        let matrix = encode("HELLO WORLD", ErrorCorrection::L).unwrap();
        let config = QrConfig { margin: 4, ..QrConfig::new("HELLO WORLD") };
        let raster = rasterize(&matrix, &config).unwrap();
        let layout = Layout::compute(matrix.side(), 4, 512).unwrap();
        assert!(layout.offset >= 4 * layout.cell);
        for i in 0..layout.offset {
            assert!(!raster.is_foreground(i, i));
            assert!(!raster.is_foreground(511 - i, 256));
        }
    }

    #[test]
    fn test_transparent_background() {
        let matrix = checker(21);
        let config = QrConfig {
            transparent_background: true,
            ..QrConfig::new("x")
        };
        let raster = rasterize(&matrix, &config).unwrap();
        assert_eq!(raster.pixel(0, 0).a, 0);
        let covered = raster
            .pixels()
            .enumerate_pixels()
            .filter(|(x, y, _)| raster.is_foreground(*x, *y))
            .all(|(_, _, px)| px[3] == 255);
        assert!(covered);
    }

    #[test]
    fn test_shapes_keep_dark_cells() {
        let matrix = checker(25);
        for shape in [ModuleShape::Square, ModuleShape::Dots, ModuleShape::Rounded] {
            let config = QrConfig {
                module_style: shape,
                eye_style: shape,
                corner_radius: 20,
                ..QrConfig::new("x")
            };
            let raster = rasterize(&matrix, &config).unwrap();
            let layout = Layout::compute(25, config.margin, 512).unwrap();
            for my in 0..25u32 {
                for mx in 0..25u32 {
                    let cx = layout.offset + mx * layout.cell + layout.cell / 2;
                    let cy = layout.offset + my * layout.cell + layout.cell / 2;
                    assert_eq!(
                        raster.is_foreground(cx, cy),
                        matrix.get(mx as usize, my as usize),
                        "{shape:?} at module ({mx}, {my})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_dots_paint_less_than_squares() {
        let matrix = checker(21);
        let count = |shape| {
            let config = QrConfig { module_style: shape, eye_style: shape, ..QrConfig::new("x") };
            let raster = rasterize(&matrix, &config).unwrap();
            raster.foreground_mask().pixels().filter(|p| p[0] > 0).count()
        };
        assert!(count(ModuleShape::Dots) < count(ModuleShape::Square));
    }

    #[test]
    fn test_rounded_corner_pixel() {
        assert!(shape_covers(ModuleShape::Rounded, 0, 0, 20, 0));
        assert!(!shape_covers(ModuleShape::Rounded, 0, 0, 20, 20));
        assert!(shape_covers(ModuleShape::Rounded, 10, 0, 20, 20));
        assert!(!shape_covers(ModuleShape::Dots, 0, 0, 20, 0));
    }

    #[test]
    fn test_invalid_dimensions() {
        let empty = BitMatrix::from_modules(0, Vec::new());
        assert!(matches!(
            rasterize(&empty, &QrConfig::new("x")),
            Err(RenderError::InvalidDimensions(_))
        ));
        let config = QrConfig { target_size_pixels: 0, ..QrConfig::new("x") };
        assert!(matches!(
            rasterize(&checker(21), &config),
            Err(RenderError::InvalidDimensions(_))
        ));
        assert!(Layout::compute(177, 10, 100).is_err());
    }
}
