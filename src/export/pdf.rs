//! Single-page A4 PDF: title, the raster, optional label, and a metadata block.

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::config::QrConfig;
use crate::error::ExportError;
use crate::raster::RasterImage;

/// Points per millimetre.
const MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
/// Space kept free under the image for the label and metadata.
const TEXT_RESERVE_MM: f32 = 40.0;

const TITLE: &str = "QR Code";
const TITLE_SIZE: f32 = 16.0;
const LABEL_SIZE: f32 = 12.0;
const META_SIZE: f32 = 8.0;
const META_GREY: f32 = 100.0 / 255.0;

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, 556, 556,
    556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722,
    722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722,
    667, 944, 667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556,
    556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500,
    500, 334, 260, 334, 584,
];

/// Approximate width of `text` in points when set in Helvetica at `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => u32::from(HELVETICA_WIDTHS[(code - 32) as usize]),
            _ => 556,
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Maps text onto WinAnsi bytes; anything outside Latin-1 becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (32..=126 | 160..=255) => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Where the image and text bands land on the page, in millimetres from the
/// top-left corner.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PdfLayout {
    pub image_x: f32,
    pub image_y: f32,
    pub image_width: f32,
    pub image_height: f32,
    pub label_y: Option<f32>,
    pub meta_y: f32,
}

impl PdfLayout {
    /// Scales a `width × height` raster to fit the page margins, keeping its
    /// aspect ratio and the text bands below it.
    pub fn compute(width: u32, height: u32, has_label: bool) -> Self {
        let max_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        let max_height = PAGE_HEIGHT_MM - 3.0 * MARGIN_MM - TEXT_RESERVE_MM;
        let scale = (max_width / width.max(1) as f32).min(max_height / height.max(1) as f32);
        let image_width = width as f32 * scale;
        let image_height = height as f32 * scale;
        let image_x = (PAGE_WIDTH_MM - image_width) / 2.0;
        let image_y = MARGIN_MM + 20.0;
        let bottom = image_y + image_height;
        Self {
            image_x,
            image_y,
            image_width,
            image_height,
            label_y: has_label.then_some(bottom + 15.0),
            meta_y: bottom + if has_label { 35.0 } else { 25.0 },
        }
    }
}

fn text_op(font: &str, size: f32, grey: f32, x: f32, y: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), Object::Real(size)]),
        Operation::new("rg", vec![Object::Real(grey), Object::Real(grey), Object::Real(grey)]),
        Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
        Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
        Operation::new("ET", vec![]),
    ]
}

/// Baseline `y` in PDF user space for a distance `mm` from the top of the page.
fn from_top(mm: f32) -> f32 {
    (PAGE_HEIGHT_MM - mm) * MM
}

fn centred(text: &str, size: f32) -> f32 {
    (PAGE_WIDTH_MM * MM - text_width(text, size)) / 2.0
}

/// Builds the metadata lines printed under the image.
pub fn metadata_lines(config: &QrConfig, generated_at: DateTime<Utc>) -> Vec<String> {
    vec![
        format!("Size: {0}x{0}px", config.target_size_pixels),
        format!("Type: {}", config.content_kind.label()),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        format!("Error Correction: {}", config.error_correction),
    ]
}

/// Renders the page and returns the PDF file bytes.
pub fn to_pdf_bytes(
    raster: &RasterImage,
    config: &QrConfig,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let (width, height) = raster.dimensions();
    let label = config.label_text();
    let layout = PdfLayout::compute(width, height, label.is_some());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let pixels = raster.pixels();
    let rgb: Vec<u8> = pixels.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect();
    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8i64,
    };
    if pixels.pixels().any(|p| p[3] != 255) {
        let alpha: Vec<u8> = pixels.pixels().map(|p| p[3]).collect();
        let smask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8i64,
            },
            alpha,
        ));
        image_dict.set("SMask", smask_id);
    }
    let image_id = doc.add_object(Stream::new(image_dict, rgb));

    let mut operations = text_op("F2", TITLE_SIZE, 0.0, centred(TITLE, TITLE_SIZE), from_top(MARGIN_MM), TITLE);

    let image_width = layout.image_width * MM;
    let image_height = layout.image_height * MM;
    operations.extend([
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                Object::Real(image_width),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(image_height),
                Object::Real(layout.image_x * MM),
                Object::Real(from_top(layout.image_y + layout.image_height)),
            ],
        ),
        Operation::new("Do", vec!["Im1".into()]),
        Operation::new("Q", vec![]),
    ]);

    if let (Some(label), Some(label_y)) = (label, layout.label_y) {
        let max_width = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) * MM;
        let natural = text_width(label, LABEL_SIZE);
        let size = if natural > max_width {
            (LABEL_SIZE * max_width / natural).max(4.0)
        } else {
            LABEL_SIZE
        };
        operations.extend(text_op("F1", size, 0.0, centred(label, size), from_top(label_y), label));
    }

    for (i, line) in metadata_lines(config, generated_at).iter().enumerate() {
        let y = from_top(layout.meta_y + 5.0 * i as f32);
        operations.extend(text_op("F1", META_SIZE, META_GREY, MARGIN_MM * MM, y, line));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
            "F2" => bold_id,
        },
        "XObject" => dictionary! {
            "Im1" => image_id,
        },
    });
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1i64,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH_MM * MM),
            Object::Real(PAGE_HEIGHT_MM * MM),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(TITLE),
        "Subject" => Object::string_literal(win_ansi(config.content_kind.label())),
        "Producer" => Object::string_literal(concat!("qr-studio ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(generated_at.format("D:%Y%m%d%H%M%SZ").to_string()),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::{GrayImage, Rgba, RgbaImage};

    fn fixture(height: u32, alpha: u8) -> RasterImage {
        let pixels = RgbaImage::from_pixel(256, height, Rgba([0, 0, 0, alpha]));
        RasterImage::new(pixels, GrayImage::new(256, height), 256)
    }

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap()
    }

    fn shown_text(bytes: &[u8]) -> Vec<String> {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .map(|op| String::from_utf8_lossy(op.operands[0].as_str().unwrap()).into_owned())
            .collect()
    }

    #[test]
    fn test_layout_square() {
        let layout = PdfLayout::compute(512, 512, false);
        assert!((layout.image_width - 170.0).abs() < 1e-3);
        assert!((layout.image_height - 170.0).abs() < 1e-3);
        assert!((layout.image_x - 20.0).abs() < 1e-3);
        assert_eq!(layout.label_y, None);
        assert!((layout.meta_y - (40.0 + 170.0 + 25.0)).abs() < 1e-3);
    }

    #[test]
    fn test_layout_keeps_aspect_and_fits() {
        let layout = PdfLayout::compute(512, 572, true);
        let ratio = layout.image_height / layout.image_width;
        assert!((ratio - 572.0 / 512.0).abs() < 1e-3);
        assert!(layout.meta_y + 15.0 < PAGE_HEIGHT_MM - MARGIN_MM / 2.0);
        assert!(layout.label_y.unwrap() < layout.meta_y);
    }

    #[test]
    fn test_text_width() {
        assert!((text_width("ii", 10.0) - 4.44).abs() < 1e-3);
        assert!(text_width("QR Code", 16.0) > 0.0);
    }

    #[test]
    fn test_page_text() {
        let config = QrConfig {
            label: Some("Scan Me".into()),
            ..QrConfig::new("https://example.com")
        };
        let bytes = to_pdf_bytes(&fixture(312, 255), &config, when()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let text = shown_text(&bytes);
        assert_eq!(
            text,
            vec![
                "QR Code",
                "Scan Me",
                "Size: 512x512px",
                "Type: URL",
                "Generated: 2026-10-17 09:30:00 UTC",
                "Error Correction: M",
            ]
        );
    }

    #[test]
    fn test_image_matches_raster() {
        let bytes = to_pdf_bytes(&fixture(256, 0), &QrConfig::new("x"), when()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let images: Vec<&Stream> = doc
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .filter(|s| s.dict.get(b"Subtype").and_then(|v| v.as_name()).ok() == Some(&b"Image"[..]))
            .collect();
        // Color image plus its soft mask.
        assert_eq!(images.len(), 2);
        for image in images {
            assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 256);
            assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 256);
        }
    }

    #[test]
    fn test_reproducible_with_fixed_time() {
        let raster = fixture(256, 255);
        let config = QrConfig::new("x");
        assert_eq!(
            to_pdf_bytes(&raster, &config, when()).unwrap(),
            to_pdf_bytes(&raster, &config, when()).unwrap()
        );
    }

    #[test]
    fn test_non_latin_label_is_replaced() {
        assert_eq!(win_ansi("añ☃"), vec![b'a', 0xf1, b'?']);
    }
}
