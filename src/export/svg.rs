//! SVG wrapper around the canonical PNG.
//!
//! The modules are not vectorized: the document embeds the raster as a
//! `data:` URL, so it scales like the PNG it carries.

use crate::compose::label::LabelMetrics;
use crate::config::QrConfig;
use crate::error::ExportError;
use crate::raster::RasterImage;

use super::png::{data_url, encode_png};

/// Escapes the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns a string of SVG code embedding `raster`.
///
/// The document is as large as the raster: `target × target` without a
/// label, and `target × (target + band)` with one, so the caption band is
/// part of the image rather than cropped away. When the configuration has a label, a vector `<text>` copy is
/// centred in the label band with `opacity="0"`: the raster label is what
/// shows, the vector one keeps the caption selectable and searchable.
/// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(raster: &RasterImage, config: &QrConfig) -> Result<String, ExportError> {
    let png = encode_png(raster)?;
    let (width, height) = raster.dimensions();

    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" version=\"1.1\" width=\"{0}\" height=\"{1}\" viewBox=\"0 0 {0} {1}\">\n",
        width, height
    );
    let href = data_url(&png);
    result += &format!(
        "\t<image x=\"0\" y=\"0\" width=\"{0}\" height=\"{1}\" href=\"{2}\" xlink:href=\"{2}\"/>\n",
        width, height, href
    );
    if let Some(label) = config.label_text() {
        let metrics = LabelMetrics::for_target(raster.target_size());
        let y = raster.target_size() + metrics.extra_height() / 2;
        result += &format!(
            "\t<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"Arial, sans-serif\" font-size=\"{}\" fill=\"{}\" opacity=\"0\">{}</text>\n",
            width / 2,
            y,
            metrics.font_size,
            config.foreground_color,
            escape_xml(label)
        );
    }
    result += "</svg>\n";
    Ok(result)
}
