//! The style compositor.
//!
//! Runs the optional passes over a base raster in a fixed order:
//!
//! 1. [`gradient`] recolors the dark modules (only when a gradient is set),
//! 2. [`logo`] centres a logo on a protective patch (only when a logo is set),
//! 3. [`label`] appends a caption band (only when a label is set).
//!
//! The gradient goes first so overlays are never recolored; the label goes
//! last because it changes the canvas height, which the other passes assume
//! is exactly the code square.

pub mod font;
pub mod gradient;
pub mod label;
pub mod logo;

use image::RgbaImage;

use crate::color::Color;
use crate::config::QrConfig;
use crate::error::RenderError;
use crate::raster::RasterImage;

/// Applies every pass the configuration asks for, decoding the logo inline.
pub fn compose(raster: &RasterImage, config: &QrConfig) -> Result<RasterImage, RenderError> {
    let logo = config
        .logo
        .as_ref()
        .map(|logo| logo::decode_logo(&logo.image_bytes))
        .transpose()?;
    compose_with_logo(raster, config, logo.as_ref())
}

/// Applies every pass the configuration asks for, using an already decoded logo.
///
/// # Errors
///
/// [`RenderError::LogoDecodeFailed`] if `config.logo` is set but no decoded
/// image is passed.
pub fn compose_with_logo(
    raster: &RasterImage,
    config: &QrConfig,
    logo: Option<&RgbaImage>,
) -> Result<RasterImage, RenderError> {
    let background = config.effective_background();
    let mut current = raster.clone();

    if let Some(gradient) = config.gradient.as_ref() {
        tracing::debug!(kind = ?gradient.kind, "Applying gradient pass");
        current = gradient::apply_gradient(&current, gradient, background);
    }

    if let Some(settings) = config.logo.as_ref() {
        let image = logo.ok_or_else(|| {
            RenderError::LogoDecodeFailed("logo is configured but was not decoded".into())
        })?;
        let patch = if config.transparent_background {
            Color::WHITE
        } else {
            config.background_color.opaque()
        };
        current = logo::apply_logo(&current, image, settings.size_percent, patch);
    }

    if let Some(text) = config.label_text() {
        current = label::apply_label(&current, text, config.foreground_color, background);
    }

    Ok(current)
}
