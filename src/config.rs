//! The render configuration and its enumerations.
//!
//! A [`QrConfig`] is an immutable value built fresh for every render request.
//! It round-trips through camelCase JSON so it can be stored in the history
//! file or read from a config file by the command-line front end.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::RenderError;

pub const MIN_TARGET_SIZE: u32 = 256;
pub const MAX_TARGET_SIZE: u32 = 4096;
pub const MAX_MARGIN: u32 = 10;
pub const MAX_CORNER_RADIUS: u32 = 20;
pub const MIN_LOGO_PERCENT: u32 = 10;
pub const MAX_LOGO_PERCENT: u32 = 50;

/// What kind of payload the content string holds.
///
/// The pipeline never looks at this beyond reporting it; templating happens
/// in [`crate::payload`] before the content reaches the encoder.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Url,
    Text,
    Email,
    Phone,
    Sms,
    Wifi,
    Vcard,
}

impl ContentKind {
    pub fn label(self) -> &'static str {
        use ContentKind::*;
        match self {
            Url => "URL",
            Text => "TEXT",
            Email => "EMAIL",
            Phone => "PHONE",
            Sms => "SMS",
            Wifi => "WIFI",
            Vcard => "VCARD",
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ContentKind::*;
        match s.to_ascii_lowercase().as_str() {
            "url" => Ok(Url),
            "text" => Ok(Text),
            "email" => Ok(Email),
            "phone" => Ok(Phone),
            "sms" => Ok(Sms),
            "wifi" => Ok(Wifi),
            "vcard" => Ok(Vcard),
            other => Err(format!("unknown content kind {other:?}")),
        }
    }
}

/// The error correction level of a QR Code symbol.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// The QR Code can tolerate about  7% erroneous codewords.
    L,
    /// The QR Code can tolerate about 15% erroneous codewords.
    #[default]
    M,
    /// The QR Code can tolerate about 25% erroneous codewords.
    Q,
    /// The QR Code can tolerate about 30% erroneous codewords.
    H,
}

impl ErrorCorrection {
    /// Approximate share of codewords that can be recovered, in percent.
    pub fn recovery_percent(self) -> u8 {
        use ErrorCorrection::*;
        match self {
            L => 7,
            M => 15,
            Q => 25,
            H => 30,
        }
    }

    pub fn as_char(self) -> char {
        use ErrorCorrection::*;
        match self {
            L => 'L',
            M => 'M',
            Q => 'Q',
            H => 'H',
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ErrorCorrection::*;
        match s.to_ascii_uppercase().as_str() {
            "L" => Ok(L),
            "M" => Ok(M),
            "Q" => Ok(Q),
            "H" => Ok(H),
            other => Err(format!("unknown error correction level {other:?}")),
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The shape painted for each dark module (or finder-pattern cell).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleShape {
    #[default]
    Square,
    Dots,
    Rounded,
}

impl FromStr for ModuleShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "square" => Ok(ModuleShape::Square),
            "dots" => Ok(ModuleShape::Dots),
            "rounded" => Ok(ModuleShape::Rounded),
            other => Err(format!("unknown module style {other:?}")),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

/// Two-stop gradient used instead of the flat foreground color.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    pub kind: GradientKind,
    pub color_start: Color,
    pub color_end: Color,
}

impl Default for Gradient {
    /// The editor's preset: blue to violet, linear.
    fn default() -> Self {
        Self {
            kind: GradientKind::Linear,
            color_start: Color::rgb(0x3b, 0x82, 0xf6),
            color_end: Color::rgb(0x8b, 0x5c, 0xf6),
        }
    }
}

/// An image placed in the centre of the code.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    #[serde(with = "base64_bytes")]
    pub image_bytes: Vec<u8>,
    pub size_percent: u32,
}

impl Logo {
    pub fn new(image_bytes: Vec<u8>, size_percent: u32) -> Self {
        Self { image_bytes, size_percent }
    }
}

impl fmt::Debug for Logo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Logo")
            .field("image_bytes", &format_args!("<{} bytes>", self.image_bytes.len()))
            .field("size_percent", &self.size_percent)
            .finish()
    }
}

/// Everything that determines what a render produces.
///
/// # Example
///
/// ```rust
/// use qr_studio::config::{QrConfig, ErrorCorrection};
///
/// let config = QrConfig {
///     content: "https://example.com".into(),
///     error_correction: ErrorCorrection::H,
///     label: Some("Scan Me".into()),
///     ..QrConfig::default()
/// };
/// assert_eq!(config.target_size_pixels, 512);
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QrConfig {
    #[serde(alias = "data")]
    pub content: String,
    #[serde(alias = "inputType")]
    pub content_kind: ContentKind,
    #[serde(alias = "errorCorrectionLevel")]
    pub error_correction: ErrorCorrection,
    pub module_style: ModuleShape,
    pub eye_style: ModuleShape,
    pub corner_radius: u32,
    pub margin: u32,
    pub foreground_color: Color,
    pub background_color: Color,
    pub transparent_background: bool,
    pub gradient: Option<Gradient>,
    pub logo: Option<Logo>,
    pub label: Option<String>,
    #[serde(alias = "size")]
    pub target_size_pixels: u32,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            content: String::new(),
            content_kind: ContentKind::Url,
            error_correction: ErrorCorrection::M,
            module_style: ModuleShape::Square,
            eye_style: ModuleShape::Square,
            corner_radius: 0,
            margin: 2,
            foreground_color: Color::BLACK,
            background_color: Color::WHITE,
            transparent_background: false,
            gradient: None,
            logo: None,
            label: None,
            target_size_pixels: 512,
        }
    }
}

impl QrConfig {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with the shape parameters clamped to their ranges.
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        config.corner_radius = config.corner_radius.min(MAX_CORNER_RADIUS);
        config.margin = config.margin.min(MAX_MARGIN);
        if let Some(logo) = config.logo.as_mut() {
            logo.size_percent = logo.size_percent.clamp(MIN_LOGO_PERCENT, MAX_LOGO_PERCENT);
        }
        if config.label.as_deref().is_some_and(|l| l.trim().is_empty()) {
            config.label = None;
        }
        config
    }

    /// The label, if one is set and not blank.
    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref().filter(|l| !l.trim().is_empty())
    }

    /// Color painted behind the code, transparent when requested.
    pub fn effective_background(&self) -> Color {
        if self.transparent_background {
            Color::TRANSPARENT
        } else {
            self.background_color
        }
    }

    pub fn check_target_size(&self) -> Result<(), RenderError> {
        let size = self.target_size_pixels;
        if !(MIN_TARGET_SIZE..=MAX_TARGET_SIZE).contains(&size) {
            return Err(RenderError::InvalidDimensions(format!(
                "target size {size}px is outside {MIN_TARGET_SIZE}..={MAX_TARGET_SIZE}"
            )));
        }
        Ok(())
    }
}

/// Serde adapter storing raw bytes as a standard base64 string.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}
