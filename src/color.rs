//! RGBA colors written as CSS-style hex strings.

use core::fmt;
use core::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};

/// A straight-alpha RGBA color.
///
/// Parses `#rgb`, `#rrggbb` and `#rrggbbaa` (the leading `#` is optional) and
/// serializes back to lowercase hex, omitting the alpha byte when it is opaque.
///
/// # Example
///
/// ```rust
/// use qr_studio::color::Color;
///
/// let blue: Color = "#3b82f6".parse().unwrap();
/// assert_eq!(blue.to_rgba().0, [0x3b, 0x82, 0xf6, 0xff]);
/// assert_eq!(blue.to_string(), "#3b82f6");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with its alpha forced to 255.
    pub const fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    pub const fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    /// Linear interpolation between two colors, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8
        };
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl From<Rgba<u8>> for Color {
    fn from(px: Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self { r, g, b, a }
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        c.to_rgba()
    }
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color {0:?}, expected #rgb, #rrggbb or #rrggbbaa")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| err());
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        match hex.len() {
            3 => Ok(Color::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("000000".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!(
            "#FFFFFF00".parse::<Color>().unwrap(),
            Color::rgba(255, 255, 255, 0)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("#ééé".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_omits_opaque_alpha() {
        assert_eq!(Color::rgb(0x8b, 0x5c, 0xf6).to_string(), "#8b5cf6");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::rgb(0, 0, 0);
        let b = Color::rgb(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Color::rgb(100, 50, 25));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::rgb(0x3b, 0x82, 0xf6)).unwrap();
        assert_eq!(json, "\"#3b82f6\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(0x3b, 0x82, 0xf6));
    }
}
