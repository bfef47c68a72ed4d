//! Colors and pens shared by styles, nodes and painters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StyleError;

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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
    pub const LIGHT_GRAY: Color = Color::rgb(192, 192, 192);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_tuple(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    /// Parse `#RRGGBB` or `#AARRGGBB`.
    pub fn from_hex(hex: &str) -> Result<Self, StyleError> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || StyleError::InvalidColor(hex.to_string());
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        match digits.len() {
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::rgba(
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
                channel(0..2)?,
            )),
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                self.a, self.r, self.g, self.b
            )
        }
    }

    /// Perceptive luminance in `0.0..=1.0`; the eye favors green.
    pub fn luma(&self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }

    /// Text color readable on top of this color.
    ///
    /// Mostly transparent backgrounds let the scene background show through,
    /// so they always get black text.
    pub fn contrasting_text(&self) -> Color {
        if self.a < 128 || self.luma() > 0.5 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }

    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
            a: self.a,
        }
    }

    pub fn lighten(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) + (255.0 - self.r as f32) * factor) as u8,
            g: ((self.g as f32) + (255.0 - self.g as f32) * factor) as u8,
            b: ((self.b as f32) + (255.0 - self.b as f32) * factor) as u8,
            a: self.a,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Outline used to stroke shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub color: Color,
    pub width: f32,
}

impl Pen {
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(Color::BLACK, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#FF8000").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(
            Color::from_hex("#80FF8000").unwrap(),
            Color::rgba(255, 128, 0, 128)
        );
        assert!(matches!(
            Color::from_hex("#12345"),
            Err(StyleError::InvalidColor(_))
        ));
        assert!(Color::from_hex("#GG0000").is_err());
    }

    #[test]
    fn test_hex_formatting_roundtrip() {
        let opaque = Color::rgb(1, 2, 3);
        assert_eq!(opaque.to_hex(), "#010203");
        let translucent = Color::rgba(1, 2, 3, 4);
        assert_eq!(Color::from_hex(&translucent.to_hex()).unwrap(), translucent);
    }

    #[test]
    fn test_contrasting_text() {
        assert_eq!(Color::WHITE.contrasting_text(), Color::BLACK);
        assert_eq!(Color::BLACK.contrasting_text(), Color::WHITE);
        // Low alpha wins over luminance.
        assert_eq!(Color::rgba(0, 0, 0, 50).contrasting_text(), Color::BLACK);
        assert_eq!(Color::rgb(0, 0, 255).contrasting_text(), Color::WHITE);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#FF0000\"");
        let parsed: Color = serde_json::from_str("\"#00FF00\"").unwrap();
        assert_eq!(parsed, Color::rgb(0, 255, 0));
        assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_contrasting_text_is_black_or_white(r: u8, g: u8, b: u8, a: u8) {
                let text = Color::rgba(r, g, b, a).contrasting_text();
                prop_assert!(text == Color::BLACK || text == Color::WHITE);
            }

            #[test]
            fn prop_hex_roundtrip(r: u8, g: u8, b: u8, a: u8) {
                let color = Color::rgba(r, g, b, a);
                prop_assert_eq!(Color::from_hex(&color.to_hex()).unwrap(), color);
            }
        }
    }
}
