//! RGB colors exchanged as `#RRGGBB` text.
use std::fmt;

use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An 8-bit RGB color.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or the short form `#RGB`. Hex digits are case-insensitive.
    pub fn from_hex(text: &str) -> Result<Self> {
        let err = || Error::parse("hex color", text);
        let digits = text.trim().strip_prefix('#').ok_or_else(err)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
        match digits.len() {
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(err()),
        }
    }

    /// Formats as uppercase `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Builds a color from an integer triple as returned by material queries.
    ///
    /// Returns `Ok(None)` unless exactly three components are present.
    pub fn from_components(components: &[i32]) -> Result<Option<Self>> {
        let [r, g, b] = components else {
            return Ok(None);
        };
        let channel = |v: i32| {
            u8::try_from(v).map_err(|_| Error::parse("color component", v.to_string()))
        };
        Ok(Some(Self::new(channel(*r)?, channel(*g)?, channel(*b)?)))
    }

    /// Normalized `[0, 1]` components.
    #[inline]
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    /// Inverse of [`Color::to_vec3`]; components are clamped to `[0, 1]`.
    pub fn from_vec3(v: Vec3) -> Self {
        let q = (v.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        Self::new(q.x as u8, q.y as u8, q.z as u8)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Color> for mint::Vector3<u8> {
    fn from(c: Color) -> Self {
        mint::Vector3 {
            x: c.r,
            y: c.g,
            z: c.b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!(Color::from_hex("#FF0000").unwrap(), Color::new(255, 0, 0));
        assert_eq!(Color::from_hex("#00ff7f").unwrap(), Color::new(0, 255, 127));
        assert_eq!(Color::from_hex("#0F8").unwrap(), Color::new(0, 255, 136));
    }

    #[test]
    fn malformed_hex_is_a_parse_error() {
        for bad in ["", "FF0000", "#FF00", "#GG0000", "#FF00000", "#+F0000"] {
            assert!(
                matches!(Color::from_hex(bad), Err(Error::Parse { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn hex_output_is_uppercase() {
        assert_eq!(Color::new(171, 205, 239).to_hex(), "#ABCDEF");
        assert_eq!(Color::new(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn components_require_three_channels_in_range() {
        assert_eq!(Color::from_components(&[]).unwrap(), None);
        assert_eq!(
            Color::from_components(&[10, 20, 30]).unwrap(),
            Some(Color::new(10, 20, 30))
        );
        assert!(Color::from_components(&[0, 256, 0]).is_err());
    }

    #[test]
    fn vec3_conversion_is_normalized() {
        let v = Color::WHITE.to_vec3();
        assert_eq!(v, Vec3::ONE);
        assert_eq!(Color::from_vec3(Vec3::new(1.0, 0.5, -1.0)), Color::new(255, 128, 0));
        let m: mint::Vector3<u8> = Color::new(1, 2, 3).into();
        assert_eq!((m.x, m.y, m.z), (1, 2, 3));
    }
}
