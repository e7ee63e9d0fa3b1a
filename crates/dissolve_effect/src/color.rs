//! Linear RGB colors for the edge highlight and base material.
//!
//! Strings (`"#ff6a00"`, `"#f60"`, `"orange"`) are read as sRGB and stored
//! linear, so shading math and HDR intensity scaling happen in linear space.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DissolveError;

/// Linear RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red component (linear).
    pub r: f32,
    /// Green component (linear).
    pub g: f32,
    /// Blue component (linear).
    pub b: f32,
}

/// CSS names accepted in configuration files (sRGB hex).
const NAMED_COLORS: [(&str, u32); 15] = [
    ("black", 0x00_0000),
    ("white", 0xFF_FFFF),
    ("red", 0xFF_0000),
    ("green", 0x00_8000),
    ("lime", 0x00_FF00),
    ("blue", 0x00_00FF),
    ("yellow", 0xFF_FF00),
    ("cyan", 0x00_FFFF),
    ("aqua", 0x00_FFFF),
    ("magenta", 0xFF_00FF),
    ("fuchsia", 0xFF_00FF),
    ("orange", 0xFF_A500),
    ("purple", 0x80_0080),
    ("gray", 0x80_8080),
    ("grey", 0x80_8080),
];

impl Rgb {
    /// Solid black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Creates a color from linear components.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Creates a color from an sRGB hex value (0xRRGGBB).
    #[must_use]
    pub fn from_srgb_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xFF) as f32 / 255.0);
        Self::rgb(channel(16), channel(8), channel(0))
    }

    /// Converts back to an sRGB hex value (0xRRGGBB).
    #[must_use]
    pub fn to_srgb_hex(self) -> u32 {
        let channel = |c: f32| (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Multiplies every component by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self::rgb(self.r * factor, self.g * factor, self.b * factor)
    }

    /// Linearly interpolates between two colors (`mix` form, exact at 0 and 1).
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let s = 1.0 - t;
        Self::rgb(
            self.r * s + other.r * t,
            self.g * s + other.g * t,
            self.b * s + other.b * t,
        )
    }

    /// Converts to array format.
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Returns true when every component is finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Rgb {
    type Err = DissolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || DissolveError::InvalidColor(s.to_owned());

        if let Some(digits) = trimmed.strip_prefix('#') {
            // from_str_radix alone would accept a leading sign
            if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
            return match digits.len() {
                6 => Ok(Self::from_srgb_hex(value)),
                3 => {
                    // #rgb -> #rrggbb
                    let expand = |n: u32| (n & 0xF) * 0x11;
                    let hex = (expand(value >> 8) << 16) | (expand(value >> 4) << 8) | expand(value);
                    Ok(Self::from_srgb_hex(hex))
                }
                _ => Err(invalid()),
            };
        }

        let lower = trimmed.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|&(_, hex)| Self::from_srgb_hex(hex))
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for Rgb {
    type Error = DissolveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_srgb_hex())
    }
}

/// sRGB transfer function, decode direction.
#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB transfer function, encode direction.
#[inline]
fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        let long: Rgb = "#ff0000".parse().unwrap();
        let short: Rgb = "#f00".parse().unwrap();
        assert_eq!(long, short);
        assert!((long.r - 1.0).abs() < 1e-6);
        assert!(long.g.abs() < 1e-6);
    }

    #[test]
    fn test_parse_named() {
        let grey: Rgb = "Grey".parse().unwrap();
        let gray: Rgb = "#808080".parse().unwrap();
        assert_eq!(grey, gray);
        // sRGB mid grey is ~0.216 linear
        assert!((gray.r - 0.2158).abs() < 1e-3);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!("#12".parse::<Rgb>(), Err(DissolveError::InvalidColor(_))));
        assert!("#gggggg".parse::<Rgb>().is_err());
        assert!("chartreuse-ish".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_parse_rejects_signed_hex() {
        assert!(matches!("#+f0".parse::<Rgb>(), Err(DissolveError::InvalidColor(_))));
        assert!("#+ff000".parse::<Rgb>().is_err());
        assert!("#-12345".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_hex_display_roundtrip() {
        let color: Rgb = "#ff6a00".parse().unwrap();
        assert_eq!(color.to_string(), "#ff6a00");
    }

    #[test]
    fn test_scaled_and_lerp() {
        let c = Rgb::rgb(0.5, 0.25, 1.0).scaled(2.0);
        assert_eq!(c, Rgb::rgb(1.0, 0.5, 2.0));
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 1.0), Rgb::WHITE);
        assert_eq!(Rgb::BLACK.lerp(Rgb::WHITE, 0.0), Rgb::BLACK);
    }
}
