//! Hex color handling.
//!
//! Colors travel through the draw pipeline as `#rrggbb` strings because they are used
//! verbatim as cache keys. They are only parsed into [`Rgb`] when handed to the renderer.

use glamx::Vec3;
use snafu::{Snafu, ensure};

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[snafu(display("Color {hex:?} is not a #rgb or #rrggbb hex color"))]
    InvalidHex { hex: String },
}

/// Linear RGB color with channels in `0.0..=1.0`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        ensure!(
            digits.is_ascii() && (digits.len() == 6 || digits.len() == 3),
            InvalidHexSnafu { hex }
        );

        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        let channels = if digits.len() == 6 {
            [
                channel(&digits[0..2]),
                channel(&digits[2..4]),
                channel(&digits[4..6]),
            ]
        } else {
            // #abc is shorthand for #aabbcc
            [
                channel(&digits[0..1]).map(|c| c * 17),
                channel(&digits[1..2]).map(|c| c * 17),
                channel(&digits[2..3]).map(|c| c * 17),
            ]
        };

        let [Some(r), Some(g), Some(b)] = channels else {
            return InvalidHexSnafu { hex }.fail();
        };

        Ok(Self::from_bytes(r, g, b))
    }

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Builds a color from float channels as delivered by geometry kernels.
    /// Missing channels are treated as `0.0`, extra channels (alpha) are ignored.
    pub fn from_channels(channels: &[f32]) -> Self {
        let at = |i: usize| channels.get(i).copied().unwrap_or(0.0);
        Self::new(at(0), at(1), at(2))
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [byte(self.r), byte(self.g), byte(self.b)]
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

impl From<Rgb> for Vec3 {
    fn from(value: Rgb) -> Self {
        value.to_vec3()
    }
}
