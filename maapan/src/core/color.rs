//! RGB colors written onto voxels and surface vertices.

use serde::{Deserialize, Serialize};

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Black, the color of never-painted voxels.
    pub const BLACK: Color = Color::new(0, 0, 0);

    /// Neutral gray for elements without a ground-truth reference.
    pub const GRAY: Color = Color::new(128, 128, 128);

    /// Create a color from byte channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from float channels in [0, 255], saturating out-of-range values.
    #[inline]
    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Linear blend towards `other` by `t` in [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| a as f32 + (b as f32 - a as f32) * t;
        Self::from_f32(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

#[inline]
fn channel(value: f32) -> u8 {
    // `as` truncates toward zero; NaN maps to 0.
    value.clamp(0.0, 255.0) as u8
}
