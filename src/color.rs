//! Packed colors and the realtime color codec.
//!
//! Locally a color is a packed `0xAARRGGBB` integer. On the realtime wire it
//! travels as an object of normalized channels:
//!
//! ```json
//! { "red": 1.0, "green": 0.0, "blue": 0.0, "alpha": 1.0 }
//! ```
//!
//! Decoding rounds each channel to the nearest 8-bit value, so any packed
//! color survives an encode/decode trip unchanged.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error returned by [`Color::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    /// The value is not an object of numeric channels.
    #[error("malformed color: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A channel lies outside `[0, 1]` or is not finite.
    #[error("color channel `{channel}` out of range: {value}")]
    ChannelOutOfRange { channel: &'static str, value: f64 },
}

/// Packed `0xAARRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    pub const BLACK: Self = Self(0xFF00_0000);
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    pub const RED: Self = Self(0xFFFF_0000);
    pub const GREEN: Self = Self(0xFF00_FF00);
    pub const BLUE: Self = Self(0xFF00_00FF);

    #[must_use]
    pub const fn from_argb(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self(
            (alpha as u32) << 24 | (red as u32) << 16 | (green as u32) << 8 | blue as u32,
        )
    }

    #[must_use]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[must_use]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[must_use]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[must_use]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Encode into the realtime channel object.
    #[must_use]
    pub fn to_json(self) -> Value {
        serde_json::json!({
            "red": normalize(self.red()),
            "green": normalize(self.green()),
            "blue": normalize(self.blue()),
            "alpha": normalize(self.alpha()),
        })
    }

    /// Decode the realtime channel object. `alpha` defaults to opaque.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::Malformed`] when a required channel is missing
    /// or not a number, and [`ColorError::ChannelOutOfRange`] when a channel
    /// falls outside `[0, 1]`.
    pub fn from_json(value: &Value) -> Result<Self, ColorError> {
        let channels = ColorChannels::deserialize(value)?;
        Ok(Self::from_argb(
            quantize("alpha", channels.alpha)?,
            quantize("red", channels.red)?,
            quantize("green", channels.green)?,
            quantize("blue", channels.blue)?,
        ))
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Self(argb)
    }
}

#[derive(Deserialize)]
struct ColorChannels {
    red: f64,
    green: f64,
    blue: f64,
    #[serde(default = "opaque")]
    alpha: f64,
}

fn opaque() -> f64 {
    1.0
}

fn normalize(channel: u8) -> f64 {
    f64::from(channel) / 255.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(channel: &'static str, value: f64) -> Result<u8, ColorError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ColorError::ChannelOutOfRange { channel, value });
    }
    Ok((value * 255.0).round() as u8)
}
