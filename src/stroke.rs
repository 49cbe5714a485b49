//! Stroke model: one committed drawing gesture.
//!
//! A stroke is a flat list of scalar components grouped into points of
//! `stride` components each (typically x, y, pressure), plus the styling
//! needed to composite it. Strokes are built fully formed and never change
//! afterwards; the owning whiteboard only appends or drops whole strokes.

#[cfg(test)]
#[path = "stroke_test.rs"]
mod stroke_test;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Draw-mode value on the wire that selects [`BlendMode::Erase`].
pub const ERASE_DRAW_MODE: &str = "ERASE";

/// Error returned by [`Stroke::new`] when the point layout is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrokeError {
    /// A stride of zero cannot group points.
    #[error("stroke stride must be greater than zero")]
    ZeroStride,
    /// The flat point list does not split evenly into `stride`-sized points.
    #[error("stroke has {len} components, not a multiple of stride {stride}")]
    PointsNotAligned { len: usize, stride: usize },
}

/// Compositing rule for a stroke.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlendMode {
    /// Paint over the existing content.
    #[default]
    Normal,
    /// Remove the pixels underneath.
    Erase,
}

impl BlendMode {
    /// Derive a blend mode from the optional realtime `drawMode` field.
    ///
    /// Only the exact value `"ERASE"` erases; anything else, including an
    /// absent field, draws normally.
    #[must_use]
    pub fn from_draw_mode(draw_mode: Option<&str>) -> Self {
        match draw_mode {
            Some(ERASE_DRAW_MODE) => Self::Erase,
            _ => Self::Normal,
        }
    }

    /// The `drawMode` value sent for this blend mode.
    #[must_use]
    pub fn draw_mode(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Erase => ERASE_DRAW_MODE,
        }
    }
}

/// One drawn gesture. Equality is structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StrokeFields")]
pub struct Stroke {
    points: Vec<f32>,
    color: Color,
    stride: usize,
    blend_mode: BlendMode,
}

/// Unchecked field set; deserialized strokes pass through [`Stroke::new`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StrokeFields {
    points: Vec<f32>,
    color: Color,
    stride: usize,
    #[serde(default)]
    blend_mode: BlendMode,
}

impl TryFrom<StrokeFields> for Stroke {
    type Error = StrokeError;

    fn try_from(fields: StrokeFields) -> Result<Self, Self::Error> {
        Self::new(fields.points, fields.color, fields.stride, fields.blend_mode)
    }
}

impl Stroke {
    /// Build a stroke, checking that `points` splits into whole points.
    ///
    /// # Errors
    ///
    /// Returns [`StrokeError::ZeroStride`] for a zero stride and
    /// [`StrokeError::PointsNotAligned`] when `points.len()` is not a
    /// multiple of `stride`.
    pub fn new(
        points: Vec<f32>,
        color: Color,
        stride: usize,
        blend_mode: BlendMode,
    ) -> Result<Self, StrokeError> {
        if stride == 0 {
            return Err(StrokeError::ZeroStride);
        }
        if points.len() % stride != 0 {
            return Err(StrokeError::PointsNotAligned { len: points.len(), stride });
        }
        Ok(Self { points, color, stride, blend_mode })
    }

    /// Flat list of point components in drawing order.
    #[must_use]
    pub fn points(&self) -> &[f32] {
        &self.points
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Number of scalar components per logical point.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Number of logical points (`points().len() / stride()`).
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len() / self.stride
    }

    /// Iterate over logical points as `stride`-sized slices.
    pub fn iter_points(&self) -> impl Iterator<Item = &[f32]> {
        self.points.chunks_exact(self.stride)
    }
}
