//! Pixel dimensions entity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of an image, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either side is zero
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height, or `None` for degenerate sizes
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        Some(self.width as f64 / self.height as f64)
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Longest side
    pub fn max_side(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Converts a target size into the pixel size a decoder must produce
    ///
    /// The size is multiplied by `scale` (anything non-finite or non-positive
    /// counts as 1). When `max_content_size` is non-zero the longest side is
    /// then capped at it, shrinking both sides by the same factor. Every side
    /// of the result is at least 1.
    pub fn output_pixels(&self, scale: f64, max_content_size: u32) -> Dimensions {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        let width = self.width as f64 * scale;
        let height = self.height as f64 * scale;

        let longest = self.max_side() as f64 * scale;
        let shrink = if max_content_size > 0 && longest > max_content_size as f64 {
            max_content_size as f64 / longest
        } else {
            1.0
        };

        Dimensions::new(
            clamp_side(width * shrink),
            clamp_side(height * shrink),
        )
    }
}

/// Rounds a floating-point side length into `1..=u32::MAX`
pub(crate) fn clamp_side(value: f64) -> u32 {
    if !value.is_finite() {
        return if value > 0.0 { u32::MAX } else { 1 };
    }
    value.round().clamp(1.0, u32::MAX as f64) as u32
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
