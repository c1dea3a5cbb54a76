//! Decoded pixel data and the result handed back to hosts

use super::{ContainerKind, Dimensions};
use bytes::Bytes;

/// Bytes per RGBA8 pixel
pub const RGBA_CHANNELS: usize = 4;

/// A fully materialized RGBA8 pixel buffer
///
/// Cloning is cheap: the pixel storage is reference counted and shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    dimensions: Dimensions,
    pixels: Bytes,
}

impl Raster {
    /// Wraps an RGBA8 buffer
    ///
    /// Returns `None` if the buffer length does not equal
    /// `width * height * 4` or either side is zero.
    pub fn from_rgba(dimensions: Dimensions, pixels: impl Into<Bytes>) -> Option<Self> {
        let pixels = pixels.into();
        if dimensions.is_degenerate() {
            return None;
        }
        let expected = dimensions.pixel_count() as usize * RGBA_CHANNELS;
        if pixels.len() != expected {
            return None;
        }
        Some(Self { dimensions, pixels })
    }

    /// Creates a raster filled with one color
    pub fn solid(dimensions: Dimensions, rgba: [u8; 4]) -> Self {
        let count = dimensions.pixel_count() as usize;
        let mut pixels = Vec::with_capacity(count * RGBA_CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            dimensions,
            pixels: Bytes::from(pixels),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Row-major RGBA8 pixels
    pub fn pixels(&self) -> &Bytes {
        &self.pixels
    }

    /// True if both rasters share the same pixel storage
    pub fn shares_pixels_with(&self, other: &Raster) -> bool {
        self.pixels.as_ptr() == other.pixels.as_ptr() && self.pixels.len() == other.pixels.len()
    }
}

/// What a decode hands back to the host
///
/// `raster` is `None` in metadata-only mode. `data` carries the source bytes
/// when the caller asked for them, so the host cache can keep them.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub kind: ContainerKind,
    /// Intrinsic size of the source image
    ///
    /// Final results always carry the size read from the header. A preview
    /// made before the header was readable carries the preview raster's size.
    pub dimensions: Dimensions,
    pub raster: Option<Raster>,
    pub data: Option<Bytes>,
    /// False for progressive previews
    pub is_final: bool,
}

impl DecodedImage {
    /// Pixel size of the raster, if one was produced
    pub fn raster_dimensions(&self) -> Option<Dimensions> {
        self.raster.as_ref().map(Raster::dimensions)
    }
}
