//! Bitstream decoder trait
//!
//! The only touch points into codec internals. The core never inspects
//! the bitstream itself; it asks an implementation of this trait for the
//! intrinsic size, a one-shot decode, or a best-effort partial decode.

use crate::domain::entities::{Dimensions, Raster};
use thiserror::Error;

/// Errors reported by a bitstream decoder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecoderError {
    #[error("Invalid bitstream: {0}")]
    Invalid(String),

    #[error("Unsupported bitstream: {0}")]
    Unsupported(String),

    #[error("Decoder failure: {0}")]
    Backend(String),
}

/// Trait for external image decoders
///
/// One instance is owned by each progressive session, so implementations
/// may keep an internal parsing cursor between `decode_partial` calls.
/// Calls may block for the duration of bitstream parsing.
///
/// # Example
///
/// ```ignore
/// let mut decoder = ImageRsDecoder::new();
/// let size = decoder.probe_size(&data)?;
/// let raster = decoder.decode_full(&data, size, 0, 1.0)?;
/// ```
pub trait BitstreamDecoder: Send {
    /// Reads the intrinsic size without materializing pixels
    fn probe_size(&self, data: &[u8]) -> Result<Dimensions, DecoderError>;

    /// Decodes a complete buffer
    ///
    /// # Arguments
    ///
    /// * `data` - The full encoded image
    /// * `target` - Resolved target size, before scaling
    /// * `max_content_size` - Cap on the longest output side, 0 for none
    /// * `scale` - Pixel scale factor applied to `target`
    ///
    /// # Returns
    ///
    /// A raster of `target.output_pixels(scale, max_content_size)` pixels
    fn decode_full(
        &self,
        data: &[u8],
        target: Dimensions,
        max_content_size: u32,
        scale: f64,
    ) -> Result<Raster, DecoderError>;

    /// Attempts a preview from a prefix of the stream
    ///
    /// `data` always holds every byte received so far. Returns `Ok(None)`
    /// while the prefix is too short to produce anything, and an error only
    /// when the bytes seen so far prove the stream is invalid.
    fn decode_partial(&mut self, data: &[u8]) -> Result<Option<Raster>, DecoderError>;
}
