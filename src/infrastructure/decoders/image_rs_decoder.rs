//! `image` crate decoder adapter
//!
//! Implements the bitstream decoder port on top of `imagesize` (header
//! probing) and `image` (pixel decoding). `image` has no incremental API,
//! so a partial decode is a full decode attempt on the prefix that only
//! succeeds once the payload is complete enough for the codec.
//!
//! AVIF pixel decoding needs the `native-avif` feature; without it AVIF
//! payloads report [`DecoderError::Unsupported`].
//!
//! Output rasters are bounded by an allocation budget, taken from
//! [`image::Limits`] unless overridden, so an oversized target is an error
//! instead of an allocation failure.

use crate::domain::entities::{Dimensions, RGBA_CHANNELS, Raster};
use crate::domain::repositories::{BitstreamDecoder, DecoderError};
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, Limits};
use tracing::{trace, warn};

/// Used when `image::Limits` sets no allocation cap
const FALLBACK_MAX_ALLOC: u64 = 512 * 1024 * 1024;

/// Decoder backed by the `image` crate
#[derive(Debug, Clone)]
pub struct ImageRsDecoder {
    filter: FilterType,
    /// Largest output raster, in bytes
    max_alloc: u64,
    /// Intrinsic size, cached once a prefix held a complete header
    header: Option<Dimensions>,
}

impl Default for ImageRsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageRsDecoder {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Triangle,
            max_alloc: Limits::default().max_alloc.unwrap_or(FALLBACK_MAX_ALLOC),
            header: None,
        }
    }

    /// Uses `filter` when resampling to the target size
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Caps the size of an output raster at `bytes`
    pub fn with_max_alloc(mut self, bytes: u64) -> Self {
        self.max_alloc = bytes;
        self
    }

    fn check_budget(&self, output: Dimensions) -> Result<(), DecoderError> {
        let bytes = output.pixel_count().checked_mul(RGBA_CHANNELS as u64);
        match bytes {
            Some(bytes) if bytes <= self.max_alloc => Ok(()),
            _ => {
                warn!(%output, max_alloc = self.max_alloc, "output raster over budget");
                Err(DecoderError::Unsupported(format!(
                    "output size {output} exceeds the {} byte allocation budget",
                    self.max_alloc
                )))
            }
        }
    }

    fn load(data: &[u8]) -> Result<DynamicImage, DecoderError> {
        image::load_from_memory(data).map_err(map_image_error)
    }

    fn to_raster(&self, image: DynamicImage, output: Dimensions) -> Result<Raster, DecoderError> {
        self.check_budget(output)?;
        let image = if image.width() == output.width && image.height() == output.height {
            image
        } else {
            image.resize_exact(output.width, output.height, self.filter)
        };
        let rgba = image.into_rgba8();
        Raster::from_rgba(output, rgba.into_raw())
            .ok_or_else(|| DecoderError::Backend("pixel buffer does not match output size".into()))
    }
}

impl BitstreamDecoder for ImageRsDecoder {
    fn probe_size(&self, data: &[u8]) -> Result<Dimensions, DecoderError> {
        let size = imagesize::blob_size(data).map_err(|e| match e {
            imagesize::ImageError::NotSupported => {
                DecoderError::Unsupported("unrecognized image header".into())
            }
            other => DecoderError::Invalid(other.to_string()),
        })?;
        let width = u32::try_from(size.width)
            .map_err(|_| DecoderError::Invalid(format!("width {} out of range", size.width)))?;
        let height = u32::try_from(size.height)
            .map_err(|_| DecoderError::Invalid(format!("height {} out of range", size.height)))?;
        Ok(Dimensions::new(width, height))
    }

    fn decode_full(
        &self,
        data: &[u8],
        target: Dimensions,
        max_content_size: u32,
        scale: f64,
    ) -> Result<Raster, DecoderError> {
        let output = target.output_pixels(scale, max_content_size);
        self.check_budget(output)?;
        let image = Self::load(data)?;
        trace!(source = %Dimensions::new(image.width(), image.height()), %output, "resampling");
        self.to_raster(image, output)
    }

    fn decode_partial(&mut self, data: &[u8]) -> Result<Option<Raster>, DecoderError> {
        if self.header.is_none() {
            match self.probe_size(data) {
                Ok(size) => self.header = Some(size),
                Err(DecoderError::Unsupported(reason)) => {
                    return Err(DecoderError::Unsupported(reason));
                }
                // header still incomplete
                Err(_) => return Ok(None),
            }
        }

        match Self::load(data) {
            Ok(image) => {
                let output = Dimensions::new(image.width(), image.height());
                self.to_raster(image, output).map(Some)
            }
            Err(DecoderError::Unsupported(reason)) => Err(DecoderError::Unsupported(reason)),
            Err(err) => {
                trace!(bytes = data.len(), error = %err, "payload not decodable yet");
                Ok(None)
            }
        }
    }
}

fn map_image_error(err: ImageError) -> DecoderError {
    match err {
        ImageError::Unsupported(e) => DecoderError::Unsupported(e.to_string()),
        ImageError::Decoding(e) => DecoderError::Invalid(e.to_string()),
        other => DecoderError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7) as u8, (y * 13) as u8, (x ^ y) as u8, 255])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn probes_without_decoding() {
        let decoder = ImageRsDecoder::new();
        assert_eq!(decoder.probe_size(&png(12, 7)).unwrap(), Dimensions::new(12, 7));
    }

    #[test]
    fn probe_rejects_unknown_bytes() {
        let decoder = ImageRsDecoder::new();
        assert!(matches!(
            decoder.probe_size(b"definitely not an image"),
            Err(DecoderError::Unsupported(_))
        ));
    }

    #[test]
    fn full_decode_resamples_to_output_size() {
        let decoder = ImageRsDecoder::new();
        let raster = decoder
            .decode_full(&png(20, 10), Dimensions::new(10, 5), 0, 2.0)
            .unwrap();
        assert_eq!(raster.dimensions(), Dimensions::new(20, 10));

        let capped = decoder
            .decode_full(&png(20, 10), Dimensions::new(20, 10), 8, 1.0)
            .unwrap();
        assert_eq!(capped.dimensions(), Dimensions::new(8, 4));
        assert_eq!(capped.pixels().len(), 8 * 4 * 4);
    }

    #[test]
    fn oversized_target_is_rejected_before_allocating() {
        let decoder = ImageRsDecoder::new();
        let target = crate::domain::services::resolve(Dimensions::new(4, 2), Some(1e12), None)
            .unwrap();
        assert_eq!(target, Dimensions::new(u32::MAX, u32::MAX));

        let err = decoder.decode_full(&png(4, 2), target, 0, 1.0).unwrap_err();
        assert!(matches!(err, DecoderError::Unsupported(_)));
    }

    #[test]
    fn custom_budget_bounds_output() {
        let decoder = ImageRsDecoder::new().with_max_alloc(64);
        let data = png(8, 8);

        let small = decoder.decode_full(&data, Dimensions::new(4, 4), 0, 1.0).unwrap();
        assert_eq!(small.pixels().len(), 64);
        assert!(matches!(
            decoder.decode_full(&data, Dimensions::new(8, 8), 0, 1.0),
            Err(DecoderError::Unsupported(_))
        ));

        let mut partial = ImageRsDecoder::new().with_max_alloc(64);
        assert!(matches!(
            partial.decode_partial(&data),
            Err(DecoderError::Unsupported(_))
        ));
    }

    #[test]
    fn partial_decode_waits_for_complete_payload() {
        let data = png(64, 64);
        let mut decoder = ImageRsDecoder::new();

        assert_eq!(decoder.decode_partial(&data[..20]).unwrap(), None);
        assert_eq!(decoder.header, None);
        assert_eq!(decoder.decode_partial(&data[..100]).unwrap(), None);
        assert_eq!(decoder.header, Some(Dimensions::new(64, 64)));

        let raster = decoder.decode_partial(&data).unwrap().unwrap();
        assert_eq!(raster.dimensions(), Dimensions::new(64, 64));
    }

    #[test]
    fn partial_decode_rejects_foreign_header() {
        let mut decoder = ImageRsDecoder::new();
        assert!(decoder.decode_partial(b"definitely not an image").is_err());
    }
}
