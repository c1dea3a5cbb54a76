//! Decode image use case
//!
//! Composes the sniffer, the size resolver and a progressive session into
//! the operations an image-loading host needs: a pure "can handle"
//! predicate, metadata reads, one-shot decodes and stream decodes with
//! previews.

use crate::application::dto::DecodeOptions;
use crate::domain::entities::{ContainerKind, DecodeRequest, DecodedImage, Dimensions, Raster};
use crate::domain::repositories::BitstreamDecoder;
use crate::domain::services::{
    ProgressiveSession, SessionState, avif_signature_len, classify, is_avif,
};
use crate::error::{DecodeError, Result};
use bytes::{Bytes, BytesMut};
use std::io::{ErrorKind, Read};
use std::time::Instant;
use tracing::{debug, info};

/// AVIF decode façade
///
/// Holds a prototype decoder that is cloned into every session, so
/// sessions never share parsing state.
///
/// Requests inherit the options' size, cap and scale wherever they leave
/// the defaults; see [`DecodeOptions::apply_defaults`].
///
/// # Example
///
/// ```ignore
/// let decoder = AvifImageDecoder::new(ImageRsDecoder::new(), DecodeOptions::default());
/// let request = DecodeRequest::new().with_width(640.0);
/// let image = decoder.decode(&request, bytes)?;
/// ```
pub struct AvifImageDecoder<D> {
    decoder: D,
    options: DecodeOptions,
}

impl<D: BitstreamDecoder + Clone> AvifImageDecoder<D> {
    pub fn new(decoder: D, options: DecodeOptions) -> Self {
        Self { decoder, options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// The predicate a host registers to route buffers to this decoder
    pub fn can_handle(data: &[u8]) -> bool {
        is_avif(data)
    }

    /// Reads the intrinsic size without decoding pixels
    pub fn read_metadata(&self, data: &[u8]) -> Result<Dimensions> {
        ensure_avif(data)?;
        Ok(self.decoder.probe_size(data)?)
    }

    /// Starts a session for a host that delivers partial data itself
    ///
    /// Constraints missing from `request` are taken from the options.
    pub fn session(&self, request: &DecodeRequest) -> ProgressiveSession<D> {
        ProgressiveSession::new(self.decoder.clone(), self.options.apply_defaults(request))
    }

    /// Decodes a complete buffer
    ///
    /// In metadata-only mode the result carries the intrinsic size and the
    /// source bytes but no raster.
    pub fn decode(&self, request: &DecodeRequest, data: Bytes) -> Result<DecodedImage> {
        ensure_avif(&data)?;

        if !self.options.render {
            let intrinsic = self.decoder.probe_size(&data)?;
            if intrinsic.is_degenerate() {
                return Err(DecodeError::SizeResolutionFailed { intrinsic });
            }
            return Ok(DecodedImage {
                kind: ContainerKind::Avif,
                dimensions: intrinsic,
                raster: None,
                data: Some(data),
                is_final: true,
            });
        }

        let mut session = self.session(request);
        self.complete(&mut session, data)
    }

    /// Offers the bytes downloaded so far to `session`
    ///
    /// Returns `Ok(None)` while no preview is available. A repeated byte
    /// count returns the previous preview again without decoding.
    pub fn decode_partial(
        &self,
        session: &mut ProgressiveSession<D>,
        data: &Bytes,
    ) -> Result<Option<DecodedImage>> {
        let Some(raster) = session.feed_partial(data)? else {
            return Ok(None);
        };
        let is_final = session.state() == SessionState::Complete;
        Ok(Some(self.wrap(session, raster, data, is_final)))
    }

    /// Finishes `session` with the complete buffer
    pub fn complete(
        &self,
        session: &mut ProgressiveSession<D>,
        data: Bytes,
    ) -> Result<DecodedImage> {
        let raster = session.finish(&data)?;
        Ok(self.wrap(session, raster, &data, true))
    }

    /// Decodes from a reader, reporting previews as bytes arrive
    ///
    /// `on_preview` is called only when a new partial raster appears. The
    /// read stops early with `FormatMismatch` once the leading bytes prove
    /// the stream is not AVIF.
    pub fn decode_stream<R: Read>(
        &self,
        request: &DecodeRequest,
        mut reader: R,
        mut on_preview: impl FnMut(&DecodedImage),
    ) -> Result<DecodedImage> {
        let start = Instant::now();
        let mut session = self.session(request);
        let mut buffer = BytesMut::new();
        let mut chunk = vec![0u8; self.options.chunk_size.max(1)];
        let mut shown: Option<Raster> = None;
        let mut previews = 0usize;

        loop {
            let read = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            buffer.extend_from_slice(&chunk[..read]);

            if !self.options.render {
                // only the signature matters until the stream ends
                if buffer.len() >= avif_signature_len() {
                    ensure_avif(&buffer)?;
                }
                continue;
            }

            let Some(raster) = session.feed_partial(&buffer)? else {
                continue;
            };
            if shown
                .as_ref()
                .is_some_and(|prev| prev.shares_pixels_with(&raster))
            {
                continue;
            }

            previews += 1;
            debug!(bytes = buffer.len(), preview = previews, dims = %raster.dimensions(), "preview ready");
            let attached = self.options.attach_data.then(|| Bytes::copy_from_slice(&buffer));
            on_preview(&DecodedImage {
                kind: ContainerKind::Avif,
                dimensions: session.intrinsic().unwrap_or(raster.dimensions()),
                raster: Some(raster.clone()),
                data: attached,
                is_final: false,
            });
            shown = Some(raster);
        }

        let data = buffer.freeze();
        let total = data.len();
        let image = if self.options.render {
            self.complete(&mut session, data)?
        } else {
            self.decode(request, data)?
        };

        info!(
            bytes = total,
            previews,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "stream decode complete"
        );
        Ok(image)
    }

    fn wrap(
        &self,
        session: &ProgressiveSession<D>,
        raster: Raster,
        data: &Bytes,
        is_final: bool,
    ) -> DecodedImage {
        // header not readable yet: fall back to the preview's own size
        let dimensions = session.intrinsic().unwrap_or(raster.dimensions());
        if !self.options.render {
            return DecodedImage {
                kind: ContainerKind::Avif,
                dimensions,
                raster: None,
                data: Some(data.clone()),
                is_final,
            };
        }
        DecodedImage {
            kind: ContainerKind::Avif,
            dimensions,
            raster: Some(raster),
            data: self.options.attach_data.then(|| data.clone()),
            is_final,
        }
    }
}

fn ensure_avif(data: &[u8]) -> Result<()> {
    match classify(data) {
        ContainerKind::Avif => Ok(()),
        detected => Err(DecodeError::FormatMismatch { detected }),
    }
}
