//! Progressive decode session
//!
//! One session is bound to one image load. Hosts call
//! [`ProgressiveSession::feed_partial`] every time more of the download is
//! available and [`ProgressiveSession::finish`] once the whole buffer is
//! known.
//!
//! ```text
//! Empty -> Accumulating -> PartiallyDecoded -> Complete
//!   \___________\_________________\__________-> Failed
//! ```
//!
//! The decoder is only consulted when the byte count grows past the last
//! count this session saw. Repeating a count, or reporting fewer bytes, is
//! a no-op that hands back the newest raster produced so far, so previews
//! never go backwards and identical ranges are never decoded twice.

use crate::domain::entities::{ContainerKind, DecodeRequest, Dimensions, Raster};
use crate::domain::repositories::BitstreamDecoder;
use crate::domain::services::signature_registry::{avif_signature_len, classify};
use crate::domain::services::size_resolver::resolve;
use crate::error::{DecodeError, Result};
use tracing::{debug, trace, warn};

/// Lifecycle of a [`ProgressiveSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No bytes observed yet
    Empty,
    /// Bytes arrived but no raster can be produced yet
    Accumulating,
    /// At least one preview raster was produced from a prefix
    PartiallyDecoded,
    /// The final raster was produced from the full buffer
    Complete,
    /// Terminal; the recorded failure is returned by every later call
    Failed,
}

/// Stateful decoder for one in-flight download
///
/// Sessions share nothing with each other and do no locking. The host must
/// not call a single session from two threads at once.
pub struct ProgressiveSession<D> {
    decoder: D,
    request: DecodeRequest,
    state: SessionState,
    /// Largest byte count reported by the host
    bytes_observed: usize,
    /// Largest byte count handed to the decoder, never above `bytes_observed`
    watermark: usize,
    latest: Option<Raster>,
    intrinsic: Option<Dimensions>,
    target: Option<Dimensions>,
    failure: Option<DecodeError>,
    partial_decodes: usize,
}

impl<D: BitstreamDecoder> ProgressiveSession<D> {
    /// Creates a session that owns `decoder` for the lifetime of one load
    pub fn new(decoder: D, request: DecodeRequest) -> Self {
        Self {
            decoder,
            request,
            state: SessionState::Empty,
            bytes_observed: 0,
            watermark: 0,
            latest: None,
            intrinsic: None,
            target: None,
            failure: None,
            partial_decodes: 0,
        }
    }

    /// Offers every byte received so far
    ///
    /// Returns `Ok(None)` while no raster can be produced yet, and the
    /// newest raster once one exists. After [`finish`](Self::finish)
    /// succeeded this returns the final raster.
    ///
    /// # Errors
    ///
    /// [`DecodeError::FormatMismatch`] once enough bytes prove the stream
    /// is not AVIF, or the decoder's error if it rejects the prefix. Either
    /// moves the session to [`SessionState::Failed`] and the same error is
    /// returned by every later call.
    pub fn feed_partial(&mut self, data: &[u8]) -> Result<Option<Raster>> {
        match self.state {
            SessionState::Failed => return Err(self.recorded_failure()),
            SessionState::Complete => return Ok(self.latest.clone()),
            _ => {}
        }

        let total = data.len();
        if total <= self.bytes_observed {
            trace!(total, observed = self.bytes_observed, "no new bytes, skipping decode");
            return Ok(self.latest.clone());
        }
        self.bytes_observed = total;

        let kind = classify(data);
        if kind != ContainerKind::Avif {
            if kind == ContainerKind::Unknown && total < avif_signature_len() {
                self.transition(SessionState::Accumulating);
                return Ok(None);
            }
            return Err(self.fail(DecodeError::FormatMismatch { detected: kind }));
        }

        if self.intrinsic.is_none() {
            // a prefix that cannot be probed yet is not a failure
            self.intrinsic = self.decoder.probe_size(data).ok();
        }

        self.watermark = total;
        self.partial_decodes += 1;
        debug!(total, attempt = self.partial_decodes, "partial decode");

        match self.decoder.decode_partial(data) {
            Ok(Some(raster)) => {
                self.latest = Some(raster.clone());
                self.transition(SessionState::PartiallyDecoded);
                Ok(Some(raster))
            }
            Ok(None) => {
                if self.latest.is_none() {
                    self.transition(SessionState::Accumulating);
                }
                Ok(self.latest.clone())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Decodes the complete buffer in one shot
    ///
    /// Independent of any partial progress: the intrinsic size is probed
    /// from `data`, the target is resolved from the request, and the
    /// decoder produces the final raster. Calling this again after success
    /// returns the same raster without decoding.
    ///
    /// # Errors
    ///
    /// `FormatMismatch`, `SizeResolutionFailed` or the decoder's error; the
    /// session is then [`SessionState::Failed`]. A session that already
    /// failed returns its recorded failure.
    pub fn finish(&mut self, data: &[u8]) -> Result<Raster> {
        match self.state {
            SessionState::Failed => return Err(self.recorded_failure()),
            SessionState::Complete => {
                if let Some(raster) = &self.latest {
                    return Ok(raster.clone());
                }
            }
            _ => {}
        }

        self.bytes_observed = self.bytes_observed.max(data.len());

        let kind = classify(data);
        if kind != ContainerKind::Avif {
            return Err(self.fail(DecodeError::FormatMismatch { detected: kind }));
        }

        let intrinsic = match self.decoder.probe_size(data) {
            Ok(size) => size,
            Err(err) => return Err(self.fail(err.into())),
        };
        self.intrinsic = Some(intrinsic);

        let target = match resolve(intrinsic, self.request.width, self.request.height) {
            Ok(target) => target,
            Err(err) => {
                return Err(self.fail(DecodeError::SizeResolutionFailed {
                    intrinsic: err.intrinsic,
                }));
            }
        };
        self.target = Some(target);
        self.watermark = data.len();

        debug!(
            bytes = data.len(),
            %intrinsic,
            %target,
            max_content_size = self.request.max_content_size,
            scale = self.request.scale,
            "full decode"
        );

        match self.decoder.decode_full(
            data,
            target,
            self.request.max_content_size,
            self.request.scale,
        ) {
            Ok(raster) => {
                self.latest = Some(raster.clone());
                self.transition(SessionState::Complete);
                Ok(raster)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn request(&self) -> &DecodeRequest {
        &self.request
    }

    /// Largest byte count reported so far
    pub fn bytes_observed(&self) -> usize {
        self.bytes_observed
    }

    /// Largest byte count the decoder has consumed
    pub fn watermark(&self) -> usize {
        self.watermark
    }

    /// Newest raster, preview or final
    pub fn latest_raster(&self) -> Option<&Raster> {
        self.latest.as_ref()
    }

    /// Intrinsic size, once the decoder could read it
    pub fn intrinsic(&self) -> Option<Dimensions> {
        self.intrinsic
    }

    /// Resolved target size, known after [`finish`](Self::finish)
    pub fn target(&self) -> Option<Dimensions> {
        self.target
    }

    /// Number of times the decoder was asked for a partial raster
    pub fn partial_decodes(&self) -> usize {
        self.partial_decodes
    }

    pub fn failure(&self) -> Option<&DecodeError> {
        self.failure.as_ref()
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "session state change");
            self.state = next;
        }
    }

    fn fail(&mut self, err: DecodeError) -> DecodeError {
        warn!(error = %err, observed = self.bytes_observed, "decode session failed");
        self.transition(SessionState::Failed);
        self.failure = Some(err.clone());
        err
    }

    fn recorded_failure(&self) -> DecodeError {
        self.failure
            .clone()
            .unwrap_or(DecodeError::FormatMismatch {
                detected: ContainerKind::Unknown,
            })
    }
}
