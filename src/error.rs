use crate::domain::entities::{ContainerKind, Dimensions};
use crate::domain::repositories::DecoderError;
use std::io;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    #[error("Format mismatch: expected AVIF, found {detected}")]
    FormatMismatch { detected: ContainerKind },

    #[error("Cannot resolve a target size from intrinsic size {intrinsic}")]
    SizeResolutionFailed { intrinsic: Dimensions },

    #[error("Decode error: {0}")]
    Codec(#[from] DecoderError),

    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        DecodeError::Io(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
