pub mod application;
pub mod domain;
mod error;
pub mod infrastructure;

pub use application::AvifImageDecoder;
pub use application::dto::DecodeOptions;
pub use domain::entities::{
    ByteSignature, ContainerKind, DecodeRequest, DecodedImage, Dimensions, Raster,
};
pub use domain::repositories::{BitstreamDecoder, DecoderError};
pub use domain::services::{
    ProgressiveSession, SessionState, SignatureRegistry, classify, is_avif, resolve,
};
pub use error::{DecodeError, Result};
pub use infrastructure::decoders::ImageRsDecoder;
