//! Domain entities
//!
//! Value types shared by the sniffer, the size resolver and the
//! progressive decode session.

mod decode_request;
mod dimensions;
mod file_signature;
mod raster;

pub use decode_request::DecodeRequest;
pub use dimensions::Dimensions;
pub(crate) use dimensions::clamp_side;
pub use file_signature::{ByteSignature, ContainerKind};
pub use raster::{DecodedImage, RGBA_CHANNELS, Raster};
