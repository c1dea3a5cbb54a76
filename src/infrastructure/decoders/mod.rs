//! Bitstream decoder adapters

mod image_rs_decoder;

pub use image_rs_decoder::ImageRsDecoder;
