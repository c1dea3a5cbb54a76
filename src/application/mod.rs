//! Application layer
//!
//! Use cases and configuration that orchestrate the domain services.

pub mod dto;
mod decode_image;

pub use decode_image::AvifImageDecoder;
