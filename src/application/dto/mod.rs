//! Data Transfer Objects

mod decode_options;

pub use decode_options::DecodeOptions;
