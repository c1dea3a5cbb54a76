//! Repository traits (interfaces)
//!
//! Contracts for the external collaborators the domain depends on.

mod bitstream_decoder;

pub use bitstream_decoder::{BitstreamDecoder, DecoderError};
