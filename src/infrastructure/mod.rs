//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories.
//! This layer holds the codec crate dependencies.

pub mod decoders;
