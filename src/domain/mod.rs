//! Domain layer - Core decoding logic
//!
//! Entities, the decoder port, and the services that sniff, size and
//! progressively decode. Nothing here touches I/O.

pub mod entities;
pub mod repositories;
pub mod services;
