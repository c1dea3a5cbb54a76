//! Domain services
//!
//! Sniffing, target sizing and the progressive decode state machine.

mod progressive_session;
mod signature_registry;
mod size_resolver;

pub use progressive_session::{ProgressiveSession, SessionState};
pub use signature_registry::{
    DEFAULT_SIGNATURES, FTYP_OFFSET, SignatureRegistry, avif_signature_len, classify, is_avif,
};
pub use size_resolver::{SizeResolutionError, resolve};
