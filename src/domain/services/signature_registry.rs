//! Signature registry service
//!
//! Holds the ordered table of container signatures and classifies
//! buffers against it. Signatures are tried in table order and the first
//! match wins, so the table is written with no two kinds able to match the
//! same buffer.

use crate::domain::entities::{ByteSignature, ContainerKind};

const JPEG: &[Option<u8>] = &[Some(0xFF), Some(0xD8), Some(0xFF)];
const PNG: &[Option<u8>] = &[
    Some(0x89),
    Some(0x50),
    Some(0x4E),
    Some(0x47),
    Some(0x0D),
    Some(0x0A),
    Some(0x1A),
    Some(0x0A),
];
const GIF: &[Option<u8>] = &[Some(b'G'), Some(b'I'), Some(b'F')];
// RIFF....WEBP
const WEBP: &[Option<u8>] = &[
    Some(b'R'),
    Some(b'I'),
    Some(b'F'),
    Some(b'F'),
    None,
    None,
    None,
    None,
    Some(b'W'),
    Some(b'E'),
    Some(b'B'),
    Some(b'P'),
];
// ISO BMFF brands follow the `ftyp` box type at offset 4
const FTYP_ISOM: &[Option<u8>] = &ftyp_brand(*b"isom");
const FTYP_MP42: &[Option<u8>] = &ftyp_brand(*b"mp42");
const FTYP_M4V: &[Option<u8>] = &ftyp_brand(*b"M4V ");
const FTYP_QT: &[Option<u8>] = &ftyp_brand(*b"qt  ");
// `avi` covers both the still (`avif`) and sequence (`avis`) brands
const FTYP_AVI: &[Option<u8>] = &[
    Some(b'f'),
    Some(b't'),
    Some(b'y'),
    Some(b'p'),
    Some(b'a'),
    Some(b'v'),
    Some(b'i'),
];

/// Offset of the `ftyp` box type in ISO base media files
pub const FTYP_OFFSET: usize = 4;

const fn ftyp_brand(brand: [u8; 4]) -> [Option<u8>; 8] {
    [
        Some(b'f'),
        Some(b't'),
        Some(b'y'),
        Some(b'p'),
        Some(brand[0]),
        Some(brand[1]),
        Some(brand[2]),
        Some(brand[3]),
    ]
}

/// Built-in signature table, in evaluation order
pub static DEFAULT_SIGNATURES: &[ByteSignature] = &[
    ByteSignature::new(ContainerKind::Jpeg, JPEG),
    ByteSignature::new(ContainerKind::Png, PNG),
    ByteSignature::new(ContainerKind::Gif, GIF),
    ByteSignature::new(ContainerKind::WebP, WEBP),
    ByteSignature::new(ContainerKind::Mp4, FTYP_ISOM).with_offset(FTYP_OFFSET),
    ByteSignature::new(ContainerKind::M4v, FTYP_MP42).with_offset(FTYP_OFFSET),
    ByteSignature::new(ContainerKind::M4v, FTYP_M4V).with_offset(FTYP_OFFSET),
    ByteSignature::new(ContainerKind::Mov, FTYP_QT).with_offset(FTYP_OFFSET),
    ByteSignature::new(ContainerKind::Avif, FTYP_AVI).with_offset(FTYP_OFFSET),
];

/// Classifies `data` against the built-in table
///
/// Returns [`ContainerKind::Unknown`] when nothing matches, including for
/// buffers too short to evaluate any signature.
pub fn classify(data: &[u8]) -> ContainerKind {
    classify_with(DEFAULT_SIGNATURES, data)
}

/// Fast-path check used before handing bytes to an AVIF decoder
///
/// Exactly `classify(data) == ContainerKind::Avif`.
pub fn is_avif(data: &[u8]) -> bool {
    classify(data) == ContainerKind::Avif
}

/// Bytes needed before the AVIF signature can be evaluated
pub fn avif_signature_len() -> usize {
    DEFAULT_SIGNATURES
        .iter()
        .filter(|sig| sig.kind() == ContainerKind::Avif)
        .map(ByteSignature::required_len)
        .max()
        .unwrap_or(0)
}

fn classify_with(signatures: &[ByteSignature], data: &[u8]) -> ContainerKind {
    signatures
        .iter()
        .find(|sig| sig.matches(data))
        .map(ByteSignature::kind)
        .unwrap_or(ContainerKind::Unknown)
}

/// Registry of container signatures
///
/// The default registry wraps the built-in table. Custom registries are
/// plain values owned by the caller; nothing here is global or mutable
/// behind the caller's back.
///
/// # Example
///
/// ```
/// use avif_stream::domain::entities::ContainerKind;
/// use avif_stream::domain::services::SignatureRegistry;
///
/// let registry = SignatureRegistry::default_images();
/// let data = b"\x00\x00\x00\x1cftypavif\x00\x00\x00\x00";
/// assert_eq!(registry.classify(data), ContainerKind::Avif);
/// assert_eq!(registry.classify(&[0xFF, 0xD8]), ContainerKind::Unknown);
/// ```
#[derive(Debug, Clone)]
pub struct SignatureRegistry {
    signatures: Vec<ByteSignature>,
}

impl SignatureRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            signatures: Vec::new(),
        }
    }

    /// Creates a registry with the built-in image and video signatures
    pub fn default_images() -> Self {
        Self {
            signatures: DEFAULT_SIGNATURES.to_vec(),
        }
    }

    /// Appends a signature; it is evaluated after every existing one
    pub fn register(&mut self, signature: ByteSignature) {
        self.signatures.push(signature);
    }

    /// Returns the signatures in evaluation order
    pub fn signatures(&self) -> &[ByteSignature] {
        &self.signatures
    }

    /// Returns all signatures registered for a kind
    pub fn get_signatures(&self, kind: ContainerKind) -> impl Iterator<Item = &ByteSignature> {
        self.signatures.iter().filter(move |sig| sig.kind() == kind)
    }

    /// Returns the first matching kind, or `Unknown`
    pub fn classify(&self, data: &[u8]) -> ContainerKind {
        classify_with(&self.signatures, data)
    }

    /// True if `data` classifies as `kind`
    pub fn is_kind(&self, data: &[u8], kind: ContainerKind) -> bool {
        self.classify(data) == kind
    }

    /// Returns the number of registered signatures
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::default_images()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn avif(brand: &[u8; 4]) -> Vec<u8> {
        let mut data = vec![0x00, 0x00, 0x00, 0x1C];
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(brand);
        data.extend_from_slice(&[0x00; 8]);
        data
    }

    #[test]
    fn classifies_each_builtin_kind() {
        assert_eq!(classify(&[0xFF, 0xD8, 0xFF, 0xE0]), ContainerKind::Jpeg);
        assert_eq!(
            classify(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            ContainerKind::Png
        );
        assert_eq!(classify(b"GIF89a"), ContainerKind::Gif);
        assert_eq!(classify(b"RIFF\x24\x00\x00\x00WEBPVP8 "), ContainerKind::WebP);
        assert_eq!(classify(b"\x00\x00\x00\x20ftypisom"), ContainerKind::Mp4);
        assert_eq!(classify(b"\x00\x00\x00\x20ftypmp42"), ContainerKind::M4v);
        assert_eq!(classify(b"\x00\x00\x00\x20ftypM4V "), ContainerKind::M4v);
        assert_eq!(classify(b"\x00\x00\x00\x14ftypqt  "), ContainerKind::Mov);
        assert_eq!(classify(&avif(b"avif")), ContainerKind::Avif);
        assert_eq!(classify(&avif(b"avis")), ContainerKind::Avif);
    }

    #[test]
    fn unknown_for_empty_and_foreign_data() {
        assert_eq!(classify(&[]), ContainerKind::Unknown);
        assert_eq!(classify(b"BM\x00\x00"), ContainerKind::Unknown);
        assert_eq!(classify(b"\x00\x00\x00\x1cftypheic"), ContainerKind::Unknown);
    }

    #[test]
    fn avif_predicate_needs_full_signature() {
        let data = avif(b"avif");
        assert_eq!(avif_signature_len(), 11);
        assert!(is_avif(&data[..11]));
        assert!(!is_avif(&data[..10]));
    }

    #[test]
    fn avif_predicate_rejects_other_kinds() {
        assert!(!is_avif(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]));
        assert!(!is_avif(b"\x00\x00\x00\x20ftypisom"));
        assert!(!is_avif(b"\x00\x00\x00\x14ftypqt  "));
    }

    #[test]
    fn custom_registry_keeps_table_order() {
        let mut registry = SignatureRegistry::new();
        assert_eq!(registry.classify(b"BM"), ContainerKind::Unknown);

        registry.register(ByteSignature::from_pattern(
            ContainerKind::Png,
            vec![Some(b'B'), Some(b'M')],
        ));
        registry.register(ByteSignature::from_pattern(
            ContainerKind::Gif,
            vec![Some(b'B'), None],
        ));
        assert_eq!(registry.classify(b"BM"), ContainerKind::Png);
        assert_eq!(registry.classify(b"BX"), ContainerKind::Gif);
        assert_eq!(registry.signature_count(), 2);
    }

    #[test]
    fn default_registry_matches_free_functions() {
        let registry = SignatureRegistry::default();
        assert_eq!(registry.signature_count(), DEFAULT_SIGNATURES.len());
        assert_eq!(registry.get_signatures(ContainerKind::M4v).count(), 2);
        assert!(registry.is_kind(&avif(b"avif"), ContainerKind::Avif));
    }

    proptest! {
        #[test]
        fn never_panics_and_agrees_with_registry(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let registry = SignatureRegistry::default_images();
            prop_assert_eq!(classify(&data), registry.classify(&data));
        }

        #[test]
        fn short_buffers_never_match_a_signature(data in proptest::collection::vec(any::<u8>(), 0..16)) {
            for sig in DEFAULT_SIGNATURES {
                if data.len() < sig.required_len() {
                    prop_assert!(!sig.matches(&data));
                }
            }
        }

        #[test]
        fn avif_brand_always_detected(size in any::<[u8; 4]>(), tail in proptest::collection::vec(any::<u8>(), 0..32), sequence in any::<bool>()) {
            // a box size starting FF D8 FF would be claimed by JPEG first
            prop_assume!(size[..3] != [0xFF, 0xD8, 0xFF]);
            prop_assume!(size[..3] != [b'G', b'I', b'F']);
            let mut data = size.to_vec();
            data.extend_from_slice(if sequence { b"ftypavis" } else { b"ftypavif" });
            data.extend_from_slice(&tail);
            prop_assert!(is_avif(&data));
        }
    }
}
