//! Container kinds and the byte signatures that identify them
//!
//! A signature is a fixed pattern of bytes, with optional wildcard
//! positions, expected at a fixed offset from the start of a buffer.
//! Nothing past the signature is ever parsed here.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Container formats recognized by the sniffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// WebP image (RIFF container)
    WebP,
    /// ISO base media file with the `isom` brand
    Mp4,
    /// MPEG-4 video with the `mp42` or `M4V ` brand
    M4v,
    /// QuickTime movie
    Mov,
    /// AV1 image file, still (`avif`) or sequence (`avis`)
    Avif,
    /// Not enough data, or a format we do not know
    Unknown,
}

impl ContainerKind {
    /// Returns the typical file extension for this kind
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerKind::Jpeg => "jpg",
            ContainerKind::Png => "png",
            ContainerKind::Gif => "gif",
            ContainerKind::WebP => "webp",
            ContainerKind::Mp4 => "mp4",
            ContainerKind::M4v => "m4v",
            ContainerKind::Mov => "mov",
            ContainerKind::Avif => "avif",
            ContainerKind::Unknown => "bin",
        }
    }

    /// Returns the MIME type for this kind
    pub fn mime_type(&self) -> &'static str {
        match self {
            ContainerKind::Jpeg => "image/jpeg",
            ContainerKind::Png => "image/png",
            ContainerKind::Gif => "image/gif",
            ContainerKind::WebP => "image/webp",
            ContainerKind::Mp4 => "video/mp4",
            ContainerKind::M4v => "video/x-m4v",
            ContainerKind::Mov => "video/quicktime",
            ContainerKind::Avif => "image/avif",
            ContainerKind::Unknown => "application/octet-stream",
        }
    }

    /// Returns the uniform type identifier hosts use to tag assets
    pub fn type_identifier(&self) -> &'static str {
        match self {
            ContainerKind::Jpeg => "public.jpeg",
            ContainerKind::Png => "public.png",
            ContainerKind::Gif => "com.compuserve.gif",
            ContainerKind::WebP => "org.webmproject.webp",
            ContainerKind::Mp4 => "public.mpeg-4",
            ContainerKind::M4v => "com.apple.m4v-video",
            ContainerKind::Mov => "com.apple.quicktime-movie",
            ContainerKind::Avif => "public.avif",
            ContainerKind::Unknown => "public.data",
        }
    }

    /// Returns a human-readable name for this kind
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Jpeg => "JPEG Image",
            ContainerKind::Png => "PNG Image",
            ContainerKind::Gif => "GIF Image",
            ContainerKind::WebP => "WebP Image",
            ContainerKind::Mp4 => "MP4 Video",
            ContainerKind::M4v => "M4V Video",
            ContainerKind::Mov => "QuickTime Movie",
            ContainerKind::Avif => "AVIF Image",
            ContainerKind::Unknown => "Unknown",
        }
    }

    /// True for the video containers
    pub fn is_video(&self) -> bool {
        matches!(
            self,
            ContainerKind::Mp4 | ContainerKind::M4v | ContainerKind::Mov
        )
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A byte pattern, anchored at an offset, that identifies one container kind
///
/// `None` entries in the pattern are wildcards and match any byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSignature {
    kind: ContainerKind,
    pattern: Cow<'static, [Option<u8>]>,
    offset: usize,
}

impl ByteSignature {
    /// Creates a signature anchored at the start of the buffer
    pub const fn new(kind: ContainerKind, pattern: &'static [Option<u8>]) -> Self {
        Self {
            kind,
            pattern: Cow::Borrowed(pattern),
            offset: 0,
        }
    }

    /// Creates a signature from an owned pattern, for tables built at runtime
    pub fn from_pattern(kind: ContainerKind, pattern: Vec<Option<u8>>) -> Self {
        Self {
            kind,
            pattern: Cow::Owned(pattern),
            offset: 0,
        }
    }

    /// Moves the anchor of this signature to `offset`
    pub const fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the container kind this signature identifies
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Returns the pattern, wildcards included
    pub fn pattern(&self) -> &[Option<u8>] {
        &self.pattern
    }

    /// Returns the offset the pattern is anchored at
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of leading bytes a buffer needs before this signature can match
    pub fn required_len(&self) -> usize {
        self.offset + self.pattern.len()
    }

    /// Checks the pattern against `data`
    ///
    /// Buffers shorter than [`required_len`](Self::required_len) never match.
    pub fn matches(&self, data: &[u8]) -> bool {
        let Some(window) = data.get(self.offset..self.required_len()) else {
            return false;
        };
        window
            .iter()
            .zip(self.pattern.iter())
            .all(|(byte, expected)| expected.is_none_or(|b| b == *byte))
    }
}
