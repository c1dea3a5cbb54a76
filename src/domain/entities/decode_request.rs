//! Decode request entity

/// Inputs to a single decode, independent of the bytes themselves
///
/// Width and height are optional constraints in pixels; non-finite or
/// non-positive values count as absent. A `max_content_size` of zero means
/// the output is not capped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeRequest {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub max_content_size: u32,
    pub scale: f64,
}

impl Default for DecodeRequest {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            max_content_size: 0,
            scale: 1.0,
        }
    }
}

impl DecodeRequest {
    /// A request that keeps the intrinsic size
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrains the output width
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Constrains the output height
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    /// Caps the longest side of the output
    pub fn with_max_content_size(mut self, max_content_size: u32) -> Self {
        self.max_content_size = max_content_size;
        self
    }

    /// Sets the pixel scale factor
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}
