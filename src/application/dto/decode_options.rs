//! Decode options DTO

use crate::domain::entities::DecodeRequest;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration of an [`AvifImageDecoder`](crate::application::AvifImageDecoder)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Produce rasters; when false only dimensions are reported
    pub render: bool,
    /// Attach the source bytes to every result
    pub attach_data: bool,
    /// Default width constraint for requests that set none
    pub width: Option<f64>,
    /// Default height constraint for requests that set none
    pub height: Option<f64>,
    /// Cap on the longest output side (0 = unbounded)
    pub max_content_size: u32,
    /// Pixel scale factor
    pub scale: f64,
    /// Read size used when decoding from a stream
    pub chunk_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            render: true,
            attach_data: false,
            width: None,
            height: None,
            max_content_size: 0,
            scale: 1.0,
            chunk_size: 16 * 1024, // 16KB reads
        }
    }
}

impl DecodeOptions {
    /// Parses options from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Loads options from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read options from {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("invalid options in {}", path.display()))
    }

    /// Switches to metadata-only mode
    pub fn metadata_only(mut self) -> Self {
        self.render = false;
        self
    }

    /// Attaches source bytes to results
    pub fn with_attached_data(mut self) -> Self {
        self.attach_data = true;
        self
    }

    /// Sets the default constraints
    pub fn with_size(mut self, width: Option<f64>, height: Option<f64>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the default cap on the longest output side
    pub fn with_max_content_size(mut self, max_content_size: u32) -> Self {
        self.max_content_size = max_content_size;
        self
    }

    /// Sets the default pixel scale
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the stream read size
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// A request seeded from these options
    pub fn request(&self) -> DecodeRequest {
        DecodeRequest {
            width: self.width,
            height: self.height,
            max_content_size: self.max_content_size,
            scale: self.scale,
        }
    }

    /// Fills what `request` leaves at its defaults from these options
    ///
    /// Width and height are taken together, and only when the request sets
    /// neither. The cap applies when the request's is 0 and the scale when
    /// the request's is 1.
    pub fn apply_defaults(&self, request: &DecodeRequest) -> DecodeRequest {
        let mut filled = *request;
        if request.width.is_none() && request.height.is_none() {
            filled.width = self.width;
            filled.height = self.height;
        }
        if request.max_content_size == 0 {
            filled.max_content_size = self.max_content_size;
        }
        if request.scale == 1.0 {
            filled.scale = self.scale;
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let options = DecodeOptions::from_json_str(r#"{"width": 320, "attach_data": true}"#).unwrap();
        assert_eq!(options.width, Some(320.0));
        assert!(options.attach_data);
        assert!(options.render);
        assert_eq!(options.chunk_size, 16 * 1024);
    }

    #[test]
    fn request_from_options() {
        let options = DecodeOptions::default().with_size(None, Some(90.0));
        let request = options.request();
        assert_eq!(request.width, None);
        assert_eq!(request.height, Some(90.0));
        assert_eq!(request.scale, 1.0);
    }

    #[test]
    fn explicit_request_constraints_win() {
        let options = DecodeOptions::default().with_size(Some(10.0), Some(10.0));
        let explicit = DecodeRequest::new().with_width(50.0).with_scale(3.0);
        assert_eq!(options.apply_defaults(&explicit), explicit);

        let bare = DecodeRequest::new().with_scale(3.0);
        let filled = options.apply_defaults(&bare);
        assert_eq!(filled.width, Some(10.0));
        assert_eq!(filled.height, Some(10.0));
        assert_eq!(filled.scale, 3.0);
    }

    #[test]
    fn cap_and_scale_fill_default_requests() {
        let options = DecodeOptions::default()
            .with_max_content_size(512)
            .with_scale(2.0);

        let filled = options.apply_defaults(&DecodeRequest::new().with_width(64.0));
        assert_eq!(filled.width, Some(64.0));
        assert_eq!(filled.max_content_size, 512);
        assert_eq!(filled.scale, 2.0);

        let explicit = DecodeRequest::new().with_max_content_size(100).with_scale(3.0);
        assert_eq!(options.apply_defaults(&explicit), explicit);
    }
}
