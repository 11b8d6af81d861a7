//! Render target output description.

use super::TextureFormat;

/// Attachment formats a pipeline renders into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputDescription {
    /// Color attachment formats, in attachment order.
    pub color_formats: Vec<TextureFormat>,
    /// Depth attachment format, if any.
    pub depth_format: Option<TextureFormat>,
    /// Sample count for multisampling.
    pub sample_count: u32,
}

impl OutputDescription {
    /// Create an output with no attachments.
    pub fn new() -> Self {
        Self {
            color_formats: Vec::new(),
            depth_format: None,
            sample_count: 1,
        }
    }

    /// Add a color attachment format.
    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_formats.push(format);
        self
    }

    /// Set the depth attachment format.
    pub fn with_depth_format(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    /// Set the sample count.
    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count;
        self
    }
}

impl Default for OutputDescription {
    /// An sRGB color target with a 32-bit float depth buffer.
    fn default() -> Self {
        Self::new()
            .with_color_format(TextureFormat::Bgra8UnormSrgb)
            .with_depth_format(TextureFormat::Depth32Float)
    }
}
