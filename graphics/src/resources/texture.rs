//! GPU texture resource.

use std::sync::Arc;

use crate::backend::{GpuBackend, TextureHandle};
use crate::error::GraphicsError;
use crate::types::{Extent3d, TextureDescriptor, TextureFormat, TextureUsage};

use super::Sampler;

/// A GPU texture resource.
///
/// Textures are created by [`GraphicsDevice::create_texture`](crate::GraphicsDevice::create_texture)
/// and are reference-counted. Every texture carries the sampler it is read
/// through; sampler slots of a resource set bind the sampler of their paired
/// texture.
///
/// # Example
///
/// ```ignore
/// let texture = device.create_texture(&TextureDescriptor::new_2d(
///     1920, 1080,
///     TextureFormat::Rgba8Unorm,
///     TextureUsage::SAMPLED,
/// ))?;
/// println!("Texture size: {}x{}", texture.width(), texture.height());
/// ```
pub struct Texture {
    backend: Arc<dyn GpuBackend>,
    handle: TextureHandle,
    descriptor: TextureDescriptor,
    sampler: Arc<Sampler>,
}

impl Texture {
    /// Create a new backend texture read through `sampler`.
    pub(crate) fn new(
        backend: Arc<dyn GpuBackend>,
        descriptor: TextureDescriptor,
        sampler: Arc<Sampler>,
    ) -> Result<Self, GraphicsError> {
        let handle = backend.create_texture(&descriptor)?;
        Ok(Self {
            backend,
            handle,
            descriptor,
            sampler,
        })
    }

    /// Get the backend handle.
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Get the texture descriptor.
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    /// Get the sampler this texture is read through.
    pub fn sampler(&self) -> &Arc<Sampler> {
        &self.sampler
    }

    /// Get the texture size.
    pub fn size(&self) -> Extent3d {
        self.descriptor.size
    }

    /// Get the texture width.
    pub fn width(&self) -> u32 {
        self.descriptor.size.width
    }

    /// Get the texture height.
    pub fn height(&self) -> u32 {
        self.descriptor.size.height
    }

    /// Get the texture format.
    pub fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    /// Get the texture usage flags.
    pub fn usage(&self) -> TextureUsage {
        self.descriptor.usage
    }

    /// Get the texture label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.backend.destroy_texture(self.handle);
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("handle", &self.handle)
            .field("size", &self.descriptor.size)
            .field("format", &self.descriptor.format)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Ensure Texture is Send + Sync
static_assertions::assert_impl_all!(Texture: Send, Sync);
