//! Placeholder resources.
//!
//! Bound in place of a texture or structured buffer that a property state
//! does not provide, or provides without the usage the slot needs.
//! Created once per [`GraphicsDevice`](crate::GraphicsDevice) and dropped
//! with it.

use std::sync::Arc;

use crate::backend::GpuBackend;
use crate::error::GraphicsError;
use crate::resources::{Buffer, Sampler, Texture};
use crate::types::{
    BufferDescriptor, BufferUsage, SamplerDescriptor, TextureDescriptor, TextureFormat,
    TextureUsage,
};

/// Size of the placeholder structured buffers.
const PLACEHOLDER_BUFFER_SIZE: u64 = 16;

/// Shared, immutable placeholder resources.
#[derive(Debug)]
pub struct DefaultResources {
    point_sampler: Arc<Sampler>,
    white_texture: Arc<Texture>,
    read_write_texture: Arc<Texture>,
    read_only_buffer: Arc<Buffer>,
    read_write_buffer: Arc<Buffer>,
}

impl DefaultResources {
    /// Create the placeholder set on `backend`.
    pub(crate) fn new(backend: &Arc<dyn GpuBackend>) -> Result<Self, GraphicsError> {
        let point_sampler = Arc::new(Sampler::new(
            backend.clone(),
            SamplerDescriptor::point().with_label("default_point_sampler"),
        )?);

        let white_texture = Arc::new(Texture::new(
            backend.clone(),
            TextureDescriptor::new_2d(
                1,
                1,
                TextureFormat::Rgba8Unorm,
                TextureUsage::SAMPLED | TextureUsage::COPY_DST,
            )
            .with_label("default_white"),
            point_sampler.clone(),
        )?);

        let read_write_texture = Arc::new(Texture::new(
            backend.clone(),
            TextureDescriptor::new_2d(
                1,
                1,
                TextureFormat::Rgba8Unorm,
                TextureUsage::SAMPLED | TextureUsage::STORAGE,
            )
            .with_label("default_read_write"),
            point_sampler.clone(),
        )?);

        let read_only_buffer = Arc::new(Buffer::new(
            backend.clone(),
            BufferDescriptor::new(PLACEHOLDER_BUFFER_SIZE, BufferUsage::STRUCTURED_READ_ONLY)
                .with_label("default_read_only_buffer"),
        )?);

        let read_write_buffer = Arc::new(Buffer::new(
            backend.clone(),
            BufferDescriptor::new(PLACEHOLDER_BUFFER_SIZE, BufferUsage::STRUCTURED_READ_WRITE)
                .with_label("default_read_write_buffer"),
        )?);

        log::debug!("Created default placeholder resources");

        Ok(Self {
            point_sampler,
            white_texture,
            read_write_texture,
            read_only_buffer,
            read_write_buffer,
        })
    }

    /// Point sampler shared by the placeholder textures.
    pub fn point_sampler(&self) -> &Arc<Sampler> {
        &self.point_sampler
    }

    /// 1x1 white texture for read-only texture slots.
    pub fn white_texture(&self) -> &Arc<Texture> {
        &self.white_texture
    }

    /// 1x1 storage texture for read-write texture slots.
    pub fn read_write_texture(&self) -> &Arc<Texture> {
        &self.read_write_texture
    }

    /// Empty buffer for read-only structured buffer slots.
    pub fn read_only_buffer(&self) -> &Arc<Buffer> {
        &self.read_only_buffer
    }

    /// Empty buffer for read-write structured buffer slots.
    pub fn read_write_buffer(&self) -> &Arc<Buffer> {
        &self.read_write_buffer
    }
}
