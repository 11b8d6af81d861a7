//! Graphics device.
//!
//! The [`GraphicsDevice`] is the main interface for creating GPU resources and
//! shader pipelines. It owns the backend and the placeholder resources that
//! binding falls back to.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::backend::{DummyBackend, GpuBackend};
use crate::command::CommandList;
use crate::defaults::DefaultResources;
use crate::error::GraphicsError;
use crate::resources::{Buffer, Sampler, Texture};
use crate::shader::{ShaderPipeline, ShaderPipelineDescriptor};
use crate::types::{BufferDescriptor, OutputDescription, SamplerDescriptor, TextureDescriptor};

/// Parameters for creating a [`GraphicsDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceParameters {
    /// Device label used in logs.
    pub label: String,
    /// Output used by pipelines created without an explicit output.
    pub output: OutputDescription,
    /// Alignment uniform buffer sizes are rounded up to.
    pub uniform_alignment: u64,
    /// Maximum buffer size.
    pub max_buffer_size: u64,
}

impl Default for DeviceParameters {
    fn default() -> Self {
        Self {
            label: "Lumen Device".to_string(),
            output: OutputDescription::default(),
            uniform_alignment: 16,
            max_buffer_size: 1 << 30, // 1 GB
        }
    }
}

impl DeviceParameters {
    /// Create default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the default output description.
    pub fn with_output(mut self, output: OutputDescription) -> Self {
        self.output = output;
        self
    }

    /// Set the uniform buffer size alignment.
    pub fn with_uniform_alignment(mut self, alignment: u64) -> Self {
        self.uniform_alignment = alignment;
        self
    }

    /// Set the maximum buffer size.
    pub fn with_max_buffer_size(mut self, size: u64) -> Self {
        self.max_buffer_size = size;
        self
    }
}

/// A graphics device for creating GPU resources.
///
/// # Thread Safety
///
/// `GraphicsDevice` is `Send + Sync` and can be safely shared across threads.
/// Resource tracking uses interior mutability.
///
/// # Example
///
/// ```ignore
/// let device = GraphicsDevice::new(Arc::new(DummyBackend::new()), DeviceParameters::new())?;
///
/// let pass = Arc::new(ShaderPass::new("Forward", descriptor, variants)?);
/// let variant = pass.get_variant(None)?.clone();
/// let pipeline = device.create_shader_pipeline(&ShaderPipelineDescriptor::new(pass, variant))?;
/// let mut resources = pipeline.create_resources()?;
/// ```
pub struct GraphicsDevice {
    backend: Arc<dyn GpuBackend>,
    parameters: DeviceParameters,
    defaults: Arc<DefaultResources>,
    // Track allocated resources (weak references for cleanup/debugging)
    buffers: RwLock<Vec<Weak<Buffer>>>,
    textures: RwLock<Vec<Weak<Texture>>>,
    samplers: RwLock<Vec<Weak<Sampler>>>,
    pipelines: RwLock<Vec<Weak<ShaderPipeline>>>,
}

impl GraphicsDevice {
    /// Create a device on `backend`, including its placeholder resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid or the placeholders
    /// cannot be created.
    pub fn new(
        backend: Arc<dyn GpuBackend>,
        parameters: DeviceParameters,
    ) -> Result<Arc<Self>, GraphicsError> {
        if parameters.uniform_alignment == 0 {
            return Err(GraphicsError::InvalidParameter(
                "uniform alignment cannot be zero".to_string(),
            ));
        }

        let defaults = Arc::new(DefaultResources::new(&backend)?);

        log::info!(
            "Graphics device '{}' initialized on {} ({:?} shaders)",
            parameters.label,
            backend.name(),
            backend.shader_target()
        );

        Ok(Arc::new(Self {
            backend,
            parameters,
            defaults,
            buffers: RwLock::new(Vec::new()),
            textures: RwLock::new(Vec::new()),
            samplers: RwLock::new(Vec::new()),
            pipelines: RwLock::new(Vec::new()),
        }))
    }

    /// Create a device on a fresh [`DummyBackend`] with default parameters.
    pub fn dummy() -> Result<Arc<Self>, GraphicsError> {
        Self::new(Arc::new(DummyBackend::new()), DeviceParameters::default())
    }

    /// Get the backend.
    pub fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    /// Get the device label.
    pub fn name(&self) -> &str {
        &self.parameters.label
    }

    /// Get the device parameters.
    pub fn parameters(&self) -> &DeviceParameters {
        &self.parameters
    }

    /// Get the placeholder resources.
    pub fn defaults(&self) -> &Arc<DefaultResources> {
        &self.defaults
    }

    /// Create a GPU buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer size exceeds device limits or allocation fails.
    pub fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<Arc<Buffer>, GraphicsError> {
        if descriptor.size > self.parameters.max_buffer_size {
            return Err(GraphicsError::InvalidParameter(format!(
                "buffer size {} exceeds maximum {}",
                descriptor.size, self.parameters.max_buffer_size
            )));
        }

        if descriptor.size == 0 {
            return Err(GraphicsError::InvalidParameter(
                "buffer size cannot be zero".to_string(),
            ));
        }

        let buffer = Arc::new(Buffer::new(self.backend.clone(), descriptor.clone())?);
        track(&self.buffers, &buffer);

        log::trace!(
            "GraphicsDevice: created buffer {:?}, size={}",
            descriptor.label,
            descriptor.size
        );

        Ok(buffer)
    }

    /// Create a GPU texture read through the default point sampler.
    ///
    /// # Errors
    ///
    /// Returns an error if the texture has a zero dimension or allocation fails.
    pub fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<Arc<Texture>, GraphicsError> {
        self.create_texture_with_sampler(descriptor, self.defaults.point_sampler().clone())
    }

    /// Create a GPU texture read through `sampler`.
    ///
    /// # Errors
    ///
    /// Returns an error if the texture has a zero dimension or allocation fails.
    pub fn create_texture_with_sampler(
        &self,
        descriptor: &TextureDescriptor,
        sampler: Arc<Sampler>,
    ) -> Result<Arc<Texture>, GraphicsError> {
        if descriptor.size.width == 0 || descriptor.size.height == 0 {
            return Err(GraphicsError::InvalidParameter(
                "texture dimensions cannot be zero".to_string(),
            ));
        }

        let texture = Arc::new(Texture::new(
            self.backend.clone(),
            descriptor.clone(),
            sampler,
        )?);
        track(&self.textures, &texture);

        log::trace!(
            "GraphicsDevice: created texture {:?}, size={}x{}",
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height
        );

        Ok(texture)
    }

    /// Create a texture sampler.
    ///
    /// # Errors
    ///
    /// Returns an error if sampler creation fails.
    pub fn create_sampler(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<Arc<Sampler>, GraphicsError> {
        let sampler = Arc::new(Sampler::new(self.backend.clone(), descriptor.clone())?);
        track(&self.samplers, &sampler);

        log::trace!("GraphicsDevice: created sampler {:?}", descriptor.label);

        Ok(sampler)
    }

    /// Create a shader pipeline for a resolved variant of a pass.
    ///
    /// Callers that want to share pipelines can key their own cache by the
    /// descriptor; this method always builds a new pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the variant has no program for the backend's
    /// shader target, its reflected layout is inconsistent, or the backend
    /// rejects a shader module or the resource layout.
    pub fn create_shader_pipeline(
        &self,
        descriptor: &ShaderPipelineDescriptor,
    ) -> Result<Arc<ShaderPipeline>, GraphicsError> {
        let pipeline = Arc::new(ShaderPipeline::new(self, descriptor)?);
        track(&self.pipelines, &pipeline);
        Ok(pipeline)
    }

    /// Execute a recorded command list.
    pub fn submit(&self, commands: &CommandList) -> Result<(), GraphicsError> {
        self.backend.submit(commands)
    }

    /// Read back the contents of a buffer.
    pub fn read_buffer(&self, buffer: &Buffer) -> Result<Vec<u8>, GraphicsError> {
        self.backend.read_buffer(buffer.handle())
    }

    /// Get the number of live buffers created by this device.
    pub fn buffer_count(&self) -> usize {
        self.buffers
            .read()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Get the number of live textures created by this device.
    pub fn texture_count(&self) -> usize {
        self.textures
            .read()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Get the number of live samplers created by this device.
    pub fn sampler_count(&self) -> usize {
        self.samplers
            .read()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Get the number of live shader pipelines created by this device.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines
            .read()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Clean up dead weak references to released resources.
    pub fn cleanup_dead_resources(&self) {
        self.buffers.write().retain(|w| w.strong_count() > 0);
        self.textures.write().retain(|w| w.strong_count() > 0);
        self.samplers.write().retain(|w| w.strong_count() > 0);
        self.pipelines.write().retain(|w| w.strong_count() > 0);
    }
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("name", &self.parameters.label)
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Record `resource` in a tracking list, dropping entries whose resource is gone.
fn track<T>(list: &RwLock<Vec<Weak<T>>>, resource: &Arc<T>) {
    let mut list = list.write();
    list.retain(|w| w.strong_count() > 0);
    list.push(Arc::downgrade(resource));
}

// Ensure GraphicsDevice is Send + Sync
static_assertions::assert_impl_all!(GraphicsDevice: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BufferUsage, TextureFormat, TextureUsage};

    fn create_test_device() -> Arc<GraphicsDevice> {
        GraphicsDevice::dummy().unwrap()
    }

    #[test]
    fn test_device_name() {
        let device = create_test_device();
        assert_eq!(device.name(), "Lumen Device");
        assert_eq!(device.backend().name(), "Dummy Backend");
    }

    #[test]
    fn test_zero_alignment_rejected() {
        let result = GraphicsDevice::new(
            Arc::new(DummyBackend::new()),
            DeviceParameters::new().with_uniform_alignment(0),
        );
        assert!(matches!(result, Err(GraphicsError::InvalidParameter(_))));
    }

    #[test]
    fn test_create_buffer() {
        let device = create_test_device();
        let buffer = device
            .create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))
            .unwrap();
        assert_eq!(buffer.size(), 1024);
        assert_eq!(device.buffer_count(), 1);
    }

    #[test]
    fn test_create_buffer_limits() {
        let device = GraphicsDevice::new(
            Arc::new(DummyBackend::new()),
            DeviceParameters::new().with_max_buffer_size(256),
        )
        .unwrap();
        assert!(
            device
                .create_buffer(&BufferDescriptor::new(0, BufferUsage::VERTEX))
                .is_err()
        );
        assert!(
            device
                .create_buffer(&BufferDescriptor::new(512, BufferUsage::VERTEX))
                .is_err()
        );
    }

    #[test]
    fn test_create_texture_uses_default_sampler() {
        let device = create_test_device();
        let texture = device
            .create_texture(&TextureDescriptor::new_2d(
                512,
                512,
                TextureFormat::Rgba8Unorm,
                TextureUsage::SAMPLED,
            ))
            .unwrap();
        assert_eq!(texture.width(), 512);
        assert!(Arc::ptr_eq(
            texture.sampler(),
            device.defaults().point_sampler()
        ));
        assert_eq!(device.texture_count(), 1);
    }

    #[test]
    fn test_create_texture_zero_size() {
        let device = create_test_device();
        let result = device.create_texture(&TextureDescriptor::new_2d(
            0,
            512,
            TextureFormat::Rgba8Unorm,
            TextureUsage::SAMPLED,
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_sampler() {
        let device = create_test_device();
        let sampler = device.create_sampler(&SamplerDescriptor::linear()).unwrap();
        assert!(sampler.label().is_none());
        assert_eq!(device.sampler_count(), 1);
    }

    #[test]
    fn test_resource_cleanup() {
        let device = create_test_device();
        {
            let _buffer = device
                .create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))
                .unwrap();
            assert_eq!(device.buffer_count(), 1);
        }
        device.cleanup_dead_resources();
        assert_eq!(device.buffer_count(), 0);
    }

    #[test]
    fn test_tracking_lists_stay_bounded() {
        let device = create_test_device();
        let descriptor =
            TextureDescriptor::new_2d(4, 4, TextureFormat::Rgba8Unorm, TextureUsage::SAMPLED);
        let kept = device
            .create_buffer(&BufferDescriptor::new(16, BufferUsage::UNIFORM))
            .unwrap();
        for _ in 0..100 {
            device
                .create_buffer(&BufferDescriptor::new(16, BufferUsage::UNIFORM))
                .unwrap();
            device.create_texture(&descriptor).unwrap();
            device.create_sampler(&SamplerDescriptor::linear()).unwrap();
        }

        assert!(device.buffers.read().len() <= 2);
        assert!(device.textures.read().len() <= 1);
        assert!(device.samplers.read().len() <= 1);
        assert_eq!(device.buffer_count(), 1);
        drop(kept);
    }

    #[test]
    fn test_dropping_device_releases_placeholders() {
        let backend = Arc::new(DummyBackend::new());
        let device = GraphicsDevice::new(backend.clone(), DeviceParameters::new()).unwrap();
        assert_eq!(backend.stats().live_buffers(), 2);

        drop(device);
        let stats = backend.stats();
        assert_eq!(stats.live_buffers(), 0);
        assert_eq!(stats.textures_created, stats.textures_destroyed);
        assert_eq!(stats.samplers_created, stats.samplers_destroyed);
    }
}
