//! GPU backend abstraction layer.
//!
//! This module provides a trait-based abstraction for GPU backends,
//! allowing the graphics crate to work with different GPU APIs.
//!
//! # Available Backends
//!
//! - `dummy`: Validating CPU backend for testing and development
//!
//! # Architecture
//!
//! Each backend implements the [`GpuBackend`] trait, which provides:
//! - Resource creation and destruction (buffers, textures, samplers)
//! - Shader module, resource layout, resource set and pipeline creation
//! - Command list submission
//!
//! Backend objects are addressed through opaque handles. Ownership lives in
//! the wrapper types ([`Buffer`](crate::resources::Buffer),
//! [`ShaderPipeline`](crate::shader::ShaderPipeline), ...) which destroy their
//! handles on drop.

pub mod dummy;

use lumen_core::render_state::{
    BlendState, CullMode, DepthStencilState, FillMode, FrontFace, PrimitiveTopology,
};
use lumen_core::shader::{ShaderStage, ShaderStageFlags, ShaderTarget, UniformKind};

use crate::command::CommandList;
use crate::error::GraphicsError;
use crate::types::{
    BufferDescriptor, OutputDescription, SamplerDescriptor, TextureDescriptor, VertexLayout,
};

pub use dummy::{DummyBackend, DummyStats};

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// Handle to a sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerHandle(pub(crate) u64);

/// Handle to a compiled shader module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderModuleHandle(pub(crate) u64);

/// Handle to a resource layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceLayoutHandle(pub(crate) u64);

/// Handle to a resource set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceSetHandle(pub(crate) u64);

/// Handle to a render pipeline-state object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineHandle(pub(crate) u64);

/// Descriptor for creating a shader module from one compiled stage.
#[derive(Debug, Clone, Copy)]
pub struct ShaderModuleDescriptor<'a> {
    pub label: Option<&'a str>,
    pub stage: ShaderStage,
    pub bytecode: &'a [u8],
    pub entry_point: &'a str,
}

/// One slot of a resource layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceLayoutEntry {
    /// Declared binding slot.
    pub binding: u32,
    /// Resource kind expected at the slot.
    pub kind: UniformKind,
    /// Stages that access the slot.
    pub stages: ShaderStageFlags,
}

/// Descriptor for creating a resource layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLayoutDescriptor {
    pub label: Option<String>,
    pub entries: Vec<ResourceLayoutEntry>,
}

/// A concrete resource bound to a layout slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingResource {
    Buffer(BufferHandle),
    Texture(TextureHandle),
    Sampler(SamplerHandle),
}

impl BindingResource {
    /// Check whether this resource can fill a slot of `kind`.
    pub fn matches(&self, kind: UniformKind) -> bool {
        match self {
            Self::Buffer(_) => matches!(
                kind,
                UniformKind::UniformBuffer
                    | UniformKind::StructuredBufferReadOnly
                    | UniformKind::StructuredBufferReadWrite
            ),
            Self::Texture(_) => matches!(
                kind,
                UniformKind::TextureReadOnly | UniformKind::TextureReadWrite
            ),
            Self::Sampler(_) => kind == UniformKind::Sampler,
        }
    }
}

/// One entry of a resource set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceSetEntry {
    pub binding: u32,
    pub resource: BindingResource,
}

/// Descriptor for creating a resource set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSetDescriptor {
    pub layout: ResourceLayoutHandle,
    pub entries: Vec<ResourceSetEntry>,
}

/// Rasterizer configuration of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterizerState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub fill_mode: FillMode,
    pub depth_clip: bool,
    pub scissor_test: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            front_face: FrontFace::Clockwise,
            fill_mode: FillMode::Solid,
            depth_clip: true,
            scissor_test: false,
        }
    }
}

/// A shader module attached to a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineStage {
    pub stage: ShaderStage,
    pub module: ShaderModuleHandle,
    pub entry_point: String,
}

/// Descriptor for creating a render pipeline-state object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPipelineDescriptor {
    pub label: Option<String>,
    pub stages: Vec<PipelineStage>,
    pub vertex_layout: VertexLayout,
    pub resource_layout: ResourceLayoutHandle,
    pub blend: BlendState,
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
    pub topology: PrimitiveTopology,
    pub output: OutputDescription,
}

/// Interface every graphics backend implements.
///
/// All methods take `&self`; backends synchronize internally.
pub trait GpuBackend: Send + Sync {
    /// Get the backend name.
    fn name(&self) -> &str;

    /// Bytecode target this backend consumes.
    fn shader_target(&self) -> ShaderTarget;

    /// Create a buffer resource.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferHandle, GraphicsError>;

    /// Destroy a buffer resource.
    fn destroy_buffer(&self, handle: BufferHandle);

    /// Create a texture resource.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<TextureHandle, GraphicsError>;

    /// Destroy a texture resource.
    fn destroy_texture(&self, handle: TextureHandle);

    /// Create a sampler resource.
    fn create_sampler(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<SamplerHandle, GraphicsError>;

    /// Destroy a sampler resource.
    fn destroy_sampler(&self, handle: SamplerHandle);

    /// Create a shader module from compiled bytecode.
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor<'_>,
    ) -> Result<ShaderModuleHandle, GraphicsError>;

    /// Destroy a shader module.
    fn destroy_shader_module(&self, handle: ShaderModuleHandle);

    /// Create a resource layout.
    fn create_resource_layout(
        &self,
        descriptor: &ResourceLayoutDescriptor,
    ) -> Result<ResourceLayoutHandle, GraphicsError>;

    /// Destroy a resource layout.
    fn destroy_resource_layout(&self, handle: ResourceLayoutHandle);

    /// Create a resource set matching a layout.
    fn create_resource_set(
        &self,
        descriptor: &ResourceSetDescriptor,
    ) -> Result<ResourceSetHandle, GraphicsError>;

    /// Destroy a resource set.
    fn destroy_resource_set(&self, handle: ResourceSetHandle);

    /// Create a render pipeline-state object.
    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<PipelineHandle, GraphicsError>;

    /// Destroy a render pipeline-state object.
    fn destroy_render_pipeline(&self, handle: PipelineHandle);

    /// Execute a recorded command list.
    fn submit(&self, commands: &CommandList) -> Result<(), GraphicsError>;

    /// Read back the current contents of a buffer.
    fn read_buffer(&self, handle: BufferHandle) -> Result<Vec<u8>, GraphicsError>;
}
