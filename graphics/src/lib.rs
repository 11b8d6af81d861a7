//! # Lumen Graphics
//!
//! Shader pipelines and GPU resource binding for the Lumen shading engine.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsDevice`] - Creates resources, placeholders and shader pipelines
//! - [`ShaderPipeline`] - Backend objects for one resolved shader variant
//! - [`BindableResourceSet`] - Stages [`PropertyState`] values into uniform
//!   blocks and keeps the resource set in sync with bound resources
//! - [`GpuBackend`] - Trait for graphics backend implementations, with a
//!   validating [`DummyBackend`] for testing
//!
//! Variant selection itself lives in `lumen-core`.
//!
//! ## Example
//!
//! ```ignore
//! use lumen_graphics::{GraphicsDevice, PropertyState, ShaderPipelineDescriptor};
//!
//! let device = GraphicsDevice::dummy()?;
//! let pipeline = device.create_shader_pipeline(&ShaderPipelineDescriptor::for_keywords(pass, None)?)?;
//! let mut resources = pipeline.create_resources()?;
//!
//! let mut properties = PropertyState::new();
//! properties.set_color("color", [1.0, 1.0, 1.0, 1.0]);
//! resources.bind(&mut commands, &properties)?;
//! ```

pub mod backend;
pub mod command;
pub mod defaults;
pub mod device;
pub mod error;
pub mod properties;
pub mod resources;
pub mod shader;
pub mod types;

// Re-export main types for convenience
pub use backend::{DummyBackend, GpuBackend, PipelineHandle};
pub use command::{Command, CommandList};
pub use defaults::DefaultResources;
pub use device::{DeviceParameters, GraphicsDevice};
pub use error::GraphicsError;
pub use properties::{Property, PropertyState};
pub use resources::{BoundResource, Buffer, Sampler, Texture};
pub use shader::{BindableResourceSet, ShaderPipeline, ShaderPipelineDescriptor};
pub use types::{
    BufferDescriptor, BufferUsage, OutputDescription, SamplerDescriptor, TextureDescriptor,
    TextureFormat, TextureUsage, VertexLayout,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
