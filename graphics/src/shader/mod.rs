//! Shader pipelines and resource binding.
//!
//! - [`ShaderPipeline`] - Backend shader modules, resource layout and cached
//!   pipeline-state objects for one resolved [`ShaderVariant`](lumen_core::shader::ShaderVariant)
//! - [`BindableResourceSet`] - Uniform staging and resource set management for
//!   one pipeline instance
//!
//! # Example
//!
//! ```ignore
//! let descriptor = ShaderPipelineDescriptor::for_keywords(pass, Some(&keywords))?;
//! let pipeline = device.create_shader_pipeline(&descriptor)?;
//! let mut resources = pipeline.create_resources()?;
//!
//! let mut commands = CommandList::new();
//! commands.set_pipeline(pipeline.get_pipeline(FillMode::Solid, PrimitiveTopology::TriangleList, false)?);
//! resources.bind(&mut commands, &properties)?;
//! pipeline.bind_vertex_buffer(&mut commands, "POSITION", &positions, 0);
//! commands.draw(0..3, 0..1);
//! device.submit(&commands)?;
//! ```

mod pipeline;
mod resource_set;

pub use pipeline::{
    BlockSlot, MAX_BINDING_SLOTS, PIPELINE_PERMUTATIONS, ShaderPipeline, ShaderPipelineDescriptor,
    permutation_index,
};
pub use resource_set::{BindableResourceSet, SAMPLER_PREFIX};
