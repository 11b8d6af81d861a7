//! Shader pipelines.
//!
//! A [`ShaderPipeline`] turns one resolved [`ShaderVariant`] of a
//! [`ShaderPass`] into backend objects: one shader module per stage, a
//! resource layout mirroring the reflected uniforms, and a lazily filled
//! cache of pipeline-state objects keyed by fill mode, topology and scissor.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use lumen_core::render_state::{FillMode, FrontFace, PrimitiveTopology};
use lumen_core::shader::{ShaderPass, ShaderUniform, ShaderVariant, UniformKind};
use lumen_core::{KeywordState, ShaderError};
use parking_lot::Mutex;

use crate::backend::{
    GpuBackend, PipelineHandle, PipelineStage, RasterizerState, RenderPipelineDescriptor,
    ResourceLayoutDescriptor, ResourceLayoutEntry, ResourceLayoutHandle, ShaderModuleDescriptor,
    ShaderModuleHandle,
};
use crate::command::CommandList;
use crate::defaults::DefaultResources;
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resources::Buffer;
use crate::types::{OutputDescription, VertexLayout};

use super::BindableResourceSet;

/// Number of cached pipeline permutations (5 topologies x 2 fill modes x scissor on/off).
pub const PIPELINE_PERMUTATIONS: usize =
    PrimitiveTopology::ALL.len() * FillMode::ALL.len() * 2;

/// Highest binding index (exclusive) a variant may declare.
///
/// Resource sets keep one slot per binding up to the highest declared one.
pub const MAX_BINDING_SLOTS: u32 = 1024;

/// Cache slot of a pipeline permutation.
pub fn permutation_index(fill: FillMode, topology: PrimitiveTopology, scissor: bool) -> usize {
    topology.index() * 4 + fill.index() * 2 + if scissor { 0 } else { 1 }
}

/// What a pipeline is built from.
///
/// Two descriptors are equal when they name the same pass and variant
/// objects and the same output override, so callers can use them as cache
/// keys.
#[derive(Clone)]
pub struct ShaderPipelineDescriptor {
    /// The pass providing render state.
    pub pass: Arc<ShaderPass>,
    /// The resolved variant providing programs and reflection.
    pub variant: Arc<ShaderVariant>,
    /// Output override; `None` uses the device default.
    pub output: Option<OutputDescription>,
}

impl ShaderPipelineDescriptor {
    /// Create a descriptor using the device default output.
    pub fn new(pass: Arc<ShaderPass>, variant: Arc<ShaderVariant>) -> Self {
        Self {
            pass,
            variant,
            output: None,
        }
    }

    /// Resolve `keywords` against `pass` and describe the resulting variant.
    pub fn for_keywords(
        pass: Arc<ShaderPass>,
        keywords: Option<&KeywordState>,
    ) -> Result<Self, ShaderError> {
        let variant = pass.get_variant(keywords)?.clone();
        Ok(Self::new(pass, variant))
    }

    /// Override the output description.
    pub fn with_output(mut self, output: OutputDescription) -> Self {
        self.output = Some(output);
        self
    }
}

impl PartialEq for ShaderPipelineDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pass, &other.pass)
            && Arc::ptr_eq(&self.variant, &other.variant)
            && self.output == other.output
    }
}

impl Eq for ShaderPipelineDescriptor {}

impl Hash for ShaderPipelineDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.pass), state);
        std::ptr::hash(Arc::as_ptr(&self.variant), state);
        self.output.hash(state);
    }
}

impl std::fmt::Debug for ShaderPipelineDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderPipelineDescriptor")
            .field("pass", &self.pass.name())
            .field("keywords", self.variant.keywords())
            .field("output", &self.output)
            .finish()
    }
}

/// Location of a uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSlot {
    /// Index of the block in the variant's uniform list.
    pub uniform_index: usize,
    /// Index among the blocks only, in declaration order.
    pub buffer_index: usize,
}

/// Backend objects for one shader variant.
pub struct ShaderPipeline {
    backend: Arc<dyn GpuBackend>,
    defaults: Arc<DefaultResources>,
    uniform_alignment: u64,
    max_buffer_size: u64,
    pass: Arc<ShaderPass>,
    variant: Arc<ShaderVariant>,
    shader_modules: Vec<ShaderModuleHandle>,
    resource_layout: ResourceLayoutHandle,
    slot_count: usize,
    blocks: HashMap<String, BlockSlot>,
    semantics: HashMap<String, u32>,
    template: RenderPipelineDescriptor,
    pipelines: Mutex<[Option<PipelineHandle>; PIPELINE_PERMUTATIONS]>,
}

impl ShaderPipeline {
    pub(crate) fn new(
        device: &GraphicsDevice,
        descriptor: &ShaderPipelineDescriptor,
    ) -> Result<Self, GraphicsError> {
        lumen_core::profile_function!();

        let backend = device.backend().clone();
        let pass = descriptor.pass.clone();
        let variant = descriptor.variant.clone();

        let target = backend.shader_target();
        let stages = match variant.programs_for(target) {
            Some(stages) if !stages.is_empty() => stages,
            _ => return Err(GraphicsError::MissingProgram(target)),
        };

        let (entries, blocks) = reflect_layout(variant.uniforms())?;
        let slot_count = entries
            .iter()
            .map(|entry| entry.binding as usize + 1)
            .max()
            .unwrap_or(0);

        let vertex_layout = VertexLayout::from_inputs(variant.vertex_inputs());
        let semantics = variant
            .vertex_inputs()
            .iter()
            .zip(0u32..)
            .map(|(input, slot)| (input.semantic.clone(), slot))
            .collect();

        let mut shader_modules = Vec::with_capacity(stages.len());
        for stage in stages {
            let module = backend.create_shader_module(&ShaderModuleDescriptor {
                label: Some(pass.name()),
                stage: stage.stage,
                bytecode: &stage.bytecode,
                entry_point: &stage.entry_point,
            });
            match module {
                Ok(module) => shader_modules.push(module),
                Err(err) => {
                    release_modules(backend.as_ref(), &shader_modules);
                    return Err(err);
                }
            }
        }

        let resource_layout = match backend.create_resource_layout(&ResourceLayoutDescriptor {
            label: Some(pass.name().to_string()),
            entries,
        }) {
            Ok(layout) => layout,
            Err(err) => {
                release_modules(backend.as_ref(), &shader_modules);
                return Err(err);
            }
        };

        let template = RenderPipelineDescriptor {
            label: Some(pass.name().to_string()),
            stages: stages
                .iter()
                .zip(&shader_modules)
                .map(|(stage, module)| PipelineStage {
                    stage: stage.stage,
                    module: *module,
                    entry_point: stage.entry_point.clone(),
                })
                .collect(),
            vertex_layout,
            resource_layout,
            blend: *pass.blend(),
            depth_stencil: *pass.depth_stencil(),
            rasterizer: RasterizerState {
                cull_mode: pass.cull_mode(),
                front_face: FrontFace::Clockwise,
                fill_mode: FillMode::Solid,
                depth_clip: pass.depth_clip(),
                scissor_test: false,
            },
            topology: PrimitiveTopology::TriangleList,
            output: descriptor
                .output
                .clone()
                .unwrap_or_else(|| device.parameters().output.clone()),
        };

        log::debug!(
            "Created shader pipeline '{}' {} ({} stage(s), {} uniform(s), {} block(s))",
            pass.name(),
            variant.keywords(),
            shader_modules.len(),
            variant.uniforms().len(),
            blocks.len()
        );

        Ok(Self {
            backend,
            defaults: device.defaults().clone(),
            uniform_alignment: device.parameters().uniform_alignment,
            max_buffer_size: device.parameters().max_buffer_size,
            pass,
            variant,
            shader_modules,
            resource_layout,
            slot_count,
            blocks,
            semantics,
            template,
            pipelines: Mutex::new([None; PIPELINE_PERMUTATIONS]),
        })
    }

    /// Get the pipeline-state object for a fill mode, topology and scissor
    /// setting, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the pipeline. Nothing is
    /// cached in that case.
    pub fn get_pipeline(
        &self,
        fill: FillMode,
        topology: PrimitiveTopology,
        scissor: bool,
    ) -> Result<PipelineHandle, GraphicsError> {
        lumen_core::profile_function!();

        let index = permutation_index(fill, topology, scissor);
        let mut pipelines = self.pipelines.lock();
        if let Some(handle) = pipelines[index] {
            return Ok(handle);
        }

        let mut descriptor = self.template.clone();
        descriptor.rasterizer.fill_mode = fill;
        descriptor.rasterizer.scissor_test = scissor;
        descriptor.topology = topology;

        let handle = self.backend.create_render_pipeline(&descriptor)?;
        pipelines[index] = Some(handle);

        log::debug!(
            "Created pipeline permutation {index} for '{}' ({fill:?}, {topology:?}, scissor={scissor})",
            self.pass.name()
        );

        Ok(handle)
    }

    /// Number of pipeline permutations created so far.
    pub fn created_pipeline_count(&self) -> usize {
        self.pipelines.lock().iter().flatten().count()
    }

    /// Record a vertex buffer bind for the input with `semantic`.
    ///
    /// Returns `false` and records nothing if the variant has no such input.
    pub fn bind_vertex_buffer(
        &self,
        commands: &mut CommandList,
        semantic: &str,
        buffer: &Buffer,
        offset: u64,
    ) -> bool {
        match self.semantics.get(semantic) {
            Some(&slot) => {
                commands.set_vertex_buffer(slot, buffer.handle(), offset);
                true
            }
            None => false,
        }
    }

    /// Allocate a resource set for this pipeline.
    pub fn create_resources(self: &Arc<Self>) -> Result<BindableResourceSet, GraphicsError> {
        BindableResourceSet::new(self.clone())
    }

    /// Get the pass this pipeline was built from.
    pub fn pass(&self) -> &Arc<ShaderPass> {
        &self.pass
    }

    /// Get the variant this pipeline was built from.
    pub fn variant(&self) -> &Arc<ShaderVariant> {
        &self.variant
    }

    /// Get the reflected uniforms.
    pub fn uniforms(&self) -> &[ShaderUniform] {
        self.variant.uniforms()
    }

    /// Look up a uniform block by name.
    pub fn block(&self, name: &str) -> Option<BlockSlot> {
        self.blocks.get(name).copied()
    }

    /// Number of uniform blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Vertex buffer slot of the input with `semantic`.
    pub fn vertex_slot(&self, semantic: &str) -> Option<u32> {
        self.semantics.get(semantic).copied()
    }

    /// Get the vertex layout.
    pub fn vertex_layout(&self) -> &VertexLayout {
        &self.template.vertex_layout
    }

    /// Get the resource layout handle.
    pub fn resource_layout(&self) -> ResourceLayoutHandle {
        self.resource_layout
    }

    /// Get the output description pipelines render to.
    pub fn output(&self) -> &OutputDescription {
        &self.template.output
    }

    /// Get the shared template pipelines are created from.
    pub fn template(&self) -> &RenderPipelineDescriptor {
        &self.template
    }

    /// Number of binding slots (highest declared binding + 1).
    pub(crate) fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub(crate) fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    pub(crate) fn defaults(&self) -> &Arc<DefaultResources> {
        &self.defaults
    }

    pub(crate) fn uniform_alignment(&self) -> u64 {
        self.uniform_alignment
    }

    pub(crate) fn max_buffer_size(&self) -> u64 {
        self.max_buffer_size
    }
}

impl Drop for ShaderPipeline {
    fn drop(&mut self) {
        for handle in self.pipelines.get_mut().iter_mut().filter_map(Option::take) {
            self.backend.destroy_render_pipeline(handle);
        }
        self.backend.destroy_resource_layout(self.resource_layout);
        release_modules(self.backend.as_ref(), &self.shader_modules);
    }
}

impl std::fmt::Debug for ShaderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderPipeline")
            .field("pass", &self.pass.name())
            .field("keywords", self.variant.keywords())
            .field("resource_layout", &self.resource_layout)
            .field("blocks", &self.blocks.len())
            .finish()
    }
}

// Ensure ShaderPipeline is Send + Sync
static_assertions::assert_impl_all!(ShaderPipeline: Send, Sync);

fn release_modules(backend: &dyn GpuBackend, modules: &[ShaderModuleHandle]) {
    for module in modules {
        backend.destroy_shader_module(*module);
    }
}

/// Build layout entries and the block lookup from reflected uniforms.
fn reflect_layout(
    uniforms: &[ShaderUniform],
) -> Result<(Vec<ResourceLayoutEntry>, HashMap<String, BlockSlot>), GraphicsError> {
    let mut entries = Vec::with_capacity(uniforms.len());
    let mut bindings = HashSet::new();
    let mut blocks = HashMap::new();

    for (uniform_index, uniform) in uniforms.iter().enumerate() {
        if uniform.binding >= MAX_BINDING_SLOTS {
            return Err(GraphicsError::LayoutMismatch(format!(
                "binding {} of '{}' exceeds the limit of {} slots",
                uniform.binding, uniform.name, MAX_BINDING_SLOTS
            )));
        }
        if !bindings.insert(uniform.binding) {
            return Err(GraphicsError::LayoutMismatch(format!(
                "binding {} is declared more than once (at '{}')",
                uniform.binding, uniform.name
            )));
        }

        entries.push(ResourceLayoutEntry {
            binding: uniform.binding,
            kind: uniform.kind,
            stages: uniform.stages,
        });

        if uniform.kind == UniformKind::UniformBuffer {
            if uniform.size == 0 {
                return Err(GraphicsError::LayoutMismatch(format!(
                    "uniform block '{}' has zero size",
                    uniform.name
                )));
            }
            let slot = BlockSlot {
                uniform_index,
                buffer_index: blocks.len(),
            };
            if blocks.insert(uniform.name.clone(), slot).is_some() {
                return Err(GraphicsError::LayoutMismatch(format!(
                    "uniform block '{}' is declared more than once",
                    uniform.name
                )));
            }
        }
    }

    Ok((entries, blocks))
}
