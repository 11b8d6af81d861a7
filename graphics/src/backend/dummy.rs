//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations but validates every
//! descriptor it receives, keeps CPU copies of buffer contents and counts
//! object creation and destruction, so the engine can be exercised and
//! observed without GPU hardware.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use lumen_core::shader::ShaderTarget;
use parking_lot::Mutex;

use crate::command::{Command, CommandList};
use crate::error::GraphicsError;
use crate::types::{BufferDescriptor, SamplerDescriptor, TextureDescriptor};

use super::{
    BufferHandle, GpuBackend, PipelineHandle, RenderPipelineDescriptor, ResourceLayoutDescriptor,
    ResourceLayoutHandle, ResourceSetDescriptor, ResourceSetHandle, SamplerHandle,
    ShaderModuleDescriptor, ShaderModuleHandle, TextureHandle,
};

/// Creation and destruction counters of a [`DummyBackend`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DummyStats {
    pub buffers_created: usize,
    pub buffers_destroyed: usize,
    pub textures_created: usize,
    pub textures_destroyed: usize,
    pub samplers_created: usize,
    pub samplers_destroyed: usize,
    pub shader_modules_created: usize,
    pub shader_modules_destroyed: usize,
    pub resource_layouts_created: usize,
    pub resource_layouts_destroyed: usize,
    pub resource_sets_created: usize,
    pub resource_sets_destroyed: usize,
    pub pipelines_created: usize,
    pub pipelines_destroyed: usize,
    pub buffer_updates: usize,
    pub draws: usize,
    pub submits: usize,
}

impl DummyStats {
    /// Buffers alive right now.
    pub fn live_buffers(&self) -> usize {
        self.buffers_created - self.buffers_destroyed
    }

    /// Resource sets alive right now.
    pub fn live_resource_sets(&self) -> usize {
        self.resource_sets_created - self.resource_sets_destroyed
    }

    /// Pipeline-state objects alive right now.
    pub fn live_pipelines(&self) -> usize {
        self.pipelines_created - self.pipelines_destroyed
    }

    /// Shader modules alive right now.
    pub fn live_shader_modules(&self) -> usize {
        self.shader_modules_created - self.shader_modules_destroyed
    }
}

#[derive(Default)]
struct DummyState {
    buffers: HashMap<u64, Vec<u8>>,
    textures: HashSet<u64>,
    samplers: HashSet<u64>,
    shader_modules: HashSet<u64>,
    resource_layouts: HashMap<u64, ResourceLayoutDescriptor>,
    resource_sets: HashSet<u64>,
    pipelines: HashSet<u64>,
    stats: DummyStats,
}

/// Dummy GPU backend.
pub struct DummyBackend {
    shader_target: ShaderTarget,
    next_id: AtomicU64,
    lost: AtomicBool,
    state: Mutex<DummyState>,
}

impl DummyBackend {
    /// Create a new dummy backend consuming SPIR-V.
    pub fn new() -> Self {
        Self {
            shader_target: ShaderTarget::Spirv,
            next_id: AtomicU64::new(1),
            lost: AtomicBool::new(false),
            state: Mutex::new(DummyState::default()),
        }
    }

    /// Select the bytecode target this backend consumes.
    pub fn with_shader_target(mut self, target: ShaderTarget) -> Self {
        self.shader_target = target;
        self
    }

    /// Snapshot of the creation/destruction counters.
    pub fn stats(&self) -> DummyStats {
        self.state.lock().stats
    }

    /// Simulate a lost device: every create call and submit fails with
    /// [`GraphicsError::DeviceLost`] until [`restore_device`](Self::restore_device).
    pub fn lose_device(&self) {
        self.lost.store(true, Ordering::Release);
        log::trace!("DummyBackend: device lost");
    }

    /// Recover from [`lose_device`](Self::lose_device).
    pub fn restore_device(&self) {
        self.lost.store(false, Ordering::Release);
        log::trace!("DummyBackend: device restored");
    }

    /// Check whether the device is currently lost.
    pub fn is_device_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }

    fn check_device(&self) -> Result<(), GraphicsError> {
        if self.is_device_lost() {
            Err(GraphicsError::DeviceLost)
        } else {
            Ok(())
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DummyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DummyBackend")
            .field("shader_target", &self.shader_target)
            .field("stats", &self.stats())
            .finish()
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &str {
        "Dummy Backend"
    }

    fn shader_target(&self) -> ShaderTarget {
        self.shader_target
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferHandle, GraphicsError> {
        self.check_device()?;
        if descriptor.size == 0 {
            return Err(GraphicsError::ResourceCreationFailed(format!(
                "buffer {:?} has zero size",
                descriptor.label
            )));
        }
        let size = usize::try_from(descriptor.size).map_err(|_| {
            GraphicsError::ResourceCreationFailed(format!(
                "buffer size {} does not fit in memory",
                descriptor.size
            ))
        })?;

        let id = self.next_id();
        let mut state = self.state.lock();
        state.buffers.insert(id, vec![0; size]);
        state.stats.buffers_created += 1;

        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {}, id: {id})",
            descriptor.label,
            descriptor.size
        );
        Ok(BufferHandle(id))
    }

    fn destroy_buffer(&self, handle: BufferHandle) {
        let mut state = self.state.lock();
        if state.buffers.remove(&handle.0).is_some() {
            state.stats.buffers_destroyed += 1;
            log::trace!("DummyBackend: destroyed buffer {}", handle.0);
        }
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
    ) -> Result<TextureHandle, GraphicsError> {
        self.check_device()?;
        let size = descriptor.size;
        if size.width == 0 || size.height == 0 || size.depth == 0 {
            return Err(GraphicsError::ResourceCreationFailed(format!(
                "texture {:?} has zero extent",
                descriptor.label
            )));
        }

        let id = self.next_id();
        let mut state = self.state.lock();
        state.textures.insert(id);
        state.stats.textures_created += 1;

        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{}x{})",
            descriptor.label,
            size.width,
            size.height,
            size.depth
        );
        Ok(TextureHandle(id))
    }

    fn destroy_texture(&self, handle: TextureHandle) {
        let mut state = self.state.lock();
        if state.textures.remove(&handle.0) {
            state.stats.textures_destroyed += 1;
            log::trace!("DummyBackend: destroyed texture {}", handle.0);
        }
    }

    fn create_sampler(
        &self,
        descriptor: &SamplerDescriptor,
    ) -> Result<SamplerHandle, GraphicsError> {
        self.check_device()?;
        let id = self.next_id();
        let mut state = self.state.lock();
        state.samplers.insert(id);
        state.stats.samplers_created += 1;

        log::trace!("DummyBackend: creating sampler {:?}", descriptor.label);
        Ok(SamplerHandle(id))
    }

    fn destroy_sampler(&self, handle: SamplerHandle) {
        let mut state = self.state.lock();
        if state.samplers.remove(&handle.0) {
            state.stats.samplers_destroyed += 1;
            log::trace!("DummyBackend: destroyed sampler {}", handle.0);
        }
    }

    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor<'_>,
    ) -> Result<ShaderModuleHandle, GraphicsError> {
        self.check_device()?;
        if descriptor.bytecode.is_empty() {
            return Err(GraphicsError::PipelineCreationFailed(format!(
                "{:?} stage '{}' has no bytecode",
                descriptor.stage, descriptor.entry_point
            )));
        }

        let id = self.next_id();
        let mut state = self.state.lock();
        state.shader_modules.insert(id);
        state.stats.shader_modules_created += 1;

        log::trace!(
            "DummyBackend: creating {:?} shader module {:?} ({} bytes)",
            descriptor.stage,
            descriptor.label,
            descriptor.bytecode.len()
        );
        Ok(ShaderModuleHandle(id))
    }

    fn destroy_shader_module(&self, handle: ShaderModuleHandle) {
        let mut state = self.state.lock();
        if state.shader_modules.remove(&handle.0) {
            state.stats.shader_modules_destroyed += 1;
            log::trace!("DummyBackend: destroyed shader module {}", handle.0);
        }
    }

    fn create_resource_layout(
        &self,
        descriptor: &ResourceLayoutDescriptor,
    ) -> Result<ResourceLayoutHandle, GraphicsError> {
        self.check_device()?;
        let mut seen = HashSet::new();
        for entry in &descriptor.entries {
            if !seen.insert(entry.binding) {
                return Err(GraphicsError::LayoutMismatch(format!(
                    "binding {} appears twice in layout {:?}",
                    entry.binding, descriptor.label
                )));
            }
        }

        let id = self.next_id();
        let mut state = self.state.lock();
        state.resource_layouts.insert(id, descriptor.clone());
        state.stats.resource_layouts_created += 1;

        log::trace!(
            "DummyBackend: creating resource layout {:?} ({} entries)",
            descriptor.label,
            descriptor.entries.len()
        );
        Ok(ResourceLayoutHandle(id))
    }

    fn destroy_resource_layout(&self, handle: ResourceLayoutHandle) {
        let mut state = self.state.lock();
        if state.resource_layouts.remove(&handle.0).is_some() {
            state.stats.resource_layouts_destroyed += 1;
            log::trace!("DummyBackend: destroyed resource layout {}", handle.0);
        }
    }

    fn create_resource_set(
        &self,
        descriptor: &ResourceSetDescriptor,
    ) -> Result<ResourceSetHandle, GraphicsError> {
        self.check_device()?;
        let mut state = self.state.lock();
        let layout = state
            .resource_layouts
            .get(&descriptor.layout.0)
            .ok_or_else(|| {
                GraphicsError::Internal(format!(
                    "unknown resource layout {}",
                    descriptor.layout.0
                ))
            })?;

        if layout.entries.len() != descriptor.entries.len() {
            return Err(GraphicsError::LayoutMismatch(format!(
                "layout expects {} entries, resource set provides {}",
                layout.entries.len(),
                descriptor.entries.len()
            )));
        }

        for entry in &descriptor.entries {
            let slot = layout
                .entries
                .iter()
                .find(|slot| slot.binding == entry.binding)
                .ok_or_else(|| {
                    GraphicsError::LayoutMismatch(format!(
                        "binding {} is not part of the layout",
                        entry.binding
                    ))
                })?;
            if !entry.resource.matches(slot.kind) {
                return Err(GraphicsError::LayoutMismatch(format!(
                    "binding {} expects {:?}, got {:?}",
                    entry.binding, slot.kind, entry.resource
                )));
            }
        }

        let id = self.next_id();
        state.resource_sets.insert(id);
        state.stats.resource_sets_created += 1;

        log::trace!(
            "DummyBackend: creating resource set {id} ({} entries)",
            descriptor.entries.len()
        );
        Ok(ResourceSetHandle(id))
    }

    fn destroy_resource_set(&self, handle: ResourceSetHandle) {
        let mut state = self.state.lock();
        if state.resource_sets.remove(&handle.0) {
            state.stats.resource_sets_destroyed += 1;
            log::trace!("DummyBackend: destroyed resource set {}", handle.0);
        }
    }

    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<PipelineHandle, GraphicsError> {
        self.check_device()?;
        let mut state = self.state.lock();
        if descriptor.stages.is_empty() {
            return Err(GraphicsError::PipelineCreationFailed(format!(
                "pipeline {:?} has no shader stages",
                descriptor.label
            )));
        }
        if let Some(stage) = descriptor
            .stages
            .iter()
            .find(|stage| !state.shader_modules.contains(&stage.module.0))
        {
            return Err(GraphicsError::PipelineCreationFailed(format!(
                "unknown shader module {} for {:?} stage",
                stage.module.0, stage.stage
            )));
        }
        if !state
            .resource_layouts
            .contains_key(&descriptor.resource_layout.0)
        {
            return Err(GraphicsError::PipelineCreationFailed(format!(
                "unknown resource layout {}",
                descriptor.resource_layout.0
            )));
        }

        let id = self.next_id();
        state.pipelines.insert(id);
        state.stats.pipelines_created += 1;

        log::trace!(
            "DummyBackend: creating render pipeline {:?} ({:?}, {:?})",
            descriptor.label,
            descriptor.topology,
            descriptor.rasterizer.fill_mode
        );
        Ok(PipelineHandle(id))
    }

    fn destroy_render_pipeline(&self, handle: PipelineHandle) {
        let mut state = self.state.lock();
        if state.pipelines.remove(&handle.0) {
            state.stats.pipelines_destroyed += 1;
            log::trace!("DummyBackend: destroyed render pipeline {}", handle.0);
        }
    }

    fn submit(&self, commands: &CommandList) -> Result<(), GraphicsError> {
        self.check_device()?;
        let mut state = self.state.lock();
        for command in commands.commands() {
            match command {
                Command::UpdateBuffer {
                    buffer,
                    offset,
                    data,
                } => {
                    let memory = state.buffers.get_mut(&buffer.0).ok_or_else(|| {
                        GraphicsError::Internal(format!("unknown buffer {}", buffer.0))
                    })?;
                    let start = usize::try_from(*offset).unwrap_or(usize::MAX);
                    let end = start.saturating_add(data.len());
                    if end > memory.len() {
                        return Err(GraphicsError::InvalidParameter(format!(
                            "update of {} bytes at offset {} overflows buffer {} ({} bytes)",
                            data.len(),
                            offset,
                            buffer.0,
                            memory.len()
                        )));
                    }
                    memory[start..end].copy_from_slice(data);
                    state.stats.buffer_updates += 1;
                }
                Command::SetPipeline(pipeline) => {
                    if !state.pipelines.contains(&pipeline.0) {
                        return Err(GraphicsError::Internal(format!(
                            "unknown pipeline {}",
                            pipeline.0
                        )));
                    }
                }
                Command::SetResourceSet { set, .. } => {
                    if !state.resource_sets.contains(&set.0) {
                        return Err(GraphicsError::Internal(format!(
                            "unknown resource set {}",
                            set.0
                        )));
                    }
                }
                Command::SetVertexBuffer { buffer, .. } => {
                    if !state.buffers.contains_key(&buffer.0) {
                        return Err(GraphicsError::Internal(format!(
                            "unknown vertex buffer {}",
                            buffer.0
                        )));
                    }
                }
                Command::Draw { .. } | Command::DrawIndexed { .. } => {
                    state.stats.draws += 1;
                }
            }
        }
        state.stats.submits += 1;

        log::trace!("DummyBackend: submitted {} command(s)", commands.len());
        Ok(())
    }

    fn read_buffer(&self, handle: BufferHandle) -> Result<Vec<u8>, GraphicsError> {
        self.state
            .lock()
            .buffers
            .get(&handle.0)
            .cloned()
            .ok_or_else(|| GraphicsError::Internal(format!("unknown buffer {}", handle.0)))
    }
}

// Ensure DummyBackend is Send + Sync
static_assertions::assert_impl_all!(DummyBackend: Send, Sync);

#[cfg(test)]
mod tests {
    use lumen_core::shader::{ShaderStage, ShaderStageFlags, UniformKind};

    use super::*;
    use crate::backend::{BindingResource, ResourceLayoutEntry, ResourceSetEntry};
    use crate::types::BufferUsage;

    #[test]
    fn test_dummy_backend_name() {
        let backend = DummyBackend::new();
        assert_eq!(backend.name(), "Dummy Backend");
        assert_eq!(backend.shader_target(), ShaderTarget::Spirv);

        let backend = DummyBackend::new().with_shader_target(ShaderTarget::Wgsl);
        assert_eq!(backend.shader_target(), ShaderTarget::Wgsl);
    }

    #[test]
    fn test_buffer_shadow_memory() {
        let backend = DummyBackend::new();
        let buffer = backend
            .create_buffer(&BufferDescriptor::new(8, BufferUsage::UNIFORM))
            .unwrap();

        let mut list = CommandList::new();
        list.update_buffer(buffer, 4, vec![1, 2, 3, 4]);
        backend.submit(&list).unwrap();

        assert_eq!(backend.read_buffer(buffer).unwrap(), [0, 0, 0, 0, 1, 2, 3, 4]);
        assert_eq!(backend.stats().buffer_updates, 1);
    }

    #[test]
    fn test_buffer_update_out_of_range() {
        let backend = DummyBackend::new();
        let buffer = backend
            .create_buffer(&BufferDescriptor::new(4, BufferUsage::UNIFORM))
            .unwrap();

        let mut list = CommandList::new();
        list.update_buffer(buffer, 2, vec![0; 4]);
        assert!(backend.submit(&list).is_err());
    }

    #[test]
    fn test_zero_size_buffer_rejected() {
        let backend = DummyBackend::new();
        let result = backend.create_buffer(&BufferDescriptor::new(0, BufferUsage::UNIFORM));
        assert!(matches!(
            result,
            Err(GraphicsError::ResourceCreationFailed(_))
        ));
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let backend = DummyBackend::new();
        let result = backend.create_shader_module(&ShaderModuleDescriptor {
            label: None,
            stage: ShaderStage::Vertex,
            bytecode: &[],
            entry_point: "main",
        });
        assert!(matches!(
            result,
            Err(GraphicsError::PipelineCreationFailed(_))
        ));
    }

    #[test]
    fn test_resource_set_validation() {
        let backend = DummyBackend::new();
        let layout = backend
            .create_resource_layout(&ResourceLayoutDescriptor {
                label: None,
                entries: vec![ResourceLayoutEntry {
                    binding: 2,
                    kind: UniformKind::UniformBuffer,
                    stages: ShaderStageFlags::VERTEX,
                }],
            })
            .unwrap();
        let buffer = backend
            .create_buffer(&BufferDescriptor::new(16, BufferUsage::UNIFORM))
            .unwrap();

        let wrong_slot = ResourceSetDescriptor {
            layout,
            entries: vec![ResourceSetEntry {
                binding: 0,
                resource: BindingResource::Buffer(buffer),
            }],
        };
        assert!(matches!(
            backend.create_resource_set(&wrong_slot),
            Err(GraphicsError::LayoutMismatch(_))
        ));

        let ok = ResourceSetDescriptor {
            layout,
            entries: vec![ResourceSetEntry {
                binding: 2,
                resource: BindingResource::Buffer(buffer),
            }],
        };
        let set = backend.create_resource_set(&ok).unwrap();
        assert_eq!(backend.stats().live_resource_sets(), 1);

        backend.destroy_resource_set(set);
        backend.destroy_resource_set(set);
        assert_eq!(backend.stats().resource_sets_destroyed, 1);
    }

    #[test]
    fn test_duplicate_layout_binding_rejected() {
        let backend = DummyBackend::new();
        let entry = ResourceLayoutEntry {
            binding: 0,
            kind: UniformKind::TextureReadOnly,
            stages: ShaderStageFlags::FRAGMENT,
        };
        let result = backend.create_resource_layout(&ResourceLayoutDescriptor {
            label: None,
            entries: vec![entry, entry],
        });
        assert!(matches!(result, Err(GraphicsError::LayoutMismatch(_))));
    }

    #[test]
    fn test_unknown_handles_are_internal_errors() {
        let backend = DummyBackend::new();
        let buffer = backend
            .create_buffer(&BufferDescriptor::new(4, BufferUsage::UNIFORM))
            .unwrap();
        backend.destroy_buffer(buffer);

        assert!(matches!(
            backend.read_buffer(buffer),
            Err(GraphicsError::Internal(_))
        ));

        let mut list = CommandList::new();
        list.set_pipeline(PipelineHandle(999));
        assert!(matches!(
            backend.submit(&list),
            Err(GraphicsError::Internal(_))
        ));
    }

    #[test]
    fn test_lost_device_fails_creation_until_restored() {
        let backend = DummyBackend::new();
        backend.lose_device();
        assert!(backend.is_device_lost());
        assert_eq!(
            backend.create_buffer(&BufferDescriptor::new(16, BufferUsage::UNIFORM)),
            Err(GraphicsError::DeviceLost)
        );
        assert_eq!(
            backend.create_sampler(&SamplerDescriptor::point()),
            Err(GraphicsError::DeviceLost)
        );
        assert_eq!(
            backend.submit(&CommandList::new()),
            Err(GraphicsError::DeviceLost)
        );
        assert_eq!(backend.stats().buffers_created, 0);

        backend.restore_device();
        assert!(
            backend
                .create_buffer(&BufferDescriptor::new(16, BufferUsage::UNIFORM))
                .is_ok()
        );
    }
}
