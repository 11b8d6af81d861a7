//! Per-draw resource binding.
//!
//! A [`BindableResourceSet`] owns the uniform buffers of one
//! [`ShaderPipeline`] instance, stages block members from a
//! [`PropertyState`] and keeps a backend resource set that is only rebuilt
//! when a bound resource changes identity.

use std::sync::Arc;

use lumen_core::shader::{ShaderUniform, UniformKind, UniformMember};

use crate::backend::{ResourceSetDescriptor, ResourceSetEntry, ResourceSetHandle};
use crate::command::CommandList;
use crate::defaults::DefaultResources;
use crate::error::GraphicsError;
use crate::properties::{Property, PropertyState};
use crate::resources::{BoundResource, Buffer, Texture};
use crate::types::{BufferDescriptor, BufferUsage, TextureUsage, align_up};

use super::ShaderPipeline;

/// Prefix separating a sampler uniform from the texture it samples
/// (`sampler_MainTex` samples `_MainTex`).
pub const SAMPLER_PREFIX: &str = "sampler";

/// Resource set index resources are bound at.
const RESOURCE_SET_INDEX: u32 = 0;

/// Uniform buffers, staging memory and the current resource set of one
/// pipeline instance.
pub struct BindableResourceSet {
    pipeline: Arc<ShaderPipeline>,
    uniform_buffers: Vec<Arc<Buffer>>,
    staging: Vec<Vec<u8>>,
    bound: Vec<Option<BoundResource>>,
    resource_set: Option<ResourceSetHandle>,
    resource_set_builds: usize,
}

impl BindableResourceSet {
    pub(crate) fn new(pipeline: Arc<ShaderPipeline>) -> Result<Self, GraphicsError> {
        let backend = pipeline.backend().clone();
        let defaults = pipeline.defaults().clone();

        let mut uniform_buffers = Vec::with_capacity(pipeline.block_count());
        let mut staging = Vec::with_capacity(pipeline.block_count());
        let mut bound = vec![None; pipeline.slot_count()];

        for uniform in pipeline.uniforms() {
            let resource = if uniform.kind == UniformKind::UniformBuffer {
                let size = align_up(u64::from(uniform.size), pipeline.uniform_alignment());
                if size > pipeline.max_buffer_size() {
                    return Err(GraphicsError::InvalidParameter(format!(
                        "uniform block '{}' size {} exceeds maximum {}",
                        uniform.name,
                        size,
                        pipeline.max_buffer_size()
                    )));
                }
                let buffer = Arc::new(Buffer::new(
                    backend.clone(),
                    BufferDescriptor::new(size, BufferUsage::UNIFORM | BufferUsage::COPY_DST)
                        .with_label(uniform.name.clone()),
                )?);
                staging.push(vec![0u8; size as usize]);
                uniform_buffers.push(buffer.clone());
                BoundResource::Buffer(buffer)
            } else {
                placeholder(&defaults, uniform.kind)
            };
            bound[uniform.binding as usize] = Some(resource);
        }

        log::trace!(
            "Created resource set for '{}' ({} block(s), {} slot(s))",
            pipeline.pass().name(),
            uniform_buffers.len(),
            bound.len()
        );

        Ok(Self {
            pipeline,
            uniform_buffers,
            staging,
            bound,
            resource_set: None,
            resource_set_builds: 0,
        })
    }

    /// Stage `state` into the uniform blocks, resolve every resource slot and
    /// record the uploads and the resource set bind into `commands`.
    ///
    /// Properties that are missing or typed differently from the reflected
    /// member are skipped; resource slots without a usable resource receive
    /// the device placeholder.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the new resource set. The
    /// previous set stays in place in that case.
    pub fn bind(
        &mut self,
        commands: &mut CommandList,
        state: &PropertyState,
    ) -> Result<(), GraphicsError> {
        lumen_core::profile_function!();

        let pipeline = self.pipeline.clone();
        let defaults = pipeline.defaults();
        let mut next = self.bound.clone();

        for uniform in pipeline.uniforms() {
            let slot = uniform.binding as usize;
            let resource = match uniform.kind {
                UniformKind::UniformBuffer => {
                    let Some(block) = pipeline.block(&uniform.name) else {
                        continue;
                    };
                    let staging = &mut self.staging[block.buffer_index];
                    stage_block(uniform, staging, state);
                    commands.update_buffer(
                        self.uniform_buffers[block.buffer_index].handle(),
                        0,
                        staging.as_slice(),
                    );
                    continue;
                }
                UniformKind::StructuredBufferReadOnly => BoundResource::Buffer(
                    structured_buffer(state, &uniform.name, BufferUsage::STRUCTURED_READ_ONLY)
                        .unwrap_or(defaults.read_only_buffer())
                        .clone(),
                ),
                UniformKind::StructuredBufferReadWrite => BoundResource::Buffer(
                    structured_buffer(state, &uniform.name, BufferUsage::STRUCTURED_READ_WRITE)
                        .unwrap_or(defaults.read_write_buffer())
                        .clone(),
                ),
                UniformKind::TextureReadOnly => BoundResource::Texture(
                    texture(state, &uniform.name, TextureUsage::SAMPLED)
                        .unwrap_or(defaults.white_texture())
                        .clone(),
                ),
                UniformKind::TextureReadWrite => BoundResource::Texture(
                    texture(state, &uniform.name, TextureUsage::STORAGE)
                        .unwrap_or(defaults.read_write_texture())
                        .clone(),
                ),
                UniformKind::Sampler => {
                    let texture_name = uniform
                        .name
                        .strip_prefix(SAMPLER_PREFIX)
                        .unwrap_or(&uniform.name);
                    let paired = texture(state, texture_name, TextureUsage::SAMPLED)
                        .unwrap_or(defaults.white_texture());
                    BoundResource::Sampler(paired.sampler().clone())
                }
            };
            next[slot] = Some(resource);
        }

        let changed = self.resource_set.is_none() || next != self.bound;
        if changed {
            self.rebuild(next)?;
        }

        if let Some(set) = self.resource_set {
            commands.set_resource_set(RESOURCE_SET_INDEX, set);
        }

        Ok(())
    }

    fn rebuild(&mut self, next: Vec<Option<BoundResource>>) -> Result<(), GraphicsError> {
        let entries = next
            .iter()
            .zip(0u32..)
            .filter_map(|(resource, binding)| {
                resource.as_ref().map(|resource| ResourceSetEntry {
                    binding,
                    resource: resource.binding_resource(),
                })
            })
            .collect();

        let backend = self.pipeline.backend();
        let handle = backend.create_resource_set(&ResourceSetDescriptor {
            layout: self.pipeline.resource_layout(),
            entries,
        })?;
        if let Some(previous) = self.resource_set.replace(handle) {
            backend.destroy_resource_set(previous);
        }

        self.bound = next;
        self.resource_set_builds += 1;

        log::debug!(
            "Rebuilt resource set for '{}' (build #{})",
            self.pipeline.pass().name(),
            self.resource_set_builds
        );

        Ok(())
    }

    /// Get the pipeline this set binds for.
    pub fn pipeline(&self) -> &Arc<ShaderPipeline> {
        &self.pipeline
    }

    /// Staging memory of a uniform block.
    pub fn staging(&self, block_name: &str) -> Option<&[u8]> {
        self.pipeline
            .block(block_name)
            .map(|block| self.staging[block.buffer_index].as_slice())
    }

    /// GPU buffer of a uniform block.
    pub fn uniform_buffer(&self, block_name: &str) -> Option<&Arc<Buffer>> {
        self.pipeline
            .block(block_name)
            .map(|block| &self.uniform_buffers[block.buffer_index])
    }

    /// Resource currently bound at `binding`.
    pub fn bound_resource(&self, binding: u32) -> Option<&BoundResource> {
        self.bound.get(binding as usize).and_then(Option::as_ref)
    }

    /// Check whether a backend resource set exists.
    pub fn has_resource_set(&self) -> bool {
        self.resource_set.is_some()
    }

    /// Number of times a backend resource set has been created.
    pub fn resource_set_builds(&self) -> usize {
        self.resource_set_builds
    }
}

impl Drop for BindableResourceSet {
    fn drop(&mut self) {
        if let Some(set) = self.resource_set.take() {
            self.pipeline.backend().destroy_resource_set(set);
        }
    }
}

impl std::fmt::Debug for BindableResourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindableResourceSet")
            .field("pass", &self.pipeline.pass().name())
            .field("blocks", &self.uniform_buffers.len())
            .field("resource_set", &self.resource_set)
            .field("builds", &self.resource_set_builds)
            .finish()
    }
}

// Ensure BindableResourceSet is Send + Sync
static_assertions::assert_impl_all!(BindableResourceSet: Send, Sync);

fn placeholder(defaults: &DefaultResources, kind: UniformKind) -> BoundResource {
    match kind {
        UniformKind::UniformBuffer | UniformKind::StructuredBufferReadOnly => {
            BoundResource::Buffer(defaults.read_only_buffer().clone())
        }
        UniformKind::StructuredBufferReadWrite => {
            BoundResource::Buffer(defaults.read_write_buffer().clone())
        }
        UniformKind::TextureReadOnly => BoundResource::Texture(defaults.white_texture().clone()),
        UniformKind::TextureReadWrite => {
            BoundResource::Texture(defaults.read_write_texture().clone())
        }
        UniformKind::Sampler => BoundResource::Sampler(defaults.point_sampler().clone()),
    }
}

fn structured_buffer<'a>(
    state: &'a PropertyState,
    name: &str,
    usage: BufferUsage,
) -> Option<&'a Arc<Buffer>> {
    let buffer = state.get_buffer(name)?;
    if buffer.usage().contains(usage) {
        Some(buffer)
    } else {
        log::warn!("Buffer '{name}' lacks {usage:?}, binding placeholder");
        None
    }
}

fn texture<'a>(
    state: &'a PropertyState,
    name: &str,
    usage: TextureUsage,
) -> Option<&'a Arc<Texture>> {
    let texture = state.get_texture(name)?;
    if texture.usage().contains(usage) {
        Some(texture)
    } else {
        log::warn!("Texture '{name}' lacks {usage:?}, binding placeholder");
        None
    }
}

/// Copy the members of `uniform` found in `state` into `staging`.
fn stage_block(uniform: &ShaderUniform, staging: &mut [u8], state: &PropertyState) {
    for member in &uniform.members {
        let Some(value) = state.get(&member.name) else {
            continue;
        };
        if value.texture().is_some() || value.value_type() != member.value_type {
            log::warn!(
                "Skipping '{}.{}': expected {:?}, got {:?}",
                uniform.name,
                member.name,
                member.value_type,
                value.value_type()
            );
            continue;
        }

        if member.is_array() {
            stage_array(member, value, staging);
        } else {
            let len = (member.size as usize).min(value.data().len());
            copy_clamped(staging, member.offset as usize, &value.data()[..len]);
        }
    }
}

fn stage_array(member: &UniformMember, value: &Property, staging: &mut [u8]) {
    let data = value.data();
    let count = member.array_length.min(value.array_len()) as usize;
    let dst_stride = member.array_stride as usize;
    let src_stride = value.element_stride();
    let element_len = dst_stride.min(src_stride);

    for element in 0..count {
        let src_start = element * src_stride;
        if src_start >= data.len() {
            break;
        }
        let src_end = (src_start + element_len).min(data.len());
        copy_clamped(
            staging,
            member.offset as usize + element * dst_stride,
            &data[src_start..src_end],
        );
    }
}

/// Copy `src` to `dst[offset..]`, truncated at the end of `dst`.
fn copy_clamped(dst: &mut [u8], offset: usize, src: &[u8]) {
    if offset >= dst.len() {
        return;
    }
    let len = src.len().min(dst.len() - offset);
    dst[offset..offset + len].copy_from_slice(&src[..len]);
}
