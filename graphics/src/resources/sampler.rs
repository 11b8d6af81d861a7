//! GPU sampler resource.

use std::sync::Arc;

use crate::backend::{GpuBackend, SamplerHandle};
use crate::error::GraphicsError;
use crate::types::SamplerDescriptor;

/// A GPU texture sampler.
///
/// Samplers are created by [`GraphicsDevice::create_sampler`](crate::GraphicsDevice::create_sampler)
/// and are reference-counted.
pub struct Sampler {
    backend: Arc<dyn GpuBackend>,
    handle: SamplerHandle,
    descriptor: SamplerDescriptor,
}

impl Sampler {
    /// Create a new backend sampler.
    pub(crate) fn new(
        backend: Arc<dyn GpuBackend>,
        descriptor: SamplerDescriptor,
    ) -> Result<Self, GraphicsError> {
        let handle = backend.create_sampler(&descriptor)?;
        Ok(Self {
            backend,
            handle,
            descriptor,
        })
    }

    /// Get the backend handle.
    pub fn handle(&self) -> SamplerHandle {
        self.handle
    }

    /// Get the sampler descriptor.
    pub fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }

    /// Get the sampler label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.backend.destroy_sampler(self.handle);
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("handle", &self.handle)
            .field("mag_filter", &self.descriptor.mag_filter)
            .field("min_filter", &self.descriptor.min_filter)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Ensure Sampler is Send + Sync
static_assertions::assert_impl_all!(Sampler: Send, Sync);
