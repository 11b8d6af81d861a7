//! GPU buffer resource.

use std::sync::Arc;

use crate::backend::{BufferHandle, GpuBackend};
use crate::error::GraphicsError;
use crate::types::{BufferDescriptor, BufferUsage};

/// A GPU buffer resource.
///
/// Buffers are created by [`GraphicsDevice::create_buffer`](crate::GraphicsDevice::create_buffer)
/// and are reference-counted. The backend buffer is destroyed when the last
/// reference is dropped.
///
/// # Example
///
/// ```ignore
/// let buffer = device.create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))?;
/// println!("Buffer size: {}", buffer.size());
/// ```
pub struct Buffer {
    backend: Arc<dyn GpuBackend>,
    handle: BufferHandle,
    descriptor: BufferDescriptor,
}

impl Buffer {
    /// Create a new backend buffer.
    pub(crate) fn new(
        backend: Arc<dyn GpuBackend>,
        descriptor: BufferDescriptor,
    ) -> Result<Self, GraphicsError> {
        let handle = backend.create_buffer(&descriptor)?;
        Ok(Self {
            backend,
            handle,
            descriptor,
        })
    }

    /// Get the backend handle.
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// Get the buffer descriptor.
    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.descriptor.size
    }

    /// Get the buffer usage flags.
    pub fn usage(&self) -> BufferUsage {
        self.descriptor.usage
    }

    /// Get the buffer label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.backend.destroy_buffer(self.handle);
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("handle", &self.handle)
            .field("size", &self.descriptor.size)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Ensure Buffer is Send + Sync
static_assertions::assert_impl_all!(Buffer: Send, Sync);
