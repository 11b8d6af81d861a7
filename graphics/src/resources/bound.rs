//! Resources as bound to a resource-set slot.

use std::sync::Arc;

use crate::backend::BindingResource;

use super::{Buffer, Sampler, Texture};

/// A GPU resource occupying one binding slot.
///
/// Equality is identity: two bound resources are the same when they point to
/// the same allocation, regardless of contents.
#[derive(Debug, Clone)]
pub enum BoundResource {
    Buffer(Arc<Buffer>),
    Texture(Arc<Texture>),
    Sampler(Arc<Sampler>),
}

impl BoundResource {
    /// Check whether both refer to the same allocation.
    pub fn same_resource(&self, other: &BoundResource) -> bool {
        match (self, other) {
            (Self::Buffer(a), Self::Buffer(b)) => Arc::ptr_eq(a, b),
            (Self::Texture(a), Self::Texture(b)) => Arc::ptr_eq(a, b),
            (Self::Sampler(a), Self::Sampler(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The backend handle to place in a resource set.
    pub fn binding_resource(&self) -> BindingResource {
        match self {
            Self::Buffer(buffer) => BindingResource::Buffer(buffer.handle()),
            Self::Texture(texture) => BindingResource::Texture(texture.handle()),
            Self::Sampler(sampler) => BindingResource::Sampler(sampler.handle()),
        }
    }
}

impl PartialEq for BoundResource {
    fn eq(&self, other: &Self) -> bool {
        self.same_resource(other)
    }
}

impl Eq for BoundResource {}
