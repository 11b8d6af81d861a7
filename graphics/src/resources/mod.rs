//! GPU resources.
//!
//! This module contains the GPU resource types that are created by [`GraphicsDevice`]:
//! - [`Buffer`] - GPU memory buffer
//! - [`Texture`] - GPU texture/image, paired with the sampler it is read through
//! - [`Sampler`] - Texture sampler
//! - [`BoundResource`] - One of the above, as bound to a resource-set slot
//!
//! Resources are reference-counted with [`Arc`] and can be shared across threads.
//! Each resource holds the backend that created it and destroys its handle on drop.
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice
//! [`Arc`]: std::sync::Arc

mod bound;
mod buffer;
mod sampler;
mod texture;

pub use bound::BoundResource;
pub use buffer::Buffer;
pub use sampler::Sampler;
pub use texture::Texture;
