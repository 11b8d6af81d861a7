//! Common types and descriptors for graphics resources.
//!
//! This module contains format enums, usage flags, and descriptor structs
//! used throughout the graphics system.

mod buffer;
mod output;
mod sampler;
mod texture;
mod vertex;

pub use buffer::{BufferDescriptor, BufferUsage, align_up};
pub use output::OutputDescription;
pub use sampler::{AddressMode, CompareFunction, FilterMode, SamplerDescriptor};
pub use texture::{Extent3d, TextureDescriptor, TextureFormat, TextureUsage};
pub use vertex::{VERTEX_INPUT_PREFIX, VertexElement, VertexLayout};
