//! # Lumen Core
//!
//! CPU-side data for the Lumen shading engine.
//!
//! This crate provides:
//! - [`keyword`] - Keyword states and keyword domains used to select shader variants
//! - [`render_state`] - Blend, depth/stencil, culling and rasterizer descriptors
//! - [`shader`] - Reflected shader variants and [`ShaderPass`](shader::ShaderPass) resolution
//! - [`format`] - RON / bincode encoding of serializable shader data
//! - [`profiling`] - Optional Tracy instrumentation
//!
//! Nothing in this crate talks to a GPU; see `lumen-graphics` for pipelines and bindings.

pub mod error;
pub mod format;
pub mod keyword;
pub mod profiling;
pub mod render_state;
pub mod shader;

pub use error::ShaderError;
pub use keyword::{KeywordDomain, KeywordState};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
