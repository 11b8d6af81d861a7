//! Shader passes and their compiled variants.
//!
//! A [`ShaderPass`] groups the [`ShaderVariant`]s compiled for every keyword
//! combination of its [`KeywordDomain`](crate::keyword::KeywordDomain) and
//! resolves requested keyword states to exactly one of them.

mod pass;
mod reflection;

pub use pass::{SerializedShaderPass, ShaderPass, ShaderPassDescriptor};
pub use reflection::{
    ShaderEntryPoint, ShaderProgram, ShaderStage, ShaderStageFlags, ShaderTarget, ShaderUniform,
    ShaderVariant, UniformKind, UniformMember, ValueType, VertexFormat, VertexInput,
};
