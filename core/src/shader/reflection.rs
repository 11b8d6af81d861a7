//! Compiled shader variants and their reflection data.
//!
//! A [`ShaderVariant`] is one compiled permutation of a pass: bytecode for one
//! or more backend targets plus the reflected vertex inputs and uniforms that
//! drive pipeline and binding construction.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::keyword::KeywordState;

/// Shader stage in the graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Fragment shader.
    Fragment,
    /// Compute shader.
    Compute,
}

impl ShaderStage {
    /// The stage flag matching this stage.
    pub fn flag(self) -> ShaderStageFlags {
        match self {
            Self::Vertex => ShaderStageFlags::VERTEX,
            Self::Fragment => ShaderStageFlags::FRAGMENT,
            Self::Compute => ShaderStageFlags::COMPUTE,
        }
    }
}

bitflags! {
    /// Shader stages that can access a binding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ShaderStageFlags: u32 {
        /// Vertex shader stage.
        const VERTEX = 1 << 0;
        /// Fragment shader stage.
        const FRAGMENT = 1 << 1;
        /// Compute shader stage.
        const COMPUTE = 1 << 2;
    }
}

impl Default for ShaderStageFlags {
    fn default() -> Self {
        Self::VERTEX | Self::FRAGMENT
    }
}

/// Bytecode flavour a backend consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderTarget {
    /// SPIR-V binary.
    Spirv,
    /// WGSL source.
    Wgsl,
    /// GLSL source.
    Glsl,
    /// Metal shading language source.
    Msl,
    /// HLSL / DXIL.
    Hlsl,
}

/// One stage of a compiled program.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderEntryPoint {
    /// The shader stage.
    pub stage: ShaderStage,
    /// Compiled code for the stage.
    pub bytecode: Vec<u8>,
    /// Entry point function name.
    pub entry_point: String,
}

impl ShaderEntryPoint {
    /// Create a new entry point.
    pub fn new(
        stage: ShaderStage,
        bytecode: impl Into<Vec<u8>>,
        entry_point: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            bytecode: bytecode.into(),
            entry_point: entry_point.into(),
        }
    }

    /// Create a vertex entry point.
    pub fn vertex(bytecode: impl Into<Vec<u8>>, entry_point: impl Into<String>) -> Self {
        Self::new(ShaderStage::Vertex, bytecode, entry_point)
    }

    /// Create a fragment entry point.
    pub fn fragment(bytecode: impl Into<Vec<u8>>, entry_point: impl Into<String>) -> Self {
        Self::new(ShaderStage::Fragment, bytecode, entry_point)
    }
}

impl fmt::Debug for ShaderEntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderEntryPoint")
            .field("stage", &self.stage)
            .field("entry_point", &self.entry_point)
            .field("bytecode_len", &self.bytecode.len())
            .finish()
    }
}

/// All stages compiled for one backend target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderProgram {
    /// Target the bytecode was produced for.
    pub target: ShaderTarget,
    /// Compiled stages.
    pub stages: Vec<ShaderEntryPoint>,
}

impl ShaderProgram {
    /// Create an empty program for `target`.
    pub fn new(target: ShaderTarget) -> Self {
        Self {
            target,
            stages: Vec::new(),
        }
    }

    /// Add a compiled stage.
    pub fn with_stage(mut self, stage: ShaderEntryPoint) -> Self {
        self.stages.push(stage);
        self
    }
}

/// Format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexFormat {
    /// One 32-bit float.
    Float32,
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
    /// One 32-bit signed integer.
    Sint32,
    /// Four 32-bit signed integers.
    Sint32x4,
    /// One 32-bit unsigned integer.
    Uint32,
    /// Four 32-bit unsigned integers.
    Uint32x4,
    /// Four normalized unsigned bytes.
    Unorm8x4,
}

impl VertexFormat {
    /// Size of one attribute in bytes.
    pub fn size(self) -> u32 {
        match self {
            Self::Float32 | Self::Sint32 | Self::Uint32 | Self::Unorm8x4 => 4,
            Self::Float32x2 => 8,
            Self::Float32x3 => 12,
            Self::Float32x4 | Self::Sint32x4 | Self::Uint32x4 => 16,
        }
    }
}

/// A reflected vertex input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexInput {
    /// Semantic name (`POSITION`, `TEXCOORD0`, ...).
    pub semantic: String,
    /// Attribute format.
    pub format: VertexFormat,
}

impl VertexInput {
    /// Create a new vertex input.
    pub fn new(semantic: impl Into<String>, format: VertexFormat) -> Self {
        Self {
            semantic: semantic.into(),
            format,
        }
    }
}

/// Kind of resource a uniform binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UniformKind {
    /// Constant block staged on the CPU.
    UniformBuffer,
    /// Read-only structured buffer.
    StructuredBufferReadOnly,
    /// Read-write structured buffer.
    StructuredBufferReadWrite,
    /// Sampled texture.
    TextureReadOnly,
    /// Storage texture.
    TextureReadWrite,
    /// Sampler paired with a texture.
    Sampler,
}

/// Type tag of a block member or property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    Int3,
    Int4,
    UInt,
    UInt2,
    UInt3,
    UInt4,
    Float2x2,
    Float3x3,
    Float4x4,
    /// Opaque bytes; sized by the data itself.
    Bytes,
    /// Texture reference.
    Texture,
}

impl ValueType {
    /// Logical byte size of one element, `None` for unsized tags.
    pub fn byte_size(self) -> Option<usize> {
        match self {
            Self::Bytes | Self::Texture => None,
            _ => Some(self.columns() * self.rows() * 4),
        }
    }

    /// Number of columns (vector width).
    pub fn columns(self) -> usize {
        match self {
            Self::Float | Self::Int | Self::UInt => 1,
            Self::Float2 | Self::Int2 | Self::UInt2 | Self::Float2x2 => 2,
            Self::Float3 | Self::Int3 | Self::UInt3 | Self::Float3x3 => 3,
            Self::Float4 | Self::Int4 | Self::UInt4 | Self::Float4x4 => 4,
            Self::Bytes | Self::Texture => 0,
        }
    }

    /// Number of rows (1 for scalars and vectors).
    pub fn rows(self) -> usize {
        match self {
            Self::Float2x2 => 2,
            Self::Float3x3 => 3,
            Self::Float4x4 => 4,
            Self::Bytes | Self::Texture => 0,
            _ => 1,
        }
    }
}

/// A member of a uniform block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformMember {
    /// Member name, matched against property names.
    pub name: String,
    /// Expected value type.
    pub value_type: ValueType,
    /// Byte offset within the block.
    pub offset: u32,
    /// Byte size of the member (whole array for array members).
    pub size: u32,
    /// Byte stride between array elements, 0 for non-arrays.
    pub array_stride: u32,
    /// Declared element count, 0 for non-arrays.
    pub array_length: u32,
}

impl UniformMember {
    /// Create a non-array member.
    pub fn new(name: impl Into<String>, value_type: ValueType, offset: u32, size: u32) -> Self {
        Self {
            name: name.into(),
            value_type,
            offset,
            size,
            array_stride: 0,
            array_length: 0,
        }
    }

    /// Turn this member into an array of `length` elements spaced `stride` bytes apart.
    pub fn with_array(mut self, stride: u32, length: u32) -> Self {
        self.array_stride = stride;
        self.array_length = length;
        self
    }

    /// Check whether the member is an array.
    pub fn is_array(&self) -> bool {
        self.array_stride > 0
    }
}

/// A reflected uniform: a block, buffer, texture or sampler binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderUniform {
    /// Uniform name, matched against property names.
    pub name: String,
    /// Resource kind.
    pub kind: UniformKind,
    /// Declared binding slot.
    pub binding: u32,
    /// Byte size (blocks only).
    pub size: u32,
    /// Stages that access the uniform.
    pub stages: ShaderStageFlags,
    /// Block members (blocks only).
    pub members: Vec<UniformMember>,
}

impl ShaderUniform {
    /// Create a uniform of any kind with default stage visibility.
    pub fn new(name: impl Into<String>, kind: UniformKind, binding: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            binding,
            size: 0,
            stages: ShaderStageFlags::default(),
            members: Vec::new(),
        }
    }

    /// Create a uniform block of `size` bytes.
    pub fn block(
        name: impl Into<String>,
        binding: u32,
        size: u32,
        members: Vec<UniformMember>,
    ) -> Self {
        Self {
            size,
            members,
            ..Self::new(name, UniformKind::UniformBuffer, binding)
        }
    }

    /// Create a sampled texture uniform.
    pub fn texture(name: impl Into<String>, binding: u32) -> Self {
        Self::new(name, UniformKind::TextureReadOnly, binding)
    }

    /// Create a sampler uniform.
    pub fn sampler(name: impl Into<String>, binding: u32) -> Self {
        Self::new(name, UniformKind::Sampler, binding)
    }

    /// Set the stage visibility.
    pub fn with_stages(mut self, stages: ShaderStageFlags) -> Self {
        self.stages = stages;
        self
    }

    /// Look up a block member by name.
    pub fn member(&self, name: &str) -> Option<&UniformMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// One compiled permutation of a shader pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderVariant {
    keywords: KeywordState,
    programs: Vec<ShaderProgram>,
    vertex_inputs: Vec<VertexInput>,
    uniforms: Vec<ShaderUniform>,
}

impl ShaderVariant {
    /// Create a variant compiled for `keywords`.
    pub fn new(keywords: KeywordState) -> Self {
        Self {
            keywords,
            programs: Vec::new(),
            vertex_inputs: Vec::new(),
            uniforms: Vec::new(),
        }
    }

    /// Add a compiled program.
    pub fn with_program(mut self, program: ShaderProgram) -> Self {
        self.programs.push(program);
        self
    }

    /// Append a vertex input.
    pub fn with_vertex_input(mut self, input: VertexInput) -> Self {
        self.vertex_inputs.push(input);
        self
    }

    /// Append a uniform.
    pub fn with_uniform(mut self, uniform: ShaderUniform) -> Self {
        self.uniforms.push(uniform);
        self
    }

    /// The keyword state this variant was compiled for.
    pub fn keywords(&self) -> &KeywordState {
        &self.keywords
    }

    /// All compiled programs.
    pub fn programs(&self) -> &[ShaderProgram] {
        &self.programs
    }

    /// Stages compiled for `target`, if any.
    pub fn programs_for(&self, target: ShaderTarget) -> Option<&[ShaderEntryPoint]> {
        self.programs
            .iter()
            .find(|p| p.target == target)
            .map(|p| p.stages.as_slice())
    }

    /// Reflected vertex inputs, in input order.
    pub fn vertex_inputs(&self) -> &[VertexInput] {
        &self.vertex_inputs
    }

    /// Reflected uniforms, in declaration order.
    pub fn uniforms(&self) -> &[ShaderUniform] {
        &self.uniforms
    }

    /// Look up a uniform by name.
    pub fn uniform(&self, name: &str) -> Option<&ShaderUniform> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}
