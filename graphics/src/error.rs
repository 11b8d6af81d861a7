//! Graphics error types.

use lumen_core::ShaderError;
use lumen_core::shader::ShaderTarget;
use thiserror::Error;

/// Errors that can occur in the graphics system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// Failed to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// The backend rejected a shader module or pipeline-state object.
    #[error("pipeline creation failed: {0}")]
    PipelineCreationFailed(String),
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Reflected uniforms cannot form a valid resource layout.
    #[error("layout mismatch: {0}")]
    LayoutMismatch(String),
    /// The variant carries no program for the backend's bytecode target.
    #[error("variant has no program for shader target {0:?}")]
    MissingProgram(ShaderTarget),
    /// The GPU device was lost.
    #[error("GPU device lost")]
    DeviceLost,
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// Variant resolution or shader data error.
    #[error(transparent)]
    Shader(#[from] ShaderError),
}
