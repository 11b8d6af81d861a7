//! Shared fixtures for the binding and pipeline integration tests.
//!
//! Everything runs on the [`DummyBackend`], which keeps shadow memory for
//! buffers and counts every object it creates and destroys.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use lumen_core::KeywordState;
use lumen_core::shader::{
    ShaderEntryPoint, ShaderPass, ShaderPassDescriptor, ShaderProgram, ShaderTarget,
    ShaderUniform, ShaderVariant, UniformKind, UniformMember, ValueType, VertexFormat,
    VertexInput,
};
use lumen_graphics::{
    DeviceParameters, DummyBackend, GraphicsDevice, ShaderPipeline, ShaderPipelineDescriptor,
};

static INIT: Once = Once::new();

/// Route `log` output to the test harness once per process.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// A device on a fresh dummy backend, plus the backend for inspecting stats.
pub fn dummy_device() -> (Arc<GraphicsDevice>, Arc<DummyBackend>) {
    init_logging();
    let backend = Arc::new(DummyBackend::new());
    let device = GraphicsDevice::new(backend.clone(), DeviceParameters::new().with_label("test"))
        .expect("dummy device");
    (device, backend)
}

/// A SPIR-V program with a vertex and a fragment stage.
pub fn spirv_program() -> ShaderProgram {
    ShaderProgram::new(ShaderTarget::Spirv)
        .with_stage(ShaderEntryPoint::vertex(vec![0x03, 0x02, 0x23, 0x07], "vs_main"))
        .with_stage(ShaderEntryPoint::fragment(vec![0x03, 0x02, 0x23, 0x07], "fs_main"))
}

/// `cbuffer Light { float4 color; float intensity; }` (20 bytes).
pub fn light_block(binding: u32) -> ShaderUniform {
    ShaderUniform::block(
        "Light",
        binding,
        20,
        vec![
            UniformMember::new("color", ValueType::Float4, 0, 16),
            UniformMember::new("intensity", ValueType::Float, 16, 4),
        ],
    )
}

/// A lit variant: Light block, `_MainTex` with its sampler and a read-only
/// structured buffer of instance data.
pub fn lit_variant(keywords: KeywordState) -> ShaderVariant {
    ShaderVariant::new(keywords)
        .with_program(spirv_program())
        .with_vertex_input(VertexInput::new("POSITION", VertexFormat::Float32x3))
        .with_vertex_input(VertexInput::new("TEXCOORD0", VertexFormat::Float32x2))
        .with_uniform(light_block(0))
        .with_uniform(ShaderUniform::texture("_MainTex", 1))
        .with_uniform(ShaderUniform::sampler("sampler_MainTex", 2))
        .with_uniform(ShaderUniform::new(
            "_Instances",
            UniformKind::StructuredBufferReadOnly,
            3,
        ))
}

/// A pass with a single variant and no keywords.
pub fn single_variant_pass(variant: ShaderVariant) -> Arc<ShaderPass> {
    Arc::new(
        ShaderPass::new("Forward", ShaderPassDescriptor::new(), [variant]).expect("valid pass"),
    )
}

/// Build the pipeline of the only variant of `pass`.
pub fn pipeline_for(device: &GraphicsDevice, pass: Arc<ShaderPass>) -> Arc<ShaderPipeline> {
    let descriptor = ShaderPipelineDescriptor::for_keywords(pass, None).expect("variant");
    device
        .create_shader_pipeline(&descriptor)
        .expect("pipeline")
}

/// The lit pipeline on `device`.
pub fn lit_pipeline(device: &GraphicsDevice) -> Arc<ShaderPipeline> {
    pipeline_for(device, single_variant_pass(lit_variant(KeywordState::new())))
}
