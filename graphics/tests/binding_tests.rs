//! Resource binding tests on the dummy backend.

mod common;

use std::sync::Arc;

use lumen_core::KeywordState;
use lumen_core::shader::{ShaderUniform, ShaderVariant, UniformKind, UniformMember, ValueType};
use lumen_graphics::{
    BoundResource, BufferDescriptor, BufferUsage, Command, CommandList, DeviceParameters,
    DummyBackend, GraphicsDevice, GraphicsError, PropertyState, SamplerDescriptor,
    TextureDescriptor, TextureFormat, TextureUsage,
};
use rstest::rstest;

use common::{
    dummy_device, light_block, lit_pipeline, pipeline_for, single_variant_pass, spirv_program,
};

fn floats(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn update_count(commands: &CommandList) -> usize {
    commands
        .commands()
        .iter()
        .filter(|command| matches!(command, Command::UpdateBuffer { .. }))
        .count()
}

#[test]
fn test_uniform_buffer_allocation() {
    let (device, _backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let resources = pipeline.create_resources().unwrap();

    let buffer = resources.uniform_buffer("Light").unwrap();
    assert_eq!(buffer.size(), 32);
    assert_eq!(buffer.usage(), BufferUsage::UNIFORM | BufferUsage::COPY_DST);
    assert_eq!(resources.staging("Light").unwrap(), &[0u8; 32]);
    assert!(resources.staging("Camera").is_none());
    assert!(!resources.has_resource_set());
}

#[test]
fn test_unset_members_keep_previous_values() {
    let (device, _backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();

    let mut first = PropertyState::new();
    first.set_color("color", [1.0, 0.5, 0.25, 1.0]);
    let mut commands = CommandList::new();
    resources.bind(&mut commands, &first).unwrap();
    device.submit(&commands).unwrap();

    let mut second = PropertyState::new();
    second.set_float("intensity", 3.0);
    let mut commands = CommandList::new();
    resources.bind(&mut commands, &second).unwrap();
    device.submit(&commands).unwrap();

    let uploaded = device
        .read_buffer(resources.uniform_buffer("Light").unwrap())
        .unwrap();
    assert_eq!(&uploaded[0..16], floats(&[1.0, 0.5, 0.25, 1.0]).as_slice());
    assert_eq!(&uploaded[16..20], &3.0f32.to_le_bytes());
    assert_eq!(&uploaded[20..32], &[0u8; 12]);
}

#[test]
fn test_one_upload_per_block_per_bind() {
    let (device, _backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();

    let mut state = PropertyState::new();
    state.set_color("color", [1.0; 4]);
    state.set_float("intensity", 1.0);

    let mut commands = CommandList::new();
    resources.bind(&mut commands, &state).unwrap();
    assert_eq!(update_count(&commands), 1);
    assert!(matches!(
        commands.commands().last(),
        Some(Command::SetResourceSet { index: 0, .. })
    ));
}

#[test]
fn test_mismatched_types_are_skipped() {
    let (device, _backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();

    let texture = device
        .create_texture(&TextureDescriptor::new_2d(
            4,
            4,
            TextureFormat::Rgba8Unorm,
            TextureUsage::SAMPLED,
        ))
        .unwrap();

    let mut state = PropertyState::new();
    state.set_float("color", 1.0);
    state.set_texture("intensity", texture);

    let mut commands = CommandList::new();
    resources.bind(&mut commands, &state).unwrap();
    assert!(resources.staging("Light").unwrap().iter().all(|b| *b == 0));
}

#[test]
fn test_array_copies_declared_elements_only() {
    // float weights[4] (16-byte stride) followed by float4 tail at 64
    let variant = ShaderVariant::new(KeywordState::new())
        .with_program(spirv_program())
        .with_uniform(ShaderUniform::block(
            "Skin",
            0,
            80,
            vec![
                UniformMember::new("weights", ValueType::Float, 0, 64).with_array(16, 4),
                UniformMember::new("tail", ValueType::Float4, 64, 16),
            ],
        ));
    let (device, _backend) = dummy_device();
    let pipeline = pipeline_for(&device, single_variant_pass(variant));
    let mut resources = pipeline.create_resources().unwrap();

    let mut tail = PropertyState::new();
    tail.set_vector4("tail", [9.0; 4]);
    resources.bind(&mut CommandList::new(), &tail).unwrap();

    let mut weights = PropertyState::new();
    weights.set_float_array("weights", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    resources.bind(&mut CommandList::new(), &weights).unwrap();

    let staging = resources.staging("Skin").unwrap();
    for (element, expected) in [1.0f32, 2.0, 3.0, 4.0].iter().enumerate() {
        let offset = element * 16;
        assert_eq!(&staging[offset..offset + 4], &expected.to_le_bytes());
        assert_eq!(&staging[offset + 4..offset + 16], &[0u8; 12]);
    }
    assert_eq!(&staging[64..80], floats(&[9.0; 4]).as_slice());
}

#[test]
fn test_second_bind_reuses_resource_set() {
    let (device, backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();

    let mut state = PropertyState::new();
    state.set_float("intensity", 1.0);

    let mut first = CommandList::new();
    resources.bind(&mut first, &state).unwrap();
    state.set_float("intensity", 2.0);
    let mut second = CommandList::new();
    resources.bind(&mut second, &state).unwrap();

    assert!(resources.has_resource_set());
    assert_eq!(resources.resource_set_builds(), 1);
    assert_eq!(backend.stats().resource_sets_created, 1);
    assert_eq!(first.commands().last(), second.commands().last());
    assert_eq!(update_count(&second), 1);
}

#[test]
fn test_sampler_follows_paired_texture() {
    let (device, _backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();

    let linear = device.create_sampler(&SamplerDescriptor::linear()).unwrap();
    let albedo = device
        .create_texture_with_sampler(
            &TextureDescriptor::new_2d(64, 64, TextureFormat::Rgba8UnormSrgb, TextureUsage::SAMPLED),
            linear.clone(),
        )
        .unwrap();

    let mut state = PropertyState::new();
    state.set_texture("_MainTex", albedo.clone());
    resources.bind(&mut CommandList::new(), &state).unwrap();

    assert_eq!(
        resources.bound_resource(1),
        Some(&BoundResource::Texture(albedo))
    );
    assert_eq!(
        resources.bound_resource(2),
        Some(&BoundResource::Sampler(linear))
    );
}

#[test]
fn test_missing_resources_get_placeholders() {
    let (device, _backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();
    resources
        .bind(&mut CommandList::new(), &PropertyState::new())
        .unwrap();

    let defaults = device.defaults();
    assert_eq!(
        resources.bound_resource(1),
        Some(&BoundResource::Texture(defaults.white_texture().clone()))
    );
    assert_eq!(
        resources.bound_resource(2),
        Some(&BoundResource::Sampler(defaults.point_sampler().clone()))
    );
    assert_eq!(
        resources.bound_resource(3),
        Some(&BoundResource::Buffer(defaults.read_only_buffer().clone()))
    );
    assert!(resources.bound_resource(4).is_none());
}

#[rstest]
#[case::vertex_only(BufferUsage::VERTEX, false)]
#[case::read_write_only(BufferUsage::STRUCTURED_READ_WRITE, false)]
#[case::read_only(BufferUsage::STRUCTURED_READ_ONLY, true)]
#[case::both(
    BufferUsage::STRUCTURED_READ_ONLY | BufferUsage::STRUCTURED_READ_WRITE,
    true
)]
fn test_structured_buffer_capability(#[case] usage: BufferUsage, #[case] accepted: bool) {
    let (device, _backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();

    let instances = device
        .create_buffer(&BufferDescriptor::new(256, usage))
        .unwrap();
    let mut state = PropertyState::new();
    state.set_buffer("_Instances", instances.clone());
    resources.bind(&mut CommandList::new(), &state).unwrap();

    let expected = if accepted {
        instances
    } else {
        device.defaults().read_only_buffer().clone()
    };
    assert_eq!(
        resources.bound_resource(3),
        Some(&BoundResource::Buffer(expected))
    );
}

#[test]
fn test_texture_without_sampled_usage_falls_back() {
    let (device, _backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();

    let storage_only = device
        .create_texture(&TextureDescriptor::new_2d(
            8,
            8,
            TextureFormat::Rgba8Unorm,
            TextureUsage::STORAGE,
        ))
        .unwrap();
    let mut state = PropertyState::new();
    state.set_texture("_MainTex", storage_only);
    resources.bind(&mut CommandList::new(), &state).unwrap();

    assert_eq!(
        resources.bound_resource(1),
        Some(&BoundResource::Texture(
            device.defaults().white_texture().clone()
        ))
    );
}

#[test]
fn test_read_write_slots_use_read_write_placeholders() {
    let variant = ShaderVariant::new(KeywordState::new())
        .with_program(spirv_program())
        .with_uniform(ShaderUniform::new(
            "_Output",
            UniformKind::TextureReadWrite,
            0,
        ))
        .with_uniform(ShaderUniform::new(
            "_Particles",
            UniformKind::StructuredBufferReadWrite,
            1,
        ));
    let (device, _backend) = dummy_device();
    let pipeline = pipeline_for(&device, single_variant_pass(variant));
    let mut resources = pipeline.create_resources().unwrap();
    resources
        .bind(&mut CommandList::new(), &PropertyState::new())
        .unwrap();

    let defaults = device.defaults();
    assert_eq!(
        resources.bound_resource(0),
        Some(&BoundResource::Texture(
            defaults.read_write_texture().clone()
        ))
    );
    assert_eq!(
        resources.bound_resource(1),
        Some(&BoundResource::Buffer(defaults.read_write_buffer().clone()))
    );
}

#[test]
fn test_identity_change_rebuilds_resource_set() {
    let (device, backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();

    let descriptor =
        TextureDescriptor::new_2d(16, 16, TextureFormat::Rgba8Unorm, TextureUsage::SAMPLED);
    let a = device.create_texture(&descriptor).unwrap();
    let b = device.create_texture(&descriptor).unwrap();

    let mut state = PropertyState::new();
    state.set_texture("_MainTex", a.clone());
    resources.bind(&mut CommandList::new(), &state).unwrap();

    // same texture again: identical contents, same identity
    state.set_texture("_MainTex", a);
    resources.bind(&mut CommandList::new(), &state).unwrap();
    assert_eq!(resources.resource_set_builds(), 1);

    state.set_texture("_MainTex", b.clone());
    let mut commands = CommandList::new();
    resources.bind(&mut commands, &state).unwrap();
    device.submit(&commands).unwrap();

    assert_eq!(resources.resource_set_builds(), 2);
    assert_eq!(
        resources.bound_resource(1),
        Some(&BoundResource::Texture(b))
    );
    let stats = backend.stats();
    assert_eq!(stats.resource_sets_created, 2);
    assert_eq!(stats.live_resource_sets(), 1);
}

#[test]
fn test_bound_resources_outlive_property_state() {
    let (device, backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();

    {
        let texture = device
            .create_texture(&TextureDescriptor::new_2d(
                4,
                4,
                TextureFormat::Rgba8Unorm,
                TextureUsage::SAMPLED,
            ))
            .unwrap();
        let mut state = PropertyState::new();
        state.set_texture("_MainTex", texture);
        resources.bind(&mut CommandList::new(), &state).unwrap();
    }

    // the resource set still references the texture
    let stats = backend.stats();
    assert_eq!(stats.textures_created - stats.textures_destroyed, 3);
    assert_eq!(device.texture_count(), 1);
}

#[test]
fn test_drop_releases_backend_objects() {
    let (device, backend) = dummy_device();
    let baseline = backend.stats();

    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();
    resources
        .bind(&mut CommandList::new(), &PropertyState::new())
        .unwrap();
    pipeline
        .get_pipeline(
            lumen_core::render_state::FillMode::Solid,
            lumen_core::render_state::PrimitiveTopology::TriangleList,
            false,
        )
        .unwrap();

    drop(resources);
    let stats = backend.stats();
    assert_eq!(stats.live_resource_sets(), 0);
    assert_eq!(stats.live_buffers(), baseline.live_buffers());

    drop(pipeline);
    let stats = backend.stats();
    assert_eq!(stats.live_pipelines(), 0);
    assert_eq!(stats.live_shader_modules(), 0);
    assert_eq!(
        stats.resource_layouts_created,
        stats.resource_layouts_destroyed
    );
    assert_eq!(device.pipeline_count(), 0);
}

#[test]
fn test_resource_sets_are_independent() {
    let (device, _backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut a = pipeline.create_resources().unwrap();
    let mut b = pipeline.create_resources().unwrap();

    let mut state = PropertyState::new();
    state.set_float("intensity", 5.0);
    a.bind(&mut CommandList::new(), &state).unwrap();
    b.bind(&mut CommandList::new(), &PropertyState::new()).unwrap();

    assert_eq!(&a.staging("Light").unwrap()[16..20], &5.0f32.to_le_bytes());
    assert_eq!(&b.staging("Light").unwrap()[16..20], &[0u8; 4]);
    assert!(!Arc::ptr_eq(
        a.uniform_buffer("Light").unwrap(),
        b.uniform_buffer("Light").unwrap()
    ));
}

#[test]
fn test_light_block_layout_in_second_variant() {
    // blocks are located by name, not by binding
    let variant = ShaderVariant::new(KeywordState::new())
        .with_program(spirv_program())
        .with_uniform(ShaderUniform::texture("_MainTex", 0))
        .with_uniform(light_block(5));
    let (device, _backend) = dummy_device();
    let pipeline = pipeline_for(&device, single_variant_pass(variant));
    let mut resources = pipeline.create_resources().unwrap();

    let mut state = PropertyState::new();
    state.set_color("color", [0.0, 1.0, 0.0, 1.0]);
    resources.bind(&mut CommandList::new(), &state).unwrap();

    assert_eq!(
        &resources.staging("Light").unwrap()[0..16],
        floats(&[0.0, 1.0, 0.0, 1.0]).as_slice()
    );
    assert!(matches!(
        resources.bound_resource(5),
        Some(BoundResource::Buffer(_))
    ));
    assert!(resources.bound_resource(3).is_none());
}

#[test]
fn test_oversized_uniform_block_rejected() {
    common::init_logging();
    let backend = Arc::new(DummyBackend::new());
    let device = GraphicsDevice::new(
        backend.clone(),
        DeviceParameters::new().with_max_buffer_size(32),
    )
    .unwrap();
    let baseline = backend.stats();

    let variant = ShaderVariant::new(KeywordState::new())
        .with_program(spirv_program())
        .with_uniform(light_block(0))
        .with_uniform(ShaderUniform::block(
            "Big",
            1,
            4096,
            vec![UniformMember::new("data", ValueType::Float4, 0, 16)],
        ));
    let pipeline = pipeline_for(&device, single_variant_pass(variant));

    assert!(matches!(
        pipeline.create_resources(),
        Err(GraphicsError::InvalidParameter(_))
    ));
    // the Light buffer allocated before the failure is released again
    assert_eq!(backend.stats().live_buffers(), baseline.live_buffers());

    // blocks within the limit still fit
    let pipeline = pipeline_for(
        &device,
        single_variant_pass(
            ShaderVariant::new(KeywordState::new())
                .with_program(spirv_program())
                .with_uniform(light_block(0)),
        ),
    );
    let resources = pipeline.create_resources().unwrap();
    assert_eq!(resources.uniform_buffer("Light").unwrap().size(), 32);
}

#[test]
fn test_failed_rebuild_keeps_previous_resource_set() {
    let (device, backend) = dummy_device();
    let pipeline = lit_pipeline(&device);
    let mut resources = pipeline.create_resources().unwrap();

    let descriptor =
        TextureDescriptor::new_2d(16, 16, TextureFormat::Rgba8Unorm, TextureUsage::SAMPLED);
    let a = device.create_texture(&descriptor).unwrap();
    let b = device.create_texture(&descriptor).unwrap();

    let mut state = PropertyState::new();
    state.set_texture("_MainTex", a.clone());
    resources.bind(&mut CommandList::new(), &state).unwrap();
    assert_eq!(resources.resource_set_builds(), 1);

    backend.lose_device();
    state.set_texture("_MainTex", b.clone());
    assert!(matches!(
        resources.bind(&mut CommandList::new(), &state),
        Err(GraphicsError::DeviceLost)
    ));

    assert_eq!(resources.resource_set_builds(), 1);
    assert!(resources.has_resource_set());
    assert_eq!(
        resources.bound_resource(1),
        Some(&BoundResource::Texture(a))
    );
    assert_eq!(backend.stats().live_resource_sets(), 1);

    backend.restore_device();
    resources.bind(&mut CommandList::new(), &state).unwrap();
    assert_eq!(resources.resource_set_builds(), 2);
    assert_eq!(
        resources.bound_resource(1),
        Some(&BoundResource::Texture(b))
    );
    assert_eq!(backend.stats().live_resource_sets(), 1);
}
