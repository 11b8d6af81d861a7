//! Fixed-function render state.
//!
//! These descriptors carry the blend, depth/stencil and rasterizer
//! configuration a [`ShaderPass`](crate::shader::ShaderPass) shares across all
//! of its variants, plus the per-draw axes (fill mode and primitive topology)
//! a pipeline is specialised on.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// ============================================================================
// Blending
// ============================================================================

/// Blend factor for blending operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendFactor {
    /// 0.0
    #[default]
    Zero,
    /// 1.0
    One,
    /// Source color
    Src,
    /// 1 - source color
    OneMinusSrc,
    /// Source alpha
    SrcAlpha,
    /// 1 - source alpha
    OneMinusSrcAlpha,
    /// Destination color
    Dst,
    /// 1 - destination color
    OneMinusDst,
    /// Destination alpha
    DstAlpha,
    /// 1 - destination alpha
    OneMinusDstAlpha,
    /// min(source alpha, 1 - destination alpha)
    SrcAlphaSaturated,
    /// Constant color
    Constant,
    /// 1 - constant color
    OneMinusConstant,
}

/// Blend operation for combining colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendOperation {
    /// source + destination
    #[default]
    Add,
    /// source - destination
    Subtract,
    /// destination - source
    ReverseSubtract,
    /// min(source, destination)
    Min,
    /// max(source, destination)
    Max,
}

/// Blend component configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendComponent {
    /// Source factor.
    pub src_factor: BlendFactor,
    /// Destination factor.
    pub dst_factor: BlendFactor,
    /// Blend operation.
    pub operation: BlendOperation,
}

impl Default for BlendComponent {
    fn default() -> Self {
        Self::REPLACE
    }
}

impl BlendComponent {
    /// Source replaces destination.
    pub const REPLACE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
        operation: BlendOperation::Add,
    };

    /// Standard "over" alpha blending.
    pub const OVER: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
        operation: BlendOperation::Add,
    };

    /// Premultiplied alpha blending.
    pub const PREMULTIPLIED: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
        operation: BlendOperation::Add,
    };

    /// Additive blending.
    pub const ADDITIVE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    };
}

/// Color and alpha blend equations of a color attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlendComponents {
    /// Color blend component.
    pub color: BlendComponent,
    /// Alpha blend component.
    pub alpha: BlendComponent,
}

bitflags! {
    /// Color channels written by a pipeline.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ColorWrites: u32 {
        /// Red channel.
        const RED = 1 << 0;
        /// Green channel.
        const GREEN = 1 << 1;
        /// Blue channel.
        const BLUE = 1 << 2;
        /// Alpha channel.
        const ALPHA = 1 << 3;
        /// Red, green and blue.
        const COLOR = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits();
        /// Every channel.
        const ALL = Self::COLOR.bits() | Self::ALPHA.bits();
    }
}

impl Default for ColorWrites {
    fn default() -> Self {
        Self::ALL
    }
}

/// Blend state of the single color attachment of a pass.
///
/// `blend == None` disables blending: the fragment output overrides the
/// attachment contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlendState {
    /// Blend equations, `None` when blending is disabled.
    pub blend: Option<BlendComponents>,
    /// Channels written to the attachment.
    pub write_mask: ColorWrites,
    /// Whether alpha-to-coverage is enabled.
    pub alpha_to_coverage: bool,
}

impl BlendState {
    /// Single attachment, no blending, all channels written.
    pub fn opaque() -> Self {
        Self::default()
    }

    /// Create a standard alpha blending state (src over dst).
    pub fn alpha_blending() -> Self {
        Self::blended(BlendComponent::OVER, BlendComponent::OVER)
    }

    /// Create a premultiplied alpha blending state.
    pub fn premultiplied_alpha() -> Self {
        Self::blended(BlendComponent::PREMULTIPLIED, BlendComponent::PREMULTIPLIED)
    }

    /// Create an additive blending state.
    pub fn additive() -> Self {
        Self::blended(BlendComponent::ADDITIVE, BlendComponent::ADDITIVE)
    }

    fn blended(color: BlendComponent, alpha: BlendComponent) -> Self {
        Self {
            blend: Some(BlendComponents { color, alpha }),
            ..Self::default()
        }
    }

    /// Set the channel write mask.
    pub fn with_write_mask(mut self, write_mask: ColorWrites) -> Self {
        self.write_mask = write_mask;
        self
    }

    /// Enable or disable alpha-to-coverage.
    pub fn with_alpha_to_coverage(mut self, enabled: bool) -> Self {
        self.alpha_to_coverage = enabled;
        self
    }

    /// Check whether blending is enabled.
    pub fn is_blending(&self) -> bool {
        self.blend.is_some()
    }
}

// ============================================================================
// Depth / stencil
// ============================================================================

/// Comparison function for depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunction {
    /// Never pass.
    Never,
    /// Pass if less than.
    Less,
    /// Pass if equal.
    Equal,
    /// Pass if less than or equal.
    LessEqual,
    /// Pass if greater than.
    Greater,
    /// Pass if not equal.
    NotEqual,
    /// Pass if greater than or equal.
    GreaterEqual,
    /// Always pass.
    Always,
}

/// Operation applied to the stencil value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StencilOperation {
    /// Keep the current value.
    #[default]
    Keep,
    /// Set to zero.
    Zero,
    /// Replace with the reference value.
    Replace,
    /// Increment and clamp.
    IncrementClamp,
    /// Decrement and clamp.
    DecrementClamp,
    /// Bitwise invert.
    Invert,
    /// Increment and wrap.
    IncrementWrap,
    /// Decrement and wrap.
    DecrementWrap,
}

/// Stencil behaviour for one face orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StencilFaceState {
    /// Comparison against the reference value.
    pub compare: CompareFunction,
    /// Operation when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Operation when the stencil test passes but depth fails.
    pub depth_fail_op: StencilOperation,
    /// Operation when both tests pass.
    pub pass_op: StencilOperation,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Always,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
        }
    }
}

/// Depth and stencil configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthStencilState {
    /// Whether the depth test runs.
    pub depth_test: bool,
    /// Whether passing fragments write depth.
    pub depth_write: bool,
    /// Depth comparison.
    pub depth_compare: CompareFunction,
    /// Whether the stencil test runs.
    pub stencil_test: bool,
    /// Stencil state for front faces.
    pub stencil_front: StencilFaceState,
    /// Stencil state for back faces.
    pub stencil_back: StencilFaceState,
    /// Mask applied when reading stencil values.
    pub stencil_read_mask: u8,
    /// Mask applied when writing stencil values.
    pub stencil_write_mask: u8,
    /// Stencil reference value.
    pub stencil_reference: u32,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self::depth_only_less_equal()
    }
}

impl DepthStencilState {
    /// Depth test and write with `LessEqual`, stencil disabled.
    pub fn depth_only_less_equal() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            depth_compare: CompareFunction::LessEqual,
            stencil_test: false,
            stencil_front: StencilFaceState::default(),
            stencil_back: StencilFaceState::default(),
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
            stencil_reference: 0,
        }
    }

    /// Depth test with `LessEqual` but no depth write.
    pub fn depth_read_only() -> Self {
        Self {
            depth_write: false,
            ..Self::depth_only_less_equal()
        }
    }

    /// Depth and stencil fully disabled.
    pub fn disabled() -> Self {
        Self {
            depth_test: false,
            depth_write: false,
            depth_compare: CompareFunction::Always,
            ..Self::depth_only_less_equal()
        }
    }

    /// Enable the stencil test with the same state for both faces.
    pub fn with_stencil(mut self, face: StencilFaceState, reference: u32) -> Self {
        self.stencil_test = true;
        self.stencil_front = face;
        self.stencil_back = face;
        self.stencil_reference = reference;
        self
    }
}

// ============================================================================
// Rasterizer
// ============================================================================

/// Which faces are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// No culling.
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    #[default]
    Back,
}

/// Winding order of front-facing triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrontFace {
    /// Clockwise triangles face front.
    #[default]
    Clockwise,
    /// Counter-clockwise triangles face front.
    CounterClockwise,
}

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FillMode {
    /// Filled polygons.
    #[default]
    Solid,
    /// Polygon edges only.
    Wireframe,
}

impl FillMode {
    /// Every fill mode, in index order.
    pub const ALL: [Self; 2] = [Self::Solid, Self::Wireframe];

    /// Stable index of this fill mode.
    pub const fn index(self) -> usize {
        match self {
            Self::Solid => 0,
            Self::Wireframe => 1,
        }
    }
}

/// Primitive topology for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
    /// Every two vertices form a line.
    LineList,
    /// Vertices form a connected strip of lines.
    LineStrip,
    /// Each vertex is a separate point.
    PointList,
}

impl PrimitiveTopology {
    /// Every topology, in index order.
    pub const ALL: [Self; 5] = [
        Self::TriangleList,
        Self::TriangleStrip,
        Self::LineList,
        Self::LineStrip,
        Self::PointList,
    ];

    /// Stable index of this topology.
    pub const fn index(self) -> usize {
        match self {
            Self::TriangleList => 0,
            Self::TriangleStrip => 1,
            Self::LineList => 2,
            Self::LineStrip => 3,
            Self::PointList => 4,
        }
    }

    /// Get the number of vertices per primitive (for non-strip topologies).
    pub fn vertices_per_primitive(&self) -> Option<u32> {
        match self {
            Self::PointList => Some(1),
            Self::LineList => Some(2),
            Self::TriangleList => Some(3),
            Self::LineStrip | Self::TriangleStrip => None,
        }
    }
}
