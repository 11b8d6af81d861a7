//! Vertex layouts derived from reflected vertex inputs.
//!
//! Every reflected input gets its own buffer slot, in input order. Element
//! names carry the [`VERTEX_INPUT_PREFIX`] so they match the entry-point
//! signature generated for the backend.

use lumen_core::shader::{VertexFormat, VertexInput};

/// Prefix prepended to a semantic to form the generated input name.
pub const VERTEX_INPUT_PREFIX: &str = "in_var_";

/// One vertex element fed from its own buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// Generated input name (`in_var_POSITION`).
    pub name: String,
    /// Attribute format.
    pub format: VertexFormat,
    /// Vertex buffer slot the element reads from.
    pub buffer_slot: u32,
}

/// Vertex input layout of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    /// Elements, one per reflected input.
    pub elements: Vec<VertexElement>,
}

impl VertexLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the layout for a variant's reflected inputs.
    pub fn from_inputs(inputs: &[VertexInput]) -> Self {
        let elements = inputs
            .iter()
            .zip(0u32..)
            .map(|(input, slot)| VertexElement {
                name: format!("{VERTEX_INPUT_PREFIX}{}", input.semantic),
                format: input.format,
                buffer_slot: slot,
            })
            .collect();
        Self { elements }
    }

    /// Number of vertex buffer slots the layout consumes.
    pub fn buffer_count(&self) -> usize {
        self.elements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_inputs() {
        let layout = VertexLayout::from_inputs(&[
            VertexInput::new("POSITION", VertexFormat::Float32x3),
            VertexInput::new("TEXCOORD0", VertexFormat::Float32x2),
        ]);

        assert_eq!(layout.buffer_count(), 2);
        assert_eq!(layout.elements[0].name, "in_var_POSITION");
        assert_eq!(layout.elements[1].name, "in_var_TEXCOORD0");
        assert_eq!(layout.elements[1].buffer_slot, 1);
        assert_eq!(layout.elements[1].format, VertexFormat::Float32x2);
    }
}
