//! Named runtime values fed to a resource set.
//!
//! A [`PropertyState`] is the bag a material or draw call fills with colors,
//! floats, matrices, textures and structured buffers. Binding reads it by the
//! names reflected from the shader and never mutates it.
//!
//! # Example
//!
//! ```ignore
//! let mut properties = PropertyState::new();
//! properties.set_color("color", [1.0, 0.5, 0.0, 1.0]);
//! properties.set_float("intensity", 2.0);
//! properties.set_texture("_MainTex", albedo.clone());
//! resources.bind(&mut commands, &properties)?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::Pod;
use lumen_core::shader::ValueType;

use crate::resources::{Buffer, Texture};

/// A typed property value.
#[derive(Debug, Clone)]
pub struct Property {
    value_type: ValueType,
    data: Vec<u8>,
    array_len: u32,
    texture: Option<Arc<Texture>>,
}

impl Property {
    /// Type tag of the value.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Raw little-endian bytes of the value (all elements for arrays).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of elements (1 for single values).
    pub fn array_len(&self) -> u32 {
        self.array_len
    }

    /// Texture carried by the value, if any.
    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    /// Byte stride between consecutive elements of the data.
    pub fn element_stride(&self) -> usize {
        self.value_type
            .byte_size()
            .unwrap_or_else(|| self.data.len() / self.array_len.max(1) as usize)
    }
}

/// Named property values and structured buffers.
#[derive(Debug, Clone, Default)]
pub struct PropertyState {
    values: HashMap<String, Property>,
    buffers: HashMap<String, Arc<Buffer>>,
}

impl PropertyState {
    /// Create an empty property state.
    pub fn new() -> Self {
        Self::default()
    }

    fn set_pod<T: Pod>(&mut self, name: impl Into<String>, value_type: ValueType, values: &[T]) {
        self.values.insert(
            name.into(),
            Property {
                value_type,
                data: bytemuck::cast_slice(values).to_vec(),
                array_len: values.len() as u32,
                texture: None,
            },
        );
    }

    /// Set a float.
    pub fn set_float(&mut self, name: impl Into<String>, value: f32) {
        self.set_pod(name, ValueType::Float, &[value]);
    }

    /// Set a signed integer.
    pub fn set_int(&mut self, name: impl Into<String>, value: i32) {
        self.set_pod(name, ValueType::Int, &[value]);
    }

    /// Set an unsigned integer.
    pub fn set_uint(&mut self, name: impl Into<String>, value: u32) {
        self.set_pod(name, ValueType::UInt, &[value]);
    }

    /// Set a 2-component float vector.
    pub fn set_vector2(&mut self, name: impl Into<String>, value: [f32; 2]) {
        self.set_pod(name, ValueType::Float2, &[value]);
    }

    /// Set a 3-component float vector.
    pub fn set_vector3(&mut self, name: impl Into<String>, value: [f32; 3]) {
        self.set_pod(name, ValueType::Float3, &[value]);
    }

    /// Set a 4-component float vector.
    pub fn set_vector4(&mut self, name: impl Into<String>, value: [f32; 4]) {
        self.set_pod(name, ValueType::Float4, &[value]);
    }

    /// Set an RGBA color.
    pub fn set_color(&mut self, name: impl Into<String>, rgba: [f32; 4]) {
        self.set_vector4(name, rgba);
    }

    /// Set a 4-component signed integer vector.
    pub fn set_int_vector4(&mut self, name: impl Into<String>, value: [i32; 4]) {
        self.set_pod(name, ValueType::Int4, &[value]);
    }

    /// Set a 4-component unsigned integer vector.
    pub fn set_uint_vector4(&mut self, name: impl Into<String>, value: [u32; 4]) {
        self.set_pod(name, ValueType::UInt4, &[value]);
    }

    /// Set a column-major 4x4 matrix.
    pub fn set_matrix4(&mut self, name: impl Into<String>, value: [[f32; 4]; 4]) {
        self.set_pod(name, ValueType::Float4x4, &[value]);
    }

    /// Set an array of floats.
    pub fn set_float_array(&mut self, name: impl Into<String>, values: &[f32]) {
        self.set_pod(name, ValueType::Float, values);
    }

    /// Set an array of signed integers.
    pub fn set_int_array(&mut self, name: impl Into<String>, values: &[i32]) {
        self.set_pod(name, ValueType::Int, values);
    }

    /// Set an array of 4-component float vectors.
    pub fn set_vector4_array(&mut self, name: impl Into<String>, values: &[[f32; 4]]) {
        self.set_pod(name, ValueType::Float4, values);
    }

    /// Set an array of column-major 4x4 matrices.
    pub fn set_matrix4_array(&mut self, name: impl Into<String>, values: &[[[f32; 4]; 4]]) {
        self.set_pod(name, ValueType::Float4x4, values);
    }

    /// Set an opaque byte blob.
    pub fn set_bytes(&mut self, name: impl Into<String>, bytes: &[u8]) {
        self.values.insert(
            name.into(),
            Property {
                value_type: ValueType::Bytes,
                data: bytes.to_vec(),
                array_len: 1,
                texture: None,
            },
        );
    }

    /// Set a texture.
    pub fn set_texture(&mut self, name: impl Into<String>, texture: Arc<Texture>) {
        self.values.insert(
            name.into(),
            Property {
                value_type: ValueType::Texture,
                data: Vec::new(),
                array_len: 1,
                texture: Some(texture),
            },
        );
    }

    /// Set a structured buffer.
    pub fn set_buffer(&mut self, name: impl Into<String>, buffer: Arc<Buffer>) {
        self.buffers.insert(name.into(), buffer);
    }

    /// Look up a value.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.values.get(name)
    }

    /// Look up a texture value.
    pub fn get_texture(&self, name: &str) -> Option<&Arc<Texture>> {
        self.values.get(name).and_then(Property::texture)
    }

    /// Look up a structured buffer.
    pub fn get_buffer(&self, name: &str) -> Option<&Arc<Buffer>> {
        self.buffers.get(name)
    }

    /// Remove a value or buffer by name.
    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
        self.buffers.remove(name);
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.values.clear();
        self.buffers.clear();
    }

    /// Copy every entry of `other` into this state, replacing same-named entries.
    pub fn apply_override(&mut self, other: &PropertyState) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
        for (name, buffer) in &other.buffers {
            self.buffers.insert(name.clone(), buffer.clone());
        }
    }

    /// Number of entries (values and buffers).
    pub fn len(&self) -> usize {
        self.values.len() + self.buffers.len()
    }

    /// Check if the state holds nothing.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.buffers.is_empty()
    }
}
