//! Command recording.
//!
//! A [`CommandList`] records backend-agnostic commands that are handed to
//! [`GpuBackend::submit`](crate::backend::GpuBackend::submit) in one batch.
//! Recording never touches the GPU.

use std::ops::Range;

use crate::backend::{BufferHandle, PipelineHandle, ResourceSetHandle};

/// A recorded GPU command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write `data` into a buffer starting at `offset`.
    UpdateBuffer {
        buffer: BufferHandle,
        offset: u64,
        data: Vec<u8>,
    },
    /// Bind a pipeline-state object.
    SetPipeline(PipelineHandle),
    /// Bind a resource set at a set index.
    SetResourceSet {
        index: u32,
        set: ResourceSetHandle,
    },
    /// Bind a vertex buffer to a slot.
    SetVertexBuffer {
        slot: u32,
        buffer: BufferHandle,
        offset: u64,
    },
    /// Non-indexed draw.
    Draw {
        vertices: Range<u32>,
        instances: Range<u32>,
    },
    /// Indexed draw.
    DrawIndexed {
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    },
}

/// An ordered list of recorded commands.
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    commands: Vec<Command>,
}

impl CommandList {
    /// Create an empty command list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a buffer update.
    pub fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: impl Into<Vec<u8>>) {
        self.commands.push(Command::UpdateBuffer {
            buffer,
            offset,
            data: data.into(),
        });
    }

    /// Record a pipeline bind.
    pub fn set_pipeline(&mut self, pipeline: PipelineHandle) {
        self.commands.push(Command::SetPipeline(pipeline));
    }

    /// Record a resource-set bind.
    pub fn set_resource_set(&mut self, index: u32, set: ResourceSetHandle) {
        self.commands.push(Command::SetResourceSet { index, set });
    }

    /// Record a vertex buffer bind.
    pub fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, offset: u64) {
        self.commands.push(Command::SetVertexBuffer {
            slot,
            buffer,
            offset,
        });
    }

    /// Record a non-indexed draw.
    pub fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        self.commands.push(Command::Draw {
            vertices,
            instances,
        });
    }

    /// Record an indexed draw.
    pub fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        self.commands.push(Command::DrawIndexed {
            indices,
            base_vertex,
            instances,
        });
    }

    /// Recorded commands, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop every recorded command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}
