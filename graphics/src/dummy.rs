//! Dummy graphics context for testing and development.
//!
//! This context doesn't touch a GPU. It records every request it receives
//! and mirrors uploaded bytes in plain memory, so tests can check exactly
//! what a real backend would have been handed.

use std::collections::{BTreeMap, HashMap};

use vertex_pack_core::NumericFormat;

use crate::context::{BufferHandle, BufferUsageHint, GraphicsContext};
use crate::error::{GraphicsError, GraphicsResult};

/// A request received by a [`DummyContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DummyCall {
    CreateVertexBuffer {
        handle: BufferHandle,
        num_vertices: usize,
        stride_in_32_bits: usize,
        usage: BufferUsageHint,
    },
    UploadBytes {
        handle: BufferHandle,
        byte_offset: usize,
        start_vertex: usize,
        vertex_count: usize,
    },
    BindAttribute {
        handle: BufferHandle,
        register: u32,
        offset_in_32_bits: usize,
        format: NumericFormat,
    },
}

#[derive(Debug)]
struct DummyBuffer {
    num_vertices: usize,
    stride: usize,
    usage: BufferUsageHint,
    bytes: Vec<u8>,
    attributes: BTreeMap<u32, (usize, NumericFormat)>,
}

/// Dummy graphics context.
#[derive(Debug)]
pub struct DummyContext {
    available: bool,
    next_handle: u64,
    buffers: HashMap<BufferHandle, DummyBuffer>,
    calls: Vec<DummyCall>,
}

static_assertions::assert_impl_all!(DummyContext: Send, Sync);

impl Default for DummyContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyContext {
    /// Create an available context with no buffers.
    pub fn new() -> Self {
        Self {
            available: true,
            next_handle: 1,
            buffers: HashMap::new(),
            calls: Vec::new(),
        }
    }

    /// Get the context name.
    pub fn name(&self) -> &'static str {
        "Dummy Context"
    }

    /// Simulate losing (`false`) or restoring (`true`) the device.
    ///
    /// Buffers survive a simulated loss; only requests are refused.
    pub fn set_available(&mut self, available: bool) {
        log::trace!("DummyContext: available = {}", available);
        self.available = available;
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> &[DummyCall] {
        &self.calls
    }

    /// Forget the recorded requests.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of buffers created so far.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Mirrored contents of a buffer.
    pub fn buffer_bytes(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle).map(|buffer| buffer.bytes.as_slice())
    }

    /// Usage hint a buffer was created with.
    pub fn buffer_usage(&self, handle: BufferHandle) -> Option<BufferUsageHint> {
        self.buffers.get(&handle).map(|buffer| buffer.usage)
    }

    /// Offset (in 32-bit units) and format last bound to `register`.
    pub fn bound_attribute(
        &self,
        handle: BufferHandle,
        register: u32,
    ) -> Option<(usize, NumericFormat)> {
        self.buffers
            .get(&handle)?
            .attributes
            .get(&register)
            .copied()
    }

    fn check_available(&self) -> GraphicsResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(GraphicsError::NoGraphicsContext)
        }
    }

    fn buffer_mut(&mut self, handle: BufferHandle) -> GraphicsResult<&mut DummyBuffer> {
        self.buffers
            .get_mut(&handle)
            .ok_or_else(|| GraphicsError::UploadFailed(format!("unknown buffer {handle:?}")))
    }
}

impl GraphicsContext for DummyContext {
    fn is_available(&self) -> bool {
        self.available
    }

    fn create_vertex_buffer(
        &mut self,
        num_vertices: usize,
        stride_in_32_bits: usize,
        usage: BufferUsageHint,
    ) -> GraphicsResult<BufferHandle> {
        self.check_available()?;
        if num_vertices == 0 || stride_in_32_bits == 0 {
            return Err(GraphicsError::BufferCreationFailed(format!(
                "cannot create a buffer of {num_vertices} vertices x {stride_in_32_bits} x 32 bits"
            )));
        }

        let handle = BufferHandle::new(self.next_handle);
        self.next_handle += 1;
        let stride = stride_in_32_bits * 4;

        log::trace!(
            "DummyContext: creating vertex buffer {:?} ({} vertices, stride {})",
            handle,
            num_vertices,
            stride
        );
        self.buffers.insert(
            handle,
            DummyBuffer {
                num_vertices,
                stride,
                usage,
                bytes: vec![0; num_vertices * stride],
                attributes: BTreeMap::new(),
            },
        );
        self.calls.push(DummyCall::CreateVertexBuffer {
            handle,
            num_vertices,
            stride_in_32_bits,
            usage,
        });
        Ok(handle)
    }

    fn upload_bytes(
        &mut self,
        handle: BufferHandle,
        data: &[u8],
        byte_offset: usize,
        start_vertex: usize,
        vertex_count: usize,
    ) -> GraphicsResult<()> {
        self.check_available()?;
        let buffer = self.buffer_mut(handle)?;

        if start_vertex + vertex_count > buffer.num_vertices {
            return Err(GraphicsError::UploadFailed(format!(
                "vertices {}..{} exceed buffer of {} vertices",
                start_vertex,
                start_vertex + vertex_count,
                buffer.num_vertices
            )));
        }
        let len = vertex_count * buffer.stride;
        let Some(source) = data.get(byte_offset..byte_offset + len) else {
            return Err(GraphicsError::UploadFailed(format!(
                "source holds {} bytes, {} requested at offset {}",
                data.len(),
                len,
                byte_offset
            )));
        };

        let target = start_vertex * buffer.stride;
        buffer.bytes[target..target + len].copy_from_slice(source);

        log::trace!(
            "DummyContext: uploaded {} bytes to {:?} at vertex {}",
            len,
            handle,
            start_vertex
        );
        self.calls.push(DummyCall::UploadBytes {
            handle,
            byte_offset,
            start_vertex,
            vertex_count,
        });
        Ok(())
    }

    fn bind_attribute(
        &mut self,
        handle: BufferHandle,
        register: u32,
        offset_in_32_bits: usize,
        format: NumericFormat,
    ) -> GraphicsResult<()> {
        self.check_available()?;
        let buffer = self.buffer_mut(handle)?;
        if offset_in_32_bits * 4 + format.size() > buffer.stride {
            return Err(GraphicsError::UploadFailed(format!(
                "{format} at offset {offset_in_32_bits} exceeds stride {}",
                buffer.stride
            )));
        }
        buffer.attributes.insert(register, (offset_in_32_bits, format));

        self.calls.push(DummyCall::BindAttribute {
            handle,
            register,
            offset_in_32_bits,
            format,
        });
        Ok(())
    }
}
