//! The boundary to a graphics backend.
//!
//! Vertex data never allocates GPU memory itself. It describes buffers in
//! terms of vertex counts and 32-bit strides, and a [`GraphicsContext`]
//! turns those requests into real resources.

use vertex_pack_core::NumericFormat;

use crate::error::GraphicsResult;

/// Opaque handle to a vertex buffer owned by a [`GraphicsContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(u64);

impl BufferHandle {
    /// Wrap a backend-specific buffer id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The backend-specific buffer id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// How often a vertex buffer is expected to be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsageHint {
    /// Uploaded once, drawn many times.
    #[default]
    StaticDraw,
    /// Rewritten frequently, typically every frame.
    DynamicDraw,
}

impl BufferUsageHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StaticDraw => "staticDraw",
            Self::DynamicDraw => "dynamicDraw",
        }
    }
}

/// Options for [`create_vertex_buffer`](crate::VertexDataUpload::create_vertex_buffer).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexBufferOptions {
    /// Usage hint passed on to the context.
    pub usage: BufferUsageHint,
    /// Upload the full vertex data right after creating the buffer.
    pub upload: bool,
    /// Debug label, used only for logging.
    pub label: Option<String>,
}

impl VertexBufferOptions {
    /// Create options with a static usage hint and no initial upload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the usage hint.
    pub fn with_usage(mut self, usage: BufferUsageHint) -> Self {
        self.usage = usage;
        self
    }

    /// Upload the vertex data as part of buffer creation.
    pub fn with_upload(mut self, upload: bool) -> Self {
        self.upload = upload;
        self
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A graphics backend able to hold vertex buffers.
///
/// Every method is a thin request to the backend; contexts are free to fail
/// any of them. Strides and attribute offsets are expressed in 32-bit units,
/// which all vertex formats are aligned to.
pub trait GraphicsContext {
    /// Whether the context can currently service requests.
    ///
    /// A context that lost its device reports `false` until it is restored.
    fn is_available(&self) -> bool;

    /// Allocate a vertex buffer for `num_vertices` vertices of
    /// `stride_in_32_bits * 4` bytes each.
    fn create_vertex_buffer(
        &mut self,
        num_vertices: usize,
        stride_in_32_bits: usize,
        usage: BufferUsageHint,
    ) -> GraphicsResult<BufferHandle>;

    /// Copy `vertex_count` vertices from `data`, starting at `byte_offset`,
    /// into the buffer at vertex `start_vertex`.
    fn upload_bytes(
        &mut self,
        handle: BufferHandle,
        data: &[u8],
        byte_offset: usize,
        start_vertex: usize,
        vertex_count: usize,
    ) -> GraphicsResult<()>;

    /// Bind one attribute of the buffer to a shader input register.
    fn bind_attribute(
        &mut self,
        handle: BufferHandle,
        register: u32,
        offset_in_32_bits: usize,
        format: NumericFormat,
    ) -> GraphicsResult<()>;
}
