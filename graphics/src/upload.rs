//! Handing packed vertex data to a [`GraphicsContext`].
//!
//! Nothing here transforms data: the packed bytes go to the context as they
//! are, together with the vertex count and the stride in 32-bit units.

use std::ops::{Range, RangeBounds};

use vertex_pack_core::{AttributeKey, VertexData, VertexFormat};

use crate::context::{BufferHandle, GraphicsContext, VertexBufferOptions};
use crate::error::{GraphicsError, GraphicsResult};

/// Unwrap a context, failing if it is absent or unavailable.
fn acquire<C: GraphicsContext + ?Sized>(ctx: Option<&mut C>) -> GraphicsResult<&mut C> {
    match ctx {
        Some(ctx) if ctx.is_available() => Ok(ctx),
        _ => Err(GraphicsError::NoGraphicsContext),
    }
}

fn upload_range<C: GraphicsContext + ?Sized>(
    ctx: &mut C,
    data: &VertexData,
    handle: BufferHandle,
    range: Range<usize>,
) -> GraphicsResult<()> {
    if range.is_empty() {
        return Ok(());
    }
    let byte_offset = range.start * data.vertex_size();
    log::trace!(
        "VertexData {:?}: uploading vertices {:?} to {:?} (byte offset {})",
        data.label(),
        range,
        handle,
        byte_offset
    );
    ctx.upload_bytes(handle, data.raw_data(), byte_offset, range.start, range.len())
}

/// Vertex buffer creation and upload for [`VertexData`].
pub trait VertexDataUpload {
    /// Create a vertex buffer sized for the current vertices, optionally
    /// uploading them right away.
    ///
    /// Returns `Ok(None)` when there are no vertices to hold.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::NoGraphicsContext`] if `ctx` is `None` or
    /// unavailable, and passes on any failure reported by the context.
    fn create_vertex_buffer<C: GraphicsContext + ?Sized>(
        &self,
        ctx: Option<&mut C>,
        options: &VertexBufferOptions,
    ) -> GraphicsResult<Option<BufferHandle>>;

    /// Upload a range of vertices into the same positions of `handle`.
    ///
    /// The range is clamped to the vertices present; an empty range issues
    /// no upload.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::NoGraphicsContext`] if `ctx` is `None` or
    /// unavailable, and passes on any failure reported by the context.
    fn upload_to_vertex_buffer<C: GraphicsContext + ?Sized>(
        &self,
        ctx: Option<&mut C>,
        handle: BufferHandle,
        vertices: impl RangeBounds<usize>,
    ) -> GraphicsResult<()>;
}

impl VertexDataUpload for VertexData {
    fn create_vertex_buffer<C: GraphicsContext + ?Sized>(
        &self,
        ctx: Option<&mut C>,
        options: &VertexBufferOptions,
    ) -> GraphicsResult<Option<BufferHandle>> {
        let ctx = acquire(ctx)?;
        if self.num_vertices() == 0 {
            return Ok(None);
        }

        let handle = ctx.create_vertex_buffer(
            self.num_vertices(),
            self.vertex_size_in_32_bits(),
            options.usage,
        )?;
        log::trace!(
            "VertexData {:?}: created vertex buffer {:?} ({} vertices, {} x 32 bits, {})",
            options.label.as_deref().or(self.label()),
            handle,
            self.num_vertices(),
            self.vertex_size_in_32_bits(),
            options.usage.as_str()
        );

        if options.upload {
            upload_range(ctx, self, handle, 0..self.num_vertices())?;
        }
        Ok(Some(handle))
    }

    fn upload_to_vertex_buffer<C: GraphicsContext + ?Sized>(
        &self,
        ctx: Option<&mut C>,
        handle: BufferHandle,
        vertices: impl RangeBounds<usize>,
    ) -> GraphicsResult<()> {
        let ctx = acquire(ctx)?;
        upload_range(ctx, self, handle, self.vertex_range(vertices))
    }
}

/// Binding attributes of a vertex buffer to shader input registers.
pub trait VertexAttributeBinding {
    /// Bind the attribute `key` of the vertices stored in `handle` to
    /// `register`, passing its offset in 32-bit units and its numeric format.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::NoGraphicsContext`] if `ctx` is `None` or
    /// unavailable, [`GraphicsError::VertexData`] if the attribute is
    /// unknown, and passes on any failure reported by the context.
    fn set_vertex_buffer_attribute<C, K>(
        &self,
        ctx: Option<&mut C>,
        handle: BufferHandle,
        register: u32,
        key: &K,
    ) -> GraphicsResult<()>
    where
        C: GraphicsContext + ?Sized,
        K: AttributeKey + ?Sized;
}

impl VertexAttributeBinding for VertexFormat {
    fn set_vertex_buffer_attribute<C, K>(
        &self,
        ctx: Option<&mut C>,
        handle: BufferHandle,
        register: u32,
        key: &K,
    ) -> GraphicsResult<()>
    where
        C: GraphicsContext + ?Sized,
        K: AttributeKey + ?Sized,
    {
        let ctx = acquire(ctx)?;
        let (_, attr) = self.resolve(key)?;
        log::trace!(
            "binding '{}' ({}) of {:?} to register {}",
            attr.name,
            attr.format,
            handle,
            register
        );
        ctx.bind_attribute(handle, register, attr.offset / 4, attr.format)
    }
}

impl VertexAttributeBinding for VertexData {
    fn set_vertex_buffer_attribute<C, K>(
        &self,
        ctx: Option<&mut C>,
        handle: BufferHandle,
        register: u32,
        key: &K,
    ) -> GraphicsResult<()>
    where
        C: GraphicsContext + ?Sized,
        K: AttributeKey + ?Sized,
    {
        self.format()
            .set_vertex_buffer_attribute(ctx, handle, register, key)
    }
}
