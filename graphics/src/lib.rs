//! # Vertex Pack Graphics
//!
//! Hands packed vertex data to a graphics backend.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsContext`] - Trait for backends that hold vertex buffers
//! - [`VertexDataUpload`] - Buffer creation and upload for [`VertexData`](vertex_pack_core::VertexData)
//! - [`VertexAttributeBinding`] - Attribute-to-register binding
//! - [`DummyContext`] - Recording backend for testing (feature `dummy`)
//!
//! ## Example
//!
//! ```ignore
//! use vertex_pack_core::VertexData;
//! use vertex_pack_graphics::{DummyContext, VertexBufferOptions, VertexDataUpload};
//!
//! let data = VertexData::from_format_str("position(float2), color(bytes4)", 4)?;
//! let mut ctx = DummyContext::new();
//! let options = VertexBufferOptions::new().with_upload(true);
//! let handle = data.create_vertex_buffer(Some(&mut ctx), &options)?;
//! ```

pub mod context;
#[cfg(feature = "dummy")]
pub mod dummy;
pub mod error;
pub mod upload;

// Re-export main types for convenience
pub use context::{BufferHandle, BufferUsageHint, GraphicsContext, VertexBufferOptions};
#[cfg(feature = "dummy")]
pub use dummy::{DummyCall, DummyContext};
pub use error::{GraphicsError, GraphicsResult};
pub use upload::{VertexAttributeBinding, VertexDataUpload};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_context() {
        let ctx = DummyContext::new();
        assert!(ctx.name() == "Dummy Context");
    }
}
