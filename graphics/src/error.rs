//! Graphics error types.

use thiserror::Error;
use vertex_pack_core::VertexDataError;

/// Errors that can occur while handing vertex data to a graphics context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// No context was supplied, or the context reports itself unavailable
    /// (for example after a device loss).
    #[error("no graphics context available")]
    NoGraphicsContext,
    /// The context refused to allocate a vertex buffer.
    #[error("buffer creation failed: {0}")]
    BufferCreationFailed(String),
    /// The context refused an upload or attribute binding.
    #[error("upload failed: {0}")]
    UploadFailed(String),
    /// The vertex data rejected the request (unknown attribute and so on).
    #[error(transparent)]
    VertexData(#[from] VertexDataError),
}

/// Result alias for graphics operations.
pub type GraphicsResult<T> = Result<T, GraphicsError>;
