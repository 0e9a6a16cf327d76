//! Vertex data error types.

use thiserror::Error;

use crate::vertex::NumericFormat;

/// Errors raised by format compilation and vertex data access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VertexDataError {
    /// The format string is empty, malformed, or names an unknown numeric format.
    #[error("invalid vertex format: {0}")]
    InvalidFormat(String),
    /// The attribute is not part of the vertex format.
    #[error("attribute not found: '{0}'")]
    AttributeNotFound(String),
    /// An attribute exists on both sides of a copy but with different numeric formats.
    #[error(
        "attribute '{attribute}' has format {source_format} in the source but {target_format} in the target"
    )]
    FormatMismatch {
        attribute: String,
        source_format: NumericFormat,
        target_format: NumericFormat,
    },
    /// An argument required by the operation is missing or invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A vertex index lies outside the buffer.
    #[error("vertex {vertex} is out of range (buffer holds {num_vertices} vertices)")]
    OutOfRange { vertex: usize, num_vertices: usize },
}

/// Result alias for vertex data operations.
pub type VertexDataResult<T> = Result<T, VertexDataError>;
