//! # Vertex Pack Core
//!
//! Dynamically-formatted, interleaved vertex data packed into one contiguous
//! byte buffer, ready for direct upload to a GPU.
//!
//! ## Overview
//!
//! - [`VertexFormat`] - Compiles `"position(float2), color(bytes4)"` into byte offsets
//! - [`VertexData`] - Owns the packed bytes and exposes typed accessors
//! - [`math`] - Affine transforms and projection helpers used by copies and bounds
//!
//! ## Example
//!
//! ```ignore
//! use vertex_pack_core::VertexData;
//!
//! let mut data = VertexData::from_format_str("position(float2), color(bytes4)", 1)?;
//! data.set_point(0, "position", 320.0, 480.0)?;
//! data.set_color(0, "color", 0xff00ff)?;
//! assert_eq!(data.get_alpha(0, "color")?, 1.0);
//! ```

pub mod error;
pub mod math;
pub mod vertex;

pub use error::{VertexDataError, VertexDataResult};
pub use math::Rectangle;
pub use vertex::{
    AttributeId, AttributeKey, NumericFormat, VertexAttribute, VertexData, VertexFormat,
};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
