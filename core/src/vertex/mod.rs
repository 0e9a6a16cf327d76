//! Interleaved vertex data.
//!
//! This module provides:
//! - [`VertexFormat`] - Compiled attribute layout parsed from a format string
//! - [`VertexAttribute`] - Name, numeric format, offset and alpha mode of one attribute
//! - [`VertexData`] - Packed vertex storage with typed accessors, copies and bounds
//!
//! Attributes are addressed by anything implementing [`AttributeKey`]: a
//! name (`"position"`) for convenience, or a pre-resolved [`AttributeId`]
//! inside hot loops.

mod access;
mod attribute;
mod bounds;
mod color;
mod copy;
mod data;
mod format;

pub use attribute::{
    is_color_attribute_name, AttributeId, AttributeKey, NumericFormat, VertexAttribute,
};
pub use color::{
    premultiply_alpha, unmultiply_alpha, DEFAULT_COLOR_ATTRIBUTE, MIN_PREMULTIPLIED_ALPHA,
};
pub use data::VertexData;
pub use format::VertexFormat;
