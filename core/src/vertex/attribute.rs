//! Vertex attribute descriptors.
//!
//! An attribute is one named, fixed-size field repeated in every vertex.
//! Attributes are created by the format compiler ([`VertexFormat::parse`])
//! and never change their name, numeric format or offset afterwards.
//!
//! [`VertexFormat::parse`]: super::VertexFormat::parse

use std::fmt;
use std::str::FromStr;

use crate::error::{VertexDataError, VertexDataResult};

use super::format::VertexFormat;

/// Numeric format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericFormat {
    /// Single 32-bit float.
    Float1,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
    /// Four bytes, used for packed RGBA colors.
    Bytes4,
}

impl NumericFormat {
    /// All recognized numeric formats.
    pub const ALL: [NumericFormat; 5] = [
        Self::Float1,
        Self::Float2,
        Self::Float3,
        Self::Float4,
        Self::Bytes4,
    ];

    /// Get the size in bytes of this format.
    pub fn size(&self) -> usize {
        match self {
            Self::Float1 => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::Bytes4 => 4,
        }
    }

    /// Get the size of this format in 32-bit units.
    pub fn size_in_32_bits(&self) -> usize {
        self.size() / 4
    }

    /// The token used for this format in format strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float1 => "float1",
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Float4 => "float4",
            Self::Bytes4 => "bytes4",
        }
    }

    /// Number of leading floats that can be read as point coordinates.
    pub(crate) fn float_components(&self) -> usize {
        match self {
            Self::Float1 => 1,
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 => 4,
            Self::Bytes4 => 0,
        }
    }
}

impl fmt::Display for NumericFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumericFormat {
    type Err = VertexDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| VertexDataError::InvalidFormat(format!("unknown numeric format '{s}'")))
    }
}

/// Whether an attribute name follows the color naming convention.
///
/// Any name containing `color` or `Color` (e.g. `color`, `tintColor`,
/// `color2`) is color-like. Color-like `bytes4` attributes start out with
/// premultiplied alpha and get an opaque alpha byte in every new vertex.
pub fn is_color_attribute_name(name: &str) -> bool {
    name.contains("color") || name.contains("Color")
}

/// Stable slot index of an attribute within its [`VertexFormat`].
///
/// Resolve a name once with [`VertexFormat::slot_of`] and pass the id to
/// accessors inside hot loops to skip the name lookup.
///
/// The id remembers the layout it was resolved on. It resolves on any format
/// with the same canonical string and fails on every other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId {
    layout: u64,
    slot: usize,
}

impl AttributeId {
    pub(crate) fn new(layout: u64, slot: usize) -> Self {
        Self { layout, slot }
    }

    /// The slot index within the format.
    pub fn index(&self) -> usize {
        self.slot
    }
}

/// Anything that can address an attribute of a [`VertexFormat`].
pub trait AttributeKey {
    /// Resolve to a slot of `format`.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::AttributeNotFound`] if the key does not
    /// name an attribute of `format`.
    fn resolve(&self, format: &VertexFormat) -> VertexDataResult<AttributeId>;
}

impl AttributeKey for AttributeId {
    fn resolve(&self, format: &VertexFormat) -> VertexDataResult<AttributeId> {
        if self.layout == format.layout_key() && self.slot < format.num_attributes() {
            Ok(*self)
        } else {
            Err(VertexDataError::AttributeNotFound(format!("#{}", self.slot)))
        }
    }
}

impl AttributeKey for str {
    fn resolve(&self, format: &VertexFormat) -> VertexDataResult<AttributeId> {
        format
            .slot_of(self)
            .ok_or_else(|| VertexDataError::AttributeNotFound(self.to_string()))
    }
}

impl AttributeKey for String {
    fn resolve(&self, format: &VertexFormat) -> VertexDataResult<AttributeId> {
        self.as_str().resolve(format)
    }
}

impl<K: AttributeKey + ?Sized> AttributeKey for &K {
    fn resolve(&self, format: &VertexFormat) -> VertexDataResult<AttributeId> {
        (**self).resolve(format)
    }
}

/// Description of a single attribute within a vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Attribute name, unique within its format.
    pub name: String,
    /// Numeric format of the attribute.
    pub format: NumericFormat,
    /// Byte offset within one vertex.
    pub offset: usize,
    /// Whether color data is stored with premultiplied alpha.
    pub premultiplied_alpha: bool,
}

impl VertexAttribute {
    /// Create a new attribute at the given offset.
    ///
    /// Color-like `bytes4` attributes default to premultiplied alpha.
    pub fn new(name: impl Into<String>, format: NumericFormat, offset: usize) -> Self {
        let name = name.into();
        let premultiplied_alpha = format == NumericFormat::Bytes4 && is_color_attribute_name(&name);
        Self {
            name,
            format,
            offset,
            premultiplied_alpha,
        }
    }

    /// Size in bytes of the attribute.
    pub fn size(&self) -> usize {
        self.format.size()
    }

    /// Whether this attribute holds packed RGBA color data.
    pub fn is_color(&self) -> bool {
        self.format == NumericFormat::Bytes4 && is_color_attribute_name(&self.name)
    }
}
