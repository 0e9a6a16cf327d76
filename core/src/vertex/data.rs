//! Packed, interleaved vertex storage.
//!
//! [`VertexData`] owns a single byte buffer holding `num_vertices *
//! vertex_size` bytes, one vertex after another, laid out according to its
//! [`VertexFormat`]. All multi-byte values are stored little-endian so the
//! buffer can be handed to the GPU as-is.
//!
//! The typed accessors live in sibling modules:
//! - `access` - floats, points and raw 32-bit words
//! - `color` - packed RGBA colors and premultiplied alpha
//! - `copy` - cloning and cross-buffer copies
//! - `bounds` - bounding boxes and in-place point transforms

use std::fmt;
use std::ops::{Bound, Range, RangeBounds};
use std::sync::Arc;

use crate::error::{VertexDataError, VertexDataResult};

use super::attribute::{AttributeId, AttributeKey, NumericFormat};
use super::format::VertexFormat;

/// Byte offset of the alpha channel inside a packed color.
pub(crate) const ALPHA_BYTE: usize = 3;

/// A resolved attribute position inside the raw buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Location {
    pub id: AttributeId,
    /// Absolute byte position of the attribute in the addressed vertex.
    pub position: usize,
    pub format: NumericFormat,
    pub premultiplied_alpha: bool,
}

/// Interleaved vertex data described by a [`VertexFormat`].
///
/// # Example
///
/// ```ignore
/// let mut data = VertexData::from_format_str("position(float2), color(bytes4)", 4)?;
/// data.set_point(0, "position", 320.0, 480.0)?;
/// data.set_color(0, "color", 0xff00ff)?;
/// assert_eq!(data.get_color(0, "color")?, 0xff00ff);
/// ```
#[derive(Debug, Clone)]
pub struct VertexData {
    pub(crate) format: Arc<VertexFormat>,
    pub(crate) raw_data: Vec<u8>,
    pub(crate) num_vertices: usize,
    pub(crate) tinted: bool,
    label: Option<String>,
}

impl VertexData {
    /// Create vertex data with `num_vertices` vertices.
    ///
    /// All bytes start out zero, except the alpha channel of color
    /// attributes, which starts out opaque.
    pub fn new(format: Arc<VertexFormat>, num_vertices: usize) -> Self {
        let mut data = Self {
            format,
            raw_data: Vec::new(),
            num_vertices: 0,
            tinted: false,
            label: None,
        };
        data.set_num_vertices(num_vertices);
        data
    }

    /// Compile `format` and create vertex data with `num_vertices` vertices.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::InvalidFormat`] if the format string is invalid.
    pub fn from_format_str(format: &str, num_vertices: usize) -> VertexDataResult<Self> {
        Ok(Self::new(VertexFormat::parse(format)?, num_vertices))
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The vertex format.
    pub fn format(&self) -> &Arc<VertexFormat> {
        &self.format
    }

    /// The canonical format string.
    pub fn format_string(&self) -> &str {
        self.format.format_string()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Resize the buffer to hold `num_vertices` vertices.
    ///
    /// Growing zero-fills the new vertices and sets the alpha byte of every
    /// color attribute to `0xFF`. Shrinking truncates.
    pub fn set_num_vertices(&mut self, num_vertices: usize) {
        let old_num_vertices = self.num_vertices;
        let stride = self.format.vertex_size();

        self.raw_data.resize(num_vertices * stride, 0);
        self.num_vertices = num_vertices;

        if num_vertices > old_num_vertices {
            for attr in self.format.attributes().filter(|attr| attr.is_color()) {
                for vertex in old_num_vertices..num_vertices {
                    self.raw_data[vertex * stride + attr.offset + ALPHA_BYTE] = 0xff;
                }
            }
        }

        log::trace!(
            "VertexData {:?}: resized {} -> {} vertices",
            self.label,
            old_num_vertices,
            num_vertices
        );
    }

    /// Remove all vertices.
    pub fn clear(&mut self) {
        self.set_num_vertices(0);
        self.tinted = false;
    }

    /// Release excess capacity held by the byte buffer.
    pub fn trim(&mut self) {
        self.raw_data.shrink_to_fit();
    }

    /// Live view of the packed bytes.
    ///
    /// This is not a copy: it is meant to be handed straight to a GPU upload.
    pub fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    /// Mutable view of the packed bytes.
    pub fn raw_data_mut(&mut self) -> &mut [u8] {
        &mut self.raw_data
    }

    /// Size in bytes of one vertex.
    pub fn vertex_size(&self) -> usize {
        self.format.vertex_size()
    }

    /// Size of one vertex in 32-bit units.
    pub fn vertex_size_in_32_bits(&self) -> usize {
        self.format.vertex_size_in_32_bits()
    }

    /// Size in bytes of all vertices.
    pub fn size(&self) -> usize {
        self.raw_data.len()
    }

    /// Size of all vertices in 32-bit units.
    pub fn size_in_32_bits(&self) -> usize {
        self.raw_data.len() / 4
    }

    /// Whether any color written so far was not opaque white.
    ///
    /// This is a cached hint; use [`update_tinted`](Self::update_tinted) to
    /// recompute it from the actual data.
    pub fn tinted(&self) -> bool {
        self.tinted
    }

    /// Resolve `key` for the given vertex.
    pub(crate) fn locate<K: AttributeKey + ?Sized>(
        &self,
        vertex: usize,
        key: &K,
    ) -> VertexDataResult<Location> {
        if vertex >= self.num_vertices {
            return Err(VertexDataError::OutOfRange {
                vertex,
                num_vertices: self.num_vertices,
            });
        }
        let (id, attr) = self.format.resolve(key)?;
        Ok(Location {
            id,
            position: vertex * self.format.vertex_size() + attr.offset,
            format: attr.format,
            premultiplied_alpha: attr.premultiplied_alpha,
        })
    }

    /// Clamp a vertex range to the vertices present.
    ///
    /// Every range-taking operation goes through this, so out-of-range
    /// bounds shrink the range instead of failing.
    pub fn vertex_range(&self, range: impl RangeBounds<usize>) -> Range<usize> {
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => self.num_vertices,
        }
        .min(self.num_vertices);
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(end);
        start..end
    }

    #[inline]
    pub(crate) fn read_u32(&self, position: usize) -> u32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.raw_data[position..position + 4]);
        u32::from_le_bytes(bytes)
    }

    #[inline]
    pub(crate) fn write_u32(&mut self, position: usize, value: u32) {
        self.raw_data[position..position + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub(crate) fn read_f32(&self, position: usize) -> f32 {
        f32::from_bits(self.read_u32(position))
    }

    #[inline]
    pub(crate) fn write_f32(&mut self, position: usize, value: f32) {
        self.write_u32(position, value.to_bits());
    }
}

impl fmt::Display for VertexData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[VertexData format=\"{}\" numVertices={}]",
            self.format.format_string(),
            self.num_vertices
        )
    }
}

static_assertions::assert_impl_all!(VertexData: Send, Sync, Clone);
