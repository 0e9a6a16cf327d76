//! Cloning and cross-buffer copies.
//!
//! Copies between buffers with identical formats move whole vertices in one
//! contiguous block. Otherwise the copy walks the attributes both formats
//! share and moves them one at a time; attributes the target lacks are
//! dropped.

use std::ops::{Range, RangeBounds};
use std::sync::Arc;

use crate::error::{VertexDataError, VertexDataResult};
use crate::math::{transform_point_2d, Affine2};

use super::attribute::{AttributeId, AttributeKey, VertexAttribute};
use super::data::VertexData;

/// An attribute's placement on both sides of a copy.
#[derive(Debug, Clone, Copy)]
struct AttributePair {
    source_offset: usize,
    target_offset: usize,
    size: usize,
    /// Whether this is the attribute a transformed copy applies its matrix to.
    transformable: bool,
}

impl VertexData {
    /// Create a buffer with the same format and vertex count, holding a copy
    /// of the vertices in `vertices`.
    ///
    /// Vertices outside the range keep their initial values. Premultiplied
    /// alpha flags are carried over.
    pub fn clone_range(&self, vertices: impl RangeBounds<usize>) -> VertexData {
        let range = self.vertex_range(vertices);
        let mut clone = VertexData::new(Arc::clone(&self.format), self.num_vertices);
        if let Some(label) = self.label() {
            clone = clone.with_label(label);
        }

        let bytes = self.byte_range(&range);
        clone.raw_data[bytes.clone()].copy_from_slice(&self.raw_data[bytes]);
        clone.tinted = self.tinted;
        clone
    }

    /// Copy a range of vertices into `target`, starting at `target_vertex`.
    ///
    /// The target grows if it is too small.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::FormatMismatch`] if an attribute present in
    /// both buffers has different numeric formats. The target is left
    /// untouched in that case.
    pub fn copy_to(
        &self,
        target: &mut VertexData,
        target_vertex: usize,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<()> {
        self.copy_range(target, target_vertex, vertices, None)
    }

    /// Copy a range of vertices into `target`, transforming one point
    /// attribute by `matrix` on the way.
    ///
    /// # Errors
    ///
    /// Fails like [`copy_to`](Self::copy_to), and also if `key` is unknown
    /// or holds fewer than two floats.
    pub fn copy_to_transformed<K: AttributeKey + ?Sized>(
        &self,
        target: &mut VertexData,
        target_vertex: usize,
        vertices: impl RangeBounds<usize>,
        key: &K,
        matrix: &Affine2,
    ) -> VertexDataResult<()> {
        let id = self.transformable_attribute(key)?;
        self.copy_range(target, target_vertex, vertices, Some((id, matrix)))
    }

    /// Copy one attribute of a range of vertices into `target`.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is missing from either buffer or the numeric
    /// formats differ.
    pub fn copy_attribute_to<K: AttributeKey + ?Sized>(
        &self,
        target: &mut VertexData,
        target_vertex: usize,
        key: &K,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<()> {
        self.copy_attribute(target, target_vertex, key, vertices, None)
    }

    /// Copy one point attribute of a range of vertices into `target`,
    /// transforming it by `matrix`.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is missing from either buffer, the numeric
    /// formats differ, or the attribute holds fewer than two floats.
    pub fn copy_attribute_to_transformed<K: AttributeKey + ?Sized>(
        &self,
        target: &mut VertexData,
        target_vertex: usize,
        key: &K,
        vertices: impl RangeBounds<usize>,
        matrix: &Affine2,
    ) -> VertexDataResult<()> {
        self.transformable_attribute(key)?;
        self.copy_attribute(target, target_vertex, key, vertices, Some(matrix))
    }

    fn copy_range(
        &self,
        target: &mut VertexData,
        target_vertex: usize,
        vertices: impl RangeBounds<usize>,
        transform: Option<(AttributeId, &Affine2)>,
    ) -> VertexDataResult<()> {
        let range = self.vertex_range(vertices);
        let count = range.len();

        if Arc::ptr_eq(&self.format, &target.format) || self.format == target.format {
            target.reserve_vertices(target_vertex + count);
            target.tinted |= self.tinted;

            let stride = self.vertex_size();
            let source_bytes = self.byte_range(&range);
            let target_start = target_vertex * stride;
            target.raw_data[target_start..target_start + source_bytes.len()]
                .copy_from_slice(&self.raw_data[source_bytes]);

            if let Some((id, matrix)) = transform {
                let offset = self.format.attribute(id).map_or(0, |attr| attr.offset);
                for vertex in target_vertex..target_vertex + count {
                    target.transform_point_at(vertex * stride + offset, matrix);
                }
            }
            return Ok(());
        }

        // Validate every shared attribute before touching the target.
        let mut pairs = Vec::new();
        for (id, source_attr) in self.format.attribute_ids() {
            let Some(target_attr) = target.format.attribute_by_name(&source_attr.name) else {
                continue;
            };
            let mut pair = pair_attributes(source_attr, target_attr)?;
            pair.transformable = transform.is_some_and(|(transformed, _)| transformed == id);
            pairs.push(pair);
        }

        log::debug!(
            "VertexData: slow copy of {} vertices ('{}' -> '{}', {} shared attributes)",
            count,
            self.format_string(),
            target.format_string(),
            pairs.len()
        );

        target.reserve_vertices(target_vertex + count);
        target.tinted |= self.tinted;

        let matrix = transform.map(|(_, matrix)| matrix);
        for pair in pairs {
            let matrix = if pair.transformable { matrix } else { None };
            self.copy_attribute_pair(target, target_vertex, &range, pair, matrix);
        }
        Ok(())
    }

    fn copy_attribute<K: AttributeKey + ?Sized>(
        &self,
        target: &mut VertexData,
        target_vertex: usize,
        key: &K,
        vertices: impl RangeBounds<usize>,
        matrix: Option<&Affine2>,
    ) -> VertexDataResult<()> {
        let (_, source_attr) = self.format.resolve(key)?;
        let target_attr = target
            .format
            .attribute_by_name(&source_attr.name)
            .ok_or_else(|| VertexDataError::AttributeNotFound(source_attr.name.clone()))?;
        let pair = pair_attributes(source_attr, target_attr)?;

        let range = self.vertex_range(vertices);
        target.reserve_vertices(target_vertex + range.len());
        if source_attr.is_color() {
            target.tinted |= self.tinted;
        }
        self.copy_attribute_pair(target, target_vertex, &range, pair, matrix);
        Ok(())
    }

    fn copy_attribute_pair(
        &self,
        target: &mut VertexData,
        target_vertex: usize,
        range: &Range<usize>,
        pair: AttributePair,
        matrix: Option<&Affine2>,
    ) {
        let source_stride = self.vertex_size();
        let target_stride = target.vertex_size();

        for (i, vertex) in range.clone().enumerate() {
            let source = vertex * source_stride + pair.source_offset;
            let destination = (target_vertex + i) * target_stride + pair.target_offset;
            target.raw_data[destination..destination + pair.size]
                .copy_from_slice(&self.raw_data[source..source + pair.size]);
            if let Some(matrix) = matrix {
                target.transform_point_at(destination, matrix);
            }
        }
    }

    /// Resolve `key` and check it can be transformed as a 2D point.
    fn transformable_attribute<K: AttributeKey + ?Sized>(
        &self,
        key: &K,
    ) -> VertexDataResult<AttributeId> {
        let (id, attr) = self.format.resolve(key)?;
        if attr.format.float_components() < 2 {
            return Err(VertexDataError::InvalidArgument(format!(
                "attribute '{}' ({}) cannot be transformed as a 2D point",
                attr.name, attr.format
            )));
        }
        Ok(id)
    }

    /// Grow to at least `num_vertices`, never shrinking.
    fn reserve_vertices(&mut self, num_vertices: usize) {
        if self.num_vertices < num_vertices {
            self.set_num_vertices(num_vertices);
        }
    }

    fn byte_range(&self, vertices: &Range<usize>) -> Range<usize> {
        let stride = self.vertex_size();
        vertices.start * stride..vertices.end * stride
    }

    /// Transform the two floats at `position` in place.
    pub(crate) fn transform_point_at(&mut self, position: usize, matrix: &Affine2) {
        let x = self.read_f32(position);
        let y = self.read_f32(position + 4);
        let (x, y) = transform_point_2d(matrix, x, y);
        self.write_f32(position, x);
        self.write_f32(position + 4, y);
    }
}

fn pair_attributes(
    source: &VertexAttribute,
    target: &VertexAttribute,
) -> VertexDataResult<AttributePair> {
    if source.format != target.format {
        return Err(VertexDataError::FormatMismatch {
            attribute: source.name.clone(),
            source_format: source.format,
            target_format: target.format,
        });
    }
    Ok(AttributePair {
        source_offset: source.offset,
        target_offset: target.offset,
        size: source.size(),
        transformable: false,
    })
}
