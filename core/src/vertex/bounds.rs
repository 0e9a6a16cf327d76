//! Bounding boxes and in-place point transforms.

use std::ops::RangeBounds;

use crate::error::{VertexDataError, VertexDataResult};
use crate::math::{
    affine2_from_translation, intersect_line_with_xy_plane, transform_point_2d,
    transform_point_3d, Affine2, Mat4, Rectangle, Vec3,
};

use super::attribute::AttributeKey;
use super::data::VertexData;

/// Running min/max over a set of 2D points.
struct BoundsAccumulator {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl BoundsAccumulator {
    fn new() -> Self {
        Self {
            min_x: f32::MAX,
            min_y: f32::MAX,
            max_x: f32::MIN,
            max_y: f32::MIN,
        }
    }

    fn add(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn finish(self) -> Rectangle {
        Rectangle::from_min_max(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl VertexData {
    /// Byte positions of a point attribute over a range of vertices.
    fn point_positions<K: AttributeKey + ?Sized>(
        &self,
        key: &K,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<impl Iterator<Item = usize>> {
        let (_, attr) = self.format.resolve(key)?;
        if attr.format.float_components() < 2 {
            return Err(VertexDataError::InvalidArgument(format!(
                "attribute '{}' ({}) is not a point attribute",
                attr.name, attr.format
            )));
        }
        let stride = self.vertex_size();
        let offset = attr.offset;
        Ok(self
            .vertex_range(vertices)
            .map(move |vertex| vertex * stride + offset))
    }

    /// Axis-aligned bounds of a point attribute over a range of vertices,
    /// optionally transformed by `matrix` first.
    ///
    /// An empty range yields a zero-sized rectangle at the (transformed) origin.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown or holds fewer than two floats.
    pub fn get_bounds<K: AttributeKey + ?Sized>(
        &self,
        key: &K,
        matrix: Option<&Affine2>,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<Rectangle> {
        let mut accumulator = BoundsAccumulator::new();
        let mut empty = true;

        for position in self.point_positions(key, vertices)? {
            let x = self.read_f32(position);
            let y = self.read_f32(position + 4);
            let (x, y) = match matrix {
                Some(matrix) => transform_point_2d(matrix, x, y),
                None => (x, y),
            };
            accumulator.add(x, y);
            empty = false;
        }

        if empty {
            let (x, y) = matrix.map_or((0.0, 0.0), |m| transform_point_2d(m, 0.0, 0.0));
            return Ok(Rectangle::new(x, y, 0.0, 0.0));
        }
        Ok(accumulator.finish())
    }

    /// Bounds of a point attribute after projecting it onto the z = 0 plane
    /// as seen from `camera`.
    ///
    /// Each point is lifted to 3D with z = 0, optionally transformed by
    /// `matrix`, and then intersected with the plane along the line from the
    /// camera through the point.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::InvalidArgument`] if `camera` is `None`,
    /// and fails if the attribute is unknown or holds fewer than two floats.
    pub fn get_bounds_projected<K: AttributeKey + ?Sized>(
        &self,
        key: &K,
        matrix: Option<&Mat4>,
        camera: Option<&Vec3>,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<Rectangle> {
        let camera = camera.ok_or_else(|| {
            VertexDataError::InvalidArgument("camera position is required".to_string())
        })?;

        let lift = |x: f32, y: f32| match matrix {
            Some(matrix) => transform_point_3d(matrix, x, y, 0.0),
            None => Vec3::new(x, y, 0.0),
        };

        let mut accumulator = BoundsAccumulator::new();
        let mut empty = true;

        for position in self.point_positions(key, vertices)? {
            let point = lift(self.read_f32(position), self.read_f32(position + 4));
            let (x, y) = intersect_line_with_xy_plane(camera, &point);
            accumulator.add(x, y);
            empty = false;
        }

        if empty {
            let (x, y) = intersect_line_with_xy_plane(camera, &lift(0.0, 0.0));
            return Ok(Rectangle::new(x, y, 0.0, 0.0));
        }
        Ok(accumulator.finish())
    }

    /// Transform a point attribute in place.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown or holds fewer than two floats.
    pub fn transform_points<K: AttributeKey + ?Sized>(
        &mut self,
        key: &K,
        matrix: &Affine2,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<()> {
        let positions: Vec<usize> = self.point_positions(key, vertices)?.collect();
        for position in positions {
            self.transform_point_at(position, matrix);
        }
        Ok(())
    }

    /// Offset a point attribute in place.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown or holds fewer than two floats.
    pub fn translate_points<K: AttributeKey + ?Sized>(
        &mut self,
        key: &K,
        dx: f32,
        dy: f32,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<()> {
        self.transform_points(key, &affine2_from_translation(dx, dy), vertices)
    }
}
