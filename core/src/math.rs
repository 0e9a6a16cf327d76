//! Math type aliases and helper functions.
//!
//! Vertex transforms work in f32, matching the precision of the packed
//! `float*` attributes they operate on.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 2D affine transform in homogeneous form (f32).
///
/// Only the top two rows are used; the bottom row is `[0, 0, 1]`.
pub type Affine2 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Build a 2D affine matrix from its six coefficients.
///
/// A point is mapped as `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
pub fn affine2(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Affine2 {
    #[rustfmt::skip]
    let result = Affine2::new(
        a,   c,   tx,
        b,   d,   ty,
        0.0, 0.0, 1.0,
    );
    result
}

/// Build a translation-only 2D affine matrix.
pub fn affine2_from_translation(tx: f32, ty: f32) -> Affine2 {
    affine2(1.0, 0.0, 0.0, 1.0, tx, ty)
}

/// Build a scale-only 2D affine matrix.
pub fn affine2_from_scale(sx: f32, sy: f32) -> Affine2 {
    affine2(sx, 0.0, 0.0, sy, 0.0, 0.0)
}

/// Transform a 2D point by an affine matrix.
#[inline]
pub fn transform_point_2d(matrix: &Affine2, x: f32, y: f32) -> (f32, f32) {
    let m = matrix;
    (
        m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)],
        m[(1, 1)] * y + m[(1, 0)] * x + m[(1, 2)],
    )
}

/// Transform a 3D point by a 4x4 matrix (column-vector convention, w = 1).
#[inline]
pub fn transform_point_3d(matrix: &Mat4, x: f32, y: f32, z: f32) -> Vec3 {
    matrix.transform_point(&nalgebra::Point3::new(x, y, z)).coords
}

/// Intersect the line from `camera` through `point` with the z = 0 plane.
///
/// Returns the x/y coordinates of the intersection. A line parallel to the
/// plane has no intersection; the point itself is returned in that case.
pub fn intersect_line_with_xy_plane(camera: &Vec3, point: &Vec3) -> (f32, f32) {
    let direction = point - camera;
    if direction.z == 0.0 {
        return (point.x, point.y);
    }
    let lambda = -camera.z / direction.z;
    (
        camera.x + lambda * direction.x,
        camera.y + lambda * direction.y,
    )
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build the smallest rectangle spanning the given extremes.
    pub fn from_min_max(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affine2_identity() {
        let m = affine2(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        assert_eq!(transform_point_2d(&m, 3.0, -4.0), (3.0, -4.0));
        assert_eq!(m, Affine2::identity());
    }

    #[test]
    fn test_affine2_coefficients() {
        // a=2, b=3, c=5, d=7, tx=11, ty=13
        let m = affine2(2.0, 3.0, 5.0, 7.0, 11.0, 13.0);
        let (x, y) = transform_point_2d(&m, 1.0, 1.0);
        assert_eq!(x, 2.0 + 5.0 + 11.0);
        assert_eq!(y, 7.0 + 3.0 + 13.0);
    }

    #[test]
    fn test_translation_and_scale() {
        let t = affine2_from_translation(10.0, -2.0);
        assert_eq!(transform_point_2d(&t, 1.0, 1.0), (11.0, -1.0));

        let s = affine2_from_scale(2.0, 0.5);
        assert_eq!(transform_point_2d(&s, 4.0, 4.0), (8.0, 2.0));
    }

    #[test]
    fn test_transform_point_3d_translation() {
        let m = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let p = transform_point_3d(&m, 1.0, 1.0, 1.0);
        assert_eq!(p, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_intersect_line_with_xy_plane() {
        // Camera straight above the origin; a point on the plane projects onto itself.
        let camera = Vec3::new(0.0, 0.0, -10.0);
        assert_eq!(
            intersect_line_with_xy_plane(&camera, &Vec3::new(4.0, 2.0, 0.0)),
            (4.0, 2.0)
        );

        // A point halfway between camera and plane projects twice as far out.
        let (x, y) = intersect_line_with_xy_plane(&camera, &Vec3::new(1.0, 1.0, -5.0));
        assert!((x - 2.0).abs() < 1e-5);
        assert!((y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_rectangle() {
        let r = Rectangle::from_min_max(1.0, 2.0, 4.0, 6.0);
        assert_eq!(r, Rectangle::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(r.right(), 4.0);
        assert_eq!(r.bottom(), 6.0);
        assert!(!r.is_empty());
        assert!(Rectangle::default().is_empty());
    }
}
