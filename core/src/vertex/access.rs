//! Float, point and raw word accessors.

use crate::error::{VertexDataError, VertexDataResult};
use crate::math::{Vec2, Vec3, Vec4};

use super::attribute::AttributeKey;
use super::data::{Location, VertexData};

impl VertexData {
    /// Resolve `key` and check it holds at least `components` floats.
    pub(crate) fn locate_floats<K: AttributeKey + ?Sized>(
        &self,
        vertex: usize,
        key: &K,
        components: usize,
    ) -> VertexDataResult<Location> {
        let location = self.locate(vertex, key)?;
        if location.format.float_components() < components {
            return Err(VertexDataError::InvalidArgument(format!(
                "attribute '{}' ({}) holds fewer than {} floats",
                self.format.name(location.id).unwrap_or_default(),
                location.format,
                components
            )));
        }
        Ok(location)
    }

    /// Read the raw 32-bit word at the start of an attribute.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown or the vertex is out of range.
    pub fn get_unsigned_int<K: AttributeKey + ?Sized>(
        &self,
        vertex: usize,
        key: &K,
    ) -> VertexDataResult<u32> {
        let location = self.locate(vertex, key)?;
        Ok(self.read_u32(location.position))
    }

    /// Write a raw 32-bit word at the start of an attribute.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown or the vertex is out of range.
    pub fn set_unsigned_int<K: AttributeKey + ?Sized>(
        &mut self,
        vertex: usize,
        key: &K,
        value: u32,
    ) -> VertexDataResult<()> {
        let location = self.locate(vertex, key)?;
        self.write_u32(location.position, value);
        Ok(())
    }

    /// Read a single float.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, is not a float attribute, or the
    /// vertex is out of range.
    pub fn get_float<K: AttributeKey + ?Sized>(
        &self,
        vertex: usize,
        key: &K,
    ) -> VertexDataResult<f32> {
        let location = self.locate_floats(vertex, key, 1)?;
        Ok(self.read_f32(location.position))
    }

    /// Write a single float.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, is not a float attribute, or the
    /// vertex is out of range.
    pub fn set_float<K: AttributeKey + ?Sized>(
        &mut self,
        vertex: usize,
        key: &K,
        value: f32,
    ) -> VertexDataResult<()> {
        let location = self.locate_floats(vertex, key, 1)?;
        self.write_f32(location.position, value);
        Ok(())
    }

    /// Read the first two floats of an attribute as a point.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, holds fewer than two floats, or
    /// the vertex is out of range.
    pub fn get_point<K: AttributeKey + ?Sized>(
        &self,
        vertex: usize,
        key: &K,
    ) -> VertexDataResult<Vec2> {
        let position = self.locate_floats(vertex, key, 2)?.position;
        Ok(Vec2::new(
            self.read_f32(position),
            self.read_f32(position + 4),
        ))
    }

    /// Write the first two floats of an attribute.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, holds fewer than two floats, or
    /// the vertex is out of range.
    pub fn set_point<K: AttributeKey + ?Sized>(
        &mut self,
        vertex: usize,
        key: &K,
        x: f32,
        y: f32,
    ) -> VertexDataResult<()> {
        let position = self.locate_floats(vertex, key, 2)?.position;
        self.write_f32(position, x);
        self.write_f32(position + 4, y);
        Ok(())
    }

    /// Read the first three floats of an attribute.
    ///
    /// A fourth component, if present, is ignored.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, holds fewer than three floats, or
    /// the vertex is out of range.
    pub fn get_point_3d<K: AttributeKey + ?Sized>(
        &self,
        vertex: usize,
        key: &K,
    ) -> VertexDataResult<Vec3> {
        let position = self.locate_floats(vertex, key, 3)?.position;
        Ok(Vec3::new(
            self.read_f32(position),
            self.read_f32(position + 4),
            self.read_f32(position + 8),
        ))
    }

    /// Write the first three floats of an attribute.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, holds fewer than three floats, or
    /// the vertex is out of range.
    pub fn set_point_3d<K: AttributeKey + ?Sized>(
        &mut self,
        vertex: usize,
        key: &K,
        x: f32,
        y: f32,
        z: f32,
    ) -> VertexDataResult<()> {
        let position = self.locate_floats(vertex, key, 3)?.position;
        self.write_f32(position, x);
        self.write_f32(position + 4, y);
        self.write_f32(position + 8, z);
        Ok(())
    }

    /// Read all four floats of an attribute.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, is not `float4`, or the vertex is
    /// out of range.
    pub fn get_point_4d<K: AttributeKey + ?Sized>(
        &self,
        vertex: usize,
        key: &K,
    ) -> VertexDataResult<Vec4> {
        let position = self.locate_floats(vertex, key, 4)?.position;
        Ok(Vec4::new(
            self.read_f32(position),
            self.read_f32(position + 4),
            self.read_f32(position + 8),
            self.read_f32(position + 12),
        ))
    }

    /// Write all four floats of an attribute.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, is not `float4`, or the vertex is
    /// out of range.
    #[allow(clippy::too_many_arguments)]
    pub fn set_point_4d<K: AttributeKey + ?Sized>(
        &mut self,
        vertex: usize,
        key: &K,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    ) -> VertexDataResult<()> {
        let position = self.locate_floats(vertex, key, 4)?.position;
        self.write_f32(position, x);
        self.write_f32(position + 4, y);
        self.write_f32(position + 8, z);
        self.write_f32(position + 12, w);
        Ok(())
    }

    /// Write a homogeneous point with `w = 1.0`.
    ///
    /// # Errors
    ///
    /// Same as [`set_point_4d`](Self::set_point_4d).
    pub fn set_point_4d_xyz<K: AttributeKey + ?Sized>(
        &mut self,
        vertex: usize,
        key: &K,
        x: f32,
        y: f32,
        z: f32,
    ) -> VertexDataResult<()> {
        self.set_point_4d(vertex, key, x, y, z, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::VertexDataError;
    use crate::math::{Vec2, Vec3, Vec4};
    use crate::vertex::VertexData;

    fn data() -> VertexData {
        VertexData::from_format_str(
            "position(float2), depth(float1), normal(float3), tangent(float4), color(bytes4)",
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_float_roundtrip_is_little_endian() {
        let mut data = data();
        data.set_float(1, "depth", 1.5).unwrap();
        assert_eq!(data.get_float(1, "depth").unwrap(), 1.5);

        let position = data.vertex_size() + data.format().offset("depth").unwrap();
        assert_eq!(
            &data.raw_data()[position..position + 4],
            &1.5f32.to_le_bytes()
        );
    }

    #[test]
    fn test_points() {
        let mut data = data();
        data.set_point(0, "position", 320.0, 480.0).unwrap();
        data.set_point_3d(0, "normal", 0.0, 1.0, -1.0).unwrap();
        data.set_point_4d(1, "tangent", 1.0, 2.0, 3.0, 4.0).unwrap();
        data.set_point_4d_xyz(0, "tangent", 5.0, 6.0, 7.0).unwrap();

        assert_eq!(data.get_point(0, "position").unwrap(), Vec2::new(320.0, 480.0));
        assert_eq!(data.get_point_3d(0, "normal").unwrap(), Vec3::new(0.0, 1.0, -1.0));
        assert_eq!(
            data.get_point_4d(1, "tangent").unwrap(),
            Vec4::new(1.0, 2.0, 3.0, 4.0)
        );
        assert_eq!(
            data.get_point_4d(0, "tangent").unwrap(),
            Vec4::new(5.0, 6.0, 7.0, 1.0)
        );
        // A 3D read of a 4D attribute ignores w.
        assert_eq!(data.get_point_3d(1, "tangent").unwrap(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_pre_resolved_slot() {
        let mut data = data();
        let position = data.format().slot_of("position").unwrap();
        for vertex in 0..data.num_vertices() {
            data.set_point(vertex, &position, vertex as f32, 2.0).unwrap();
        }
        assert_eq!(data.get_point(1, &position).unwrap(), Vec2::new(1.0, 2.0));

        let mut other = VertexData::from_format_str("depth(float1), position(float2)", 1).unwrap();
        assert!(matches!(
            other.set_point(0, &position, 7.0, 8.0),
            Err(VertexDataError::AttributeNotFound(_))
        ));
        assert_eq!(other.get_point(0, "position").unwrap(), Vec2::zeros());
    }

    #[test]
    fn test_unsigned_int() {
        let mut data = data();
        data.set_unsigned_int(0, "color", 0x1122_3344).unwrap();
        assert_eq!(data.get_unsigned_int(0, "color").unwrap(), 0x1122_3344);
        let position = data.format().offset("color").unwrap();
        assert_eq!(&data.raw_data()[position..position + 4], &[0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_accessor_errors() {
        let mut data = data();
        assert!(matches!(
            data.get_point(0, "uv"),
            Err(VertexDataError::AttributeNotFound(_))
        ));
        assert!(matches!(
            data.set_point(0, "depth", 1.0, 2.0),
            Err(VertexDataError::InvalidArgument(_))
        ));
        assert!(matches!(
            data.get_float(0, "color"),
            Err(VertexDataError::InvalidArgument(_))
        ));
        assert!(matches!(
            data.get_point_4d(0, "normal"),
            Err(VertexDataError::InvalidArgument(_))
        ));
        assert!(matches!(
            data.get_float(2, "depth"),
            Err(VertexDataError::OutOfRange { .. })
        ));
    }
}
