//! Packed RGBA colors.
//!
//! A color attribute (`bytes4`) holds one RGBA word with red in the most
//! significant byte and alpha in the least significant byte. The word is
//! byte-swapped at every read and write, so in the little-endian buffer the
//! channels appear in R, G, B, A order, which is what the GPU expects for an
//! unorm8x4 attribute.
//!
//! Attributes flagged with premultiplied alpha store `channel * alpha / 255`
//! (rounded down) in their RGB bytes. Such attributes never become fully
//! transparent: alpha is clamped to at least [`MIN_PREMULTIPLIED_ALPHA`], or
//! the RGB information could not be recovered.
//!
//! Accessors always take an attribute key. Buffers with a single color
//! attribute conventionally call it [`DEFAULT_COLOR_ATTRIBUTE`]; pass that
//! constant instead of relying on an implicit default.

use std::ops::RangeBounds;

use crate::error::{VertexDataError, VertexDataResult};

use super::attribute::{AttributeKey, NumericFormat};
use super::data::{Location, VertexData, ALPHA_BYTE};

/// Conventional name of the color attribute.
pub const DEFAULT_COLOR_ATTRIBUTE: &str = "color";

/// Smallest alpha stored for premultiplied color attributes.
pub const MIN_PREMULTIPLIED_ALPHA: f32 = 5.0 / 255.0;

/// Raw value of an opaque white color word.
const OPAQUE_WHITE: u32 = 0xffff_ffff;

/// Tolerance absorbing f32 error when scaling byte-exact alphas such as `254.0 / 255.0`.
const ALPHA_EPSILON: f32 = 0.001;

/// Convert an alpha in `[0, 1]` to its byte value, rounding down.
///
/// This is `floor(alpha * 255 + 0.001)`, so byte-exact inputs like
/// `254.0 / 255.0` survive f32 error. Alphas within `0.001 / 255` below a
/// byte boundary round up to it, e.g. `0.99999994` stores `255`.
#[inline]
pub(crate) fn alpha_to_byte(alpha: f32) -> u32 {
    ((alpha * 255.0 + ALPHA_EPSILON) as u32).min(0xff)
}

/// Scale the RGB channels of an RGBA word by its alpha.
///
/// Words with alpha `0` or `255` are returned unchanged.
pub fn premultiply_alpha(rgba: u32) -> u32 {
    let alpha = rgba & 0xff;
    if alpha == 0xff || alpha == 0 {
        return rgba;
    }
    let scale = |shift: u32| (((rgba >> shift) & 0xff) * alpha / 255) << shift;
    scale(24) | scale(16) | scale(8) | alpha
}

/// Clamp an alpha to `[min_alpha, 1]`; NaN maps to `min_alpha`.
#[inline]
fn clamp_alpha(alpha: f32, min_alpha: f32) -> f32 {
    if alpha.is_nan() {
        min_alpha
    } else {
        alpha.clamp(min_alpha, 1.0)
    }
}

/// Undo [`premultiply_alpha`], rounding each channel down.
///
/// Words with alpha `0` or `255` are returned unchanged.
pub fn unmultiply_alpha(rgba: u32) -> u32 {
    let alpha = rgba & 0xff;
    if alpha == 0xff || alpha == 0 {
        return rgba;
    }
    let scale = |shift: u32| ((((rgba >> shift) & 0xff) * 255 / alpha).min(0xff)) << shift;
    scale(24) | scale(16) | scale(8) | alpha
}

impl VertexData {
    /// Resolve `key` and check it is a `bytes4` attribute.
    fn locate_color<K: AttributeKey + ?Sized>(
        &self,
        vertex: usize,
        key: &K,
    ) -> VertexDataResult<Location> {
        let location = self.locate(vertex, key)?;
        if location.format != NumericFormat::Bytes4 {
            return Err(VertexDataError::InvalidArgument(format!(
                "attribute '{}' ({}) is not a bytes4 color",
                self.format.name(location.id).unwrap_or_default(),
                location.format
            )));
        }
        Ok(location)
    }

    #[inline]
    fn read_rgba(&self, position: usize) -> u32 {
        self.read_u32(position).swap_bytes()
    }

    #[inline]
    fn write_rgba(&mut self, position: usize, rgba: u32) {
        self.write_u32(position, rgba.swap_bytes());
    }

    /// Read the RGB color (`0xRRGGBB`) of a color attribute.
    ///
    /// Premultiplied colors are unmultiplied before they are returned.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, is not `bytes4`, or the vertex is
    /// out of range.
    pub fn get_color<K: AttributeKey + ?Sized>(
        &self,
        vertex: usize,
        key: &K,
    ) -> VertexDataResult<u32> {
        let location = self.locate_color(vertex, key)?;
        let mut rgba = self.read_rgba(location.position);
        if location.premultiplied_alpha {
            rgba = unmultiply_alpha(rgba);
        }
        Ok((rgba >> 8) & 0x00ff_ffff)
    }

    /// Write the RGB color (`0xRRGGBB`) of a color attribute, keeping its alpha.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, is not `bytes4`, or the vertex is
    /// out of range.
    pub fn set_color<K: AttributeKey + ?Sized>(
        &mut self,
        vertex: usize,
        key: &K,
        color: u32,
    ) -> VertexDataResult<()> {
        let alpha = self.get_alpha(vertex, key)?;
        self.set_color_and_alpha(vertex, key, color, alpha)
    }

    /// Read the alpha of a color attribute in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, is not `bytes4`, or the vertex is
    /// out of range.
    pub fn get_alpha<K: AttributeKey + ?Sized>(
        &self,
        vertex: usize,
        key: &K,
    ) -> VertexDataResult<f32> {
        let location = self.locate_color(vertex, key)?;
        Ok((self.read_rgba(location.position) & 0xff) as f32 / 255.0)
    }

    /// Write the alpha of a color attribute, keeping its RGB color.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, is not `bytes4`, or the vertex is
    /// out of range.
    pub fn set_alpha<K: AttributeKey + ?Sized>(
        &mut self,
        vertex: usize,
        key: &K,
        alpha: f32,
    ) -> VertexDataResult<()> {
        let color = self.get_color(vertex, key)?;
        self.set_color_and_alpha(vertex, key, color, alpha)
    }

    /// Write both RGB color and alpha of a color attribute.
    ///
    /// Alpha is clamped to `[0, 1]`, or to `[MIN_PREMULTIPLIED_ALPHA, 1]`
    /// for premultiplied attributes, and stored rounded down to a byte. A NaN
    /// alpha stores the lower bound.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, is not `bytes4`, or the vertex is
    /// out of range.
    pub fn set_color_and_alpha<K: AttributeKey + ?Sized>(
        &mut self,
        vertex: usize,
        key: &K,
        color: u32,
        alpha: f32,
    ) -> VertexDataResult<()> {
        let location = self.locate_color(vertex, key)?;
        self.write_color_and_alpha(location, color, alpha);
        Ok(())
    }

    fn write_color_and_alpha(&mut self, location: Location, color: u32, alpha: f32) {
        let min_alpha = if location.premultiplied_alpha {
            MIN_PREMULTIPLIED_ALPHA
        } else {
            0.0
        };
        let alpha = clamp_alpha(alpha, min_alpha);

        let mut rgba = ((color << 8) & 0xffff_ff00) | alpha_to_byte(alpha);
        if rgba != OPAQUE_WHITE {
            self.tinted = true;
        }
        if location.premultiplied_alpha && alpha != 1.0 {
            rgba = premultiply_alpha(rgba);
        }
        self.write_rgba(location.position, rgba);
    }

    /// Write the same color and alpha to a range of vertices.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown or is not `bytes4`.
    pub fn set_uniform_color_and_alpha<K: AttributeKey + ?Sized>(
        &mut self,
        key: &K,
        color: u32,
        alpha: f32,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<()> {
        let id = key.resolve(&self.format)?;
        for vertex in self.vertex_range(vertices) {
            let location = self.locate_color(vertex, &id)?;
            self.write_color_and_alpha(location, color, alpha);
        }
        Ok(())
    }

    /// Tint a range of vertices; same as [`set_uniform_color_and_alpha`](Self::set_uniform_color_and_alpha).
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown or is not `bytes4`.
    pub fn colorize<K: AttributeKey + ?Sized>(
        &mut self,
        key: &K,
        color: u32,
        alpha: f32,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<()> {
        self.set_uniform_color_and_alpha(key, color, alpha, vertices)
    }

    /// Multiply the alpha of a range of vertices by `factor`.
    ///
    /// Non-premultiplied attributes only have their alpha byte touched;
    /// premultiplied ones are decoded and re-encoded since their RGB depends
    /// on alpha.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown or is not `bytes4`.
    pub fn scale_alphas<K: AttributeKey + ?Sized>(
        &mut self,
        key: &K,
        factor: f32,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<()> {
        let id = key.resolve(&self.format)?;
        let range = self.vertex_range(vertices);
        if factor == 1.0 || range.is_empty() {
            return Ok(());
        }

        self.tinted = true;

        for vertex in range {
            let location = self.locate_color(vertex, &id)?;
            if location.premultiplied_alpha {
                let rgba = unmultiply_alpha(self.read_rgba(location.position));
                let alpha =
                    clamp_alpha((rgba & 0xff) as f32 / 255.0 * factor, MIN_PREMULTIPLIED_ALPHA);
                let rgba = (rgba & 0xffff_ff00) | alpha_to_byte(alpha);
                self.write_rgba(location.position, premultiply_alpha(rgba));
            } else {
                let position = location.position + ALPHA_BYTE;
                let alpha = clamp_alpha(self.raw_data[position] as f32 / 255.0 * factor, 0.0);
                self.raw_data[position] = alpha_to_byte(alpha) as u8;
            }
        }
        Ok(())
    }

    /// Check whether any vertex in the range is not opaque white.
    ///
    /// This compares raw words against `0xFFFFFFFF`; it does not decode colors.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown.
    pub fn is_tinted<K: AttributeKey + ?Sized>(
        &self,
        key: &K,
        vertices: impl RangeBounds<usize>,
    ) -> VertexDataResult<bool> {
        let (_, attr) = self.format.resolve(key)?;
        let stride = self.vertex_size();
        let offset = attr.offset;
        Ok(self.vertex_range(vertices).any(|vertex| {
            let position = vertex * stride + offset;
            bytemuck::pod_read_unaligned::<u32>(&self.raw_data[position..position + 4])
                != OPAQUE_WHITE
        }))
    }

    /// Recompute the cached [`tinted`](Self::tinted) flag from the data.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown.
    pub fn update_tinted<K: AttributeKey + ?Sized>(&mut self, key: &K) -> VertexDataResult<bool> {
        self.tinted = self.is_tinted(key, ..)?;
        Ok(self.tinted)
    }

    /// Whether a color attribute stores premultiplied alpha.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown.
    pub fn premultiplied_alpha<K: AttributeKey + ?Sized>(&self, key: &K) -> VertexDataResult<bool> {
        Ok(self.format.resolve(key)?.1.premultiplied_alpha)
    }

    /// Change whether a color attribute stores premultiplied alpha.
    ///
    /// With `update_data`, every stored color is converted to the new
    /// encoding; otherwise only the flag changes.
    ///
    /// # Errors
    ///
    /// Fails if the attribute is unknown, or if `update_data` is set and the
    /// attribute is not `bytes4`.
    pub fn set_premultiplied_alpha<K: AttributeKey + ?Sized>(
        &mut self,
        key: &K,
        value: bool,
        update_data: bool,
    ) -> VertexDataResult<()> {
        let (id, attr) = self.format.resolve(key)?;
        if attr.premultiplied_alpha == value {
            return Ok(());
        }

        if update_data {
            for vertex in 0..self.num_vertices {
                let location = self.locate_color(vertex, &id)?;
                let rgba = self.read_rgba(location.position);
                let rgba = if value {
                    premultiply_alpha(rgba)
                } else {
                    unmultiply_alpha(rgba)
                };
                self.write_rgba(location.position, rgba);
            }
            log::debug!(
                "VertexData {:?}: re-encoded {} colors (premultiplied: {})",
                self.label(),
                self.num_vertices,
                value
            );
        }

        std::sync::Arc::make_mut(&mut self.format).set_premultiplied_alpha(id, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premultiply_identity_at_extremes() {
        assert_eq!(premultiply_alpha(0x8040_20ff), 0x8040_20ff);
        assert_eq!(premultiply_alpha(0x8040_2000), 0x8040_2000);
        assert_eq!(unmultiply_alpha(0x8040_20ff), 0x8040_20ff);
        assert_eq!(unmultiply_alpha(0x8040_2000), 0x8040_2000);
    }

    #[test]
    fn test_premultiply_rounds_down() {
        // 0xff * 0x80 / 255 = 128, 0x80 * 0x80 / 255 = 64.25, 0x01 * 0x80 / 255 = 0.5
        assert_eq!(premultiply_alpha(0xff80_0180), 0x8040_0080);
        assert_eq!(unmultiply_alpha(0x8040_0080), 0xff7f_0080);
    }

    #[test]
    fn test_alpha_to_byte() {
        assert_eq!(alpha_to_byte(0.0), 0);
        assert_eq!(alpha_to_byte(1.0 / 255.0), 1);
        assert_eq!(alpha_to_byte(0.5), 127);
        assert_eq!(alpha_to_byte(254.0 / 255.0), 254);
        assert_eq!(alpha_to_byte(1.0), 255);
    }

    #[test]
    fn test_alpha_to_byte_epsilon_rounds_up_near_boundary() {
        assert_eq!(alpha_to_byte(0.999_999_94), 255);
        assert_eq!(alpha_to_byte(127.5 / 255.0), 127);
    }

    #[test]
    fn test_nan_alpha_stores_lower_bound() {
        let mut data = VertexData::from_format_str("color(bytes4), tint(bytes4)", 1).unwrap();
        data.set_color_and_alpha(0, DEFAULT_COLOR_ATTRIBUTE, 0x808080, f32::NAN)
            .unwrap();
        assert_eq!(data.get_alpha(0, DEFAULT_COLOR_ATTRIBUTE).unwrap(), 5.0 / 255.0);
        assert_eq!(data.raw_data()[3], 5);

        data.set_color_and_alpha(0, "tint", 0x808080, f32::NAN).unwrap();
        assert_eq!(data.get_alpha(0, "tint").unwrap(), 0.0);
    }

    #[test]
    fn test_scale_alphas_by_nan_stores_lower_bound() {
        let mut data = VertexData::from_format_str("color(bytes4), tint(bytes4)", 1).unwrap();
        data.set_color(0, DEFAULT_COLOR_ATTRIBUTE, 0x808080).unwrap();
        data.scale_alphas(DEFAULT_COLOR_ATTRIBUTE, f32::NAN, ..).unwrap();
        assert_eq!(data.get_alpha(0, DEFAULT_COLOR_ATTRIBUTE).unwrap(), 5.0 / 255.0);
        assert_eq!(data.raw_data()[3], 5);

        data.scale_alphas("tint", f32::NAN, ..).unwrap();
        assert_eq!(data.get_alpha(0, "tint").unwrap(), 0.0);
    }

    #[test]
    fn test_color_bytes_are_rgba_in_memory() {
        let mut data = VertexData::from_format_str("color(bytes4)", 1).unwrap();
        data.set_premultiplied_alpha("color", false, false).unwrap();
        data.set_color_and_alpha(0, "color", 0x112233, 1.0).unwrap();
        assert_eq!(data.raw_data(), &[0x11, 0x22, 0x33, 0xff]);
    }

    #[test]
    fn test_set_color_keeps_alpha() {
        let mut data = VertexData::from_format_str("color(bytes4)", 1).unwrap();
        data.set_premultiplied_alpha("color", false, false).unwrap();
        data.set_alpha(0, "color", 0.2).unwrap();
        let alpha = data.get_alpha(0, "color").unwrap();
        data.set_color(0, "color", 0x00ff00).unwrap();
        assert_eq!(data.get_alpha(0, "color").unwrap(), alpha);
        assert_eq!(data.get_color(0, "color").unwrap(), 0x00ff00);
    }

    #[test]
    fn test_premultiplied_min_alpha() {
        let mut data = VertexData::from_format_str("color(bytes4)", 1).unwrap();
        assert!(data.premultiplied_alpha("color").unwrap());
        data.set_color_and_alpha(0, "color", 0xffffff, 0.0).unwrap();
        assert_eq!(data.get_alpha(0, "color").unwrap(), 5.0 / 255.0);
        assert_eq!(data.get_color(0, "color").unwrap(), 0xffffff);
    }

    #[test]
    fn test_tinted_flag() {
        let mut data = VertexData::from_format_str("color(bytes4)", 2).unwrap();
        assert!(!data.tinted());
        data.set_color_and_alpha(0, "color", 0xffffff, 1.0).unwrap();
        assert!(!data.tinted());
        data.set_color(1, "color", 0xff0000).unwrap();
        assert!(data.tinted());

        data.set_color(1, "color", 0xffffff).unwrap();
        assert!(data.tinted());
        assert!(!data.update_tinted("color").unwrap());
        assert!(!data.tinted());
    }

    #[test]
    fn test_is_tinted_range() {
        let mut data = VertexData::from_format_str("color(bytes4)", 4).unwrap();
        // Fresh vertices are opaque black, which counts as tinted.
        assert!(data.is_tinted("color", ..).unwrap());

        data.set_uniform_color_and_alpha("color", 0xffffff, 1.0, ..)
            .unwrap();
        data.set_color(2, "color", 0x808080).unwrap();
        assert!(!data.is_tinted("color", 0..2).unwrap());
        assert!(data.is_tinted("color", 0..3).unwrap());
        assert!(data.is_tinted("color", ..).unwrap());
        assert!(!data.is_tinted("color", 3..).unwrap());
    }

    #[test]
    fn test_scale_alphas_straight() {
        let mut data = VertexData::from_format_str("color(bytes4)", 3).unwrap();
        data.set_premultiplied_alpha("color", false, false).unwrap();
        data.set_color(0, "color", 0x336699).unwrap();
        data.scale_alphas("color", 0.5, 0..2).unwrap();
        assert_eq!(data.get_alpha(0, "color").unwrap(), 127.0 / 255.0);
        assert_eq!(data.get_color(0, "color").unwrap(), 0x336699);
        assert_eq!(data.get_alpha(2, "color").unwrap(), 1.0);

        data.scale_alphas("color", 4.0, ..).unwrap();
        assert_eq!(data.get_alpha(0, "color").unwrap(), 1.0);
    }

    #[test]
    fn test_scale_alphas_premultiplied() {
        let mut data = VertexData::from_format_str("color(bytes4)", 1).unwrap();
        data.set_color(0, "color", 0xffffff).unwrap();
        data.scale_alphas("color", 0.5, ..).unwrap();
        assert_eq!(data.get_alpha(0, "color").unwrap(), 127.0 / 255.0);
        // RGB bytes are stored premultiplied.
        assert_eq!(data.raw_data(), &[127, 127, 127, 127]);
        assert_eq!(data.get_color(0, "color").unwrap(), 0xffffff);

        data.scale_alphas("color", 0.0, ..).unwrap();
        assert_eq!(data.get_alpha(0, "color").unwrap(), 5.0 / 255.0);
    }

    #[test]
    fn test_set_premultiplied_alpha_updates_data() {
        let mut data = VertexData::from_format_str("color(bytes4)", 1).unwrap();
        data.set_premultiplied_alpha("color", false, false).unwrap();
        data.set_color_and_alpha(0, "color", 0xff8000, 0.5).unwrap();
        assert_eq!(data.raw_data(), &[0xff, 0x80, 0x00, 127]);

        data.set_premultiplied_alpha("color", true, true).unwrap();
        assert!(data.premultiplied_alpha("color").unwrap());
        assert_eq!(data.raw_data(), &[127, 63, 0, 127]);

        // Unchanged flag leaves data untouched.
        data.set_premultiplied_alpha("color", true, true).unwrap();
        assert_eq!(data.raw_data(), &[127, 63, 0, 127]);

        data.set_premultiplied_alpha("color", false, false).unwrap();
        assert_eq!(data.raw_data(), &[127, 63, 0, 127]);
    }

    #[test]
    fn test_premultiplied_flag_is_per_buffer() {
        let mut a = VertexData::from_format_str("color(bytes4)", 1).unwrap();
        let b = VertexData::new(a.format().clone(), 1);
        a.set_premultiplied_alpha("color", false, false).unwrap();
        assert!(!a.premultiplied_alpha("color").unwrap());
        assert!(b.premultiplied_alpha("color").unwrap());
    }

    #[test]
    fn test_color_accessor_requires_bytes4() {
        let mut data = VertexData::from_format_str("position(float2)", 1).unwrap();
        assert!(matches!(
            data.set_color(0, "position", 0xff0000),
            Err(VertexDataError::InvalidArgument(_))
        ));
        assert!(matches!(
            data.set_premultiplied_alpha("position", true, true),
            Err(VertexDataError::InvalidArgument(_))
        ));
    }
}
