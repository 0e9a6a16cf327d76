//! Vertex format compiler.
//!
//! A vertex format is compiled from a human-readable string of
//! comma-separated `name(format)` entries:
//!
//! ```ignore
//! let format = VertexFormat::parse("position(float2), texCoords(float2), color(bytes4)")?;
//! assert_eq!(format.vertex_size(), 20);
//! assert_eq!(format.offset("color")?, 16);
//! ```
//!
//! Attributes are laid out back to back in declaration order, so every
//! offset is the sum of the sizes declared before it and the vertex size is
//! the sum of all of them.
//!
//! Formats are shared via `Arc` since a handful of layouts typically serve
//! many buffers. Two formats are identical when their canonical strings
//! match, which is what enables the fast whole-vertex copy path.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{VertexDataError, VertexDataResult};

use super::attribute::{AttributeId, AttributeKey, NumericFormat, VertexAttribute};

/// Compiled layout of one interleaved vertex.
#[derive(Debug, Clone)]
pub struct VertexFormat {
    format_string: String,
    attributes: Vec<VertexAttribute>,
    slots: HashMap<String, usize>,
    layout_key: u64,
    vertex_size: usize,
}

impl VertexFormat {
    /// Compile a format string.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::InvalidFormat`] if the string is empty,
    /// an entry does not match `name(format)`, a numeric format is unknown,
    /// or an attribute name is declared twice.
    pub fn parse(format: &str) -> VertexDataResult<Arc<Self>> {
        Self::compile(format).map(Arc::new)
    }

    fn compile(format: &str) -> VertexDataResult<Self> {
        if format.trim().is_empty() {
            return Err(VertexDataError::InvalidFormat(
                "format string is empty".to_string(),
            ));
        }

        let mut attributes = Vec::new();
        let mut slots = HashMap::new();
        let mut offset = 0;

        for entry in format.split(',') {
            let (name, numeric_format) = parse_entry(entry)?;
            if slots.contains_key(name) {
                return Err(VertexDataError::InvalidFormat(format!(
                    "attribute '{name}' is declared more than once"
                )));
            }
            slots.insert(name.to_string(), attributes.len());
            attributes.push(VertexAttribute::new(name, numeric_format, offset));
            offset += numeric_format.size();
        }

        let format_string = attributes
            .iter()
            .map(|attr| format!("{}({})", attr.name, attr.format))
            .collect::<Vec<_>>()
            .join(", ");

        let mut hasher = DefaultHasher::new();
        format_string.hash(&mut hasher);
        let layout_key = hasher.finish();

        log::trace!("VertexFormat: compiled '{format_string}' (vertex size {offset})");

        Ok(Self {
            format_string,
            attributes,
            slots,
            layout_key,
            vertex_size: offset,
        })
    }

    /// Create a new format with this format's attributes followed by `additional` ones.
    ///
    /// # Errors
    ///
    /// Fails like [`parse`](Self::parse) if `additional` is malformed or
    /// redeclares an existing attribute.
    pub fn extend(&self, additional: &str) -> VertexDataResult<Arc<Self>> {
        Self::parse(&format!("{}, {}", self.format_string, additional))
    }

    /// The canonical format string, e.g. `"position(float2), color(bytes4)"`.
    pub fn format_string(&self) -> &str {
        &self.format_string
    }

    /// Size in bytes of one vertex.
    pub fn vertex_size(&self) -> usize {
        self.vertex_size
    }

    /// Size of one vertex in 32-bit units.
    pub fn vertex_size_in_32_bits(&self) -> usize {
        self.vertex_size / 4
    }

    /// Hash of the canonical string, carried by every [`AttributeId`] of this format.
    pub(crate) fn layout_key(&self) -> u64 {
        self.layout_key
    }

    /// Number of attributes in the format.
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Iterate the attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &VertexAttribute> {
        self.attributes.iter()
    }

    /// Iterate the attributes together with their slot ids.
    pub fn attribute_ids(&self) -> impl Iterator<Item = (AttributeId, &VertexAttribute)> {
        self.attributes
            .iter()
            .enumerate()
            .map(|(index, attr)| (AttributeId::new(self.layout_key, index), attr))
    }

    /// Look up the slot of an attribute by name.
    pub fn slot_of(&self, name: &str) -> Option<AttributeId> {
        self.slots
            .get(name)
            .map(|&slot| AttributeId::new(self.layout_key, slot))
    }

    /// Check if the format has an attribute with this name.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Get an attribute by slot.
    pub fn attribute(&self, id: AttributeId) -> Option<&VertexAttribute> {
        self.attributes.get(id.index())
    }

    /// Get an attribute by name.
    pub fn attribute_by_name(&self, name: &str) -> Option<&VertexAttribute> {
        self.slot_of(name).and_then(|id| self.attribute(id))
    }

    /// Resolve a key to its attribute.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::AttributeNotFound`] for unknown keys.
    pub fn resolve<K: AttributeKey + ?Sized>(
        &self,
        key: &K,
    ) -> VertexDataResult<(AttributeId, &VertexAttribute)> {
        let id = key.resolve(self)?;
        Ok((id, &self.attributes[id.index()]))
    }

    /// Name of the attribute in a slot.
    pub fn name(&self, id: AttributeId) -> Option<&str> {
        self.attribute(id).map(|attr| attr.name.as_str())
    }

    /// Byte offset of an attribute within a vertex.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::AttributeNotFound`] for unknown keys.
    pub fn offset<K: AttributeKey + ?Sized>(&self, key: &K) -> VertexDataResult<usize> {
        Ok(self.resolve(key)?.1.offset)
    }

    /// Offset of an attribute in 32-bit units.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::AttributeNotFound`] for unknown keys.
    pub fn offset_in_32_bits<K: AttributeKey + ?Sized>(&self, key: &K) -> VertexDataResult<usize> {
        Ok(self.offset(key)? / 4)
    }

    /// Size in bytes of an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::AttributeNotFound`] for unknown keys.
    pub fn size<K: AttributeKey + ?Sized>(&self, key: &K) -> VertexDataResult<usize> {
        Ok(self.resolve(key)?.1.size())
    }

    /// Size of an attribute in 32-bit units.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::AttributeNotFound`] for unknown keys.
    pub fn size_in_32_bits<K: AttributeKey + ?Sized>(&self, key: &K) -> VertexDataResult<usize> {
        Ok(self.size(key)? / 4)
    }

    /// Numeric format of an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`VertexDataError::AttributeNotFound`] for unknown keys.
    pub fn numeric_format<K: AttributeKey + ?Sized>(
        &self,
        key: &K,
    ) -> VertexDataResult<NumericFormat> {
        Ok(self.resolve(key)?.1.format)
    }

    /// Flip the premultiplied-alpha flag of one attribute.
    pub(crate) fn set_premultiplied_alpha(&mut self, id: AttributeId, value: bool) {
        if let Some(attr) = self.attributes.get_mut(id.index()) {
            attr.premultiplied_alpha = value;
        }
    }
}

/// Split one `name(format)` entry into its parts.
fn parse_entry(entry: &str) -> VertexDataResult<(&str, NumericFormat)> {
    let invalid = || VertexDataError::InvalidFormat(format!("malformed entry '{}'", entry.trim()));

    let entry = entry.trim();
    let body = entry.strip_suffix(')').ok_or_else(invalid)?;
    let (name, format) = body.split_once('(').ok_or_else(invalid)?;
    let name = name.trim();
    let format = format.trim();

    if name.is_empty() || name.contains(['(', ')']) || format.contains(['(', ')']) {
        return Err(invalid());
    }

    Ok((name, format.parse()?))
}

impl PartialEq for VertexFormat {
    fn eq(&self, other: &Self) -> bool {
        self.format_string == other.format_string
    }
}

impl Eq for VertexFormat {}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offsets_and_size() {
        let format = VertexFormat::parse("position(float2), texCoords(float2), color(bytes4)")
            .unwrap();
        assert_eq!(format.num_attributes(), 3);
        assert_eq!(format.offset("position").unwrap(), 0);
        assert_eq!(format.offset("texCoords").unwrap(), 8);
        assert_eq!(format.offset("color").unwrap(), 16);
        assert_eq!(format.vertex_size(), 20);
        assert_eq!(format.vertex_size_in_32_bits(), 5);
        assert_eq!(format.offset_in_32_bits("color").unwrap(), 4);
    }

    #[test]
    fn test_canonical_string_normalizes_whitespace() {
        let format = VertexFormat::parse("  position ( float2 ),color(bytes4)  ").unwrap();
        assert_eq!(format.format_string(), "position(float2), color(bytes4)");
        assert_eq!(format.to_string(), "position(float2), color(bytes4)");
    }

    #[test]
    fn test_identity_is_textual() {
        let a = VertexFormat::parse("position(float2), color(bytes4)").unwrap();
        let b = VertexFormat::parse("position(float2),color(bytes4)").unwrap();
        let c = VertexFormat::parse("color(bytes4), position(float2)").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "",
            "   ",
            "position",
            "position(float2",
            "position float2)",
            "(float2)",
            "position(float5)",
            "position(float2),",
            "position(float2) color(bytes4)",
            "position((float2))",
        ] {
            assert!(
                matches!(
                    VertexFormat::parse(bad),
                    Err(VertexDataError::InvalidFormat(_))
                ),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = VertexFormat::parse("position(float2), position(float3)");
        assert!(matches!(result, Err(VertexDataError::InvalidFormat(_))));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let format = VertexFormat::parse("pos(float2), Pos(float3)").unwrap();
        assert_eq!(format.numeric_format("pos").unwrap(), NumericFormat::Float2);
        assert_eq!(format.numeric_format("Pos").unwrap(), NumericFormat::Float3);
        assert!(!format.has_attribute("POS"));
    }

    #[test]
    fn test_lookup_by_slot_and_name() {
        let format = VertexFormat::parse("position(float3), color(bytes4)").unwrap();
        let color = format.slot_of("color").unwrap();
        assert_eq!(color.index(), 1);
        assert_eq!(format.name(color), Some("color"));
        assert_eq!(format.size(&color).unwrap(), 4);
        assert_eq!(format.size_in_32_bits("position").unwrap(), 3);
        assert!(format.attribute_by_name("color").unwrap().premultiplied_alpha);
        assert!(matches!(
            format.offset("normal"),
            Err(VertexDataError::AttributeNotFound(name)) if name == "normal"
        ));
        assert!(format.offset(&AttributeId::new(format.layout_key(), 7)).is_err());
    }

    #[test]
    fn test_slot_from_another_layout_is_rejected() {
        let a = VertexFormat::parse("uv(float2), position(float2)").unwrap();
        let b = VertexFormat::parse("position(float2), uv(float2)").unwrap();
        let position = a.slot_of("position").unwrap();
        assert!(matches!(
            b.offset(&position),
            Err(VertexDataError::AttributeNotFound(_))
        ));

        // Same canonical string, separately compiled: the slot carries over.
        let a2 = VertexFormat::parse("uv(float2),position(float2)").unwrap();
        assert_eq!(a2.offset(&position).unwrap(), 8);
    }

    #[test]
    fn test_extend() {
        let base = VertexFormat::parse("position(float2)").unwrap();
        let extended = base.extend("texCoords(float2), color(bytes4)").unwrap();
        assert_eq!(
            extended.format_string(),
            "position(float2), texCoords(float2), color(bytes4)"
        );
        assert_eq!(extended.vertex_size(), 20);
        assert!(base.extend("position(float3)").is_err());
    }
}
