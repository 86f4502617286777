//! Schema declaration: an ordered list of named field specs.
//!
//! Field order is significant: it determines byte offsets in the compiled layout.

use ahash::AHashMap;

use crate::record_type::RecordType;

/// The type a field spec refers to.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// A type resolved by name through the record type's registry
    /// (a built-in primitive, `string`, or an extension type).
    Named(String),
    /// A nested record type.
    Record(RecordType),
}

/// Declaration of a single field: its type plus optional `length` (text capacity
/// in bytes), `size` (element count, making the field a fixed-length sequence)
/// and `little_endian` override.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    ty: FieldType,
    length: Option<usize>,
    size: Option<usize>,
    little_endian: Option<bool>,
}

impl FieldSpec {
    /// Creates a spec for a type resolved by name.
    pub fn new(type_name: impl Into<String>) -> FieldSpec {
        Self::with_type(FieldType::Named(type_name.into()))
    }

    /// Creates a spec for a nested record field.
    pub fn record(ty: &RecordType) -> FieldSpec {
        Self::with_type(FieldType::Record(ty.clone()))
    }

    /// Shorthand for a `string` field of `length` bytes.
    pub fn text(length: usize) -> FieldSpec {
        Self::new("string").length(length)
    }

    pub fn with_type(ty: FieldType) -> FieldSpec {
        FieldSpec {
            ty,
            length: None,
            size: None,
            little_endian: None,
        }
    }

    /// Sets the byte capacity of one text element.
    pub fn length(mut self, length: usize) -> FieldSpec {
        self.length = Some(length);
        self
    }

    /// Makes the field a sequence of `size` elements.
    pub fn size(mut self, size: usize) -> FieldSpec {
        self.size = Some(size);
        self
    }

    pub fn little_endian(mut self, little_endian: bool) -> FieldSpec {
        self.little_endian = Some(little_endian);
        self
    }

    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    /// Returns the type name for named types, or the record type's name.
    pub fn type_name(&self) -> &str {
        match &self.ty {
            FieldType::Named(name) => name,
            FieldType::Record(ty) => ty.name(),
        }
    }

    pub fn get_length(&self) -> Option<usize> {
        self.length
    }

    pub fn get_size(&self) -> Option<usize> {
        self.size
    }

    pub fn get_little_endian(&self) -> Option<bool> {
        self.little_endian
    }
}

/// An ordered mapping from field name to field spec.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldSpec)>,
    field_map: AHashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Schema {
        Schema::default()
    }

    /// Appends a field to the schema.
    ///
    /// # Panics
    ///
    /// Panics if the field name is empty or if a field with the same name already exists.
    pub fn add_field(&mut self, name: impl Into<String>, spec: FieldSpec) {
        let name = name.into();
        assert!(!name.is_empty());
        assert!(!self.field_map.contains_key(&name));
        self.field_map.insert(name.clone(), self.fields.len());
        self.fields.push((name, spec));
    }

    /// Builder-style variant of [`Schema::add_field`].
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Schema {
        self.add_field(name, spec);
        self
    }

    pub fn fields(&self) -> &[(String, FieldSpec)] {
        &self.fields
    }

    pub fn find_field(&self, name: &str) -> Option<(usize, &FieldSpec)> {
        self.field_map
            .get(name)
            .map(|&i| (i, &self.fields[i].1))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_preserves_order() {
        let schema = Schema::new()
            .field("b", FieldSpec::new("int8"))
            .field("a", FieldSpec::text(4).size(2))
            .field("c", FieldSpec::new("float32").little_endian(true));
        let names = schema.fields().iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["b", "a", "c"]);

        let (index, spec) = schema.find_field("a").unwrap();
        assert_eq!(index, 1);
        assert_eq!(spec.type_name(), "string");
        assert_eq!(spec.get_length(), Some(4));
        assert_eq!(spec.get_size(), Some(2));
        assert_eq!(schema.find_field("c").unwrap().1.get_little_endian(), Some(true));
        assert!(schema.find_field("d").is_none());
    }

    #[test]
    #[should_panic]
    fn test_duplicate_field_panics() {
        Schema::new()
            .field("a", FieldSpec::new("int8"))
            .field("a", FieldSpec::new("int16"));
    }
}
