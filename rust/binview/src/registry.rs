//! Type registry: maps type names to field configurators.
//!
//! A configurator receives the field spec and produces a [`FieldConfig`]: the byte
//! width of one element, the interpreter ([`ViewKind`]) and the accessor names.
//! Record types start from the built-in registry and may add or override entries
//! to declare extension types, whose accessors the record type supplies itself.

use std::sync::{Arc, OnceLock};

use ahash::AHashMap;
use binview_bytes::{Endian, codec};
use binview_common::{Result, error::Error};

use crate::{
    record_type::RecordType,
    schema::{FieldSpec, FieldType},
    value::Value,
};

/// A function that fills in the configuration of a field with a given type name.
pub type Configurator = Arc<dyn Fn(&FieldSpec) -> Result<FieldConfig> + Send + Sync>;

/// Fixed-width numeric types understood by the built-in registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    BigInt64,
    BigUint64,
}

impl Primitive {
    pub const ALL: [Primitive; 10] = [
        Primitive::Int8,
        Primitive::Uint8,
        Primitive::Int16,
        Primitive::Uint16,
        Primitive::Int32,
        Primitive::Uint32,
        Primitive::Float32,
        Primitive::Float64,
        Primitive::BigInt64,
        Primitive::BigUint64,
    ];

    /// Looks up a primitive by its schema type name.
    pub fn from_name(name: &str) -> Option<Primitive> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Schema type name.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int8 => "int8",
            Primitive::Uint8 => "uint8",
            Primitive::Int16 => "int16",
            Primitive::Uint16 => "uint16",
            Primitive::Int32 => "int32",
            Primitive::Uint32 => "uint32",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::BigInt64 => "bigint64",
            Primitive::BigUint64 => "biguint64",
        }
    }

    /// Accessor suffix shared by the getter and setter names (`getInt8`, `setInt8`).
    fn accessor_suffix(self) -> &'static str {
        match self {
            Primitive::Int8 => "Int8",
            Primitive::Uint8 => "Uint8",
            Primitive::Int16 => "Int16",
            Primitive::Uint16 => "Uint16",
            Primitive::Int32 => "Int32",
            Primitive::Uint32 => "Uint32",
            Primitive::Float32 => "Float32",
            Primitive::Float64 => "Float64",
            Primitive::BigInt64 => "BigInt64",
            Primitive::BigUint64 => "BigUint64",
        }
    }

    pub fn getter_name(self) -> String {
        format!("get{}", self.accessor_suffix())
    }

    pub fn setter_name(self) -> String {
        format!("set{}", self.accessor_suffix())
    }

    /// Width in bytes.
    pub fn byte_len(self) -> usize {
        match self {
            Primitive::Int8 | Primitive::Uint8 => 1,
            Primitive::Int16 | Primitive::Uint16 => 2,
            Primitive::Int32 | Primitive::Uint32 | Primitive::Float32 => 4,
            Primitive::Float64 | Primitive::BigInt64 | Primitive::BigUint64 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Primitive::Float32 | Primitive::Float64)
    }

    /// Decodes the value stored at `position`.
    ///
    /// Signed kinds decode to [`Value::Int`], unsigned kinds to [`Value::UInt`]
    /// and floats to [`Value::Float`].
    pub fn read(self, buf: &[u8], position: usize, endian: Endian) -> Value {
        match self {
            Primitive::Int8 => Value::Int(codec::read_i8(buf, position) as i64),
            Primitive::Uint8 => Value::UInt(codec::read_u8(buf, position) as u64),
            Primitive::Int16 => Value::Int(codec::read_i16(buf, position, endian) as i64),
            Primitive::Uint16 => Value::UInt(codec::read_u16(buf, position, endian) as u64),
            Primitive::Int32 => Value::Int(codec::read_i32(buf, position, endian) as i64),
            Primitive::Uint32 => Value::UInt(codec::read_u32(buf, position, endian) as u64),
            Primitive::Float32 => Value::Float(codec::read_f32(buf, position, endian) as f64),
            Primitive::Float64 => Value::Float(codec::read_f64(buf, position, endian)),
            Primitive::BigInt64 => Value::Int(codec::read_i64(buf, position, endian)),
            Primitive::BigUint64 => Value::UInt(codec::read_u64(buf, position, endian)),
        }
    }

    /// Returns `true` if `value` can be encoded into this primitive.
    pub fn accepts(self, value: &Value) -> bool {
        value.to_int_bits().is_some()
    }

    /// Encodes `value` at `position`, wrapping integers to the slot width.
    pub fn write(self, buf: &mut [u8], position: usize, value: &Value, endian: Endian) -> Result<()> {
        let mismatch = || Error::value_mismatch(self.name(), "number");
        let bits = || value.to_int_bits().ok_or_else(mismatch);
        let float = || value.to_float().ok_or_else(mismatch);
        match self {
            Primitive::Int8 => codec::write_i8(buf, position, bits()? as i8),
            Primitive::Uint8 => codec::write_u8(buf, position, bits()? as u8),
            Primitive::Int16 => codec::write_i16(buf, position, bits()? as i16, endian),
            Primitive::Uint16 => codec::write_u16(buf, position, bits()? as u16, endian),
            Primitive::Int32 => codec::write_i32(buf, position, bits()? as i32, endian),
            Primitive::Uint32 => codec::write_u32(buf, position, bits()? as u32, endian),
            Primitive::Float32 => codec::write_f32(buf, position, float()? as f32, endian),
            Primitive::Float64 => codec::write_f64(buf, position, float()?, endian),
            Primitive::BigInt64 => codec::write_i64(buf, position, bits()? as i64, endian),
            Primitive::BigUint64 => codec::write_u64(buf, position, bits()?, endian),
        }
        Ok(())
    }
}

/// The interpreter selected for a field.
#[derive(Debug, Clone)]
pub enum ViewKind {
    /// A fixed-width number decoded in place.
    Primitive(Primitive),
    /// A fixed-capacity text slot, exposed as a text view.
    Text,
    /// A nested record, exposed as a record view.
    Record(RecordType),
    /// A caller-defined type dispatched to the record type's accessors.
    Extension,
}

/// Output of a configurator.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Byte length of one element.
    pub element_len: usize,
    pub kind: ViewKind,
    pub getter: String,
    pub setter: String,
}

impl FieldConfig {
    pub fn primitive(primitive: Primitive) -> FieldConfig {
        FieldConfig {
            element_len: primitive.byte_len(),
            kind: ViewKind::Primitive(primitive),
            getter: primitive.getter_name(),
            setter: primitive.setter_name(),
        }
    }

    pub fn text(length: usize) -> FieldConfig {
        FieldConfig {
            element_len: length,
            kind: ViewKind::Text,
            getter: "getString".to_string(),
            setter: "setString".to_string(),
        }
    }

    /// Configures a nested record field, compiling the nested type if needed.
    pub fn record(ty: &RecordType) -> Result<FieldConfig> {
        Ok(FieldConfig {
            element_len: ty.byte_len()?,
            kind: ViewKind::Record(ty.clone()),
            getter: "getObject".to_string(),
            setter: "setObject".to_string(),
        })
    }

    /// Configures an extension field of `element_len` bytes whose values are read
    /// and written by the named accessors of the enclosing record type.
    pub fn extension(
        element_len: usize,
        getter: impl Into<String>,
        setter: impl Into<String>,
    ) -> FieldConfig {
        FieldConfig {
            element_len,
            kind: ViewKind::Extension,
            getter: getter.into(),
            setter: setter.into(),
        }
    }
}

/// A name-keyed table of field configurators.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    entries: AHashMap<String, Configurator>,
}

impl TypeRegistry {
    /// Creates a registry with no entries.
    pub fn empty() -> TypeRegistry {
        TypeRegistry::default()
    }

    /// Returns a registry holding the built-in entries: every [`Primitive`] and `string`.
    pub fn builtin() -> TypeRegistry {
        static BUILTIN: OnceLock<TypeRegistry> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let mut registry = TypeRegistry::empty();
                for primitive in Primitive::ALL {
                    registry.register(primitive.name(), move |_| {
                        Ok(FieldConfig::primitive(primitive))
                    });
                }
                registry.register("string", |spec| {
                    let length = spec.get_length().ok_or_else(|| {
                        Error::invalid_arg("length", "text fields require a byte length")
                    })?;
                    Ok(FieldConfig::text(length))
                });
                registry
            })
            .clone()
    }

    /// Installs (or replaces) the configurator for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, configurator: F)
    where
        F: Fn(&FieldSpec) -> Result<FieldConfig> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(configurator));
    }

    /// Makes a record type addressable by its name.
    pub fn register_record(&mut self, ty: &RecordType) {
        let nested = ty.clone();
        self.register(ty.name(), move |_| FieldConfig::record(&nested));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a field spec into its configuration.
    ///
    /// Nested record types are compiled first if they have not been yet.
    ///
    /// # Errors
    ///
    /// Fails with `Type "<name>" is not a valid type.` when the name is not registered.
    pub fn resolve(&self, spec: &FieldSpec) -> Result<FieldConfig> {
        match spec.field_type() {
            FieldType::Record(ty) => FieldConfig::record(ty),
            FieldType::Named(name) => {
                let configurator = self
                    .entries
                    .get(name)
                    .ok_or_else(|| Error::invalid_type(name.as_str()))?;
                configurator(spec)
            }
        }
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.entries.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("TypeRegistry")
            .field("entries", &names)
            .finish()
    }
}
