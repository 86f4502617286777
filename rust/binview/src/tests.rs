use binview_bytes::Endian;
use binview_common::error::ErrorKind;

use crate::{
    FieldConfig, FieldSpec, LayoutConfig, RecordType, TypeRegistry, Value, ViewKind,
    element::ElementKind, object, registry::Primitive,
};

fn pet_type() -> RecordType {
    RecordType::builder("Pet")
        .field("age", FieldSpec::new("int8"))
        .field("name", FieldSpec::text(10))
        .build()
}

fn person_type(pet: &RecordType) -> RecordType {
    RecordType::builder("Person")
        .field("age", FieldSpec::new("int8"))
        .field("height", FieldSpec::new("float32"))
        .field("scores", FieldSpec::new("int16").size(5))
        .field("weight", FieldSpec::new("float32").little_endian(true))
        .field("name", FieldSpec::text(10))
        .field("pet", FieldSpec::record(pet))
        .build()
}

#[test]
fn test_layout_offsets() {
    let pet = pet_type();
    let person = person_type(&pet);
    assert!(!person.is_compiled());
    assert!(!pet.is_compiled());

    let layout = person.compile().unwrap();
    assert!(person.is_compiled());
    // Nested types are compiled along with the outer one.
    assert!(pet.is_compiled());
    assert_eq!(layout.byte_len(), 40);
    assert_eq!(pet.byte_len().unwrap(), 11);

    let offsets = layout
        .fields()
        .iter()
        .map(|f| (f.name(), f.byte_offset(), f.total_len()))
        .collect::<Vec<_>>();
    assert_eq!(
        offsets,
        vec![
            ("age", 0, 1),
            ("height", 1, 4),
            ("scores", 5, 10),
            ("weight", 15, 4),
            ("name", 19, 10),
            ("pet", 29, 11),
        ]
    );

    let scores = layout.field("scores").unwrap();
    assert!(scores.is_sequence());
    assert_eq!(scores.size(), Some(5));
    assert_eq!(scores.element_len(), 2);
    assert_eq!(scores.getter_name(), "getInt16");
    assert_eq!(scores.setter_name(), "setInt16");
    assert_eq!(scores.endian(), Endian::Big);
    assert_eq!(layout.field("weight").unwrap().endian(), Endian::Little);
    assert_eq!(layout.field("name").unwrap().getter_name(), "getString");
    assert_eq!(layout.field("pet").unwrap().setter_name(), "setObject");
    assert!(matches!(
        layout.field("pet").unwrap().view_kind(),
        ViewKind::Record(ty) if *ty == pet
    ));
    assert!(layout.field("missing").is_none());
}

#[test]
fn test_compile_is_idempotent() {
    let pet = pet_type();
    let first = pet.compile().unwrap();
    let second = pet.compile().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert!(std::sync::Arc::ptr_eq(pet.layout().unwrap(), &first));

    let clone = pet.clone();
    assert!(clone.is_compiled());
    assert_eq!(clone, pet);
    assert_ne!(pet_type(), pet);
}

#[test]
fn test_primitive_lengths() {
    let ty = RecordType::builder("Primitives")
        .field("a", FieldSpec::new("int8"))
        .field("b", FieldSpec::new("uint8"))
        .field("c", FieldSpec::new("int16").little_endian(true))
        .field("d", FieldSpec::new("uint16"))
        .field("e", FieldSpec::new("int32").little_endian(true))
        .field("f", FieldSpec::new("uint32"))
        .field("g", FieldSpec::new("float32").little_endian(true))
        .field("h", FieldSpec::new("float64"))
        .field("i", FieldSpec::new("bigint64"))
        .field("j", FieldSpec::new("biguint64"))
        .build();
    assert_eq!(ty.byte_len().unwrap(), 42);
}

#[test]
fn test_invalid_type_fails_to_compile() {
    let ty = RecordType::builder("Invalid")
        .field("a", FieldSpec::new("Int128"))
        .build();
    let err = ty.compile().unwrap_err();
    assert_eq!(err.to_string(), "Type \"Int128\" is not a valid type.");
    assert!(err.is_schema_error());
    assert!(!ty.is_compiled());
    assert!(ty.zeroed().is_err());
    assert!(ty.from_value(&object! {}).is_err());

    let err = RecordType::builder("Invalid")
        .field("a", FieldSpec::new("Int128"))
        .try_build()
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidType { name } if name == "Int128"));
}

#[test]
fn test_text_requires_length() {
    let ty = RecordType::builder("Text")
        .field("name", FieldSpec::new("string"))
        .build();
    let err = ty.compile().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidArgument { name, .. } if name == "length"));
}

#[test]
fn test_registry_builtin_entries() {
    let registry = TypeRegistry::builtin();
    for primitive in Primitive::ALL {
        assert!(registry.contains(primitive.name()));
        let config = registry.resolve(&FieldSpec::new(primitive.name())).unwrap();
        assert_eq!(config.element_len, primitive.byte_len());
    }
    assert!(registry.contains("string"));
    assert_eq!(registry.len(), Primitive::ALL.len() + 1);
    assert!(!registry.contains("boolean"));
    assert!(TypeRegistry::empty().is_empty());
}

#[test]
fn test_registry_override_is_local() {
    let ty = RecordType::builder("Wide")
        .register("int8", |_| Ok(FieldConfig::primitive(Primitive::Int32)))
        .field("a", FieldSpec::new("int8"))
        .build();
    assert_eq!(ty.byte_len().unwrap(), 4);
    // The built-in registry is untouched.
    let config = TypeRegistry::builtin()
        .resolve(&FieldSpec::new("int8"))
        .unwrap();
    assert_eq!(config.element_len, 1);
}

#[test]
fn test_empty_registry_rejects_builtins() {
    let ty = RecordType::builder("Bare")
        .registry(TypeRegistry::empty())
        .field("a", FieldSpec::new("int8"))
        .build();
    assert!(ty.compile().unwrap_err().is_schema_error());
}

#[test]
fn test_register_record_by_name() {
    let pet = pet_type();
    let house = RecordType::builder("House")
        .register_record(&pet)
        .field("pets", FieldSpec::new("Pet").size(3))
        .build();
    let layout = house.compile().unwrap();
    assert_eq!(layout.byte_len(), 33);
    let pets = layout.field("pets").unwrap();
    assert!(matches!(pets.element().kind(), ElementKind::Record(ty) if *ty == pet));
}

#[test]
fn test_extension_fields_are_configured_lazily() {
    // No accessors are implemented: compilation still succeeds, access fails.
    let ty = RecordType::builder("Flags")
        .register("boolean", |_| {
            Ok(FieldConfig::extension(1, "getBoolean", "setBoolean"))
        })
        .field("a", FieldSpec::new("boolean"))
        .field("b", FieldSpec::new("uint8"))
        .build();
    let layout = ty.compile().unwrap();
    assert_eq!(layout.byte_len(), 2);
    assert!(matches!(layout.field("a").unwrap().view_kind(), ViewKind::Extension));

    let mut view = ty.zeroed().unwrap();
    assert_eq!(view.get_value("b").unwrap(), Value::UInt(0));
    let err = view.get_value("a").unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::MissingAccessor { record, method } if record == "Flags" && method == "getBoolean"
    ));
    let err = view.set("a", true).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::MissingAccessor { method, .. } if method == "setBoolean"
    ));
}

#[test]
fn test_default_endian_config() {
    let ty = RecordType::builder("Little")
        .config(LayoutConfig::default().with_default_endian(Endian::Little))
        .field("a", FieldSpec::new("uint16"))
        .field("b", FieldSpec::new("uint16").little_endian(false))
        .build();
    let mut view = ty.zeroed().unwrap();
    view.set("a", 0x0102).unwrap().set("b", 0x0102).unwrap();
    assert_eq!(view.as_bytes(), &[0x02, 0x01, 0x01, 0x02]);
}

#[test]
fn test_max_record_len() {
    let ty = RecordType::builder("Big")
        .config(LayoutConfig::default().with_max_record_len(8))
        .field("a", FieldSpec::new("float64"))
        .field("b", FieldSpec::new("int8"))
        .build();
    let err = ty.compile().unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::InvalidArgument { name, .. } if name == "max_record_len"
    ));

    let ty = RecordType::builder("Zero")
        .config(LayoutConfig::default().with_max_record_len(0))
        .build();
    assert!(ty.compile().is_err());
}

#[test]
fn test_empty_record() {
    let ty = RecordType::builder("Empty").build();
    assert_eq!(ty.byte_len().unwrap(), 0);
    let view = ty.zeroed().unwrap();
    assert_eq!(view.to_value().unwrap(), object! {});
}
