use binview::{
    ArrayType, Endian, Error, ErrorKind, FieldConfig, FieldSpec, Primitive, RecordType, Result, TextEncoding,
    TextView, Value, View, list, object,
};

fn pet_type() -> RecordType {
    RecordType::builder("Pet")
        .field("age", FieldSpec::new("int8"))
        .field("name", FieldSpec::text(10))
        .build()
}

fn person_type() -> RecordType {
    RecordType::builder("Person")
        .field("age", FieldSpec::new("int8"))
        .field("height", FieldSpec::new("float32"))
        .field("scores", FieldSpec::new("int16").size(5))
        .field("weight", FieldSpec::new("float32").little_endian(true))
        .field("name", FieldSpec::text(10))
        .field("pets", FieldSpec::record(&pet_type()).size(2))
        .field("traits", FieldSpec::new("uint8").size(10))
        .build()
}

fn person_object() -> Value {
    object! {
        "age" => 10,
        "height" => 50,
        "scores" => list![1, 2, 3, 0, 0],
        "weight" => 60,
        "name" => "arthur",
        "pets" => list![
            object! { "age" => 1, "name" => "dog" },
            object! { "age" => 2, "name" => "cat" },
        ],
        "traits" => list![1, 2, 3, 4, 0, 0, 0, 0, 0, 0],
    }
}

fn pets() -> Vec<Value> {
    vec![
        object! { "age" => 1, "name" => "a" },
        object! { "age" => 2, "name" => "b" },
        object! { "age" => 3, "name" => "c" },
    ]
}

#[test]
fn test_records_byte_len() {
    let pets = ArrayType::records(&pet_type()).unwrap();
    assert_eq!(pets.element_len(), 11);
    assert_eq!(pets.byte_len(10).unwrap(), 110);

    let people = ArrayType::records(&person_type()).unwrap();
    assert_eq!(people.byte_len(1).unwrap(), 61);
    assert_eq!(people.byte_len(5).unwrap(), 305);
}

#[test]
fn test_records_compiles_element_type() {
    let ty = RecordType::builder("Uninitialized")
        .field("a", FieldSpec::new("uint8"))
        .build();
    assert!(!ty.is_compiled());
    ArrayType::records(&ty).unwrap();
    assert!(ty.is_compiled());

    let invalid = RecordType::builder("Invalid")
        .field("a", FieldSpec::new("Int128"))
        .build();
    assert!(ArrayType::records(&invalid).is_err());
}

#[test]
fn test_of() {
    let people = ArrayType::records(&person_type()).unwrap();
    let array = people.of(10).unwrap();
    assert_eq!(array.len(), 10);
    assert_eq!(array.byte_offset(), 0);
    assert_eq!(array.byte_len(), 610);

    let array = people.of(9).unwrap();
    assert_eq!(array.byte_len(), 549);
    assert_eq!(array.len(), 9);

    let array = people.of(1).unwrap();
    assert_eq!(array.len(), 1);
    assert!(people.of(0).unwrap().is_empty());
}

#[test]
fn test_view_over_existing_buffer() {
    let people = ArrayType::records(&person_type()).unwrap();
    let buffer = vec![0u8; 1100];
    let array = people.view(&buffer[..], 400, 610).unwrap();
    assert_eq!(array.len(), 10);
    assert_eq!(array.byte_offset(), 400);
    assert_eq!(array.byte_len(), 610);
    assert_eq!(array.buffer().as_ptr(), buffer.as_ptr());

    let err = people.view(&buffer[..], 400, 600).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::InvalidLength { byte_len: 600, element_len: 61 }
    ));
    let err = people.view(&buffer[..], 600, 610).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::OutOfBounds { .. }));
}

#[test]
fn test_get_returns_record_view() {
    let array = ArrayType::records(&person_type()).unwrap().of(10).unwrap();
    let person = array.get(1).unwrap().into_record().unwrap();
    assert_eq!(person.record_type().name(), "Person");
    assert_eq!(person.byte_offset(), 61);
    assert_eq!(person.byte_len(), 61);
    assert_eq!(person.buffer().as_ptr(), array.buffer().as_ptr());

    let err = array.get(10).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::IndexOutOfRange { index: 10, len: 10 }));
    assert!(array.get_value(10).is_err());
}

#[test]
fn test_get_value() {
    let array = ArrayType::records(&pet_type())
        .unwrap()
        .from_values(&pets())
        .unwrap();
    assert_eq!(array.get_value(0).unwrap(), pets()[0]);
    assert_eq!(array.get_value(2).unwrap(), pets()[2]);
}

#[test]
fn test_set_view() {
    let people = ArrayType::records(&person_type()).unwrap();
    let person_ty = match people.element().kind() {
        binview::ElementKind::Record(ty) => ty.clone(),
        other => panic!("unexpected element kind: {other:?}"),
    };
    let mut buffer = vec![0u8; 1100];
    let mut array = people.view(&mut buffer[..], 400, 610).unwrap();
    let person = person_ty.from_value(&person_object()).unwrap();
    array.set_view(3, &person).unwrap();
    assert_eq!(
        array.get(3).unwrap().into_record().unwrap().to_value().unwrap(),
        person_object()
    );
    assert_eq!(array.get_value(2).unwrap().get("age"), Some(&Value::Int(0)));

    // A record of a different type never fits, whatever its length.
    let pet = pet_type().zeroed().unwrap();
    let err = array.set_view(0, &pet).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::ViewMismatch { .. }));
    assert!(array.set_view(10, &person).is_err());
}

#[test]
fn test_set() {
    let mut array = ArrayType::records(&person_type()).unwrap().of(10).unwrap();
    array.set(1, person_object()).unwrap();
    assert_eq!(
        array.get(1).unwrap().into_record().unwrap().to_value().unwrap(),
        person_object()
    );
    assert!(array.set(10, person_object()).is_err());
    assert!(array.set(0, 5).is_err());
}

#[test]
fn test_to_value() {
    let mut pets_array = ArrayType::records(&pet_type()).unwrap().of(3).unwrap();
    let expected = pets();
    pets_array
        .set(0, expected[0].clone())
        .unwrap()
        .set(1, expected[1].clone())
        .unwrap()
        .set(2, expected[2].clone())
        .unwrap();
    assert_eq!(pets_array.to_value().unwrap(), Value::List(expected));
}

#[test]
fn test_from_values() {
    let array = ArrayType::records(&pet_type())
        .unwrap()
        .from_values(&pets())
        .unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(array.to_value().unwrap(), Value::List(pets()));
}

#[test]
fn test_fill_existing_view() {
    let ty = ArrayType::records(&pet_type()).unwrap();
    let mut array = ty.of(4).unwrap();
    array.fill(&pets()).unwrap();
    assert_eq!(array.len(), 4);
    let mut expected = pets();
    expected.push(object! { "age" => 0, "name" => "" });
    assert_eq!(array.to_value().unwrap(), Value::List(expected));

    // Extra values are ignored.
    let mut short = ty.of(2).unwrap();
    short.fill(&pets()).unwrap();
    assert_eq!(short.to_value().unwrap(), Value::List(pets()[..2].to_vec()));
}

#[test]
fn test_fill_validates_before_writing() {
    let ty = ArrayType::primitive("int16").unwrap();
    let mut array = ty.from_values(&[1, 2, 3].map(Value::from)).unwrap();
    let err = array
        .fill(&[Value::from(4), Value::from("five")])
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::ValueMismatch { field, .. } if field == "[1]"));
    assert_eq!(array.to_value().unwrap(), list![1, 2, 3]);
}

#[test]
fn test_iteration() {
    let people = ArrayType::records(&person_type()).unwrap().of(10).unwrap();
    assert_eq!(people.iter().count(), 10);
    assert_eq!(people.iter().len(), 10);
    // Every call starts over.
    assert_eq!(people.iter().count(), 10);

    let mut offsets = Vec::new();
    for person in &people {
        offsets.push(person.unwrap().into_record().unwrap().byte_offset());
    }
    assert_eq!(offsets, (0..10).map(|i| i * 61).collect::<Vec<_>>());
    assert!(people.as_bytes().iter().all(|&b| b == 0));
}

#[test]
fn test_values() {
    let array = ArrayType::text(4)
        .from_values(&["ab", "cdef", "ghijk"].map(Value::from))
        .unwrap();
    let values = array.values().collect::<Result<Vec<_>>>().unwrap();
    assert_eq!(values, ["ab", "cdef", "ghij"].map(Value::from));
}

#[test]
fn test_primitive_array() {
    let ty = ArrayType::primitive("int16").unwrap();
    assert_eq!(ty.byte_len(5).unwrap(), 10);
    let mut array = ty.from_values(&[10, 0, 0, 0, -10].map(Value::from)).unwrap();
    assert_eq!(array.as_bytes(), &[0, 10, 0, 0, 0, 0, 0, 0, 0xff, 0xf6]);
    assert!(matches!(array.get(4).unwrap(), View::Scalar(Value::Int(-10))));

    array.set(1, 70000).unwrap();
    assert_eq!(array.get_value(1).unwrap(), Value::Int(4464));

    let little = ArrayType::primitive_with("uint32", Endian::Little).unwrap();
    let array = little.from_values(&[Value::from(1)]).unwrap();
    assert_eq!(array.as_bytes(), &[1, 0, 0, 0]);

    let err = ArrayType::primitive("int128").unwrap_err();
    assert_eq!(err.to_string(), "Type \"int128\" is not a valid type.");
}

#[test]
fn test_primitive_array_low_level_access() {
    let mut array = ArrayType::primitive("uint8").unwrap().of(4).unwrap();
    array.write(Primitive::Uint16, 1, 0x0102, Endian::Big).unwrap();
    assert_eq!(array.to_value().unwrap(), list![0, 1, 2, 0]);
    assert_eq!(
        array.read(Primitive::Uint16, 2, Endian::Little).unwrap(),
        Value::UInt(2)
    );
    assert!(array.read(Primitive::Uint32, 1, Endian::Big).is_err());
}

#[test]
fn test_text_array() {
    let ty = ArrayType::text(10);
    let mut array = ty.from_values(&["a", "abcdefg", "h"].map(Value::from)).unwrap();
    assert_eq!(array.byte_len(), 30);
    assert_eq!(array.to_value().unwrap(), list!["a", "abcdefg", "h"]);

    let item = array.get(1).unwrap().into_text().unwrap();
    assert_eq!(item.byte_offset(), 10);
    assert_eq!(item.to_string(), "abcdefg");

    {
        let View::Text(mut item) = array.get_mut(2).unwrap() else {
            panic!("expected a text view");
        };
        item.set_text("xyz");
    }
    assert_eq!(array.get_value(2).unwrap(), Value::from("xyz"));

    array.set_view(0, &TextView::from_text("copied", 10)).unwrap();
    assert_eq!(array.get_value(0).unwrap(), Value::from("copied"));
    assert!(array.set_view(0, &TextView::from_text("short", 5)).is_err());
}

#[test]
fn test_latin1_text_array() {
    let ty = ArrayType::text_with(3, TextEncoding::Latin1);
    let array = ty.from_values(&[Value::from("é€")]).unwrap();
    assert_eq!(array.as_bytes(), &[0xe9, b'?', 0]);
    assert_eq!(array.get_value(0).unwrap(), Value::from("é?"));
}

#[test]
fn test_zero_length_elements_are_rejected() {
    let ty = ArrayType::text(0);
    assert!(ty.of(3).is_err());
    assert!(ty.view(&[0u8; 4][..], 0, 0).is_err());
}

#[test]
fn test_array_views_alias_record_views() {
    let person_ty = person_type();
    let mut person = person_ty.from_value(&person_object()).unwrap();
    let bytes = person.as_bytes().to_vec();

    // An array window laid over the record's `traits` bytes.
    let traits_offset = person_ty.compile().unwrap().field("traits").unwrap().byte_offset();
    let ty = ArrayType::primitive("uint8").unwrap();
    let traits = ty.view(&bytes[..], traits_offset, 10).unwrap();
    assert_eq!(&traits.to_value().unwrap(), person_object().get("traits").unwrap());

    {
        let View::Array(mut traits) = person.get_mut("traits").unwrap() else {
            panic!("expected an array view");
        };
        traits.set(9, 200).unwrap();
    }
    let traits = ty.view(person.buffer(), traits_offset, 10).unwrap();
    assert_eq!(traits.get_value(9).unwrap(), Value::UInt(200));
}

#[test]
fn test_serialize() {
    let array = ArrayType::records(&pet_type())
        .unwrap()
        .from_values(&pets()[..1])
        .unwrap();
    assert_eq!(
        serde_json::to_value(&array).unwrap(),
        serde_json::json!([{ "age": 1, "name": "a" }])
    );
}

#[test]
fn test_random_fill() {
    let mut rng = fastrand::Rng::with_seed(7);
    let ty = ArrayType::primitive_with("int32", Endian::Little).unwrap();
    for _ in 0..100 {
        let capacity = rng.usize(0..16);
        let values = (0..rng.usize(0..24))
            .map(|_| Value::from(rng.i32(..)))
            .collect::<Vec<_>>();
        let mut array = ty.of(capacity).unwrap();
        array.fill(&values).unwrap();

        let mut expected = values.iter().take(capacity).cloned().collect::<Vec<_>>();
        expected.resize(capacity, Value::Int(0));
        assert_eq!(array.to_value().unwrap(), Value::List(expected));
    }
}

#[test]
fn test_rejected_extension_write_leaves_array() {
    let strict = RecordType::builder("StrictBool")
        .register("strict", |_| {
            Ok(FieldConfig::extension(1, "getStrict", "setStrict"))
        })
        .getter("getStrict", |slot, _| Ok(Value::Bool(slot[0] != 0)))
        .setter("setStrict", |slot, value, _| match value {
            Value::Null | Value::Bool(_) => {
                slot[0] = u8::from(value.as_bool().unwrap_or(false));
                Ok(())
            }
            _ => Err(Error::value_mismatch("setStrict", "bool")),
        })
        .field("a", FieldSpec::new("strict"))
        .build();
    let mut array = ArrayType::records(&strict)
        .unwrap()
        .from_values(&[true, true, true].map(|a| object! { "a" => a }))
        .unwrap();
    assert_eq!(array.as_bytes(), &[1, 1, 1]);

    assert!(array.set(1, object! { "a" => 3 }).is_err());
    assert!(
        array
            .fill(&[object! { "a" => false }, object! { "a" => "bad" }])
            .is_err()
    );
    assert_eq!(array.as_bytes(), &[1, 1, 1]);

    array.fill(&[object! { "a" => false }]).unwrap();
    assert_eq!(array.as_bytes(), &[0, 0, 0]);
}

#[test]
fn test_byte_len_overflow() {
    let ty = ArrayType::primitive("int16").unwrap();
    let err = ty.byte_len(usize::MAX).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
    assert!(ty.of(usize::MAX).is_err());
}
