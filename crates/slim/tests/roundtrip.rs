// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Graph roundtrip: every value kind through serialize -> deserialize.
//
// Each test registers its own type names so tests stay independent while
// sharing the process-wide catalog.

#![allow(clippy::float_cmp)]
#![allow(clippy::unreadable_literal)]

use slim::types::{
    catalog, ClassBuilder, EnumBuilder, PrimitiveKind, StructBuilder,
};
use slim::{EnumValue, ObjectRef, Slim, SlimType, StructValue, Value, Version};

fn roundtrip(value: &Value) -> Value {
    let engine = Slim::new();
    let bytes = engine.to_bytes(value).expect("serialize");
    engine.from_bytes(&bytes).expect("deserialize")
}

fn object_of(value: &Value) -> ObjectRef {
    value.as_object().expect("object root").clone()
}

#[test]
fn test_primitive_roots() {
    let cases = vec![
        Value::Bool(true),
        Value::I8(-5),
        Value::U8(250),
        Value::I16(-30000),
        Value::U16(65000),
        Value::I32(-7),
        Value::U32(0xDEADBEEF),
        Value::I64(i64::MIN),
        Value::U64(u64::MAX),
        Value::F32(1.5),
        Value::F64(-2.25e300),
        Value::Char('é'),
        Value::Guid([7; 16]),
        Value::Timestamp(638_000_000_000_000_000),
        Value::Duration(-10_000_000),
    ];
    for value in cases {
        assert_eq!(roundtrip(&value), value, "value {:?}", value);
    }
}

#[test]
fn test_string_root_and_empty_string() {
    assert_eq!(roundtrip(&Value::from("héllo")), Value::from("héllo"));
    assert_eq!(roundtrip(&Value::from("")), Value::from(""));
}

#[test]
fn test_null_root() {
    assert_eq!(roundtrip(&Value::Null), Value::Null);
}

#[test]
fn test_native_reference_roots() {
    let version = Value::Version(Version::new(1, 2, 3, 4));
    assert_eq!(roundtrip(&version), version);

    let ty = Value::Type(SlimType::primitive(PrimitiveKind::F64));
    assert_eq!(roundtrip(&ty), ty);

    let array_ty = Value::Type(catalog().resolve("int[,]").unwrap());
    assert_eq!(roundtrip(&array_ty), array_ty);
}

#[test]
fn test_class_fields_roundtrip() {
    let person = ClassBuilder::new("tests.roundtrip.Person")
        .field("name", "string")
        .field("age", "int")
        .field("score", "double")
        .field("id", "guid")
        .get_or_register()
        .unwrap();

    let obj = ObjectRef::new(&person).unwrap();
    obj.set("name", "Grace").unwrap();
    obj.set("age", 85i32).unwrap();
    obj.set("score", 99.5f64).unwrap();
    obj.set("id", Value::Guid([0xAB; 16])).unwrap();

    let back = object_of(&roundtrip(&Value::from(&obj)));
    assert!(!back.ptr_eq(&obj));
    assert_eq!(back.ty(), &person);
    assert_eq!(back.get("name").unwrap().as_str(), Some("Grace"));
    assert_eq!(back.get("age").unwrap(), Value::I32(85));
    assert_eq!(back.get("score").unwrap(), Value::F64(99.5));
    assert_eq!(back.get("id").unwrap(), Value::Guid([0xAB; 16]));
}

#[test]
fn test_null_string_field_stays_null() {
    let note = ClassBuilder::new("tests.roundtrip.Note")
        .field("text", "string")
        .get_or_register()
        .unwrap();
    let obj = ObjectRef::new(&note).unwrap();

    let back = object_of(&roundtrip(&Value::from(&obj)));
    assert_eq!(back.get("text").unwrap(), Value::Null);
}

#[test]
fn test_shared_reference_preserved() {
    let leaf = ClassBuilder::new("tests.roundtrip.Leaf")
        .field("n", "int")
        .get_or_register()
        .unwrap();
    let pair = ClassBuilder::new("tests.roundtrip.Pair")
        .field("left", "tests.roundtrip.Leaf")
        .field("right", "tests.roundtrip.Leaf")
        .get_or_register()
        .unwrap();

    let shared = ObjectRef::new(&leaf).unwrap();
    shared.set("n", 3i32).unwrap();
    let root = ObjectRef::new(&pair).unwrap();
    root.set("left", &shared).unwrap();
    root.set("right", &shared).unwrap();

    let back = object_of(&roundtrip(&Value::from(&root)));
    let left = object_of(&back.get("left").unwrap());
    let right = object_of(&back.get("right").unwrap());
    assert!(left.ptr_eq(&right));
    assert_eq!(left.get("n").unwrap(), Value::I32(3));
}

#[test]
fn test_distinct_equal_objects_stay_distinct() {
    let leaf = ClassBuilder::new("tests.roundtrip.Twin")
        .field("n", "int")
        .get_or_register()
        .unwrap();
    let pair = ClassBuilder::new("tests.roundtrip.TwinPair")
        .field("a", "tests.roundtrip.Twin")
        .field("b", "tests.roundtrip.Twin")
        .get_or_register()
        .unwrap();

    let a = ObjectRef::new(&leaf).unwrap();
    let b = ObjectRef::new(&leaf).unwrap();
    a.set("n", 1i32).unwrap();
    b.set("n", 1i32).unwrap();
    let root = ObjectRef::new(&pair).unwrap();
    root.set("a", &a).unwrap();
    root.set("b", &b).unwrap();

    let back = object_of(&roundtrip(&Value::from(&root)));
    let a2 = object_of(&back.get("a").unwrap());
    let b2 = object_of(&back.get("b").unwrap());
    assert!(!a2.ptr_eq(&b2));
}

#[test]
fn test_self_and_mutual_cycles() {
    let node = ClassBuilder::new("tests.roundtrip.Node")
        .field("next", "tests.roundtrip.Node")
        .field("label", "string")
        .get_or_register()
        .unwrap();

    let a = ObjectRef::new(&node).unwrap();
    a.set("next", &a).unwrap();
    let back = object_of(&roundtrip(&Value::from(&a)));
    assert!(object_of(&back.get("next").unwrap()).ptr_eq(&back));

    let x = ObjectRef::new(&node).unwrap();
    let y = ObjectRef::new(&node).unwrap();
    x.set("next", &y).unwrap();
    y.set("next", &x).unwrap();
    x.set("label", "x").unwrap();
    y.set("label", "y").unwrap();
    let x2 = object_of(&roundtrip(&Value::from(&x)));
    let y2 = object_of(&x2.get("next").unwrap());
    assert_eq!(y2.get("label").unwrap().as_str(), Some("y"));
    assert!(object_of(&y2.get("next").unwrap()).ptr_eq(&x2));
}

#[test]
fn test_long_chain_is_not_limited_by_depth() {
    let link = ClassBuilder::new("tests.roundtrip.Link")
        .field("next", "tests.roundtrip.Link")
        .field("n", "int")
        .get_or_register()
        .unwrap();

    let head = ObjectRef::new(&link).unwrap();
    let mut tail = head.clone();
    for n in 1..2000i32 {
        let next = ObjectRef::new(&link).unwrap();
        next.set("n", n).unwrap();
        tail.set("next", &next).unwrap();
        tail = next;
    }

    let mut cursor = object_of(&roundtrip(&Value::from(&head)));
    let mut count = 1;
    while let Value::Object(next) = cursor.get("next").unwrap() {
        count += 1;
        cursor = next;
    }
    assert_eq!(count, 2000);
    assert_eq!(cursor.get("n").unwrap(), Value::I32(1999));
}

#[test]
fn test_enum_and_struct_fields() {
    let color = EnumBuilder::new("tests.roundtrip.Color")
        .underlying(PrimitiveKind::U8)
        .variant("Red", 1)
        .variant("Green", 2)
        .get_or_register()
        .unwrap();
    let point = StructBuilder::new("tests.roundtrip.Point")
        .field("x", "int")
        .field("y", "int")
        .get_or_register()
        .unwrap();
    let pixel = ClassBuilder::new("tests.roundtrip.Pixel")
        .field("at", "tests.roundtrip.Point")
        .field("color", "tests.roundtrip.Color")
        .get_or_register()
        .unwrap();

    let at = StructValue::new(&point)
        .unwrap()
        .with("x", 10i32)
        .unwrap()
        .with("y", -4i32)
        .unwrap();
    let obj = ObjectRef::new(&pixel).unwrap();
    obj.set("at", Value::Struct(at.clone())).unwrap();
    obj.set("color", Value::Enum(EnumValue::named(&color, "Green").unwrap()))
        .unwrap();

    let back = object_of(&roundtrip(&Value::from(&obj)));
    assert_eq!(back.get("at").unwrap(), Value::Struct(at));
    let decoded = back.get("color").unwrap();
    let decoded = decoded.as_enum().unwrap();
    assert_eq!(decoded.value(), 2);
    assert_eq!(decoded.variant_name(), Some("Green"));
}

#[test]
fn test_struct_and_enum_roots() {
    let span = StructBuilder::new("tests.roundtrip.Span")
        .field("start", "long")
        .field("len", "ushort")
        .get_or_register()
        .unwrap();
    let value = Value::Struct(
        StructValue::new(&span)
            .unwrap()
            .with("start", 1i64 << 40)
            .unwrap()
            .with("len", 9u16)
            .unwrap(),
    );
    assert_eq!(roundtrip(&value), value);

    let mode = EnumBuilder::new("tests.roundtrip.Mode")
        .underlying(PrimitiveKind::I64)
        .variant("Far", -1 << 40)
        .get_or_register()
        .unwrap();
    let value = Value::Enum(EnumValue::named(&mode, "Far").unwrap());
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn test_boxed_values_in_object_fields() {
    let bag = ClassBuilder::new("tests.roundtrip.Bag")
        .field("a", "object")
        .field("b", "object")
        .field("c", "object")
        .field("d", "object")
        .field("e", "object")
        .get_or_register()
        .unwrap();
    let point = StructBuilder::new("tests.roundtrip.BoxedPoint")
        .field("x", "float")
        .get_or_register()
        .unwrap();

    let boxed_struct = Value::Struct(StructValue::new(&point).unwrap().with("x", 0.5f32).unwrap());
    let obj = ObjectRef::new(&bag).unwrap();
    obj.set("a", 42i32).unwrap();
    obj.set("b", "text").unwrap();
    obj.set("c", boxed_struct.clone()).unwrap();
    obj.set("d", Value::Version(Version::new(4, 3, 2, 1))).unwrap();
    obj.set("e", ObjectRef::plain()).unwrap();

    let back = object_of(&roundtrip(&Value::from(&obj)));
    assert_eq!(back.get("a").unwrap(), Value::I32(42));
    assert_eq!(back.get("b").unwrap().as_str(), Some("text"));
    assert_eq!(back.get("c").unwrap(), boxed_struct);
    assert_eq!(
        back.get("d").unwrap(),
        Value::Version(Version::new(4, 3, 2, 1))
    );
    assert!(back.get("e").unwrap().as_object().unwrap().ty().is_object());
}

#[test]
fn test_class_instance_in_object_field() {
    let circle = ClassBuilder::new("tests.roundtrip.Circle")
        .field("radius", "double")
        .get_or_register()
        .unwrap();
    let holder = ClassBuilder::new("tests.roundtrip.Holder")
        .field("item", "object")
        .get_or_register()
        .unwrap();

    let c = ObjectRef::new(&circle).unwrap();
    c.set("radius", 2.0f64).unwrap();
    let h = ObjectRef::new(&holder).unwrap();
    h.set("item", &c).unwrap();

    let back = object_of(&roundtrip(&Value::from(&h)));
    let item = object_of(&back.get("item").unwrap());
    assert_eq!(item.ty(), &circle);
    assert_eq!(item.get("radius").unwrap(), Value::F64(2.0));
}

#[test]
fn test_transient_field_comes_back_default() {
    let session = ClassBuilder::new("tests.roundtrip.Session")
        .field("user", "string")
        .transient_field("cache_hits", "int")
        .get_or_register()
        .unwrap();
    let obj = ObjectRef::new(&session).unwrap();
    obj.set("user", "root").unwrap();
    obj.set("cache_hits", 77i32).unwrap();

    let back = object_of(&roundtrip(&Value::from(&obj)));
    assert_eq!(back.get("user").unwrap().as_str(), Some("root"));
    assert_eq!(back.get("cache_hits").unwrap(), Value::I32(0));
}

#[test]
fn test_read_only_field_restored() {
    let account = ClassBuilder::new("tests.roundtrip.Account")
        .read_only_field("number", "long")
        .field("balance", "long")
        .get_or_register()
        .unwrap();
    let obj = ObjectRef::new(&account).unwrap();
    obj.init("number", 123456789i64).unwrap();
    obj.set("balance", -50i64).unwrap();
    assert!(obj.set("number", 1i64).is_err());

    let back = object_of(&roundtrip(&Value::from(&obj)));
    assert_eq!(back.get("number").unwrap(), Value::I64(123456789));
    assert_eq!(back.get("balance").unwrap(), Value::I64(-50));
}

#[test]
fn test_serialize_twice_is_byte_identical() {
    let thing = ClassBuilder::new("tests.roundtrip.Stable")
        .field("v", "int")
        .field("me", "tests.roundtrip.Stable")
        .get_or_register()
        .unwrap();
    let obj = ObjectRef::new(&thing).unwrap();
    obj.set("v", 5i32).unwrap();
    obj.set("me", &obj).unwrap();

    let engine = Slim::new();
    let first = engine.to_bytes(&Value::from(&obj)).unwrap();
    let second = engine.to_bytes(&Value::from(&obj)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_non_serializable_type_rejected() {
    let secret = ClassBuilder::new("tests.roundtrip.Secret")
        .field("key", "string")
        .non_serializable()
        .get_or_register()
        .unwrap();
    let obj = ObjectRef::new(&secret).unwrap();

    let mut out = Vec::new();
    let err = Slim::new().serialize(&mut out, &Value::from(&obj)).unwrap_err();
    assert!(err.is_serialization());
    assert!(matches!(
        err.root_cause(),
        slim::Error::SerializationProhibited(name) if name.contains("Secret")
    ));
    assert!(out.is_empty(), "nothing written on failure");
}
