// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Hostile input: truncated streams, random byte flips and garbage must fail
// with a Deserialization error, never panic. Inline nesting is bounded by the
// configured depth on both ends.

use slim::config::{MAX_ARRAY_NESTING, MAX_TYPE_NAME_LEN};
use slim::types::{catalog, ClassBuilder, EnumBuilder, PrimitiveKind, StructBuilder};
use slim::{
    ArrayValue, EnumValue, Error, ObjectRef, Slim, SlimConfig, SlimType, StructValue, Value,
};

/// A graph touching every encoding path: classes, strings, enums, structs,
/// boxed values, arrays, shared references and a cycle.
fn rich_graph() -> Value {
    let level = EnumBuilder::new("tests.corruption.Level")
        .underlying(PrimitiveKind::I16)
        .variant("Low", -1)
        .variant("High", 300)
        .get_or_register()
        .unwrap();
    let pos = StructBuilder::new("tests.corruption.Pos")
        .field("x", "double")
        .field("tag", "string")
        .get_or_register()
        .unwrap();
    let item = ClassBuilder::new("tests.corruption.Item")
        .field("name", "string")
        .field("level", "tests.corruption.Level")
        .field("pos", "tests.corruption.Pos")
        .field("extra", "object")
        .field("data", "byte[]")
        .field("peers", "tests.corruption.Item[]")
        .field("owner", "tests.corruption.Item")
        .get_or_register()
        .unwrap();

    let a = ObjectRef::new(&item).unwrap();
    let b = ObjectRef::new(&item).unwrap();
    a.set("name", "alpha").unwrap();
    b.set("name", "beta").unwrap();
    a.set("level", EnumValue::named(&level, "High").unwrap()).unwrap();
    a.set(
        "pos",
        StructValue::new(&pos)
            .unwrap()
            .with("x", 1.25f64)
            .unwrap()
            .with("tag", "p")
            .unwrap(),
    )
    .unwrap();
    a.set("extra", 99u64).unwrap();
    b.set("extra", Value::Type(SlimType::string())).unwrap();
    a.set("data", ObjectRef::from_array(ArrayValue::bytes(vec![1, 2, 3, 4])))
        .unwrap();
    let peers = ArrayValue::vector(&item, vec![Value::from(&b), Value::Null, Value::from(&a)]).unwrap();
    a.set("peers", ObjectRef::from_array(peers)).unwrap();
    b.set("owner", &a).unwrap();
    Value::from(&a)
}

#[test]
fn test_rich_graph_roundtrips() {
    let engine = Slim::new();
    let bytes = engine.to_bytes(&rich_graph()).unwrap();
    let back = engine.from_bytes(&bytes).unwrap();
    let a = back.as_object().unwrap();
    let peers = a.get("peers").unwrap();
    let last = peers.as_object().unwrap().array_get(&[2]).unwrap();
    assert!(last.as_object().unwrap().ptr_eq(a));
}

#[test]
fn test_every_truncated_prefix_fails() {
    let engine = Slim::new();
    let bytes = engine.to_bytes(&rich_graph()).unwrap();
    for len in 0..bytes.len() {
        let err = engine.from_bytes(&bytes[..len]);
        assert!(
            matches!(&err, Err(e) if e.is_deserialization()),
            "prefix of {} bytes: {:?}",
            len,
            err
        );
    }
}

#[test]
fn test_random_byte_flips_never_panic() {
    let engine = Slim::new();
    let bytes = engine.to_bytes(&rich_graph()).unwrap();
    let mut rng = fastrand::Rng::with_seed(0xC0FFEE);
    for _ in 0..2000 {
        let mut corrupted = bytes.clone();
        for _ in 0..rng.usize(1..4) {
            let at = rng.usize(..corrupted.len());
            corrupted[at] = rng.u8(..);
        }
        if let Err(e) = engine.from_bytes(&corrupted) {
            assert!(e.is_deserialization(), "unwrapped error {:?}", e);
        }
    }
}

#[test]
fn test_random_garbage_never_panics() {
    let engine = Slim::with_config(SlimConfig::new().with_crosscheck(false));
    let mut rng = fastrand::Rng::with_seed(42);
    for _ in 0..2000 {
        let mut bytes = vec![0x00, 0x00, 0x53, 0x4D];
        bytes.extend((0..rng.usize(0..64)).map(|_| rng.u8(..)));
        let _ = engine.from_bytes(&bytes);
    }
}

#[test]
fn test_trailing_stream_is_left_unread() {
    let engine = Slim::new();
    let mut bytes = engine.to_bytes(&Value::I32(1)).unwrap();
    let len = bytes.len();
    bytes.extend_from_slice(&engine.to_bytes(&Value::I32(2)).unwrap());

    let mut input = bytes.as_slice();
    assert_eq!(engine.deserialize(&mut input).unwrap(), Value::I32(1));
    assert_eq!(input.len(), bytes.len() - len);
    assert_eq!(engine.deserialize(&mut input).unwrap(), Value::I32(2));
}

fn nested_struct(levels: usize) -> Value {
    let mut ty = StructBuilder::new("tests.corruption.depth.L0")
        .field("v", "int")
        .get_or_register()
        .unwrap();
    let mut value = StructValue::new(&ty).unwrap().with("v", 1i32).unwrap();
    for level in 1..levels {
        ty = StructBuilder::new(format!("tests.corruption.depth.L{}", level))
            .field("inner", ty.name().to_string())
            .get_or_register()
            .unwrap();
        value = StructValue::new(&ty).unwrap().with("inner", value).unwrap();
    }
    Value::Struct(value)
}

#[test]
fn test_depth_bound_on_encode() {
    let shallow = Slim::with_config(SlimConfig::new().with_max_depth(2));
    let err = shallow.to_bytes(&nested_struct(6)).unwrap_err();
    assert!(err.is_serialization());
    assert!(matches!(err.root_cause(), Error::DepthExceeded { limit: 2 }));
    assert!(shallow.to_bytes(&nested_struct(2)).is_ok());
}

#[test]
fn test_depth_bound_on_decode() {
    let bytes = Slim::new().to_bytes(&nested_struct(6)).unwrap();
    assert_eq!(Slim::new().from_bytes(&bytes).unwrap(), nested_struct(6));

    let shallow = Slim::with_config(SlimConfig::new().with_max_depth(2));
    let err = shallow.from_bytes(&bytes).unwrap_err();
    assert!(err.is_deserialization());
    assert!(matches!(err.root_cause(), Error::DepthExceeded { limit: 2 }));
}

/// Header followed by a root type token carrying `name` (no crosscheck).
fn stream_with_root_name(name: &str) -> Vec<u8> {
    let mut bytes = vec![0x00, 0x00, 0x53, 0x4D];
    let mut token = ((name.len() as u64) << 1) | 1;
    while token >= 0x80 {
        bytes.push((token as u8 & 0x7F) | 0x80);
        token >>= 7;
    }
    bytes.push(token as u8);
    bytes.extend_from_slice(name.as_bytes());
    bytes
}

#[test]
fn test_deep_array_type_names_fail_without_growing_catalog() {
    ClassBuilder::new("tests.corruption.Deep")
        .field("v", "int")
        .get_or_register()
        .unwrap();
    let engine = Slim::with_config(SlimConfig::new().with_crosscheck(false));

    for groups in [MAX_ARRAY_NESTING + 1, 3000, 200_000] {
        let name = format!("tests.corruption.Deep{}", "[]".repeat(groups));
        let err = engine.from_bytes(&stream_with_root_name(&name)).unwrap_err();
        assert!(err.is_deserialization(), "{} groups: {:?}", groups, err);
        assert!(
            matches!(err.root_cause(), Error::InvalidTypeHandle(_)),
            "{} groups: {:?}",
            groups,
            err.root_cause()
        );
    }
    assert!(!catalog().contains("tests.corruption.Deep[]"));

    let long = format!("tests.corruption.{}", "x".repeat(MAX_TYPE_NAME_LEN));
    let err = engine.from_bytes(&stream_with_root_name(&long)).unwrap_err();
    assert!(matches!(err.root_cause(), Error::InvalidTypeHandle(_)));
}
