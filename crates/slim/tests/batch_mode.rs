// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Batch type mode: the registry outlives individual calls, so a type's full
// name is written once per batch. Writer and reader replay the same call
// sequence; reset_batch() returns both to the initial handle space.

use slim::types::ClassBuilder;
use slim::{Error, ObjectRef, Slim, SlimConfig, SlimType, TypeMode, Value};

const EVENT: &str = "tests.batch.Event";

fn event_type() -> SlimType {
    ClassBuilder::new(EVENT)
        .field("seq", "long")
        .field("payload", "string")
        .get_or_register()
        .unwrap()
}

fn event(seq: i64) -> Value {
    let obj = ObjectRef::new(&event_type()).unwrap();
    obj.set("seq", seq).unwrap();
    obj.set("payload", format!("event-{}", seq)).unwrap();
    Value::from(&obj)
}

fn batch_engine() -> Slim {
    Slim::with_config(SlimConfig::new().with_type_mode(TypeMode::Batch))
}

fn contains_name(bytes: &[u8], name: &str) -> bool {
    bytes.windows(name.len()).any(|w| w == name.as_bytes())
}

fn seq_of(value: &Value) -> i64 {
    value.as_object().unwrap().get("seq").unwrap().as_i64().unwrap()
}

#[test]
fn test_type_name_written_once_per_batch() {
    let writer = batch_engine();
    let reader = batch_engine();

    let first = writer.to_bytes(&event(1)).unwrap();
    assert!(writer.batch_registered_new_types());
    let second = writer.to_bytes(&event(2)).unwrap();
    assert!(!writer.batch_registered_new_types());

    assert!(contains_name(&first, EVENT));
    assert!(!contains_name(&second, EVENT));
    assert!(second.len() < first.len());

    assert_eq!(seq_of(&reader.from_bytes(&first).unwrap()), 1);
    assert!(reader.batch_registered_new_types());
    assert_eq!(seq_of(&reader.from_bytes(&second).unwrap()), 2);
    assert!(!reader.batch_registered_new_types());
}

#[test]
fn test_default_mode_repeats_names() {
    let engine = Slim::new();
    let first = engine.to_bytes(&event(1)).unwrap();
    let second = engine.to_bytes(&event(2)).unwrap();
    assert!(contains_name(&first, EVENT));
    assert!(contains_name(&second, EVENT));
}

#[test]
fn test_reset_returns_to_initial_handles() {
    let writer = batch_engine();
    let reader = batch_engine();

    let first = writer.to_bytes(&event(1)).unwrap();
    reader.from_bytes(&first).unwrap();

    writer.reset_batch().unwrap();
    reader.reset_batch().unwrap();
    assert!(!writer.batch_registered_new_types());

    let after_reset = writer.to_bytes(&event(1)).unwrap();
    assert_eq!(after_reset, first);
    assert_eq!(seq_of(&reader.from_bytes(&after_reset).unwrap()), 1);
}

#[test]
fn test_failed_call_resets_batch_registry() {
    let writer = batch_engine();
    let first = writer.to_bytes(&event(1)).unwrap();

    let hidden = ClassBuilder::new("tests.batch.Hidden")
        .non_serializable()
        .get_or_register()
        .unwrap();
    let err = writer
        .to_bytes(&Value::from(&ObjectRef::new(&hidden).unwrap()))
        .unwrap_err();
    assert!(matches!(err.root_cause(), Error::SerializationProhibited(_)));
    assert!(!writer.batch_registered_new_types());

    // Back at the initial handle space: the name is written again.
    let again = writer.to_bytes(&event(1)).unwrap();
    assert_eq!(again, first);
}

#[test]
fn test_failed_read_resets_reader() {
    let writer = batch_engine();
    let reader = batch_engine();

    let first = writer.to_bytes(&event(1)).unwrap();
    assert!(reader.from_bytes(&first[..first.len() - 1]).is_err());

    // Reader fell back to the initial handle space; so does the writer.
    writer.reset_batch().unwrap();
    let fresh = writer.to_bytes(&event(3)).unwrap();
    assert_eq!(seq_of(&reader.from_bytes(&fresh).unwrap()), 3);
}

#[test]
fn test_switching_to_default_discards_batch() {
    let engine = batch_engine();
    engine.to_bytes(&event(1)).unwrap();

    engine.set_type_mode(TypeMode::Default);
    engine.set_type_mode(TypeMode::Batch);
    let bytes = engine.to_bytes(&event(2)).unwrap();
    assert!(contains_name(&bytes, EVENT));
}
