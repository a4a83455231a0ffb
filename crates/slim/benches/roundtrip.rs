// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialize / Deserialize Throughput Benchmark
//!
//! Measures the engine on three graph shapes:
//! - a wide object tree with string and numeric fields
//! - a large `double[]` and a large `byte[]` (bulk element paths)
//! - the same tree in batch mode, where type names are written once
//!
//! Results include bytes per graph so stream size regressions show up next
//! to timing regressions.

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slim::types::{ClassBuilder, StructBuilder};
use slim::{ArrayValue, ObjectRef, Slim, SlimConfig, SlimType, StructValue, TypeMode, Value};

fn order_tree(lines: usize) -> Value {
    let point = StructBuilder::new("bench.Point")
        .field("x", "double")
        .field("y", "double")
        .get_or_register()
        .expect("point type");
    let line = ClassBuilder::new("bench.Line")
        .field("sku", "string")
        .field("qty", "int")
        .field("at", "bench.Point")
        .field("order", "bench.Order")
        .get_or_register()
        .expect("line type");
    let order = ClassBuilder::new("bench.Order")
        .field("id", "long")
        .field("lines", "bench.Line[]")
        .get_or_register()
        .expect("order type");

    let root = ObjectRef::new(&order).expect("order");
    root.set("id", 7i64).expect("id");
    let items: Vec<Value> = (0..lines)
        .map(|i| {
            let l = ObjectRef::new(&line).expect("line");
            l.set("sku", format!("SKU-{:05}", i)).expect("sku");
            l.set("qty", i as i32).expect("qty");
            let at = StructValue::new(&point)
                .and_then(|p| p.with("x", i as f64))
                .and_then(|p| p.with("y", -(i as f64)))
                .expect("point");
            l.set("at", at).expect("at");
            l.set("order", &root).expect("back reference");
            Value::from(l)
        })
        .collect();
    let array = ArrayValue::vector(&line, items).expect("lines");
    root.set("lines", ObjectRef::from_array(array))
        .expect("lines field");
    Value::from(root)
}

fn bench_object_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_tree");
    let engine = Slim::new();
    for lines in [16usize, 256, 4096] {
        let graph = order_tree(lines);
        let bytes = engine.to_bytes(&graph).expect("serialize");
        println!("object_tree/{}: {} bytes", lines, bytes.len());
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("serialize", lines), &graph, |b, graph| {
            let mut out = Vec::with_capacity(bytes.len());
            b.iter(|| {
                out.clear();
                engine.serialize(&mut out, black_box(graph)).expect("serialize");
            });
        });
        group.bench_with_input(BenchmarkId::new("deserialize", lines), &bytes, |b, bytes| {
            b.iter(|| engine.from_bytes(black_box(bytes)).expect("deserialize"));
        });
    }
    group.finish();
}

fn bench_bulk_arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_arrays");
    let engine = Slim::new();
    let len = 1 << 16;

    let doubles: Vec<Value> = (0..len).map(|i| Value::F64(i as f64 * 0.5)).collect();
    let doubles = Value::from(ObjectRef::from_array(
        ArrayValue::vector(&SlimType::named("double").expect("double"), doubles)
            .expect("double[]"),
    ));
    let raw = Value::from(ObjectRef::from_array(ArrayValue::bytes(
        (0..len).map(|i| i as u8).collect(),
    )));

    for (name, graph) in [("double[]", doubles), ("byte[]", raw)] {
        let bytes = engine.to_bytes(&graph).expect("serialize");
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_function(BenchmarkId::new("serialize", name), |b| {
            b.iter(|| engine.to_bytes(black_box(&graph)).expect("serialize"));
        });
        group.bench_function(BenchmarkId::new("deserialize", name), |b| {
            b.iter(|| engine.from_bytes(black_box(&bytes)).expect("deserialize"));
        });
    }
    group.finish();
}

fn bench_batch_mode(c: &mut Criterion) {
    let graph = order_tree(16);
    let default_len = Slim::new().to_bytes(&graph).expect("serialize").len();

    let engine = Slim::with_config(SlimConfig::new().with_type_mode(TypeMode::Batch));
    engine.to_bytes(&graph).expect("warm batch");
    let batched_len = engine.to_bytes(&graph).expect("serialize").len();
    println!(
        "batch_mode: {} bytes per call vs {} in default mode",
        batched_len, default_len
    );

    c.bench_function("batch_mode_serialize_16", |b| {
        b.iter(|| engine.to_bytes(black_box(&graph)).expect("serialize"));
    });
}

criterion_group!(
    benches,
    bench_object_tree,
    bench_bulk_arrays,
    bench_batch_mode
);
criterion_main!(benches);
