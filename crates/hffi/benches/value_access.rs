// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::cast_possible_truncation)] // Bench parameters
#![allow(clippy::semicolon_if_nothing_returned)] // Benchmark code formatting

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hffi::{Field, Type, Value};

// ============================================================================
// Scalar access
// ============================================================================

fn bench_scalar_set_get(c: &mut Criterion) {
    let v = Value::new(&Type::int32());
    c.bench_function("scalar_set_get_int32", |b| {
        b.iter(|| {
            v.set_int(black_box(12345));
            black_box(v.int())
        })
    });

    let d = Value::new(&Type::double());
    c.bench_function("scalar_set_get_double", |b| {
        b.iter(|| {
            d.set_float(black_box(1.5));
            black_box(d.float())
        })
    });
}

// ============================================================================
// Navigation
// ============================================================================

fn bench_navigation(c: &mut Criterion) {
    let samples = Type::array(&Type::uint16(), 64).expect("array");
    let rec = Type::structure(
        "rec",
        136,
        vec![
            Field::new("id", Type::uint64(), 0),
            Field::new("samples", samples, 8),
        ],
    )
    .expect("rec");
    let v = Value::new(&rec);

    c.bench_function("field_index_write", |b| {
        b.iter(|| {
            let arr = v.field(1);
            for i in 0..64 {
                arr.index(i).set_uint(black_box(i as u64));
            }
        })
    });

    c.bench_function("field_by_name", |b| {
        b.iter(|| black_box(v.field_by_name(black_box("samples"))))
    });

    c.bench_function("addr_elem", |b| {
        b.iter(|| black_box(v.addr().elem().field(0).uint()))
    });
}

// ============================================================================
// Allocation
// ============================================================================

fn bench_allocate(c: &mut Criterion) {
    let arr = Type::array(&Type::double(), 128).expect("array");
    c.bench_function("allocate_1k", |b| b.iter(|| black_box(Value::new(&arr))));
}

criterion_group!(benches, bench_scalar_set_get, bench_navigation, bench_allocate);
criterion_main!(benches);
