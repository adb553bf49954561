// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Behavioural properties of the public Value API: round trips, truncation,
// struct/array addressing, aliasing, validity and kind-mismatch failures.

#![allow(clippy::float_cmp)]
#![allow(clippy::cast_possible_truncation)]

use hffi::{indirect, Field, Kind, Type, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

fn pair() -> Arc<Type> {
    Type::structure(
        "pair",
        16,
        vec![
            Field::new("a", Type::int32(), 0),
            Field::new("b", Type::double(), 8),
        ],
    )
    .expect("pair layout")
}

fn panic_message(f: impl FnOnce()) -> String {
    let err = panic::catch_unwind(AssertUnwindSafe(f)).expect_err("operation should panic");
    err.downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_default()
}

#[test]
fn integer_round_trip_for_representable_values() {
    for kind in [Kind::Int8, Kind::Int16, Kind::Int32, Kind::Int64] {
        let v = Value::new(&Type::scalar(kind));
        let bits = kind.intrinsic_size().unwrap() * 8;
        let max = if bits == 64 { i64::MAX } else { (1i64 << (bits - 1)) - 1 };
        let min = -max - 1;
        for x in [min, min + 1, -1, 0, 1, max - 1, max] {
            v.set_int(x);
            assert_eq!(v.int(), x, "{}", kind);
        }
    }
    for kind in [Kind::Uint8, Kind::Uint16, Kind::Uint32, Kind::Uint64] {
        let v = Value::new(&Type::scalar(kind));
        let bits = kind.intrinsic_size().unwrap() * 8;
        let max = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
        for x in [0, 1, max - 1, max] {
            v.set_uint(x);
            assert_eq!(v.uint(), x, "{}", kind);
        }
    }
}

#[test]
fn narrowing_store_keeps_low_bits() {
    let v = Value::new(&Type::uint8());
    v.set_uint(300);
    assert_eq!(v.uint(), 300 % 256);
    assert_eq!(v.uint(), 44);

    let v = Value::new(&Type::uint32());
    v.set_uint(u64::MAX);
    assert_eq!(v.uint(), u32::MAX as u64);

    let v = Value::new(&Type::int16());
    v.set_int(70_000);
    assert_eq!(v.int(), 70_000i64 as i16 as i64);
}

#[test]
fn struct_fields_are_independently_addressed() {
    let v = Value::new(&pair());
    v.field(0).set_int(7);
    v.field(1).set_float(3.5);
    assert_eq!(v.field(0).int(), 7);
    assert_eq!(v.field(1).float(), 3.5);

    for round in 0..10 {
        v.field(0).set_int(round);
        assert_eq!(v.field(1).float(), 3.5);
        v.field(1).set_float(round as f64 / 2.0);
        assert_eq!(v.field(0).int(), round);
    }
}

#[test]
fn array_index_boundary() {
    let arr = Type::array(&Type::int32(), 5).expect("array");
    let v = Value::new(&arr);
    for i in 0..=5 {
        let _ = v.index(i);
    }
    let msg = panic_message(|| {
        let _ = v.index(6);
    });
    assert_eq!(msg, "ffi: Value::index out of range (index 6, len 5)");
}

#[test]
fn addr_then_elem_aliases() {
    let v = Value::new(&pair());
    let back = v.addr().elem();
    back.field(0).set_int(123);
    assert_eq!(v.field(0).int(), 123);
    v.field(1).set_float(-8.0);
    assert_eq!(back.field(1).float(), -8.0);
    assert_eq!(back.unsafe_addr(), v.unsafe_addr());
}

#[test]
fn validity() {
    assert!(!Value::default().is_valid());

    let v = Value::new(&pair());
    assert!(v.is_valid());
    assert!(v.field(0).is_valid());
    assert!(v.field_by_index(&[1]).is_valid());
    assert!(v.field_by_name("a").is_valid());
    assert!(v.addr().is_valid());
    assert!(v.addr().elem().is_valid());
    assert!(indirect(&v).is_valid());

    let arr = Value::new(&Type::array(&Type::uint8(), 2).expect("array"));
    assert!(arr.index(0).is_valid());

    let mut word: usize = 0;
    // SAFETY: word outlives p.
    let p = unsafe { Value::new_at(&Type::int32(), (&mut word as *mut usize).cast()) };
    assert!(p.is_valid());
    assert!(p.is_nil());

    // the one reportable miss
    assert!(!v.field_by_name("nope").is_valid());
}

#[test]
fn kind_mismatch_names_operation_and_kind() {
    let s = Value::new(&pair());
    assert_eq!(
        panic_message(|| {
            let _ = s.len();
        }),
        "ffi: call of Value::len on struct Value"
    );

    let i = Value::new(&Type::int32());
    assert_eq!(
        panic_message(|| {
            let _ = i.float();
        }),
        "ffi: call of Value::float on int32 Value"
    );
    assert_eq!(
        panic_message(|| i.set_float(1.0)),
        "ffi: call of Value::set_float on int32 Value"
    );
    assert_eq!(
        panic_message(|| i.set_uint(1)),
        "ffi: call of Value::set_uint on int32 Value"
    );

    let d = Value::new(&Type::double());
    assert_eq!(
        panic_message(|| {
            let _ = d.index(0);
        }),
        "ffi: call of Value::index on double Value"
    );
    assert_eq!(
        panic_message(|| {
            let _ = d.field_by_name("x");
        }),
        "ffi: call of Value::field_by_name on double Value"
    );

    assert_eq!(
        panic_message(|| {
            let _ = Value::default().buffer();
        }),
        "ffi: call of Value::buffer on zero Value"
    );
}

#[test]
fn kind_always_matches_type() {
    let v = Value::new(&pair());
    let views = [
        v.clone(),
        v.field(0),
        v.field(1),
        v.addr(),
        v.addr().elem(),
    ];
    for view in &views {
        assert_eq!(view.kind(), view.type_of().kind());
    }
}
