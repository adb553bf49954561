// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HFFI - foreign value layer
//!
//! Describe C-like types at runtime and read, write and navigate instances
//! of them in raw memory, without compile-time knowledge of their shape.
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |            Type producers (headers, IDL, hand-written tables)       |
//! +---------------------------------------------------------------------+
//! |  Type model:  Kind | Type (size, elem, len, fields @ offsets)       |
//! +---------------------------------------------------------------------+
//! |  Value:  (Type, address)  new | new_at | addr                       |
//! |          int/uint/float + set_* | field | index | elem | buffer     |
//! +---------------------------------------------------------------------+
//! |            Call marshaling (unsafe_addr, buffer, scalar I/O)        |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Kind`] | Closed set of shapes (integer/float widths, pointer, array, struct) |
//! | [`Type`] | Immutable shape description, shared as `Arc<Type>` |
//! | [`Value`] | Typed view of one datum in memory |
//! | [`ByteView`] | Aliasing byte view of a value's storage |
//!
//! ## Example
//!
//! ```rust
//! use hffi::{Field, Kind, Type, Value};
//!
//! let samples = Type::array(&Type::int32(), 4).unwrap();
//! let reading = Type::structure("reading", 24, vec![
//!     Field::new("sensor", Type::uint8(), 0),
//!     Field::new("samples", samples, 4),
//!     Field::new("scale", Type::float(), 20),
//! ]).unwrap();
//!
//! let v = Value::new(&reading);
//! v.field(0).set_uint(300); // truncates to 44
//! v.field_by_name("samples").index(3).set_int(-7);
//!
//! assert_eq!(v.field(0).uint(), 44);
//! assert_eq!(v.field(1).index(3).int(), -7);
//!
//! let p = v.addr();
//! assert_eq!(p.kind(), Kind::Pointer);
//! assert_eq!(p.elem().field(1).index(3).int(), -7);
//! ```
//!
//! ## Logging
//!
//! The crate logs through the `log` facade and never installs a logger.
//! Allocation and pointer-type construction log at `debug`; pointer-cache
//! hits and dereferences into foreign memory at `trace`. Enable the
//! `trace-access` feature to trace every scalar read and write.

pub mod error;
pub mod kind;
pub mod types;
pub mod value;

pub use error::{Result, TypeError, ValueError};
pub use kind::{Kind, KIND_BITS, KIND_MASK, PTR_SIZE};
pub use types::{Field, Type};
pub use value::{indirect, ByteView, Value};
