// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct, array and pointer navigation.
//!
//! Navigation never allocates or copies: every result addresses a part of
//! the parent's storage (or, for [`Value::elem`], the storage the pointer
//! refers to).

use super::region::Target;
use super::{Backing, Value};
use crate::kind::Kind;
use std::ptr;

impl Value {
    /// Number of struct fields.
    pub fn num_field(&self) -> usize {
        self.must_be("Value::num_field", Kind::Struct).num_field()
    }

    /// The `i`th struct field, addressed at `struct + offset`.
    ///
    /// # Panics
    /// If `self` is not a struct or `i >= num_field()`.
    pub fn field(&self, i: usize) -> Value {
        let typ = self.must_be("Value::field", Kind::Struct);
        let n = typ.num_field();
        if i >= n {
            panic!(
                "ffi: Value::field index out of range (index {}, num_field {})",
                i, n
            );
        }
        let field = typ.field(i);
        self.derive("Value::field", &field.typ, field.offset)
    }

    /// Nested field reached by walking `path`.
    ///
    /// After the first hop, a pointer to a struct is dereferenced before
    /// the next index is applied, so paths run through embedded pointers.
    pub fn field_by_index(&self, path: &[usize]) -> Value {
        self.must_be("Value::field_by_index", Kind::Struct);
        let mut v = self.clone();
        for (hop, &i) in path.iter().enumerate() {
            if hop > 0 && v.kind() == Kind::Pointer && v.type_of().elem().kind() == Kind::Struct {
                v = v.elem();
            }
            v = v.field(i);
        }
        v
    }

    /// First field named `name` in declaration order.
    ///
    /// Returns the zero Value when there is no such field.
    pub fn field_by_name(&self, name: &str) -> Value {
        let typ = self.must_be("Value::field_by_name", Kind::Struct);
        match typ.field_by_name(name) {
            Some((i, _)) => self.field(i),
            None => {
                log::trace!("[ffi] {} has no field {}", typ.name(), name);
                Value::default()
            }
        }
    }

    /// Array element count.
    pub fn len(&self) -> usize {
        self.must_be("Value::len", Kind::Array).len()
    }

    /// Same as [`Value::len`]: fixed arrays have no separate capacity.
    pub fn cap(&self) -> usize {
        self.must_be("Value::cap", Kind::Array).len()
    }

    /// Element `i`, addressed at `array + i * elem.size`.
    ///
    /// The accepted range is `0..=len()`. Index `len()` is one element past
    /// the end: taking it is allowed, but reading or writing through it on
    /// storage allocated by [`Value::new`] fails the bounds check.
    ///
    /// # Panics
    /// If `self` is not an array or `i > len()`.
    pub fn index(&self, i: usize) -> Value {
        let typ = self.must_be("Value::index", Kind::Array);
        let len = typ.len();
        if i > len {
            panic!("ffi: Value::index out of range (index {}, len {})", i, len);
        }
        let elem = typ.elem();
        // i <= len, so this is at most the array size, which fit in usize
        let offset = i * elem.size();
        self.derive("Value::index", elem, offset)
    }

    /// Whether the stored pointer is null.
    pub fn is_nil(&self) -> bool {
        self.must_be("Value::is_nil", Kind::Pointer);
        self.load_addr("Value::is_nil").is_null()
    }

    /// Value the pointer refers to.
    ///
    /// A null pointer yields a valid value whose every access panics. On
    /// storage allocated by [`Value::new`], the target must lie in storage
    /// reachable from this value: itself, what `addr`/`set_pointer` linked
    /// to it, or the exact foreign bytes an unsafe entry point vouched for.
    ///
    /// # Panics
    /// If `self` is not a pointer, or the target cannot be vouched for.
    pub fn elem(&self) -> Value {
        let typ = self.must_be("Value::elem", Kind::Pointer).elem().clone();
        let target = self.load_addr("Value::elem");
        if target.is_null() {
            return Value {
                typ: Some(typ),
                addr: ptr::null_mut(),
                backing: self.backing.clone(),
            };
        }
        let backing = match &self.backing {
            Backing::Owned(region) => match region.resolve(target as usize, typ.size()) {
                Some(Target::Owned(found)) => Backing::Owned(found),
                Some(Target::Foreign) => {
                    log::trace!("[ffi] Value::elem into foreign memory at {:p}", target);
                    Backing::Foreign
                }
                None => panic!(
                    "ffi: Value::elem target {:p} is outside storage reachable from this value",
                    target
                ),
            },
            Backing::Foreign | Backing::None => Backing::Foreign,
        };
        Value {
            typ: Some(typ),
            addr: target,
            backing,
        }
    }
}

/// `v.elem()` if `v` is a pointer, otherwise a clone of `v`.
pub fn indirect(v: &Value) -> Value {
    if v.kind() != Kind::Pointer {
        return v.clone();
    }
    v.elem()
}
