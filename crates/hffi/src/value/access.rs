// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar accessors and byte-level views.
//!
//! Multi-byte scalars use the host's native byte order. Narrowing stores
//! truncate silently, exactly like an assignment in C.

use super::{Backing, Value};
use crate::error::ValueError;
use crate::kind::Kind;
use std::ptr;

/// Generate a getter that dispatches on kind and widens to `$out`.
macro_rules! impl_get {
    ($name:ident, $method:literal, $out:ty, { $($kind:ident => $ty:ty),* $(,)? }) => {
        #[allow(clippy::unnecessary_cast)]
        pub fn $name(&self) -> $out {
            let kind = self.typ_for($method).kind();
            let value = match kind {
                $(Kind::$kind => <$ty>::from_ne_bytes(self.load($method)) as $out,)*
                other => ValueError::new($method, Some(other)).raise(),
            };
            access_trace!("[ffi] {} {:#x} -> {:?}", $method, self.addr as usize, value);
            value
        }
    };
}

/// Generate a setter that dispatches on kind and narrows `$in` with `as`.
macro_rules! impl_set {
    ($name:ident, $method:literal, $in:ty, { $($kind:ident => $ty:ty),* $(,)? }) => {
        #[allow(clippy::unnecessary_cast)]
        pub fn $name(&self, x: $in) {
            let kind = self.typ_for($method).kind();
            access_trace!("[ffi] {} {:#x} <- {:?}", $method, self.addr as usize, x);
            match kind {
                $(Kind::$kind => self.store($method, (x as $ty).to_ne_bytes()),)*
                other => ValueError::new($method, Some(other)).raise(),
            }
        }
    };
}

impl Value {
    impl_get!(int, "Value::int", i64, {
        Int8 => i8,
        Int16 => i16,
        Int32 => i32,
        Int64 => i64,
    });

    impl_get!(uint, "Value::uint", u64, {
        Uint8 => u8,
        Uint16 => u16,
        Uint32 => u32,
        Uint64 => u64,
    });

    impl_get!(float, "Value::float", f64, {
        Float => f32,
        Double => f64,
    });

    impl_set!(set_int, "Value::set_int", i64, {
        Int8 => i8,
        Int16 => i16,
        Int32 => i32,
        Int64 => i64,
    });

    impl_set!(set_uint, "Value::set_uint", u64, {
        Uint8 => u8,
        Uint16 => u16,
        Uint32 => u32,
        Uint64 => u64,
    });

    impl_set!(set_float, "Value::set_float", f64, {
        Float => f32,
        Double => f64,
    });

    /// Byte view over exactly `type_of().size()` bytes of this value.
    ///
    /// The view aliases the storage: writes through it are visible through
    /// `self` and vice versa. It keeps owned storage alive on its own.
    pub fn buffer(&self) -> ByteView {
        let len = self.typ_for("Value::buffer").size();
        let ptr = self.span("Value::buffer", 0, len);
        ByteView {
            ptr,
            len,
            _backing: self.backing.clone(),
        }
    }

    /// Copy the bytes of `src` into `self`.
    ///
    /// # Panics
    /// If either value is the zero Value or their types differ.
    pub fn copy_from(&self, src: &Value) {
        let dst_type = self.typ_for("Value::copy_from");
        let src_type = src.typ_for("Value::copy_from");
        if **dst_type != **src_type {
            panic!(
                "ffi: Value::copy_from type mismatch ({} into {})",
                src_type.name(),
                dst_type.name()
            );
        }
        let len = dst_type.size();
        let from = src.span("Value::copy_from", 0, len);
        let to = self.span("Value::copy_from", 0, len);
        // SAFETY: both ranges were validated by span(); ptr::copy allows
        // the overlap that aliasing views may have.
        unsafe { ptr::copy(from, to, len) };
    }
}

/// Aliasing byte view returned by [`Value::buffer`].
///
/// All accessors work through raw pointers so the view can coexist with
/// other values addressing the same bytes.
pub struct ByteView {
    ptr: *mut u8,
    len: usize,
    _backing: Backing,
}

impl ByteView {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr
    }

    /// Byte at `i`.
    ///
    /// # Panics
    /// If `i >= len()`.
    pub fn get(&self, i: usize) -> u8 {
        self.check(i);
        // SAFETY: i < len and the view's range was validated on creation.
        unsafe { self.ptr.add(i).read() }
    }

    /// Store `b` at `i`.
    ///
    /// # Panics
    /// If `i >= len()`.
    pub fn set(&self, i: usize, b: u8) {
        self.check(i);
        // SAFETY: as in get().
        unsafe { self.ptr.add(i).write(b) }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.len];
        // SAFETY: the view covers len readable bytes; out is a fresh buffer.
        unsafe { ptr::copy_nonoverlapping(self.ptr, out.as_mut_ptr(), self.len) };
        out
    }

    /// Overwrite the whole view.
    ///
    /// # Panics
    /// If `src.len() != len()`.
    pub fn copy_from_slice(&self, src: &[u8]) {
        if src.len() != self.len {
            panic!(
                "ffi: ByteView::copy_from_slice length mismatch ({} into {})",
                src.len(),
                self.len
            );
        }
        // SAFETY: lengths match; ptr::copy tolerates src aliasing the view.
        unsafe { ptr::copy(src.as_ptr(), self.ptr, self.len) };
    }

    pub fn fill(&self, b: u8) {
        // SAFETY: the view covers len writable bytes.
        unsafe { ptr::write_bytes(self.ptr, b, self.len) };
    }

    /// Borrow the bytes as a mutable slice.
    ///
    /// # Safety
    /// No other access to these bytes (through any `Value`, `ByteView` or
    /// foreign code) may happen while the slice is alive.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn as_mut_slice(&self) -> &mut [u8] {
        std::slice::from_raw_parts_mut(self.ptr, self.len)
    }

    fn check(&self, i: usize) {
        if i >= self.len {
            panic!("ffi: ByteView index out of range (index {}, len {})", i, self.len);
        }
    }
}
