// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed access to foreign values living in raw memory.
//!
//! A [`Value`] pairs a [`Type`] with the address of its data. The address
//! always points *to* the data (there is no inline small-value form), and
//! a `Value` never owns a private copy: [`Value::field`], [`Value::index`],
//! [`Value::elem`] and [`Value::addr`] hand out views that alias the
//! parent's storage.
//!
//! # Storage lifetime
//!
//! Storage created by [`Value::new`] is reference counted. Every `Value`
//! derived from it holds a count, so a view can never outlive the bytes it
//! addresses. All accesses to such storage go through one bounds-checked
//! primitive that validates against the storage's real length.
//!
//! Memory handed in through the `unsafe` constructors ([`Value::new_at`],
//! [`Value::from_raw`]) is *foreign*: its lifetime and extent are the
//! caller's business and accesses trust [`Type::size`].
//!
//! # Failure
//!
//! Calling an accessor on the wrong kind, on the zero Value or with an
//! out-of-range index panics with a message naming the method and the
//! actual kind (see [`ValueError`]).
//!
//! # Example
//!
//! ```rust
//! use hffi::{Field, Type, Value};
//!
//! let pair = Type::structure("pair", 16, vec![
//!     Field::new("a", Type::int32(), 0),
//!     Field::new("b", Type::double(), 8),
//! ]).unwrap();
//!
//! let v = Value::new(&pair);
//! v.field(0).set_int(7);
//! v.field_by_name("b").set_float(3.5);
//! assert_eq!(v.field(0).int(), 7);
//! assert_eq!(v.field(1).float(), 3.5);
//! ```

/// Per-access tracing, compiled out unless the `trace-access` feature is on.
macro_rules! access_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "trace-access")]
        log::trace!($($arg)*);
    };
}

mod access;
mod nav;
mod region;

pub use access::ByteView;
pub use nav::indirect;

use crate::error::ValueError;
use crate::kind::{Kind, PTR_SIZE};
use crate::types::Type;
use region::{Link, Region};
use std::fmt;
use std::ptr;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Clone)]
enum Backing {
    /// Zero Value.
    None,
    /// Storage allocated by this crate.
    Owned(Rc<Region>),
    /// Caller-managed memory.
    Foreign,
}

/// A typed view of one foreign datum.
///
/// The default value is the zero Value: [`Value::is_valid`] is the only
/// method it supports.
#[derive(Clone)]
pub struct Value {
    typ: Option<Arc<Type>>,
    addr: *mut u8,
    backing: Backing,
}

impl Default for Value {
    fn default() -> Self {
        Self {
            typ: None,
            addr: ptr::null_mut(),
            backing: Backing::None,
        }
    }
}

impl Value {
    /// Allocate zeroed storage for one `typ` and return a value addressing it.
    ///
    /// # Panics
    /// If `typ` is not a valid type (a `Function` placeholder).
    pub fn new(typ: &Arc<Type>) -> Value {
        if !typ.is_valid() {
            panic!("ffi: Value::new of invalid type {} ({})", typ.name(), typ.kind());
        }
        let region = Region::zeroed(typ.size());
        log::debug!(
            "[ffi] allocated {} bytes for {} at {:p}",
            typ.size(),
            typ.name(),
            region.base()
        );
        Value {
            typ: Some(typ.clone()),
            addr: region.base(),
            backing: Backing::Owned(region),
        }
    }

    /// Wrap a pointer slot at `slot` as a value of type `*typ`.
    ///
    /// `slot` is the address of a pointer-sized word, *not* of a `typ`
    /// instance: the returned value has kind [`Kind::Pointer`] and
    /// [`Value::elem`] reads the word at `slot` and follows it. Use
    /// [`Value::from_raw`] when the address directly holds a `typ`.
    ///
    /// Returns the zero Value if no pointer type can be built for `typ`.
    ///
    /// # Safety
    /// `slot` must be valid for reads and writes of `PTR_SIZE` bytes for as
    /// long as the returned value (or anything derived from it) is used,
    /// and every non-null address stored in it, now or later, must point to
    /// a live instance of `typ` (transitively for nested pointers).
    pub unsafe fn new_at(typ: &Arc<Type>, slot: *mut u8) -> Value {
        let ptr_type = match Type::pointer_to(typ) {
            Ok(t) => t,
            Err(err) => {
                log::warn!("[ffi] Value::new_at: {}", err);
                return Value::default();
            }
        };
        Value {
            typ: Some(ptr_type),
            addr: slot,
            backing: Backing::Foreign,
        }
    }

    /// View the `typ` instance stored directly at `addr`.
    ///
    /// # Panics
    /// If `typ` is not a valid type.
    ///
    /// # Safety
    /// `addr` must be valid for reads and writes of `typ.size()` bytes for
    /// as long as the returned value (or anything derived from it) is used,
    /// and pointers stored inside it must obey the same rule.
    pub unsafe fn from_raw(typ: &Arc<Type>, addr: *mut u8) -> Value {
        if !typ.is_valid() {
            panic!("ffi: Value::from_raw of invalid type {} ({})", typ.name(), typ.kind());
        }
        Value {
            typ: Some(typ.clone()),
            addr,
            backing: Backing::Foreign,
        }
    }

    /// False only for the zero Value.
    pub fn is_valid(&self) -> bool {
        self.typ.is_some()
    }

    /// Bound type.
    pub fn type_of(&self) -> &Arc<Type> {
        self.typ_for("Value::type_of")
    }

    /// Kind of the bound type.
    pub fn kind(&self) -> Kind {
        self.typ_for("Value::kind").kind()
    }

    /// Raw address of the data, for marshaling code.
    pub fn unsafe_addr(&self) -> usize {
        self.typ_for("Value::unsafe_addr");
        self.addr as usize
    }

    /// Pointer value addressing `self`.
    ///
    /// The address word lives in a fresh pointer-sized slot that keeps this
    /// value's storage alive, so `v.addr().elem()` aliases `v`.
    ///
    /// Returns the zero Value if no pointer type can be built.
    pub fn addr(&self) -> Value {
        let typ = self.typ_for("Value::addr");
        let ptr_type = match Type::pointer_to(typ) {
            Ok(t) => t,
            Err(err) => {
                log::warn!("[ffi] Value::addr: {}", err);
                return Value::default();
            }
        };
        let slot = Region::zeroed(PTR_SIZE);
        if let Some(link) = self.link_to() {
            slot.set_link(0, link);
        }
        let v = Value {
            typ: Some(ptr_type),
            addr: slot.base(),
            backing: Backing::Owned(slot),
        };
        v.store_addr("Value::addr", self.addr);
        v
    }

    /// Point `self` at `target`.
    ///
    /// `target` must have exactly the pointee type. Its storage is kept
    /// alive by `self`'s storage until the slot is pointed elsewhere.
    ///
    /// # Panics
    /// If `self` is not a pointer, `target` is the zero Value, or the types
    /// differ.
    pub fn set_pointer(&self, target: &Value) {
        let elem = self.pointee("Value::set_pointer");
        let target_type = target.typ_for("Value::set_pointer");
        if !Arc::ptr_eq(&elem, target_type) && *elem != **target_type {
            panic!(
                "ffi: Value::set_pointer type mismatch ({} is not {})",
                target_type.name(),
                elem.name()
            );
        }
        self.store_addr("Value::set_pointer", target.addr);
        self.relink(target.link_to());
    }

    /// Store a null address into a pointer value.
    pub fn set_nil(&self) {
        self.pointee("Value::set_nil");
        self.store_addr("Value::set_nil", ptr::null_mut());
        self.relink(None);
    }

    /// Store an arbitrary address into a pointer value.
    ///
    /// # Safety
    /// `addr` must be null or point to a live instance of the pointee type
    /// for as long as any value reachable from `self`'s storage may follow
    /// it. On storage allocated by [`Value::new`], exactly the pointee's
    /// bytes at `addr` become reachable through this slot.
    pub unsafe fn set_pointer_raw(&self, addr: usize) {
        let elem = self.pointee("Value::set_pointer_raw");
        self.store_addr("Value::set_pointer_raw", addr as *mut u8);
        self.relink((addr != 0).then(|| Link::Foreign {
            addr,
            len: elem.size(),
        }));
    }

    /// Link that keeps the storage under `self` reachable from a pointer
    /// slot holding its address.
    fn link_to(&self) -> Option<Link> {
        if self.addr.is_null() {
            return None;
        }
        match &self.backing {
            Backing::Owned(region) => Some(Link::Owned(region.clone())),
            Backing::Foreign => Some(Link::Foreign {
                addr: self.addr as usize,
                len: self.typ.as_ref().map_or(0, |t| t.size()),
            }),
            Backing::None => None,
        }
    }

    /// Replace the link recorded for the pointer slot `self` occupies.
    fn relink(&self, link: Option<Link>) {
        if let Backing::Owned(region) = &self.backing {
            let slot = region.slot_offset(self.addr);
            match link {
                Some(link) => region.set_link(slot, link),
                None => region.unlink(slot),
            }
        }
    }

    fn typ_for(&self, method: &'static str) -> &Arc<Type> {
        match &self.typ {
            Some(typ) => typ,
            None => ValueError::new(method, None).raise(),
        }
    }

    /// Panics unless `self` has kind `expected`.
    fn must_be(&self, method: &'static str, expected: Kind) -> &Arc<Type> {
        let typ = self.typ_for(method);
        if typ.kind() != expected {
            ValueError::new(method, Some(typ.kind())).raise();
        }
        typ
    }

    fn pointee(&self, method: &'static str) -> Arc<Type> {
        self.must_be(method, Kind::Pointer).elem().clone()
    }

    /// Address of `len` bytes at `offset` from the data, after checking it
    /// against the backing storage.
    ///
    /// Every read and write goes through here.
    fn span(&self, method: &'static str, offset: usize, len: usize) -> *mut u8 {
        if self.addr.is_null() {
            panic!("ffi: {} through nil pointer", method);
        }
        let start = (self.addr as usize).checked_add(offset).unwrap_or_else(|| {
            panic!("ffi: {} address overflow (offset {})", method, offset)
        });
        if let Backing::Owned(region) = &self.backing {
            if !region.contains(start, len) {
                panic!(
                    "ffi: {} access out of bounds (address {:#x}, len {}, storage {:p}+{})",
                    method,
                    start,
                    len,
                    region.base(),
                    region.len()
                );
            }
        }
        self.addr.wrapping_add(offset)
    }

    fn load<const N: usize>(&self, method: &'static str) -> [u8; N] {
        let src = self.span(method, 0, N);
        let mut bytes = [0u8; N];
        // SAFETY: span() checked [src, src+N) against owned storage; foreign
        // storage is valid for the type's size per the unsafe constructor
        // contract. Raw copies tolerate any alignment and aliasing views.
        unsafe { ptr::copy_nonoverlapping(src, bytes.as_mut_ptr(), N) };
        bytes
    }

    fn store<const N: usize>(&self, method: &'static str, bytes: [u8; N]) {
        let dst = self.span(method, 0, N);
        // SAFETY: as in load().
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), dst, N) };
    }

    fn load_addr(&self, method: &'static str) -> *mut u8 {
        usize::from_ne_bytes(self.load::<{ PTR_SIZE }>(method)) as *mut u8
    }

    fn store_addr(&self, method: &'static str, addr: *mut u8) {
        self.store::<{ PTR_SIZE }>(method, (addr as usize).to_ne_bytes());
    }

    /// View of `typ` at `offset` bytes into this value, sharing its storage.
    ///
    /// Pure address arithmetic; the result is validated when accessed.
    fn derive(&self, method: &'static str, typ: &Arc<Type>, offset: usize) -> Value {
        if self.addr.is_null() {
            panic!("ffi: {} through nil pointer", method);
        }
        Value {
            typ: Some(typ.clone()),
            addr: self.addr.wrapping_add(offset),
            backing: self.backing.clone(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(typ) = &self.typ else {
            return f.write_str("Value(<zero>)");
        };
        let backing = match self.backing {
            Backing::Owned(_) => "owned",
            Backing::Foreign => "foreign",
            Backing::None => "none",
        };
        f.debug_struct("Value")
            .field("type", &typ.name())
            .field("kind", &typ.kind())
            .field("addr", &self.addr)
            .field("backing", &backing)
            .finish()
    }
}
