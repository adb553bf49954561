// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reference-counted backing storage for allocated values.
//!
//! A region is a zeroed heap block that is only ever touched through raw
//! pointers, so any number of `Value`s may alias it without creating
//! overlapping Rust references. Each pointer slot inside a region may
//! carry one [`Link`], keyed by the slot's byte offset: either another
//! region it keeps alive, or a foreign extent vouched for by an unsafe
//! entry point. Following a pointer is only allowed into storage reachable
//! through those links, so a word forged through a byte view leads
//! nowhere.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ptr::{self, NonNull};
use std::rc::Rc;

/// What a pointer slot refers to.
pub(crate) enum Link {
    /// Storage allocated by this crate.
    Owned(Rc<Region>),
    /// Caller-managed bytes `[addr, addr + len)`.
    Foreign { addr: usize, len: usize },
}

/// Where a followed address landed.
pub(crate) enum Target {
    Owned(Rc<Region>),
    Foreign,
}

pub(crate) struct Region {
    base: NonNull<u8>,
    len: usize,
    links: RefCell<BTreeMap<usize, Link>>,
}

/// Whether `[addr, addr + len)` lies inside `[start, start + extent)`.
fn within(start: usize, extent: usize, addr: usize, len: usize) -> bool {
    match (addr.checked_sub(start), addr.checked_add(len)) {
        (Some(rel), Some(_)) => rel <= extent && len <= extent - rel,
        _ => false,
    }
}

impl Region {
    /// Allocate `len` zeroed bytes.
    pub(crate) fn zeroed(len: usize) -> Rc<Region> {
        let block: Box<[u8]> = vec![0u8; len].into_boxed_slice();
        let raw = Box::into_raw(block);
        // SAFETY: Box::into_raw never returns null (empty boxes yield a
        // dangling, non-null pointer).
        let base = unsafe { NonNull::new_unchecked(raw.cast::<u8>()) };
        Rc::new(Region {
            base,
            len,
            links: RefCell::new(BTreeMap::new()),
        })
    }

    pub(crate) fn base(&self) -> *mut u8 {
        self.base.as_ptr()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Whether `[addr, addr + len)` lies inside this region.
    pub(crate) fn contains(&self, addr: usize, len: usize) -> bool {
        within(self.base.as_ptr() as usize, self.len, addr, len)
    }

    /// Byte offset of `addr` from the start of this region.
    pub(crate) fn slot_offset(&self, addr: *mut u8) -> usize {
        addr as usize - self.base.as_ptr() as usize
    }

    /// Record what the pointer slot at `slot` refers to, replacing (and
    /// releasing) whatever it referred to before.
    pub(crate) fn set_link(&self, slot: usize, link: Link) {
        if let Link::Owned(other) = &link {
            if ptr::eq(Rc::as_ptr(other), self) {
                self.unlink(slot);
                return;
            }
        }
        let old = self.links.borrow_mut().insert(slot, link);
        drop(old);
    }

    /// Forget the link of the pointer slot at `slot`.
    pub(crate) fn unlink(&self, slot: usize) {
        let old = self.links.borrow_mut().remove(&slot);
        drop(old);
    }

    /// Storage reachable from `self` that holds `len` bytes at `addr`.
    ///
    /// Regions match on the start address alone since every access to them
    /// is bounds-checked again; foreign extents must hold the whole range.
    pub(crate) fn resolve(self: &Rc<Self>, addr: usize, len: usize) -> Option<Target> {
        let mut stack = vec![self.clone()];
        let mut seen: Vec<*const Region> = Vec::new();
        while let Some(region) = stack.pop() {
            let id = Rc::as_ptr(&region);
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            // An empty range at the end of a region still belongs to it.
            if region.contains(addr, 0) {
                return Some(Target::Owned(region));
            }
            for link in region.links.borrow().values() {
                match link {
                    Link::Owned(next) => stack.push(next.clone()),
                    Link::Foreign {
                        addr: start,
                        len: extent,
                    } => {
                        if within(*start, *extent, addr, len) {
                            return Some(Target::Foreign);
                        }
                    }
                }
            }
        }
        None
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        // SAFETY: base/len describe the boxed slice leaked in `zeroed`,
        // and this is the only place it is reclaimed.
        unsafe {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                self.base.as_ptr(),
                self.len,
            )));
        }
    }
}
