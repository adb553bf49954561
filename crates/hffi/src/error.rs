// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the type model and value layer.
//!
//! Two classes are kept apart:
//!
//! - [`TypeError`] is recoverable and travels in a `Result`.
//! - [`ValueError`] describes a programming error (wrong kind, zero Value,
//!   bad index). It is never returned: the operation panics with its
//!   `Display` text so the method and the actual kind show up in the
//!   panic message.

use crate::kind::Kind;
use std::fmt;

/// Errors reported while constructing types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Element/pointee type does not satisfy the type invariants.
    InvalidElement { reason: String },
    /// Struct field extends past the declared struct size.
    FieldOutOfBounds {
        name: String,
        offset: usize,
        size: usize,
        struct_size: usize,
    },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidElement { reason } => write!(f, "ffi: invalid element type: {}", reason),
            Self::FieldOutOfBounds {
                name,
                offset,
                size,
                struct_size,
            } => write!(
                f,
                "ffi: field {} at offset {} (size {}) exceeds struct size {}",
                name, offset, size, struct_size
            ),
        }
    }
}

impl std::error::Error for TypeError {}

/// Result alias for type construction.
pub type Result<T> = std::result::Result<T, TypeError>;

/// A method was invoked on a Value (or Type) that does not support it.
///
/// `kind` is `None` when the receiver is the zero Value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueError {
    pub method: &'static str,
    pub kind: Option<Kind>,
}

impl ValueError {
    pub fn new(method: &'static str, kind: Option<Kind>) -> Self {
        Self { method, kind }
    }

    /// Abort the current operation with this error as the panic message.
    #[cold]
    #[track_caller]
    pub fn raise(self) -> ! {
        panic!("{}", self)
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "ffi: call of {} on {} Value", self.method, kind),
            None => write!(f, "ffi: call of {} on zero Value", self.method),
        }
    }
}

impl std::error::Error for ValueError {}
