// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Kind tags for foreign types.
//!
//! A [`Kind`] is the closed set of shapes the value layer knows how to
//! read and write. Tags fit in [`KIND_BITS`] bits; tag `0` is never used
//! so it can stand for "no kind" (the zero [`Value`](crate::Value)).

use std::fmt;
use std::mem::size_of;

/// Width in bytes of a foreign pointer on this host.
pub const PTR_SIZE: usize = size_of::<usize>();

/// Number of bits needed to encode any [`Kind`] tag.
pub const KIND_BITS: u32 = 5;

/// Mask selecting the kind bits of an encoded tag word.
pub const KIND_MASK: u8 = (1 << KIND_BITS) - 1;

/// Fundamental shape of a foreign datum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    Uint8 = 5,
    Uint16 = 6,
    Uint32 = 7,
    Uint64 = 8,
    /// C `float` (32-bit IEEE 754).
    Float = 9,
    /// C `double` (64-bit IEEE 754).
    Double = 10,
    Pointer = 11,
    Array = 12,
    Struct = 13,
    /// Reserved for method values; no accessor supports it.
    Function = 14,
}

const _: () = assert!((Kind::Function as u8) <= KIND_MASK);

impl Kind {
    /// All kinds, in tag order.
    pub const ALL: [Kind; 14] = [
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Uint8,
        Kind::Uint16,
        Kind::Uint32,
        Kind::Uint64,
        Kind::Float,
        Kind::Double,
        Kind::Pointer,
        Kind::Array,
        Kind::Struct,
        Kind::Function,
    ];

    /// Encoded tag (always within [`KIND_MASK`]).
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Decode a tag produced by [`Kind::bits`].
    ///
    /// Bits above [`KIND_MASK`] are ignored so a kind can be pulled out of a
    /// wider tag word. Returns `None` for the reserved zero tag and for
    /// unassigned tags.
    pub fn from_bits(bits: u8) -> Option<Kind> {
        let tag = bits & KIND_MASK;
        Self::ALL.iter().copied().find(|k| k.bits() == tag)
    }

    /// Human-readable name, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Pointer => "ptr",
            Self::Array => "array",
            Self::Struct => "struct",
            Self::Function => "func",
        }
    }

    /// Intrinsic width in bytes.
    ///
    /// `None` for kinds whose width comes from their composition
    /// (`Array`, `Struct`) and for the reserved `Function` tag.
    pub fn intrinsic_size(self) -> Option<usize> {
        match self {
            Self::Int8 | Self::Uint8 => Some(1),
            Self::Int16 | Self::Uint16 => Some(2),
            Self::Int32 | Self::Uint32 | Self::Float => Some(4),
            Self::Int64 | Self::Uint64 | Self::Double => Some(8),
            Self::Pointer => Some(PTR_SIZE),
            Self::Array | Self::Struct | Self::Function => None,
        }
    }

    /// `Int8` through `Int64`; read with `Value::int`.
    pub fn is_signed_int(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// `Uint8` through `Uint64`; read with `Value::uint`.
    pub fn is_unsigned_int(self) -> bool {
        matches!(
            self,
            Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64
        )
    }

    /// `Float` or `Double`; read with `Value::float`.
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Integer or floating-point kind.
    pub fn is_scalar(self) -> bool {
        self.is_signed_int() || self.is_unsigned_int() || self.is_float()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_fit_in_five_bits() {
        for kind in Kind::ALL {
            assert!(kind.bits() != 0);
            assert_eq!(kind.bits() & !KIND_MASK, 0, "{} overflows", kind);
            assert_eq!(Kind::from_bits(kind.bits()), Some(kind));
        }
        assert_eq!(Kind::from_bits(0), None);
        assert_eq!(Kind::from_bits(31), None);
    }

    #[test]
    fn test_from_bits_ignores_high_bits() {
        let word = (0b101 << KIND_BITS) | Kind::Struct.bits();
        assert_eq!(Kind::from_bits(word), Some(Kind::Struct));
    }

    #[test]
    fn test_intrinsic_size() {
        assert_eq!(Kind::Int8.intrinsic_size(), Some(1));
        assert_eq!(Kind::Uint16.intrinsic_size(), Some(2));
        assert_eq!(Kind::Float.intrinsic_size(), Some(4));
        assert_eq!(Kind::Double.intrinsic_size(), Some(8));
        assert_eq!(Kind::Pointer.intrinsic_size(), Some(PTR_SIZE));
        assert_eq!(Kind::Array.intrinsic_size(), None);
        assert_eq!(Kind::Struct.intrinsic_size(), None);
        assert_eq!(Kind::Function.intrinsic_size(), None);
    }

    #[test]
    fn test_classification() {
        assert!(Kind::Int32.is_signed_int());
        assert!(!Kind::Uint32.is_signed_int());
        assert!(Kind::Uint64.is_unsigned_int());
        assert!(Kind::Float.is_float());
        assert!(!Kind::Pointer.is_scalar());
        assert!(!Kind::Function.is_scalar());
    }

    #[test]
    fn test_display() {
        assert_eq!(Kind::Double.to_string(), "double");
        assert_eq!(format!("{}", Kind::Pointer), "ptr");
    }
}
