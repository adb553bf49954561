// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime descriptions of foreign types.
//!
//! A [`Type`] is immutable once built and is shared as `Arc<Type>`.
//! Struct layouts are taken as given: offsets come from whoever produced
//! the type (header parser, IDL compiler, hand-written table) and are not
//! recomputed or realigned here.

use crate::error::{Result, TypeError, ValueError};
use crate::kind::{Kind, PTR_SIZE};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Struct member: name, type and byte offset from the start of the struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub typ: Arc<Type>,
    pub offset: usize,
}

impl Field {
    pub fn new(name: impl Into<String>, typ: Arc<Type>, offset: usize) -> Self {
        Self {
            name: name.into(),
            typ,
            offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Layout {
    Scalar(Kind),
    Pointer(Arc<Type>),
    Array { elem: Arc<Type>, len: usize },
    Struct(Vec<Field>),
    /// Reserved placeholder; cannot be instantiated or pointed to.
    Function,
}

/// Shape and size of a foreign datum.
pub struct Type {
    name: String,
    size: usize,
    layout: Layout,
    /// Last pointer type built for this type (see [`Type::pointer_to`]).
    ptr_to: Mutex<Weak<Type>>,
}

macro_rules! predefined {
    ($($fn_name:ident => $kind:ident),* $(,)?) => {
        $(
            #[doc = concat!("Shared `", stringify!($fn_name), "` type.")]
            pub fn $fn_name() -> Arc<Type> {
                static CELL: OnceLock<Arc<Type>> = OnceLock::new();
                CELL.get_or_init(|| Type::build(Kind::$kind.name(), Layout::Scalar(Kind::$kind)))
                    .clone()
            }
        )*
    };
}

impl Type {
    fn build(name: impl Into<String>, layout: Layout) -> Arc<Type> {
        let size = match &layout {
            Layout::Scalar(kind) => kind.intrinsic_size().unwrap_or(0),
            Layout::Pointer(_) => PTR_SIZE,
            Layout::Array { elem, len } => elem.size * len,
            Layout::Struct(_) | Layout::Function => 0,
        };
        Self::build_sized(name, size, layout)
    }

    fn build_sized(name: impl Into<String>, size: usize, layout: Layout) -> Arc<Type> {
        Arc::new(Type {
            name: name.into(),
            size,
            layout,
            ptr_to: Mutex::new(Weak::new()),
        })
    }

    predefined! {
        int8 => Int8,
        int16 => Int16,
        int32 => Int32,
        int64 => Int64,
        uint8 => Uint8,
        uint16 => Uint16,
        uint32 => Uint32,
        uint64 => Uint64,
        float => Float,
        double => Double,
    }

    /// Shared scalar type for `kind`.
    ///
    /// # Panics
    /// If `kind` is not an integer or floating-point kind.
    pub fn scalar(kind: Kind) -> Arc<Type> {
        match kind {
            Kind::Int8 => Self::int8(),
            Kind::Int16 => Self::int16(),
            Kind::Int32 => Self::int32(),
            Kind::Int64 => Self::int64(),
            Kind::Uint8 => Self::uint8(),
            Kind::Uint16 => Self::uint16(),
            Kind::Uint32 => Self::uint32(),
            Kind::Uint64 => Self::uint64(),
            Kind::Float => Self::float(),
            Kind::Double => Self::double(),
            other => ValueError::new("Type::scalar", Some(other)).raise(),
        }
    }

    /// Placeholder for the reserved `Function` kind.
    ///
    /// Such a type is never valid: no value can be allocated for it and no
    /// pointer type can be built from it.
    pub fn function(name: impl Into<String>) -> Arc<Type> {
        Self::build(name, Layout::Function)
    }

    /// Fixed-length array of `len` elements of `elem`.
    pub fn array(elem: &Arc<Type>, len: usize) -> Result<Arc<Type>> {
        elem.check_element()?;
        let size = elem
            .size
            .checked_mul(len)
            .ok_or_else(|| TypeError::InvalidElement {
                reason: format!("[{}]{} overflows the address space", len, elem.name),
            })?;
        Ok(Self::build_sized(
            format!("[{}]{}", len, elem.name),
            size,
            Layout::Array {
                elem: elem.clone(),
                len,
            },
        ))
    }

    /// Struct of `size` bytes with fields at producer-supplied offsets.
    ///
    /// Fields are kept in declaration order. Each field must fit inside
    /// `size`; overlap and alignment are not checked.
    pub fn structure(
        name: impl Into<String>,
        size: usize,
        fields: Vec<Field>,
    ) -> Result<Arc<Type>> {
        let name = name.into();
        for field in &fields {
            field.typ.check_element()?;
            let fits = matches!(field.offset.checked_add(field.typ.size), Some(end) if end <= size);
            if !fits {
                return Err(TypeError::FieldOutOfBounds {
                    name: format!("{}.{}", name, field.name),
                    offset: field.offset,
                    size: field.typ.size,
                    struct_size: size,
                });
            }
        }
        Ok(Self::build_sized(name, size, Layout::Struct(fields)))
    }

    /// Pointer to `elem`.
    ///
    /// Repeated requests return the same `Arc` for as long as someone holds
    /// it. Fails only when `elem` cannot be pointed to.
    pub fn pointer_to(elem: &Arc<Type>) -> Result<Arc<Type>> {
        elem.check_element()?;
        let mut cached = elem.ptr_to.lock();
        if let Some(ptr) = cached.upgrade() {
            log::trace!("[ffi] pointer type cache hit for {}", elem.name);
            return Ok(ptr);
        }
        let ptr = Self::build(
            format!("*{}", elem.name),
            Layout::Pointer(elem.clone()),
        );
        *cached = Arc::downgrade(&ptr);
        log::debug!("[ffi] built pointer type {}", ptr.name);
        Ok(ptr)
    }

    fn check_element(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(TypeError::InvalidElement {
                reason: format!("{} ({}) cannot be instantiated", self.name, self.kind()),
            })
        }
    }

    /// Whether values of this type can exist.
    ///
    /// Every constructor already enforces the size invariant, so the only
    /// invalid types are `Function` placeholders.
    pub fn is_valid(&self) -> bool {
        !matches!(self.layout, Layout::Function)
    }

    pub fn kind(&self) -> Kind {
        match &self.layout {
            Layout::Scalar(kind) => *kind,
            Layout::Pointer(_) => Kind::Pointer,
            Layout::Array { .. } => Kind::Array,
            Layout::Struct(_) => Kind::Struct,
            Layout::Function => Kind::Function,
        }
    }

    /// Byte width of one instance.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element count. Array only.
    pub fn len(&self) -> usize {
        match &self.layout {
            Layout::Array { len, .. } => *len,
            _ => ValueError::new("Type::len", Some(self.kind())).raise(),
        }
    }

    /// Pointee (Pointer) or element (Array) type.
    pub fn elem(&self) -> &Arc<Type> {
        match &self.layout {
            Layout::Pointer(elem) | Layout::Array { elem, .. } => elem,
            _ => ValueError::new("Type::elem", Some(self.kind())).raise(),
        }
    }

    /// Fields in declaration order. Struct only.
    pub fn fields(&self) -> &[Field] {
        match &self.layout {
            Layout::Struct(fields) => fields,
            _ => ValueError::new("Type::fields", Some(self.kind())).raise(),
        }
    }

    pub fn num_field(&self) -> usize {
        match &self.layout {
            Layout::Struct(fields) => fields.len(),
            _ => ValueError::new("Type::num_field", Some(self.kind())).raise(),
        }
    }

    /// The `i`th field.
    ///
    /// # Panics
    /// If this is not a struct or `i >= num_field()`.
    pub fn field(&self, i: usize) -> &Field {
        let fields = match &self.layout {
            Layout::Struct(fields) => fields,
            _ => ValueError::new("Type::field", Some(self.kind())).raise(),
        };
        match fields.get(i) {
            Some(field) => field,
            None => panic!(
                "ffi: Type::field index out of range (index {}, num_field {})",
                i,
                fields.len()
            ),
        }
    }

    /// First field named `name`, with its index.
    pub fn field_by_name(&self, name: &str) -> Option<(usize, &Field)> {
        match &self.layout {
            Layout::Struct(fields) => fields.iter().enumerate().find(|(_, f)| f.name == name),
            _ => ValueError::new("Type::field_by_name", Some(self.kind())).raise(),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.size == other.size && self.layout == other.layout
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("size", &self.size)
            .field("layout", &self.layout)
            .finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
