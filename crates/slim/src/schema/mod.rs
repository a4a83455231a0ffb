// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled per-type serialization plans.
//!
//! A [`TypeSchema`] is computed once per type and cached process-wide. It
//! resolves every field's declared type up front and picks the encoding
//! operation for the field, so the encoder and decoder never consult the
//! catalog inside a hot loop.
//!
//! # Field operations
//!
//! | Declared type        | Operation                         |
//! |----------------------|-----------------------------------|
//! | primitive            | fixed-width little-endian scalar  |
//! | `string`             | nullable string                   |
//! | enum                 | underlying integer                |
//! | struct               | fields inline, recursively        |
//! | anything else        | MetaHandle                        |
//! | transient field      | skipped, default on decode        |

mod cache;
mod compile;
mod decode;
mod encode;

pub use cache::{schema_cache, LookupStats, SchemaCache};

pub(crate) use compile::field_op;
pub(crate) use decode::Decoder;
pub(crate) use encode::Encoder;

use crate::error::Result;
use crate::types::{CustomFactory, NativeRefKind, PrimitiveKind, SlimType, TypeHooks};
use crate::value::Value;
use std::sync::Arc;

/// How one declared slot is encoded.
#[derive(Debug, Clone)]
pub enum FieldOp {
    Primitive(PrimitiveKind),
    String,
    Enum {
        ty: SlimType,
        underlying: PrimitiveKind,
    },
    /// Struct copied inline.
    Nested(SlimType),
    /// MetaHandle: null, inline string/boxed/native, or pool slot.
    Reference,
    /// Transient field, never on the wire.
    Skip,
}

/// One compiled field.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub name: Arc<str>,
    pub ty: SlimType,
    pub op: FieldOp,
    pub read_only: bool,
    pub transient: bool,
}

/// Compiled array element handling.
#[derive(Debug, Clone)]
pub struct ArrayPlan {
    pub element: SlimType,
    pub rank: usize,
    pub op: FieldOp,
    /// `byte` elements stream as one raw block.
    pub raw_bytes: bool,
}

/// Compiled shape of a type.
#[derive(Debug, Clone)]
pub enum SchemaShape {
    Object,
    Primitive(PrimitiveKind),
    String,
    Native(NativeRefKind),
    /// Enum of the given underlying integer kind.
    Enum(PrimitiveKind),
    Struct(Vec<FieldPlan>),
    Class(Vec<FieldPlan>),
    Array(ArrayPlan),
    Custom(CustomFactory),
}

/// Serialization plan of one type.
#[derive(Debug)]
pub struct TypeSchema {
    ty: SlimType,
    shape: SchemaShape,
    hooks: TypeHooks,
    /// Field defaults of a class, in plan order; empty for other shapes.
    defaults: Vec<Value>,
}

impl TypeSchema {
    pub(crate) fn new(ty: SlimType, shape: SchemaShape) -> Result<Self> {
        let defaults = match &shape {
            SchemaShape::Class(plans) => plans
                .iter()
                .map(|plan| Value::default_for(&plan.ty))
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };
        let hooks = ty.hooks().clone();
        Ok(Self {
            ty,
            shape,
            hooks,
            defaults,
        })
    }

    pub fn ty(&self) -> &SlimType {
        &self.ty
    }

    pub fn shape(&self) -> &SchemaShape {
        &self.shape
    }

    pub fn hooks(&self) -> &TypeHooks {
        &self.hooks
    }

    /// Field plans of a class or struct, in declaration order.
    pub fn fields(&self) -> &[FieldPlan] {
        match &self.shape {
            SchemaShape::Struct(fields) | SchemaShape::Class(fields) => fields,
            _ => &[],
        }
    }

    /// Initial field values of a fresh class instance.
    pub fn defaults(&self) -> &[Value] {
        &self.defaults
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| &*f.name == name)
    }

    /// `true` when some field must be applied after the others on decode.
    pub fn has_read_only(&self) -> bool {
        self.fields().iter().any(|f| f.read_only && !f.transient)
    }
}

/// Cached schema of `ty`, compiled on first request.
pub fn schema_for(ty: &SlimType) -> Result<Arc<TypeSchema>> {
    schema_cache().get_or_compile(ty)
}
