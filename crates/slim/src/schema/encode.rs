// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Graph -> bytes, driven by compiled schemas.
//!
//! The root is written first. Every pooled object met along the way gets a
//! slot and only its type payload at the point of first sighting; bodies
//! are written afterwards in slot order by [`Encoder::drain`], which keeps
//! recursion depth independent of graph depth.

use super::{field_op, schema_for, ArrayPlan, FieldOp, FieldPlan, SchemaShape, TypeSchema};
use crate::array_codec::ArrayDescriptor;
use crate::config::NULL_TYPE_HANDLE;
use crate::error::{Error, Result};
use crate::pool::{MetaHandle, ReferencePool};
use crate::registry::TypeRegistry;
use crate::types::{catalog, HookStage, PrimitiveKind, SlimType};
use crate::value::{ArrayValue, ObjectBody, ObjectRef, SerializationInfo, Value};
use crate::wire::{HandleToken, SlimWriter};
use std::sync::Arc;

pub(crate) struct Encoder<'a> {
    writer: &'a mut SlimWriter,
    registry: &'a mut TypeRegistry,
    pool: &'a mut ReferencePool,
    max_depth: usize,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(
        writer: &'a mut SlimWriter,
        registry: &'a mut TypeRegistry,
        pool: &'a mut ReferencePool,
        max_depth: usize,
    ) -> Self {
        Self {
            writer,
            registry,
            pool,
            max_depth,
        }
    }

    fn write_type(&mut self, ty: &SlimType) {
        let token = self.registry.handle_for(ty);
        self.writer.write_token(&token);
    }

    /// Declared root type token, then the root value.
    ///
    /// Null is the null type marker alone. Heap objects and native
    /// references go through `object` and a MetaHandle; anything else is
    /// written inline under its own runtime type.
    pub(crate) fn encode_root(&mut self, root: &Value) -> Result<()> {
        let declared = match root {
            Value::Null => {
                self.writer.write_token(&HandleToken::Index(NULL_TYPE_HANDLE));
                return Ok(());
            }
            Value::Object(_) | Value::Type(_) | Value::Version(_) => catalog().object().clone(),
            other => other
                .runtime_type()
                .ok_or_else(|| Error::mismatch("typed root", other.type_label()))?,
        };
        self.write_type(&declared);
        let op = field_op(&declared);
        self.encode_op(&op, root, 0)
    }

    /// Write the body of every pooled slot, including slots discovered while
    /// draining.
    pub(crate) fn drain(&mut self) -> Result<()> {
        while let Some((index, object)) = self.pool.next_pending() {
            self.encode_body(&object).map_err(|e| {
                e.in_serialization(format!("slot {} (`{}`)", index, object.ty().name()))
            })?;
        }
        Ok(())
    }

    fn encode_op(&mut self, op: &FieldOp, value: &Value, depth: usize) -> Result<()> {
        match op {
            FieldOp::Primitive(kind) => write_primitive(self.writer, *kind, value),
            FieldOp::String => match value {
                Value::Null => {
                    self.writer.write_nullable_str(None);
                    Ok(())
                }
                Value::String(s) => {
                    self.writer.write_nullable_str(Some(s));
                    Ok(())
                }
                other => Err(Error::mismatch("string", other.type_label())),
            },
            FieldOp::Enum { ty, underlying } => match value {
                Value::Enum(e) if e.ty() == ty => write_integer(self.writer, *underlying, e.value()),
                other => Err(Error::mismatch(ty.name(), other.type_label())),
            },
            FieldOp::Nested(ty) => {
                let schema = schema_for(ty)?;
                self.encode_inline(&schema, value, depth + 1)
            }
            FieldOp::Reference => self.encode_meta_handle(value, depth),
            FieldOp::Skip => Ok(()),
        }
    }

    /// Value-type payload with no framing.
    fn encode_inline(&mut self, schema: &TypeSchema, value: &Value, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.max_depth,
            });
        }
        match schema.shape() {
            SchemaShape::Primitive(kind) => write_primitive(self.writer, *kind, value),
            SchemaShape::Enum(underlying) => match value {
                Value::Enum(e) if e.ty() == schema.ty() => {
                    write_integer(self.writer, *underlying, e.value())
                }
                other => Err(Error::mismatch(schema.ty().name(), other.type_label())),
            },
            SchemaShape::Struct(plans) => match value {
                Value::Struct(s) if s.ty() == schema.ty() => {
                    self.encode_fields(plans, s.fields(), depth)
                }
                other => Err(Error::mismatch(schema.ty().name(), other.type_label())),
            },
            _ => Err(Error::mismatch("value type", schema.ty().name())),
        }
    }

    fn encode_fields(&mut self, plans: &[FieldPlan], values: &[Value], depth: usize) -> Result<()> {
        for (plan, value) in plans.iter().zip(values) {
            if plan.transient {
                continue;
            }
            value.ensure_assignable(&plan.ty).map_err(|e| field_error(plan, e))?;
            self.encode_op(&plan.op, value, depth)
                .map_err(|e| field_error(plan, e))?;
        }
        Ok(())
    }

    fn encode_meta_handle(&mut self, value: &Value, depth: usize) -> Result<()> {
        let handle = self.pool.meta_handle(value);
        self.writer.write_u8(handle.tag().as_u8());
        match handle {
            MetaHandle::Null => Ok(()),
            MetaHandle::Str(s) => {
                self.writer.write_str(s);
                Ok(())
            }
            MetaHandle::Boxed(inner) => {
                let ty = inner
                    .runtime_type()
                    .filter(SlimType::is_value_type)
                    .ok_or_else(|| Error::mismatch("value type", inner.type_label()))?;
                self.write_type(&ty);
                let schema = schema_for(&ty)?;
                self.encode_inline(&schema, inner, depth + 1)
            }
            MetaHandle::Native(kind, inner) => {
                self.writer.write_u8(kind.code());
                match inner {
                    Value::Type(ty) => self.write_type(ty),
                    Value::Version(v) => {
                        self.writer.write_i32(v.major);
                        self.writer.write_i32(v.minor);
                        self.writer.write_i32(v.build);
                        self.writer.write_i32(v.revision);
                    }
                    other => return Err(Error::mismatch(kind.name(), other.type_label())),
                }
                Ok(())
            }
            MetaHandle::Indexed { index, first } => {
                self.writer.write_varint(u64::from(index));
                match (first, value) {
                    (true, Value::Object(object)) => self.write_slot_type(object),
                    _ => Ok(()),
                }
            }
        }
    }

    /// Type payload of a new slot: a type token, or for arrays a descriptor
    /// framed as a name token.
    fn write_slot_type(&mut self, object: &ObjectRef) -> Result<()> {
        let ty = object.ty();
        if !ty.is_array() {
            self.write_type(ty);
            return Ok(());
        }
        let dims = object.with_array(|array| array.dims().to_vec())?;
        let token = self.registry.handle_for(ty);
        let descriptor = ArrayDescriptor::new(token, dims).render();
        self.writer
            .write_token(&HandleToken::Name(Arc::from(descriptor)));
        Ok(())
    }

    fn encode_body(&mut self, object: &ObjectRef) -> Result<()> {
        let schema = schema_for(object.ty())?;
        schema.hooks().run(HookStage::BeforeSerialize, object)?;

        let contract = {
            let body = object.body();
            match (schema.shape(), &*body) {
                (SchemaShape::Object, _) => None,
                (SchemaShape::Class(plans), ObjectBody::Fields(values)) => {
                    self.encode_fields(plans, values, 0)?;
                    None
                }
                (SchemaShape::Array(plan), ObjectBody::Array(array)) => {
                    self.encode_array(plan, array)?;
                    None
                }
                (SchemaShape::Custom(_), ObjectBody::Custom(custom)) => {
                    let mut info = SerializationInfo::new(object.ty());
                    custom.get_object_data(&mut info)?;
                    Some(info)
                }
                (_, ObjectBody::Pending) => {
                    return Err(Error::Contract {
                        type_name: object.ty().name().to_string(),
                        message: "object was never rebuilt from its entries".into(),
                    })
                }
                _ => return Err(Error::mismatch(schema.ty().name(), "foreign object body")),
            }
        };
        if let Some(info) = contract {
            self.encode_entries(&info)?;
        }

        schema.hooks().run(HookStage::AfterSerialize, object)
    }

    fn encode_array(&mut self, plan: &ArrayPlan, array: &ArrayValue) -> Result<()> {
        if let Some(bytes) = array.as_bytes() {
            self.writer.write_bytes(bytes);
            return Ok(());
        }
        for value in array.values().unwrap_or(&[]) {
            value.ensure_assignable(&plan.element)?;
            self.encode_op(&plan.op, value, 0)?;
        }
        Ok(())
    }

    /// Custom-contract entry bag: count, then `(name, declared type, value)`.
    fn encode_entries(&mut self, info: &SerializationInfo) -> Result<()> {
        self.writer.write_varint(info.len() as u64);
        for entry in info.entries() {
            self.writer.write_str(&entry.name);
            self.write_type(&entry.declared);
            entry.value.ensure_assignable(&entry.declared)?;
            let op = field_op(&entry.declared);
            self.encode_op(&op, &entry.value, 0)?;
        }
        Ok(())
    }
}

fn field_error(plan: &FieldPlan, e: Error) -> Error {
    match e {
        Error::TypeMismatch { expected, found } => Error::TypeMismatch {
            expected: format!("{} (field `{}`)", expected, plan.name),
            found,
        },
        other => other,
    }
}

/// Fixed-width primitive payload.
pub(crate) fn write_primitive(w: &mut SlimWriter, kind: PrimitiveKind, value: &Value) -> Result<()> {
    match (kind, value) {
        (PrimitiveKind::Bool, Value::Bool(v)) => w.write_bool(*v),
        (PrimitiveKind::I8, Value::I8(v)) => w.write_i8(*v),
        (PrimitiveKind::U8, Value::U8(v)) => w.write_u8(*v),
        (PrimitiveKind::I16, Value::I16(v)) => w.write_i16(*v),
        (PrimitiveKind::U16, Value::U16(v)) => w.write_u16(*v),
        (PrimitiveKind::I32, Value::I32(v)) => w.write_i32(*v),
        (PrimitiveKind::U32, Value::U32(v)) => w.write_u32(*v),
        (PrimitiveKind::I64, Value::I64(v)) => w.write_i64(*v),
        (PrimitiveKind::U64, Value::U64(v)) => w.write_u64(*v),
        (PrimitiveKind::F32, Value::F32(v)) => w.write_f32(*v),
        (PrimitiveKind::F64, Value::F64(v)) => w.write_f64(*v),
        (PrimitiveKind::Char, Value::Char(v)) => w.write_char(*v),
        (PrimitiveKind::Guid, Value::Guid(v)) => w.write_bytes(v),
        (PrimitiveKind::Timestamp, Value::Timestamp(v)) => w.write_i64(*v),
        (PrimitiveKind::Duration, Value::Duration(v)) => w.write_i64(*v),
        _ => return Err(Error::mismatch(kind.name(), value.type_label())),
    }
    Ok(())
}

/// Enum payload in its underlying integer width.
pub(crate) fn write_integer(w: &mut SlimWriter, kind: PrimitiveKind, value: i64) -> Result<()> {
    match kind {
        PrimitiveKind::I8 => w.write_i8(value as i8),
        PrimitiveKind::U8 => w.write_u8(value as u8),
        PrimitiveKind::I16 => w.write_i16(value as i16),
        PrimitiveKind::U16 => w.write_u16(value as u16),
        PrimitiveKind::I32 => w.write_i32(value as i32),
        PrimitiveKind::U32 => w.write_u32(value as u32),
        PrimitiveKind::I64 => w.write_i64(value),
        PrimitiveKind::U64 => w.write_u64(value as u64),
        other => return Err(Error::mismatch("integer kind", other.name())),
    }
    Ok(())
}
