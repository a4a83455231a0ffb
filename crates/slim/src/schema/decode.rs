// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bytes -> graph, the mirror of the encoder.
//!
//! New slots are allocated and registered as soon as they are announced, so
//! a later reference (including one from inside the object's own body)
//! resolves to the same instance. Bodies are read in slot order by
//! [`Decoder::drain`]; construction of custom-contract objects and the
//! deferred hooks run afterwards from the pool's fixup queue.

use super::{field_op, schema_for, ArrayPlan, FieldOp, FieldPlan, SchemaShape, TypeSchema};
use crate::array_codec::ArrayDescriptor;
use crate::error::{Error, Result};
use crate::pool::{MetaTag, ReferencePool};
use crate::registry::TypeRegistry;
use crate::types::{HookStage, NativeRefKind, PrimitiveKind, SlimType, TypeShape};
use crate::value::{
    ArrayValue, EnumValue, ObjectBody, ObjectRef, SerializationEntry, SerializationInfo,
    StructValue, Value, Version,
};
use crate::wire::{HandleToken, SlimReader, WireError};
use std::sync::Arc;

/// Upper bound on up-front element reservation for a decoded array.
const ELEMENT_RESERVE: usize = 4096;

pub(crate) struct Decoder<'a, 'r> {
    reader: &'a mut SlimReader<'r>,
    registry: &'a mut TypeRegistry,
    pool: &'a mut ReferencePool,
    max_depth: usize,
}

impl<'a, 'r> Decoder<'a, 'r> {
    pub(crate) fn new(
        reader: &'a mut SlimReader<'r>,
        registry: &'a mut TypeRegistry,
        pool: &'a mut ReferencePool,
        max_depth: usize,
    ) -> Self {
        Self {
            reader,
            registry,
            pool,
            max_depth,
        }
    }

    fn read_type(&mut self) -> Result<Option<SlimType>> {
        let token = self.reader.read_token()?;
        self.registry.resolve(&token)
    }

    fn read_required_type(&mut self) -> Result<SlimType> {
        self.read_type()?
            .ok_or_else(|| Error::InvalidTypeHandle("null marker where a type is required".into()))
    }

    /// Declared root type, then the root value.
    pub(crate) fn decode_root(&mut self) -> Result<Value> {
        let Some(declared) = self.read_type()? else {
            return Ok(Value::Null);
        };
        let op = field_op(&declared);
        let value = self.decode_op(&op, 0)?;
        value.ensure_assignable(&declared)?;
        Ok(value)
    }

    /// Read the body of every announced slot, including slots announced
    /// while draining.
    pub(crate) fn drain(&mut self) -> Result<()> {
        while let Some((index, object)) = self.pool.next_pending() {
            self.decode_body(&object).map_err(|e| {
                e.in_deserialization(format!("slot {} (`{}`)", index, object.ty().name()))
            })?;
        }
        Ok(())
    }

    /// Run deferred contract construction and hooks.
    pub(crate) fn finish(&mut self) -> Result<()> {
        self.pool.run_fixups()
    }

    fn decode_op(&mut self, op: &FieldOp, depth: usize) -> Result<Value> {
        match op {
            FieldOp::Primitive(kind) => read_primitive(self.reader, *kind),
            FieldOp::String => Ok(self
                .reader
                .read_nullable_str()?
                .map_or(Value::Null, Value::from)),
            FieldOp::Enum { ty, underlying } => {
                let raw = read_integer(self.reader, *underlying)?;
                Ok(Value::Enum(EnumValue::from_raw(ty.clone(), raw)))
            }
            FieldOp::Nested(ty) => {
                let schema = schema_for(ty)?;
                self.decode_inline(&schema, depth + 1)
            }
            FieldOp::Reference => self.decode_meta_handle(depth),
            FieldOp::Skip => Ok(Value::Null),
        }
    }

    fn decode_inline(&mut self, schema: &TypeSchema, depth: usize) -> Result<Value> {
        if depth > self.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.max_depth,
            });
        }
        match schema.shape() {
            SchemaShape::Primitive(kind) => read_primitive(self.reader, *kind),
            SchemaShape::Enum(underlying) => {
                let raw = read_integer(self.reader, *underlying)?;
                Ok(Value::Enum(EnumValue::from_raw(schema.ty().clone(), raw)))
            }
            SchemaShape::Struct(plans) => {
                let fields = self.decode_fields(plans, depth)?;
                Ok(Value::Struct(StructValue::from_parts(
                    schema.ty().clone(),
                    fields,
                )))
            }
            _ => Err(Error::mismatch("value type", schema.ty().name())),
        }
    }

    /// Wire values of every field in declaration order; transient fields get
    /// their defaults.
    fn decode_fields(&mut self, plans: &[FieldPlan], depth: usize) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(plans.len());
        for plan in plans {
            let value = if plan.transient {
                Value::default_for(&plan.ty)?
            } else {
                let value = self.decode_op(&plan.op, depth)?;
                value.ensure_assignable(&plan.ty)?;
                value
            };
            values.push(value);
        }
        Ok(values)
    }

    fn decode_meta_handle(&mut self, depth: usize) -> Result<Value> {
        let offset = self.reader.offset();
        let raw = self.reader.read_u8()?;
        let tag = MetaTag::from_u8(raw).ok_or(WireError::InvalidTag { offset, tag: raw })?;
        match tag {
            MetaTag::Null => Ok(Value::Null),
            MetaTag::Str => Ok(Value::from(self.reader.read_str()?)),
            MetaTag::Boxed => {
                let ty = self.read_required_type()?;
                if !ty.is_value_type() {
                    return Err(Error::mismatch("boxed value type", ty.name()));
                }
                let schema = schema_for(&ty)?;
                self.decode_inline(&schema, depth + 1)
            }
            MetaTag::Native => {
                let offset = self.reader.offset();
                let code = self.reader.read_u8()?;
                match NativeRefKind::from_code(code) {
                    Some(NativeRefKind::Type) => Ok(Value::Type(self.read_required_type()?)),
                    Some(NativeRefKind::Version) => {
                        let major = self.reader.read_i32()?;
                        let minor = self.reader.read_i32()?;
                        let build = self.reader.read_i32()?;
                        let revision = self.reader.read_i32()?;
                        Ok(Value::Version(Version::new(major, minor, build, revision)))
                    }
                    None => Err(WireError::InvalidTag { offset, tag: code }.into()),
                }
            }
            MetaTag::Ref => {
                let index = self.reader.read_varint_u32()?;
                Ok(Value::Object(self.pool.get(index)?))
            }
            MetaTag::NewRef => {
                let index = self.reader.read_varint_u32()?;
                let expected = self.pool.next_index();
                if index != expected {
                    return Err(Error::PoolOutOfOrder {
                        expected,
                        found: index,
                    });
                }
                let object = self.allocate_slot()?;
                self.pool.register(index, object.clone())?;
                Ok(Value::Object(object))
            }
        }
    }

    /// Allocate the object announced by a new slot from its type payload.
    fn allocate_slot(&mut self) -> Result<ObjectRef> {
        let token = self.reader.read_token()?;
        if let HandleToken::Name(text) = &token {
            if text.contains('|') {
                return self.allocate_array(text);
            }
        }
        let ty = self
            .registry
            .resolve(&token)?
            .ok_or_else(|| Error::InvalidTypeHandle("null marker for a new slot".into()))?;
        match ty.shape() {
            TypeShape::Object => Ok(ObjectRef::with_body(ty, ObjectBody::Empty)),
            TypeShape::Class(_) => {
                let defaults = schema_for(&ty)?.defaults().to_vec();
                Ok(ObjectRef::with_body(ty, ObjectBody::Fields(defaults)))
            }
            TypeShape::Custom(_) => Ok(ObjectRef::pending(ty)),
            TypeShape::Array(_) => Err(Error::InvalidArrayDescriptor(format!(
                "array `{}` announced without bounds",
                ty.name()
            ))),
            _ => Err(Error::mismatch("pooled type", ty.name())),
        }
    }

    fn allocate_array(&mut self, text: &str) -> Result<ObjectRef> {
        let descriptor = ArrayDescriptor::parse(text)?;
        let ty = self
            .registry
            .resolve(&descriptor.type_token)?
            .ok_or_else(|| Error::InvalidArrayDescriptor(text.to_string()))?;
        descriptor.check_type(&ty)?;
        let array = ArrayValue::unfilled(&ty, descriptor.dims)?;
        Ok(ObjectRef::from_array(array))
    }

    fn decode_body(&mut self, object: &ObjectRef) -> Result<()> {
        let schema = schema_for(object.ty())?;
        schema.hooks().run(HookStage::BeforeDeserialize, object)?;

        match schema.shape() {
            SchemaShape::Object => {}
            SchemaShape::Class(plans) => self.decode_class(object, plans)?,
            SchemaShape::Array(plan) => self.decode_array(object, plan)?,
            SchemaShape::Custom(factory) => {
                let info = self.decode_entries(object.ty())?;
                self.pool
                    .fixups_mut()
                    .push_contract(object.clone(), info, *factory);
            }
            _ => return Err(Error::mismatch("pooled type", schema.ty().name())),
        }

        for stage in [HookStage::AfterDeserialize, HookStage::Deserialized] {
            if let Some(hook) = schema.hooks().get(stage) {
                self.pool
                    .fixups_mut()
                    .push_hook(stage, object.clone(), Arc::clone(hook));
            }
        }
        Ok(())
    }

    /// The slot starts at its defaults; writable fields are stored before
    /// read-only ones.
    fn decode_class(&mut self, object: &ObjectRef, plans: &[FieldPlan]) -> Result<()> {
        let decoded = self.decode_fields(plans, 0)?;
        let mut read_only = Vec::new();
        for (index, (plan, value)) in plans.iter().zip(decoded).enumerate() {
            if plan.transient {
                continue;
            }
            if plan.read_only {
                read_only.push((index, value));
            } else {
                object.store_field(index, value)?;
            }
        }
        for (index, value) in read_only {
            object.store_field(index, value)?;
        }
        Ok(())
    }

    fn decode_array(&mut self, object: &ObjectRef, plan: &ArrayPlan) -> Result<()> {
        let count = object.with_array(ArrayValue::element_count)?;
        if plan.raw_bytes {
            let bytes = self.reader.read_bytes(count)?;
            return object.with_array_mut(|array| array.fill_bytes(bytes))?;
        }
        let mut values = Vec::with_capacity(count.min(ELEMENT_RESERVE));
        for _ in 0..count {
            let value = self.decode_op(&plan.op, 0)?;
            value.ensure_assignable(&plan.element)?;
            values.push(value);
        }
        object.with_array_mut(|array| array.fill_values(values))?
    }

    fn decode_entries(&mut self, ty: &SlimType) -> Result<SerializationInfo> {
        let count = self.reader.read_varint_u32()?;
        let mut info = SerializationInfo::new(ty);
        for _ in 0..count {
            let name = self.reader.read_str()?;
            let declared = self.read_required_type()?;
            let op = field_op(&declared);
            let value = self.decode_op(&op, 0)?;
            value.ensure_assignable(&declared)?;
            info.push(SerializationEntry {
                name: Arc::from(name),
                declared,
                value,
            })?;
        }
        Ok(info)
    }
}

/// Fixed-width primitive payload.
pub(crate) fn read_primitive(r: &mut SlimReader<'_>, kind: PrimitiveKind) -> Result<Value> {
    let value = match kind {
        PrimitiveKind::Bool => Value::Bool(r.read_bool()?),
        PrimitiveKind::I8 => Value::I8(r.read_i8()?),
        PrimitiveKind::U8 => Value::U8(r.read_u8()?),
        PrimitiveKind::I16 => Value::I16(r.read_i16()?),
        PrimitiveKind::U16 => Value::U16(r.read_u16()?),
        PrimitiveKind::I32 => Value::I32(r.read_i32()?),
        PrimitiveKind::U32 => Value::U32(r.read_u32()?),
        PrimitiveKind::I64 => Value::I64(r.read_i64()?),
        PrimitiveKind::U64 => Value::U64(r.read_u64()?),
        PrimitiveKind::F32 => Value::F32(r.read_f32()?),
        PrimitiveKind::F64 => Value::F64(r.read_f64()?),
        PrimitiveKind::Char => Value::Char(r.read_char()?),
        PrimitiveKind::Guid => Value::Guid(r.read_array::<16>()?),
        PrimitiveKind::Timestamp => Value::Timestamp(r.read_i64()?),
        PrimitiveKind::Duration => Value::Duration(r.read_i64()?),
    };
    Ok(value)
}

/// Enum payload in its underlying integer width, widened to `i64`.
pub(crate) fn read_integer(r: &mut SlimReader<'_>, kind: PrimitiveKind) -> Result<i64> {
    let value = match kind {
        PrimitiveKind::I8 => i64::from(r.read_i8()?),
        PrimitiveKind::U8 => i64::from(r.read_u8()?),
        PrimitiveKind::I16 => i64::from(r.read_i16()?),
        PrimitiveKind::U16 => i64::from(r.read_u16()?),
        PrimitiveKind::I32 => i64::from(r.read_i32()?),
        PrimitiveKind::U32 => i64::from(r.read_u32()?),
        PrimitiveKind::I64 => r.read_i64()?,
        PrimitiveKind::U64 => r.read_u64()? as i64,
        other => return Err(Error::mismatch("integer kind", other.name())),
    };
    Ok(value)
}
