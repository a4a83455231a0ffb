// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic values making up a serializable object graph.
//!
//! Value types ([`Value::Struct`], [`Value::Enum`], primitives) are copied
//! inline. Heap objects ([`ObjectRef`]) carry identity: cloning an
//! `ObjectRef` shares the object, so graphs may contain shared references
//! and cycles.
//!
//! # Example
//!
//! ```rust
//! use slim::types::ClassBuilder;
//! use slim::{ObjectRef, Value};
//!
//! let person = ClassBuilder::new("docs.value.Person")
//!     .field("name", "string")
//!     .field("age", "int")
//!     .register()
//!     .unwrap();
//!
//! let alice = ObjectRef::new(&person).unwrap();
//! alice.set("name", "Alice").unwrap();
//! alice.set("age", 31i32).unwrap();
//! assert_eq!(alice.get("age").unwrap(), Value::I32(31));
//! assert!(alice.set("age", "old").is_err());
//! ```

mod array;
mod custom;
mod object;

pub use array::{ArrayValue, Dimension};
pub use custom::{CustomObject, SerializationEntry, SerializationInfo};
pub use object::ObjectRef;

pub(crate) use array::checked_element_count;
pub(crate) use object::ObjectBody;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Error, Result};
use crate::types::{
    catalog, FieldDescriptor, NativeRefKind, PrimitiveKind, SlimType, TypeShape,
};
use std::fmt;
use std::sync::Arc;

/// Four-part version number (format-native reference type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Version {
    pub major: i32,
    pub minor: i32,
    pub build: i32,
    pub revision: i32,
}

impl Version {
    pub const fn new(major: i32, minor: i32, build: i32, revision: i32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Enumeration value: its type plus the raw integer.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    ty: SlimType,
    value: i64,
}

impl EnumValue {
    /// Fails unless `ty` is an enum and `value` fits its underlying width.
    pub fn new(ty: &SlimType, value: i64) -> Result<Self> {
        let shape = ty
            .enum_shape()
            .ok_or_else(|| Error::mismatch("enum type", ty.name()))?;
        if !fits_integer(shape.underlying, value) {
            return Err(Error::mismatch(
                shape.underlying.name(),
                format!("{} ({})", ty.name(), value),
            ));
        }
        Ok(Self {
            ty: ty.clone(),
            value,
        })
    }

    /// Value of the named variant.
    pub fn named(ty: &SlimType, variant: &str) -> Result<Self> {
        let value = ty
            .enum_shape()
            .and_then(|shape| shape.value_of(variant))
            .ok_or_else(|| Error::FieldNotFound {
                type_name: ty.name().to_string(),
                field: variant.to_string(),
            })?;
        Self::new(ty, value)
    }

    pub(crate) fn from_raw(ty: SlimType, value: i64) -> Self {
        Self { ty, value }
    }

    pub fn ty(&self) -> &SlimType {
        &self.ty
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn variant_name(&self) -> Option<&str> {
        self.ty.enum_shape()?.variant_name(self.value)
    }
}

/// Struct value: copied inline, no identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    ty: SlimType,
    fields: Vec<Value>,
}

impl StructValue {
    /// Struct of type `ty` with every field at its default.
    pub fn new(ty: &SlimType) -> Result<Self> {
        match Value::default_for(ty)? {
            Value::Struct(value) => Ok(value),
            _ => Err(Error::mismatch("struct type", ty.name())),
        }
    }

    pub(crate) fn from_parts(ty: SlimType, fields: Vec<Value>) -> Self {
        Self { ty, fields }
    }

    pub fn ty(&self) -> &SlimType {
        &self.ty
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        let (index, _) = field_slot(&self.ty, name)?;
        Ok(&self.fields[index])
    }

    /// Assign a writable field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (index, field) = field_slot(&self.ty, name)?;
        if field.read_only {
            return Err(Error::ReadOnlyField {
                type_name: self.ty.name().to_string(),
                field: name.to_string(),
            });
        }
        let value = value.into();
        check_field_value(field, &value)?;
        self.fields[index] = value;
        Ok(())
    }

    /// Assign any field, read-only ones included (construction path).
    pub fn init(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (index, field) = field_slot(&self.ty, name)?;
        let value = value.into();
        check_field_value(field, &value)?;
        self.fields[index] = value;
        Ok(())
    }

    /// Builder form of [`StructValue::init`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.init(name, value)?;
        Ok(self)
    }
}

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Guid([u8; 16]),
    Timestamp(i64),
    Duration(i64),
    String(Arc<str>),
    /// Format-native reference to a type.
    Type(SlimType),
    /// Format-native version number.
    Version(Version),
    Enum(EnumValue),
    Struct(StructValue),
    Object(ObjectRef),
}

impl Value {
    /// Default of a declared type: zero for primitives and enums, a struct
    /// of defaults for structs, null for everything else.
    pub fn default_for(ty: &SlimType) -> Result<Value> {
        default_at_depth(ty, 0)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Primitive kind of a primitive value.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Value::Bool(_) => PrimitiveKind::Bool,
            Value::I8(_) => PrimitiveKind::I8,
            Value::U8(_) => PrimitiveKind::U8,
            Value::I16(_) => PrimitiveKind::I16,
            Value::U16(_) => PrimitiveKind::U16,
            Value::I32(_) => PrimitiveKind::I32,
            Value::U32(_) => PrimitiveKind::U32,
            Value::I64(_) => PrimitiveKind::I64,
            Value::U64(_) => PrimitiveKind::U64,
            Value::F32(_) => PrimitiveKind::F32,
            Value::F64(_) => PrimitiveKind::F64,
            Value::Char(_) => PrimitiveKind::Char,
            Value::Guid(_) => PrimitiveKind::Guid,
            Value::Timestamp(_) => PrimitiveKind::Timestamp,
            Value::Duration(_) => PrimitiveKind::Duration,
            _ => return None,
        })
    }

    /// Type of the value itself; `None` for null.
    pub fn runtime_type(&self) -> Option<SlimType> {
        if let Some(kind) = self.primitive_kind() {
            return Some(catalog().primitive(kind).clone());
        }
        match self {
            Value::String(_) => Some(catalog().string().clone()),
            Value::Type(_) => Some(catalog().native(NativeRefKind::Type).clone()),
            Value::Version(_) => Some(catalog().native(NativeRefKind::Version).clone()),
            Value::Enum(e) => Some(e.ty.clone()),
            Value::Struct(s) => Some(s.ty.clone()),
            Value::Object(o) => Some(o.ty().clone()),
            _ => None,
        }
    }

    /// Short type label for error messages.
    pub fn type_label(&self) -> String {
        match self.runtime_type() {
            Some(ty) => ty.name().to_string(),
            None => "null".to_string(),
        }
    }

    /// Whether the value may be stored in a slot declared as `declared`.
    pub fn is_assignable_to(&self, declared: &SlimType) -> bool {
        match declared.shape() {
            TypeShape::Object => true,
            TypeShape::Primitive(kind) => self.primitive_kind() == Some(*kind),
            TypeShape::String => matches!(self, Value::Null | Value::String(_)),
            TypeShape::Native(NativeRefKind::Type) => matches!(self, Value::Null | Value::Type(_)),
            TypeShape::Native(NativeRefKind::Version) => {
                matches!(self, Value::Null | Value::Version(_))
            }
            TypeShape::Enum(_) => matches!(self, Value::Enum(e) if e.ty == *declared),
            TypeShape::Struct(_) => matches!(self, Value::Struct(s) if s.ty == *declared),
            TypeShape::Class(_) | TypeShape::Array(_) | TypeShape::Custom(_) => match self {
                Value::Null => true,
                Value::Object(o) => o.ty() == declared,
                _ => false,
            },
        }
    }

    pub(crate) fn ensure_assignable(&self, declared: &SlimType) -> Result<()> {
        if self.is_assignable_to(declared) {
            Ok(())
        } else {
            Err(Error::mismatch(declared.name(), self.type_label()))
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer value widened to `i64` (u64 above `i64::MAX` excluded).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(i64::from(*v)),
            Value::U8(v) => Some(i64::from(*v)),
            Value::I16(v) => Some(i64::from(*v)),
            Value::U16(v) => Some(i64::from(*v)),
            Value::I32(v) => Some(i64::from(*v)),
            Value::U32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            Value::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(f64::from(*v)),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }
}

fn default_at_depth(ty: &SlimType, depth: usize) -> Result<Value> {
    match ty.shape() {
        TypeShape::Primitive(kind) => Ok(zero(*kind)),
        TypeShape::Enum(_) => Ok(Value::Enum(EnumValue::from_raw(ty.clone(), 0))),
        TypeShape::Struct(fields) => {
            if depth >= DEFAULT_MAX_DEPTH {
                return Err(Error::InvalidTypeDefinition(format!(
                    "struct `{}` contains itself by value",
                    ty.name()
                )));
            }
            let mut values = Vec::with_capacity(fields.len());
            for field in fields {
                let field_ty = catalog().resolve(&field.type_name)?;
                values.push(default_at_depth(&field_ty, depth + 1)?);
            }
            Ok(Value::Struct(StructValue::from_parts(ty.clone(), values)))
        }
        _ => Ok(Value::Null),
    }
}

pub(crate) fn zero(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::Bool => Value::Bool(false),
        PrimitiveKind::I8 => Value::I8(0),
        PrimitiveKind::U8 => Value::U8(0),
        PrimitiveKind::I16 => Value::I16(0),
        PrimitiveKind::U16 => Value::U16(0),
        PrimitiveKind::I32 => Value::I32(0),
        PrimitiveKind::U32 => Value::U32(0),
        PrimitiveKind::I64 => Value::I64(0),
        PrimitiveKind::U64 => Value::U64(0),
        PrimitiveKind::F32 => Value::F32(0.0),
        PrimitiveKind::F64 => Value::F64(0.0),
        PrimitiveKind::Char => Value::Char('\0'),
        PrimitiveKind::Guid => Value::Guid([0; 16]),
        PrimitiveKind::Timestamp => Value::Timestamp(0),
        PrimitiveKind::Duration => Value::Duration(0),
    }
}

/// Whether `value` fits the enum's underlying integer width.
///
/// `u64` enums store values above `i64::MAX` reinterpreted as negative.
fn fits_integer(kind: PrimitiveKind, value: i64) -> bool {
    match kind {
        PrimitiveKind::I8 => i8::try_from(value).is_ok(),
        PrimitiveKind::U8 => u8::try_from(value).is_ok(),
        PrimitiveKind::I16 => i16::try_from(value).is_ok(),
        PrimitiveKind::U16 => u16::try_from(value).is_ok(),
        PrimitiveKind::I32 => i32::try_from(value).is_ok(),
        PrimitiveKind::U32 => u32::try_from(value).is_ok(),
        PrimitiveKind::I64 | PrimitiveKind::U64 => true,
        _ => false,
    }
}

/// Index and descriptor of a named field.
pub(crate) fn field_slot<'t>(ty: &'t SlimType, name: &str) -> Result<(usize, &'t FieldDescriptor)> {
    ty.fields()
        .and_then(|fields| {
            fields
                .iter()
                .enumerate()
                .find(|(_, f)| &*f.name == name)
        })
        .ok_or_else(|| Error::FieldNotFound {
            type_name: ty.name().to_string(),
            field: name.to_string(),
        })
}

pub(crate) fn check_field_value(field: &FieldDescriptor, value: &Value) -> Result<()> {
    let declared = catalog().resolve(&field.type_name)?;
    value.ensure_assignable(&declared)
}

macro_rules! impl_from_primitive {
    ($($type:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive!(
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    Version => Version,
    SlimType => Type,
    EnumValue => Enum,
    StructValue => Struct,
    ObjectRef => Object,
    Arc<str> => String,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<&ObjectRef> for Value {
    fn from(v: &ObjectRef) -> Self {
        Value::Object(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassBuilder, EnumBuilder, StructBuilder};

    #[test]
    fn test_default_for_struct_nests() {
        StructBuilder::new("tests.value.Inner")
            .field("a", "short")
            .get_or_register()
            .unwrap();
        let outer = StructBuilder::new("tests.value.Outer")
            .field("inner", "tests.value.Inner")
            .field("label", "string")
            .get_or_register()
            .unwrap();
        let value = StructValue::new(&outer).unwrap();
        let inner = value.get("inner").unwrap().as_struct().unwrap();
        assert_eq!(inner.get("a").unwrap(), &Value::I16(0));
        assert!(value.get("label").unwrap().is_null());
    }

    #[test]
    fn test_self_containing_struct_default_fails() {
        let looped = StructBuilder::new("tests.value.Loop")
            .field("me", "tests.value.Loop")
            .get_or_register()
            .unwrap();
        assert!(matches!(
            Value::default_for(&looped),
            Err(Error::InvalidTypeDefinition(_))
        ));
    }

    #[test]
    fn test_assignability() {
        let node = ClassBuilder::new("tests.value.Node")
            .get_or_register()
            .unwrap();
        let other = ClassBuilder::new("tests.value.Other")
            .get_or_register()
            .unwrap();
        let obj = ObjectRef::new(&node).unwrap();

        assert!(Value::from(&obj).is_assignable_to(&node));
        assert!(!Value::from(&obj).is_assignable_to(&other));
        assert!(Value::Null.is_assignable_to(&node));
        assert!(!Value::Null.is_assignable_to(&SlimType::primitive(PrimitiveKind::I32)));
        assert!(Value::I32(3).is_assignable_to(&SlimType::object()));
        assert!(!Value::I64(3).is_assignable_to(&SlimType::primitive(PrimitiveKind::I32)));
        assert!(Value::from("x").is_assignable_to(&SlimType::string()));
    }

    #[test]
    fn test_enum_range_checked() {
        let small = EnumBuilder::new("tests.value.Small")
            .underlying(PrimitiveKind::U8)
            .variant("Max", 255)
            .get_or_register()
            .unwrap();
        assert!(EnumValue::new(&small, 255).is_ok());
        assert!(EnumValue::new(&small, 256).is_err());
        assert!(EnumValue::new(&small, -1).is_err());
        assert_eq!(
            EnumValue::named(&small, "Max").unwrap().variant_name(),
            Some("Max")
        );
    }

    #[test]
    fn test_struct_read_only_field() {
        let stamp = StructBuilder::new("tests.value.Stamp")
            .read_only_field("at", "timestamp")
            .field("note", "string")
            .get_or_register()
            .unwrap();
        let mut value = StructValue::new(&stamp).unwrap();
        assert!(matches!(
            value.set("at", Value::Timestamp(5)),
            Err(Error::ReadOnlyField { .. })
        ));
        value.init("at", Value::Timestamp(5)).unwrap();
        value.set("note", "ok").unwrap();
        assert_eq!(value.get("at").unwrap(), &Value::Timestamp(5));
        assert!(matches!(
            value.get("missing"),
            Err(Error::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3, 4).to_string(), "1.2.3.4");
    }

    #[test]
    fn test_from_conversions() {
        let version = Version::new(4, 0, 1, 0);
        assert_eq!(Value::from(version), Value::Version(version));

        let level = EnumBuilder::new("tests.value.FromLevel")
            .variant("On", 1)
            .get_or_register()
            .unwrap();
        let on = EnumValue::new(&level, 1).unwrap();
        assert_eq!(Value::from(on.clone()), Value::Enum(on));

        let point = StructBuilder::new("tests.value.FromPoint")
            .field("x", "int")
            .get_or_register()
            .unwrap();
        let p = StructValue::new(&point).unwrap().with("x", 2i32).unwrap();
        assert_eq!(Value::from(p.clone()), Value::Struct(p));

        let node = ClassBuilder::new("tests.value.FromNode")
            .get_or_register()
            .unwrap();
        let obj = ObjectRef::new(&node).unwrap();
        assert!(Value::from(obj.clone()).as_object().unwrap().ptr_eq(&obj));
        assert!(Value::from(&obj).as_object().unwrap().ptr_eq(&obj));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("s")).as_str(), Some("s"));
    }
}
