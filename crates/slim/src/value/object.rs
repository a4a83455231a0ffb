// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identity-bearing heap objects.

use super::array::ArrayValue;
use super::custom::CustomObject;
use super::{check_field_value, field_slot, Value};
use crate::error::{Error, Result};
use crate::types::{catalog, SlimType, TypeShape};
use parking_lot::{RwLock, RwLockReadGuard};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Body of a heap object.
#[derive(Debug)]
pub(crate) enum ObjectBody {
    /// Plain `object` instance.
    Empty,
    /// Class fields in declaration order.
    Fields(Vec<Value>),
    Array(ArrayValue),
    Custom(Box<dyn CustomObject>),
    /// Allocated during decode, body not read yet.
    Pending,
}

struct ObjectCell {
    ty: SlimType,
    body: RwLock<ObjectBody>,
}

/// Shared reference to a heap object.
///
/// Equality and hashing use identity: two distinct objects with equal
/// contents are not equal.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectCell>);

impl ObjectRef {
    /// New instance of a class (fields at their defaults) or of `object`.
    ///
    /// Arrays are created with [`ObjectRef::from_array`], custom-contract
    /// objects with [`ObjectRef::new_custom`].
    pub fn new(ty: &SlimType) -> Result<Self> {
        let body = match ty.shape() {
            TypeShape::Object => ObjectBody::Empty,
            TypeShape::Class(_) => ObjectBody::Fields(default_fields(ty)?),
            _ => return Err(Error::mismatch("class or object type", ty.name())),
        };
        Ok(Self::with_body(ty.clone(), body))
    }

    /// New plain `object` instance.
    pub fn plain() -> Self {
        Self::with_body(catalog().object().clone(), ObjectBody::Empty)
    }

    pub fn from_array(array: ArrayValue) -> Self {
        let ty = array.ty().clone();
        Self::with_body(ty, ObjectBody::Array(array))
    }

    /// Wrap a custom-contract implementation as an instance of `ty`.
    pub fn new_custom<T: CustomObject>(ty: &SlimType, value: T) -> Result<Self> {
        if !matches!(ty.shape(), TypeShape::Custom(_)) {
            return Err(Error::mismatch("custom type", ty.name()));
        }
        Ok(Self::with_body(
            ty.clone(),
            ObjectBody::Custom(Box::new(value)),
        ))
    }

    pub(crate) fn pending(ty: SlimType) -> Self {
        Self::with_body(ty, ObjectBody::Pending)
    }

    pub(crate) fn with_body(ty: SlimType, body: ObjectBody) -> Self {
        Self(Arc::new(ObjectCell {
            ty,
            body: RwLock::new(body),
        }))
    }

    pub fn ty(&self) -> &SlimType {
        &self.0.ty
    }

    /// Address-based identity key.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// `true` until a custom-contract object has been rebuilt by its factory.
    pub fn is_pending(&self) -> bool {
        matches!(*self.0.body.read(), ObjectBody::Pending)
    }

    /// Read a class field.
    pub fn get(&self, name: &str) -> Result<Value> {
        let (index, _) = field_slot(self.ty(), name)?;
        self.get_index(index).ok_or_else(|| Error::FieldNotFound {
            type_name: self.ty().name().to_string(),
            field: name.to_string(),
        })
    }

    /// Class field by declaration index.
    pub fn get_index(&self, index: usize) -> Option<Value> {
        match &*self.0.body.read() {
            ObjectBody::Fields(values) => values.get(index).cloned(),
            _ => None,
        }
    }

    /// Assign a writable class field.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (index, field) = field_slot(self.ty(), name)?;
        if field.read_only {
            return Err(Error::ReadOnlyField {
                type_name: self.ty().name().to_string(),
                field: name.to_string(),
            });
        }
        let value = value.into();
        check_field_value(field, &value)?;
        self.store_field(index, value)
    }

    /// Assign any class field, read-only ones included (construction path).
    pub fn init(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (index, field) = field_slot(self.ty(), name)?;
        let value = value.into();
        check_field_value(field, &value)?;
        self.store_field(index, value)
    }

    pub(crate) fn store_field(&self, index: usize, value: Value) -> Result<()> {
        match &mut *self.0.body.write() {
            ObjectBody::Fields(values) if index < values.len() => {
                values[index] = value;
                Ok(())
            }
            _ => Err(Error::IndexOutOfBounds(format!(
                "field #{} of `{}`",
                index,
                self.ty().name()
            ))),
        }
    }

    /// Number of class fields (0 for other shapes).
    pub fn field_count(&self) -> usize {
        match &*self.0.body.read() {
            ObjectBody::Fields(values) => values.len(),
            _ => 0,
        }
    }

    pub fn with_array<R>(&self, f: impl FnOnce(&ArrayValue) -> R) -> Result<R> {
        match &*self.0.body.read() {
            ObjectBody::Array(array) => Ok(f(array)),
            _ => Err(Error::mismatch("array", self.ty().name())),
        }
    }

    pub fn with_array_mut<R>(&self, f: impl FnOnce(&mut ArrayValue) -> R) -> Result<R> {
        match &mut *self.0.body.write() {
            ObjectBody::Array(array) => Ok(f(array)),
            _ => Err(Error::mismatch("array", self.ty().name())),
        }
    }

    /// Element at `indices` (one per dimension, within declared bounds).
    pub fn array_get(&self, indices: &[i64]) -> Result<Value> {
        self.with_array(|array| array.get(indices))?
    }

    pub fn array_set(&self, indices: &[i64], value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.with_array_mut(|array| array.set(indices, value))?
    }

    /// Run `f` on the custom-contract implementation, if it is a `T`.
    pub fn with_custom<T: CustomObject, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        match &*self.0.body.read() {
            ObjectBody::Custom(custom) => custom.as_any().downcast_ref::<T>().map(f),
            _ => None,
        }
    }

    pub(crate) fn body(&self) -> RwLockReadGuard<'_, ObjectBody> {
        self.0.body.read()
    }

    pub(crate) fn replace_body(&self, body: ObjectBody) {
        *self.0.body.write() = body;
    }
}

/// Defaults of every class field, resolving declared types through the catalog.
pub(crate) fn default_fields(ty: &SlimType) -> Result<Vec<Value>> {
    let fields = ty.fields().unwrap_or(&[]);
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        let field_ty = catalog().resolve(&field.type_name)?;
        values.push(Value::default_for(&field_ty)?);
    }
    Ok(values)
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    // Shallow: cyclic graphs must not recurse.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({} @ {:#x})", self.ty().name(), self.identity())
    }
}
