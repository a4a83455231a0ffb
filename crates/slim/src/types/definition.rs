// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type definitions for runtime type information.

use super::catalog::catalog;
use super::hooks::TypeHooks;
use super::kind::{NativeRefKind, PrimitiveKind};
use crate::error::Result;
use crate::value::{CustomObject, SerializationInfo};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Factory rebuilding a custom-contract object from its entry bag.
pub type CustomFactory = fn(&SerializationInfo) -> Result<Box<dyn CustomObject>>;

/// Field descriptor for class and struct members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: Arc<str>,
    /// Declared type, resolved through the catalog when first needed.
    pub type_name: Arc<str>,
    /// Not assignable through [`crate::ObjectRef::set`].
    pub read_only: bool,
    /// Never written; reset to its default on decode.
    pub transient: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<Arc<str>>, type_name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            read_only: false,
            transient: false,
        }
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    #[must_use]
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

/// Enumeration variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: Arc<str>,
    pub value: i64,
}

/// Enumeration shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumShape {
    /// Integer kind used on the wire.
    pub underlying: PrimitiveKind,
    pub variants: Vec<EnumVariant>,
}

impl EnumShape {
    /// Value of a named variant.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|v| &*v.name == name)
            .map(|v| v.value)
    }

    /// Name of the variant carrying `value`.
    pub fn variant_name(&self, value: i64) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.value == value)
            .map(|v| &*v.name)
    }
}

/// Array shape: element type and rank.
#[derive(Debug, Clone)]
pub struct ArrayShape {
    pub element: SlimType,
    pub rank: usize,
}

/// Type shape enumeration.
#[derive(Debug, Clone)]
pub enum TypeShape {
    /// Plain `object`: identity only, empty body.
    Object,
    Primitive(PrimitiveKind),
    /// Nullable UTF-8 string.
    String,
    /// Inline reference type (`type`, `version`).
    Native(NativeRefKind),
    Enum(EnumShape),
    /// Value type with named fields, copied inline.
    Struct(Vec<FieldDescriptor>),
    /// Reference type with named fields, pooled by identity.
    Class(Vec<FieldDescriptor>),
    Array(ArrayShape),
    /// Reference type exposing `(name, type, value)` entries instead of fields.
    Custom(CustomFactory),
}

/// A complete type definition.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub(crate) name: Arc<str>,
    pub(crate) shape: TypeShape,
    pub(crate) non_serializable: bool,
    pub(crate) hooks: TypeHooks,
}

impl TypeDefinition {
    pub fn new(name: impl Into<Arc<str>>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            shape,
            non_serializable: false,
            hooks: TypeHooks::default(),
        }
    }

    /// Opt the type out of serialization.
    #[must_use]
    pub fn non_serializable(mut self) -> Self {
        self.non_serializable = true;
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: TypeHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    /// Register in the process-wide catalog.
    pub fn register(self) -> Result<SlimType> {
        catalog().register(self)
    }
}

/// Shared handle to a registered type.
///
/// Two handles are equal when they name the same type; names are unique in
/// the catalog.
#[derive(Clone)]
pub struct SlimType(Arc<TypeDefinition>);

impl SlimType {
    pub(crate) fn from_definition(def: TypeDefinition) -> Self {
        Self(Arc::new(def))
    }

    /// Built-in `object`.
    pub fn object() -> SlimType {
        catalog().object().clone()
    }

    /// Built-in `string`.
    pub fn string() -> SlimType {
        catalog().string().clone()
    }

    pub fn primitive(kind: PrimitiveKind) -> SlimType {
        catalog().primitive(kind).clone()
    }

    pub fn native(kind: NativeRefKind) -> SlimType {
        catalog().native(kind).clone()
    }

    /// Array type over `self` with the given rank.
    pub fn array(&self, rank: usize) -> Result<SlimType> {
        catalog().array_of(self, rank)
    }

    /// Resolve a registered (or synthesizable array) type by name.
    pub fn named(name: &str) -> Result<SlimType> {
        catalog().resolve(name)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.0.name
    }

    pub fn definition(&self) -> &TypeDefinition {
        &self.0
    }

    pub fn shape(&self) -> &TypeShape {
        &self.0.shape
    }

    pub fn hooks(&self) -> &TypeHooks {
        &self.0.hooks
    }

    pub fn is_non_serializable(&self) -> bool {
        self.0.non_serializable
    }

    /// Copied inline, never pooled (primitives, enums, structs).
    pub fn is_value_type(&self) -> bool {
        matches!(
            self.0.shape,
            TypeShape::Primitive(_) | TypeShape::Enum(_) | TypeShape::Struct(_)
        )
    }

    /// Identity-bearing heap object that receives a pool slot.
    pub fn is_pooled(&self) -> bool {
        matches!(
            self.0.shape,
            TypeShape::Object | TypeShape::Class(_) | TypeShape::Array(_) | TypeShape::Custom(_)
        )
    }

    pub fn is_object(&self) -> bool {
        matches!(self.0.shape, TypeShape::Object)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.0.shape, TypeShape::Array(_))
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.0.shape {
            TypeShape::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn array_shape(&self) -> Option<&ArrayShape> {
        match &self.0.shape {
            TypeShape::Array(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn enum_shape(&self) -> Option<&EnumShape> {
        match &self.0.shape {
            TypeShape::Enum(shape) => Some(shape),
            _ => None,
        }
    }

    /// Get fields if this is a class or struct.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.0.shape {
            TypeShape::Class(fields) | TypeShape::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?.iter().position(|f| &*f.name == name)
    }

    pub fn ptr_eq(&self, other: &SlimType) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for SlimType {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.name == other.0.name
    }
}

impl Eq for SlimType {}

impl Hash for SlimType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl fmt::Debug for SlimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlimType").field(&self.name()).finish()
    }
}

impl fmt::Display for SlimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
