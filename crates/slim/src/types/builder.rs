// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for type definitions.

use super::catalog::catalog;
use super::definition::{
    CustomFactory, EnumShape, EnumVariant, FieldDescriptor, SlimType, TypeDefinition, TypeShape,
};
use super::hooks::{HookError, HookStage, TypeHooks};
use super::kind::PrimitiveKind;
use crate::error::Result;
use crate::value::ObjectRef;
use std::sync::Arc;

/// Builder for class (pooled reference) types.
///
/// # Example
///
/// ```rust
/// use slim::types::ClassBuilder;
///
/// let node = ClassBuilder::new("docs.builder.Node")
///     .field("value", "int")
///     .field("next", "docs.builder.Node")
///     .register()
///     .unwrap();
/// assert_eq!(node.fields().unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct ClassBuilder {
    name: Arc<str>,
    fields: Vec<FieldDescriptor>,
    hooks: TypeHooks,
    non_serializable: bool,
}

impl ClassBuilder {
    /// Create a new builder for a class type.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            hooks: TypeHooks::default(),
            non_serializable: false,
        }
    }

    /// Add a field declared with the named type.
    pub fn field(mut self, name: impl Into<Arc<str>>, type_name: impl Into<Arc<str>>) -> Self {
        self.fields.push(FieldDescriptor::new(name, type_name));
        self
    }

    /// Add a read-only field.
    pub fn read_only_field(
        mut self,
        name: impl Into<Arc<str>>,
        type_name: impl Into<Arc<str>>,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, type_name).read_only());
        self
    }

    /// Add a field that is never serialized.
    pub fn transient_field(
        mut self,
        name: impl Into<Arc<str>>,
        type_name: impl Into<Arc<str>>,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, type_name).transient());
        self
    }

    pub fn field_descriptor(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Attach a lifecycle hook.
    pub fn hook<F>(mut self, stage: HookStage, hook: F) -> Self
    where
        F: Fn(&ObjectRef) -> core::result::Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.set(stage, Arc::new(hook));
        self
    }

    pub fn non_serializable(mut self) -> Self {
        self.non_serializable = true;
        self
    }

    pub fn build(self) -> TypeDefinition {
        let def = TypeDefinition::new(self.name, TypeShape::Class(self.fields)).with_hooks(self.hooks);
        if self.non_serializable {
            def.non_serializable()
        } else {
            def
        }
    }

    /// Build and register; fails if the name is taken.
    pub fn register(self) -> Result<SlimType> {
        catalog().register(self.build())
    }

    /// Build and register, or return the type already registered under the name.
    pub fn get_or_register(self) -> Result<SlimType> {
        catalog().get_or_register(self.build())
    }
}

/// Builder for struct (inline value) types.
#[derive(Debug)]
pub struct StructBuilder {
    name: Arc<str>,
    fields: Vec<FieldDescriptor>,
    non_serializable: bool,
}

impl StructBuilder {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            non_serializable: false,
        }
    }

    pub fn field(mut self, name: impl Into<Arc<str>>, type_name: impl Into<Arc<str>>) -> Self {
        self.fields.push(FieldDescriptor::new(name, type_name));
        self
    }

    pub fn read_only_field(
        mut self,
        name: impl Into<Arc<str>>,
        type_name: impl Into<Arc<str>>,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, type_name).read_only());
        self
    }

    pub fn transient_field(
        mut self,
        name: impl Into<Arc<str>>,
        type_name: impl Into<Arc<str>>,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, type_name).transient());
        self
    }

    pub fn non_serializable(mut self) -> Self {
        self.non_serializable = true;
        self
    }

    pub fn build(self) -> TypeDefinition {
        let def = TypeDefinition::new(self.name, TypeShape::Struct(self.fields));
        if self.non_serializable {
            def.non_serializable()
        } else {
            def
        }
    }

    pub fn register(self) -> Result<SlimType> {
        catalog().register(self.build())
    }

    pub fn get_or_register(self) -> Result<SlimType> {
        catalog().get_or_register(self.build())
    }
}

/// Builder for enumeration types (underlying `int` unless set).
#[derive(Debug)]
pub struct EnumBuilder {
    name: Arc<str>,
    underlying: PrimitiveKind,
    variants: Vec<EnumVariant>,
}

impl EnumBuilder {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            underlying: PrimitiveKind::I32,
            variants: Vec::new(),
        }
    }

    /// Integer kind carried on the wire.
    pub fn underlying(mut self, kind: PrimitiveKind) -> Self {
        self.underlying = kind;
        self
    }

    pub fn variant(mut self, name: impl Into<Arc<str>>, value: i64) -> Self {
        self.variants.push(EnumVariant {
            name: name.into(),
            value,
        });
        self
    }

    pub fn build(self) -> TypeDefinition {
        TypeDefinition::new(
            self.name,
            TypeShape::Enum(EnumShape {
                underlying: self.underlying,
                variants: self.variants,
            }),
        )
    }

    pub fn register(self) -> Result<SlimType> {
        catalog().register(self.build())
    }

    pub fn get_or_register(self) -> Result<SlimType> {
        catalog().get_or_register(self.build())
    }
}

/// Builder for custom-contract types.
#[derive(Debug)]
pub struct CustomBuilder {
    name: Arc<str>,
    factory: CustomFactory,
    hooks: TypeHooks,
    non_serializable: bool,
}

impl CustomBuilder {
    /// `factory` rebuilds an instance from the decoded entry bag.
    pub fn new(name: impl Into<Arc<str>>, factory: CustomFactory) -> Self {
        Self {
            name: name.into(),
            factory,
            hooks: TypeHooks::default(),
            non_serializable: false,
        }
    }

    pub fn hook<F>(mut self, stage: HookStage, hook: F) -> Self
    where
        F: Fn(&ObjectRef) -> core::result::Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.set(stage, Arc::new(hook));
        self
    }

    pub fn non_serializable(mut self) -> Self {
        self.non_serializable = true;
        self
    }

    pub fn build(self) -> TypeDefinition {
        let def =
            TypeDefinition::new(self.name, TypeShape::Custom(self.factory)).with_hooks(self.hooks);
        if self.non_serializable {
            def.non_serializable()
        } else {
            def
        }
    }

    pub fn register(self) -> Result<SlimType> {
        catalog().register(self.build())
    }

    pub fn get_or_register(self) -> Result<SlimType> {
        catalog().get_or_register(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HookStage;

    #[test]
    fn test_class_builder_flags() {
        let def = ClassBuilder::new("tests.builder.Account")
            .field("id", "long")
            .read_only_field("owner", "string")
            .transient_field("cache", "object")
            .hook(HookStage::AfterDeserialize, |_| Ok(()))
            .build();
        let fields = match def.shape() {
            TypeShape::Class(fields) => fields,
            other => panic!("unexpected shape {:?}", other),
        };
        assert_eq!(fields.len(), 3);
        assert!(fields[1].read_only);
        assert!(fields[2].transient);
        assert!(def.hooks.get(HookStage::AfterDeserialize).is_some());
    }

    #[test]
    fn test_enum_builder_defaults_to_int() {
        let def = EnumBuilder::new("tests.builder.Color")
            .variant("Red", 0)
            .variant("Green", 1)
            .build();
        match def.shape() {
            TypeShape::Enum(shape) => {
                assert_eq!(shape.underlying, PrimitiveKind::I32);
                assert_eq!(shape.value_of("Green"), Some(1));
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_struct_builder_non_serializable() {
        let def = StructBuilder::new("tests.builder.Secret")
            .field("pin", "int")
            .non_serializable()
            .build();
        assert!(def.non_serializable);
    }
}
