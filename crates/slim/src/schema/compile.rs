// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type definition -> [`TypeSchema`] compilation.

use super::{ArrayPlan, FieldOp, FieldPlan, SchemaShape, TypeSchema};
use crate::error::{Error, Result};
use crate::types::{catalog, FieldDescriptor, PrimitiveKind, SlimType, TypeShape};
use std::collections::HashSet;
use std::sync::Arc;

/// Encoding operation for a slot declared as `ty`.
pub(crate) fn field_op(ty: &SlimType) -> FieldOp {
    match ty.shape() {
        TypeShape::Primitive(kind) => FieldOp::Primitive(*kind),
        TypeShape::String => FieldOp::String,
        TypeShape::Enum(shape) => FieldOp::Enum {
            ty: ty.clone(),
            underlying: shape.underlying,
        },
        TypeShape::Struct(_) => FieldOp::Nested(ty.clone()),
        TypeShape::Object
        | TypeShape::Native(_)
        | TypeShape::Class(_)
        | TypeShape::Array(_)
        | TypeShape::Custom(_) => FieldOp::Reference,
    }
}

pub(crate) fn compile(ty: &SlimType) -> Result<TypeSchema> {
    if ty.is_non_serializable() {
        return Err(Error::SerializationProhibited(ty.name().to_string()));
    }

    let shape = match ty.shape() {
        TypeShape::Object => SchemaShape::Object,
        TypeShape::Primitive(kind) => SchemaShape::Primitive(*kind),
        TypeShape::String => SchemaShape::String,
        TypeShape::Native(kind) => SchemaShape::Native(*kind),
        TypeShape::Enum(shape) => SchemaShape::Enum(shape.underlying),
        TypeShape::Struct(fields) => {
            check_struct_containment(ty)?;
            SchemaShape::Struct(plan_fields(ty, fields)?)
        }
        TypeShape::Class(fields) => SchemaShape::Class(plan_fields(ty, fields)?),
        TypeShape::Array(shape) => SchemaShape::Array(ArrayPlan {
            element: shape.element.clone(),
            rank: shape.rank,
            op: field_op(&shape.element),
            raw_bytes: shape.element.primitive_kind() == Some(PrimitiveKind::U8),
        }),
        TypeShape::Custom(factory) => SchemaShape::Custom(*factory),
    };

    log::debug!(
        "[slim::schema] compiled `{}` ({} fields)",
        ty.name(),
        match &shape {
            SchemaShape::Struct(f) | SchemaShape::Class(f) => f.len(),
            _ => 0,
        }
    );
    TypeSchema::new(ty.clone(), shape)
}

fn plan_fields(owner: &SlimType, fields: &[FieldDescriptor]) -> Result<Vec<FieldPlan>> {
    fields
        .iter()
        .map(|field| {
            let ty = resolve_field(owner, field)?;
            let op = if field.transient {
                FieldOp::Skip
            } else {
                field_op(&ty)
            };
            Ok(FieldPlan {
                name: Arc::clone(&field.name),
                ty,
                op,
                read_only: field.read_only,
                transient: field.transient,
            })
        })
        .collect()
}

fn resolve_field(owner: &SlimType, field: &FieldDescriptor) -> Result<SlimType> {
    catalog().resolve(&field.type_name).map_err(|e| match e {
        Error::InvalidTypeHandle(_) => Error::InvalidTypeHandle(format!(
            "{} (field `{}.{}`)",
            field.type_name,
            owner.name(),
            field.name
        )),
        other => other,
    })
}

/// Reject structs that contain themselves by value, directly or through
/// other structs.
fn check_struct_containment(root: &SlimType) -> Result<()> {
    let mut path: Vec<Arc<str>> = vec![Arc::clone(root.name_arc())];
    let mut cleared: HashSet<Arc<str>> = HashSet::new();
    visit_struct(root, &mut path, &mut cleared)
}

fn visit_struct(
    ty: &SlimType,
    path: &mut Vec<Arc<str>>,
    cleared: &mut HashSet<Arc<str>>,
) -> Result<()> {
    let fields = ty.fields().unwrap_or(&[]);
    for field in fields {
        let field_ty = resolve_field(ty, field)?;
        if !matches!(field_ty.shape(), TypeShape::Struct(_)) {
            continue;
        }
        if path.iter().any(|name| **name == *field_ty.name()) {
            return Err(Error::InvalidTypeDefinition(format!(
                "struct `{}` contains itself by value ({} -> {})",
                field_ty.name(),
                path.join(" -> "),
                field_ty.name()
            )));
        }
        if cleared.contains(field_ty.name()) {
            continue;
        }
        path.push(Arc::clone(field_ty.name_arc()));
        visit_struct(&field_ty, path, cleared)?;
        path.pop();
        cleared.insert(Arc::clone(field_ty.name_arc()));
    }
    Ok(())
}
