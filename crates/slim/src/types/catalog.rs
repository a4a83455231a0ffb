// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide type catalog.
//!
//! Maps fully-qualified names to [`SlimType`] handles. Built-in types are
//! pre-registered; array types are synthesized on demand from their element
//! type and rank (`Elem[]`, `Elem[,]`, `Elem[][,,]`).

use super::definition::{ArrayShape, SlimType, TypeDefinition, TypeShape};
use super::kind::{NativeRefKind, PrimitiveKind};
use crate::config::{MAX_ARRAY_NESTING, MAX_ARRAY_RANK, MAX_TYPE_NAME_LEN};
use crate::error::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// Characters never allowed in a registered type name.
const RESERVED_NAME_CHARS: [char; 3] = ['|', '~', ','];

static CATALOG: OnceLock<TypeCatalog> = OnceLock::new();

/// The process-wide catalog.
pub fn catalog() -> &'static TypeCatalog {
    CATALOG.get_or_init(TypeCatalog::with_builtins)
}

/// Concurrent name -> type table.
pub struct TypeCatalog {
    types: DashMap<Arc<str>, SlimType>,
    object: SlimType,
    object_array: SlimType,
    byte_array: SlimType,
    string: SlimType,
    primitives: [SlimType; 15],
    natives: [SlimType; 2],
}

impl TypeCatalog {
    fn with_builtins() -> Self {
        let object = SlimType::from_definition(TypeDefinition::new("object", TypeShape::Object));
        let string = SlimType::from_definition(TypeDefinition::new("string", TypeShape::String));
        let primitives = PrimitiveKind::ALL.map(|kind| {
            SlimType::from_definition(TypeDefinition::new(kind.name(), TypeShape::Primitive(kind)))
        });
        let natives = NativeRefKind::ALL.map(|kind| {
            SlimType::from_definition(TypeDefinition::new(kind.name(), TypeShape::Native(kind)))
        });
        let object_array = SlimType::from_definition(TypeDefinition::new(
            array_type_name(&object, 1),
            TypeShape::Array(ArrayShape {
                element: object.clone(),
                rank: 1,
            }),
        ));
        let byte = primitives[PrimitiveKind::U8.index()].clone();
        let byte_array = SlimType::from_definition(TypeDefinition::new(
            array_type_name(&byte, 1),
            TypeShape::Array(ArrayShape {
                element: byte,
                rank: 1,
            }),
        ));

        let types = DashMap::new();
        let builtins = [&object, &object_array, &byte_array, &string]
            .into_iter()
            .chain(primitives.iter())
            .chain(natives.iter());
        for ty in builtins {
            types.insert(ty.name_arc().clone(), ty.clone());
        }
        log::debug!("[slim::types] catalog initialized with {} built-in types", types.len());

        Self {
            types,
            object,
            object_array,
            byte_array,
            string,
            primitives,
            natives,
        }
    }

    /// Register a new type; fails with [`Error::DuplicateType`] if the name is taken.
    pub fn register(&self, def: TypeDefinition) -> Result<SlimType> {
        validate_definition(&def)?;
        match self.types.entry(def.name.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateType(def.name.to_string())),
            Entry::Vacant(vacant) => {
                let ty = SlimType::from_definition(def);
                vacant.insert(ty.clone());
                log::debug!("[slim::types] registered `{}`", ty.name());
                Ok(ty)
            }
        }
    }

    /// Register a new type, or return the one already registered under its name.
    pub fn get_or_register(&self, def: TypeDefinition) -> Result<SlimType> {
        validate_definition(&def)?;
        let entry = self
            .types
            .entry(def.name.clone())
            .or_insert_with(|| SlimType::from_definition(def));
        Ok(entry.value().clone())
    }

    /// Registered type by exact name.
    pub fn get(&self, name: &str) -> Option<SlimType> {
        self.types.get(name).map(|entry| entry.value().clone())
    }

    /// Registered type by name, synthesizing array types on demand.
    ///
    /// Only arrays over an already registered innermost element are built.
    /// Unknown names longer than [`MAX_TYPE_NAME_LEN`] or with more than
    /// [`MAX_ARRAY_NESTING`] bracket groups fail before anything is inserted.
    pub fn resolve(&self, name: &str) -> Result<SlimType> {
        if let Some(ty) = self.get(name) {
            return Ok(ty);
        }
        if name.len() > MAX_TYPE_NAME_LEN {
            return Err(Error::InvalidTypeHandle(format!(
                "type name of {} bytes exceeds {}",
                name.len(),
                MAX_TYPE_NAME_LEN
            )));
        }

        // Peel bracket groups outermost first down to the innermost element.
        let mut ranks = Vec::new();
        let mut current = name;
        while let Some((element, rank)) = split_array_name(current) {
            if ranks.len() == MAX_ARRAY_NESTING {
                return Err(Error::InvalidTypeHandle(format!(
                    "`{}` nests arrays deeper than {}",
                    name, MAX_ARRAY_NESTING
                )));
            }
            if rank > MAX_ARRAY_RANK {
                return Err(Error::ArrayRankExceeded { rank });
            }
            ranks.push(rank);
            current = element;
        }
        let base = self
            .get(current)
            .ok_or_else(|| Error::InvalidTypeHandle(name.to_string()))?;

        ranks
            .into_iter()
            .rev()
            .try_fold(base, |element, rank| self.array_of(&element, rank))
    }

    /// Array type over `element` with `rank` dimensions.
    pub fn array_of(&self, element: &SlimType, rank: usize) -> Result<SlimType> {
        if rank == 0 || rank > MAX_ARRAY_RANK {
            return Err(Error::ArrayRankExceeded { rank });
        }
        let name = array_type_name(element, rank);
        if let Some(ty) = self.get(&name) {
            return Ok(ty);
        }
        let key: Arc<str> = Arc::from(name);
        let def = TypeDefinition::new(
            key.clone(),
            TypeShape::Array(ArrayShape {
                element: element.clone(),
                rank,
            }),
        );
        let entry = self
            .types
            .entry(key)
            .or_insert_with(|| SlimType::from_definition(def));
        Ok(entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types (built-ins and synthesized arrays included).
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn object(&self) -> &SlimType {
        &self.object
    }

    pub fn object_array(&self) -> &SlimType {
        &self.object_array
    }

    pub fn byte_array(&self) -> &SlimType {
        &self.byte_array
    }

    pub fn string(&self) -> &SlimType {
        &self.string
    }

    pub fn primitive(&self, kind: PrimitiveKind) -> &SlimType {
        &self.primitives[kind.index()]
    }

    pub fn native(&self, kind: NativeRefKind) -> &SlimType {
        &self.natives[kind.index()]
    }
}

/// `Elem[]`, `Elem[,]`, ... for the given rank.
fn array_type_name(element: &SlimType, rank: usize) -> String {
    let mut name = String::with_capacity(element.name().len() + rank + 1);
    name.push_str(element.name());
    name.push('[');
    for _ in 1..rank {
        name.push(',');
    }
    name.push(']');
    name
}

/// Split `Elem[,,]` into (`Elem`, 3). The outermost (last) bracket pair wins,
/// so `int[][,]` is a rank-2 array of `int[]`.
fn split_array_name(name: &str) -> Option<(&str, usize)> {
    let inner_end = name.len().checked_sub(1)?;
    if !name.ends_with(']') {
        return None;
    }
    let open = name.rfind('[')?;
    let commas = &name[open + 1..inner_end];
    if !commas.bytes().all(|b| b == b',') {
        return None;
    }
    let element = &name[..open];
    if element.is_empty() {
        return None;
    }
    Some((element, commas.len() + 1))
}

/// Reject names that would collide with the wire's token and descriptor syntax.
pub(crate) fn validate_type_name(name: &str) -> Result<()> {
    let problem = if name.is_empty() {
        Some("empty name")
    } else if name.starts_with('$') {
        Some("names must not start with `$`")
    } else if name.ends_with(']') {
        Some("array type names are derived from their element type")
    } else if name.chars().any(|c| RESERVED_NAME_CHARS.contains(&c)) {
        Some("names must not contain `|`, `~` or `,`")
    } else if name.chars().any(char::is_whitespace) {
        Some("names must not contain whitespace")
    } else {
        None
    };
    match problem {
        Some(reason) => Err(Error::InvalidTypeDefinition(format!(
            "invalid type name {:?}: {}",
            name, reason
        ))),
        None => Ok(()),
    }
}

fn validate_definition(def: &TypeDefinition) -> Result<()> {
    validate_type_name(&def.name)?;
    match &def.shape {
        TypeShape::Class(fields) | TypeShape::Struct(fields) => {
            let mut seen = HashSet::with_capacity(fields.len());
            for field in fields {
                if field.name.is_empty() || field.type_name.is_empty() {
                    return Err(Error::InvalidTypeDefinition(format!(
                        "`{}` has a field with an empty name or type",
                        def.name
                    )));
                }
                if !seen.insert(&*field.name) {
                    return Err(Error::InvalidTypeDefinition(format!(
                        "`{}` declares field `{}` twice",
                        def.name, field.name
                    )));
                }
            }
            Ok(())
        }
        TypeShape::Enum(shape) => {
            if shape.underlying.is_integer() {
                Ok(())
            } else {
                Err(Error::InvalidTypeDefinition(format!(
                    "enum `{}` needs an integer underlying type, not `{}`",
                    def.name,
                    shape.underlying.name()
                )))
            }
        }
        TypeShape::Custom(_) => Ok(()),
        TypeShape::Object
        | TypeShape::Primitive(_)
        | TypeShape::String
        | TypeShape::Native(_)
        | TypeShape::Array(_) => Err(Error::InvalidTypeDefinition(format!(
            "`{}` uses a built-in shape; only classes, structs, enums and custom types can be registered",
            def.name
        ))),
    }
}
