// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type information.
//!
//! Types are described at runtime by [`TypeDefinition`]s, registered once in
//! the process-wide [`TypeCatalog`], and referenced by cheap [`SlimType`]
//! handles.
//!
//! # Example
//!
//! ```rust
//! use slim::types::{catalog, EnumBuilder, PrimitiveKind, StructBuilder};
//!
//! let level = EnumBuilder::new("docs.types.Level")
//!     .underlying(PrimitiveKind::U8)
//!     .variant("Low", 0)
//!     .variant("High", 1)
//!     .register()
//!     .unwrap();
//!
//! let point = StructBuilder::new("docs.types.Point")
//!     .field("x", "int")
//!     .field("y", "int")
//!     .field("level", "docs.types.Level")
//!     .register()
//!     .unwrap();
//!
//! assert!(point.is_value_type());
//! assert_eq!(catalog().resolve("docs.types.Point[,]").unwrap().array_shape().unwrap().rank, 2);
//! assert_eq!(level.enum_shape().unwrap().value_of("High"), Some(1));
//! ```

mod builder;
mod catalog;
mod definition;
mod hooks;
mod kind;

pub use builder::{ClassBuilder, CustomBuilder, EnumBuilder, StructBuilder};
pub use catalog::{catalog, TypeCatalog};
pub use definition::{
    ArrayShape, CustomFactory, EnumShape, EnumVariant, FieldDescriptor, SlimType, TypeDefinition,
    TypeShape,
};
pub use hooks::{HookError, HookFn, HookStage, TypeHooks};
pub use kind::{NativeRefKind, PrimitiveKind};

pub(crate) use hooks::invoke as invoke_hook;
