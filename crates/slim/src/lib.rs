// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Slim - compact binary object-graph serialization
//!
//! Slim writes an arbitrary graph of runtime-typed values to a byte stream
//! and reads it back, preserving shared references and cycles. Type names
//! cross the wire once per call (or once per batch); every later reference
//! to the type or to an already-written object is a small integer.
//!
//! ## Quick Start
//!
//! ```rust
//! use slim::types::ClassBuilder;
//! use slim::{deserialize, serialize, ObjectRef, Result, Value};
//!
//! fn main() -> Result<()> {
//!     let order = ClassBuilder::new("docs.lib.Order")
//!         .field("id", "long")
//!         .field("customer", "string")
//!         .register()?;
//!
//!     let obj = ObjectRef::new(&order)?;
//!     obj.set("id", 42i64)?;
//!     obj.set("customer", "ada")?;
//!
//!     let mut bytes = Vec::new();
//!     serialize(&mut bytes, &Value::from(&obj))?;
//!     let back = deserialize(&mut bytes.as_slice())?;
//!     assert_eq!(back.as_object().unwrap().get("id")?, Value::I64(42));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  Slim engine: header, crosscheck, root, pool drain, fixups          |
//! +---------------------------------------------------------------------+
//! |  Schema: compiled per-type field plans (cached, lock-free reads)    |
//! +-----------------------+-------------------+-------------------------+
//! |  Type registry        |  Reference pool   |  Array codec            |
//! |  handle <-> type      |  identity slots   |  rank / bounds          |
//! +-----------------------+-------------------+-------------------------+
//! |  Wire: little-endian scalars, LEB128 varints, type tokens           |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`types`] - runtime type definitions and the process-wide catalog
//! - [`value`] - dynamic values, heap objects, arrays, custom contracts
//! - [`schema`] - compiled serialization plans
//! - [`registry`] - per-call type handle table
//! - [`pool`] - per-call object identity table
//! - [`array_codec`] - array descriptor strings
//! - [`wire`] - primitive reader and writer
//! - [`config`] - wire constants and [`SlimConfig`]

/// Array descriptor strings (`<handle>|<lb>~<ub>,...`).
pub mod array_codec;
/// Global configuration (wire constants, ceilings, runtime settings).
pub mod config;
/// Per-call object identity table and deferred fixups.
pub mod pool;
/// Per-call (or per-batch) type handle table.
pub mod registry;
/// Compiled per-type serialization plans.
pub mod schema;
/// Runtime type definitions, builders and the process-wide catalog.
pub mod types;
/// Dynamic values: primitives, structs, enums, heap objects, arrays.
pub mod value;
/// Low-level primitive reader/writer.
pub mod wire;

mod engine;
mod error;

pub use config::{SlimConfig, TypeMode};
pub use engine::{deserialize, serialize, Slim};
pub use error::{Error, Result};
pub use types::{SlimType, TypeDefinition};
pub use value::{
    ArrayValue, CustomObject, Dimension, EnumValue, ObjectRef, SerializationInfo, StructValue,
    Value, Version,
};
