// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Custom serialization contract.
//!
//! A custom type never exposes its fields to the engine. On encode it fills a
//! [`SerializationInfo`] with `(name, declared type, value)` entries; on
//! decode the engine collects the same entries and hands them to the type's
//! [`crate::types::CustomFactory`] once the whole graph is materialized.
//!
//! # Example
//!
//! ```rust
//! use slim::types::CustomBuilder;
//! use slim::{CustomObject, ObjectRef, Result, SerializationInfo, Slim};
//! use std::any::Any;
//! use std::collections::HashMap;
//!
//! #[derive(Debug)]
//! struct Money {
//!     cents: i64,
//!     currency: String,
//! }
//!
//! impl CustomObject for Money {
//!     fn get_object_data(&self, info: &mut SerializationInfo) -> Result<()> {
//!         info.add("cents", self.cents)?;
//!         info.add("currency", self.currency.as_str())
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! fn rebuild(info: &SerializationInfo) -> Result<Box<dyn CustomObject>> {
//!     Ok(Box::new(Money {
//!         cents: info.get_i64("cents")?,
//!         currency: info.get_str("currency")?.unwrap_or_default().to_string(),
//!     }))
//! }
//!
//! let money = CustomBuilder::new("docs.custom.Money", rebuild).register().unwrap();
//! let obj = ObjectRef::new_custom(&money, Money { cents: 1250, currency: "EUR".into() }).unwrap();
//!
//! let engine = Slim::new();
//! let bytes = engine.to_bytes(&obj.into()).unwrap();
//! let back = engine.from_bytes(&bytes).unwrap();
//! let cents = back
//!     .as_object()
//!     .unwrap()
//!     .with_custom(|m: &Money| m.cents)
//!     .unwrap();
//! assert_eq!(cents, 1250);
//! ```

use super::{ObjectRef, Value};
use crate::error::{Error, Result};
use crate::types::{catalog, SlimType};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Implemented by types that serialize through named entries.
pub trait CustomObject: Any + Send + Sync + fmt::Debug {
    /// Expose the entries to write.
    fn get_object_data(&self, info: &mut SerializationInfo) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

/// One `(name, declared type, value)` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializationEntry {
    pub name: Arc<str>,
    pub declared: SlimType,
    pub value: Value,
}

/// Ordered entry bag of one custom-contract object.
#[derive(Debug, Clone)]
pub struct SerializationInfo {
    type_name: Arc<str>,
    entries: Vec<SerializationEntry>,
    /// Entry name -> position in `entries`.
    index: HashMap<Arc<str>, usize>,
}

impl SerializationInfo {
    pub fn new(ty: &SlimType) -> Self {
        Self {
            type_name: ty.name_arc().clone(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Name of the type the entries belong to.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Add an entry declared as `declared`.
    pub fn add_value(
        &mut self,
        name: impl Into<Arc<str>>,
        declared: &SlimType,
        value: impl Into<Value>,
    ) -> Result<()> {
        let value = value.into();
        value.ensure_assignable(declared)?;
        self.push(SerializationEntry {
            name: name.into(),
            declared: declared.clone(),
            value,
        })
    }

    /// Add an entry declared with the value's own type (`object` for null).
    pub fn add(&mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let declared = declared_type_of(&value);
        self.push(SerializationEntry {
            name: name.into(),
            declared,
            value,
        })
    }

    pub(crate) fn push(&mut self, entry: SerializationEntry) -> Result<()> {
        if self.index.contains_key(&*entry.name) {
            return Err(self.contract_error(format!("duplicate entry `{}`", entry.name)));
        }
        self.index.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.index
            .get(name)
            .map(|&at| &self.entries[at].value)
            .ok_or_else(|| Error::FieldNotFound {
                type_name: self.type_name.to_string(),
                field: name.to_string(),
            })
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        let value = self.get(name)?;
        value
            .as_bool()
            .ok_or_else(|| Error::mismatch("bool", value.type_label()))
    }

    pub fn get_i32(&self, name: &str) -> Result<i32> {
        let value = self.get(name)?;
        value
            .as_i32()
            .ok_or_else(|| Error::mismatch("int", value.type_label()))
    }

    /// Any integer entry widened to `i64`.
    pub fn get_i64(&self, name: &str) -> Result<i64> {
        let value = self.get(name)?;
        value
            .as_i64()
            .ok_or_else(|| Error::mismatch("long", value.type_label()))
    }

    pub fn get_f64(&self, name: &str) -> Result<f64> {
        let value = self.get(name)?;
        value
            .as_f64()
            .ok_or_else(|| Error::mismatch("double", value.type_label()))
    }

    /// String entry; `None` when the entry holds null.
    pub fn get_str(&self, name: &str) -> Result<Option<&str>> {
        match self.get(name)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(Error::mismatch("string", other.type_label())),
        }
    }

    /// Object entry; `None` when the entry holds null.
    pub fn get_object(&self, name: &str) -> Result<Option<ObjectRef>> {
        match self.get(name)? {
            Value::Null => Ok(None),
            Value::Object(o) => Ok(Some(o.clone())),
            other => Err(Error::mismatch("object", other.type_label())),
        }
    }

    pub fn entries(&self) -> &[SerializationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// [`Error::Contract`] tagged with this bag's type, for use in factories.
    pub fn contract_error(&self, message: impl Into<String>) -> Error {
        Error::Contract {
            type_name: self.type_name.to_string(),
            message: message.into(),
        }
    }
}

fn declared_type_of(value: &Value) -> SlimType {
    value
        .runtime_type()
        .unwrap_or_else(|| catalog().object().clone())
}
