// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The Slim engine: per-call orchestration and registry lifetime.
//!
//! # Modes
//!
//! - [`TypeMode::Default`]: every call starts from a pristine registry drawn
//!   from the thread-local scratch. Calls on any number of threads are
//!   independent.
//! - [`TypeMode::Batch`]: one registry lives on the engine across calls, so
//!   a type's full name is written once per batch. Writer and reader must
//!   process the same calls in the same order. Only one batch call may run
//!   at a time; others fail with [`Error::BatchInUse`].
//!
//! # Example
//!
//! ```rust
//! use slim::types::ClassBuilder;
//! use slim::{ObjectRef, Slim, Value};
//!
//! let node = ClassBuilder::new("doc.engine.Node")
//!     .field("next", "doc.engine.Node")
//!     .field("label", "string")
//!     .get_or_register()
//!     .unwrap();
//!
//! let a = ObjectRef::new(&node).unwrap();
//! let b = ObjectRef::new(&node).unwrap();
//! a.set("next", &b).unwrap();
//! b.set("next", &a).unwrap();
//! a.set("label", "a").unwrap();
//!
//! let slim = Slim::new();
//! let bytes = slim.to_bytes(&Value::from(&a)).unwrap();
//! let back = slim.from_bytes(&bytes).unwrap();
//!
//! let a2 = back.as_object().unwrap().clone();
//! let b2 = a2.get("next").unwrap().as_object().unwrap().clone();
//! assert!(b2.get("next").unwrap().as_object().unwrap().ptr_eq(&a2));
//! assert_eq!(a2.get("label").unwrap().as_str(), Some("a"));
//! ```

mod deserialize;
mod scratch;
mod serialize;

use crate::config::{SlimConfig, TypeMode};
use crate::error::{Error, Result};
use crate::registry::TypeRegistry;
use crate::value::Value;
use crate::wire::SlimReader;
use parking_lot::Mutex;
use scratch::{with_scratch, Scratch};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::OnceLock;

/// Registry state kept across calls in batch mode.
struct BatchState {
    registry: TypeRegistry,
}

/// Serialization engine.
pub struct Slim {
    config: SlimConfig,
    mode: AtomicU8,
    batch: Mutex<BatchState>,
    /// Set when the last batch call grew the batch registry.
    registered_new: AtomicBool,
}

impl Slim {
    /// Engine with [`SlimConfig::default`].
    pub fn new() -> Self {
        Self::with_config(SlimConfig::default())
    }

    pub fn with_config(config: SlimConfig) -> Self {
        Self {
            config,
            mode: AtomicU8::new(config.type_mode.as_u8()),
            batch: Mutex::new(BatchState {
                registry: TypeRegistry::new(),
            }),
            registered_new: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SlimConfig {
        &self.config
    }

    pub fn type_mode(&self) -> TypeMode {
        TypeMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// Switch registry lifetime. Switching modes discards the batch registry.
    pub fn set_type_mode(&self, mode: TypeMode) {
        let previous = TypeMode::from_u8(self.mode.swap(mode.as_u8(), Ordering::AcqRel));
        if previous != mode {
            log::debug!("[slim::engine] type mode {:?} -> {:?}", previous, mode);
            if self.reset_batch().is_err() {
                log::warn!("[slim::engine] batch registry busy, not reset on mode change");
            }
        }
    }

    /// Back to the initial handle space. Fails if a batch call is running.
    pub fn reset_batch(&self) -> Result<()> {
        let mut batch = self.batch.try_lock().ok_or(Error::BatchInUse)?;
        batch.registry.reset();
        self.registered_new.store(false, Ordering::Release);
        Ok(())
    }

    /// Whether the last batch-mode call registered types not seen before in
    /// the batch.
    pub fn batch_registered_new_types(&self) -> bool {
        self.registered_new.load(Ordering::Acquire)
    }

    /// Serialize the graph reachable from `root` into `out`.
    ///
    /// The stream is written only once the whole graph has been encoded.
    pub fn serialize<W: Write + ?Sized>(&self, out: &mut W, root: &Value) -> Result<()> {
        with_scratch(|scratch| {
            let Scratch {
                writer,
                registry,
                pool,
            } = scratch;
            let mut call = |registry: &mut TypeRegistry| -> Result<()> {
                serialize::encode_call(&self.config, writer, registry, pool, root)?;
                out.write_all(writer.as_bytes())
                    .and_then(|()| out.flush())
                    .map_err(|e| Error::Io(e).in_serialization("output stream"))
            };
            match self.type_mode() {
                TypeMode::Default => call(registry),
                TypeMode::Batch => self
                    .with_batch(call)
                    .map_err(|e| e.in_serialization("batch state")),
            }
        })
    }

    /// Deserialize one graph from `input`.
    pub fn deserialize<R: Read + ?Sized>(&self, input: &mut R) -> Result<Value> {
        let mut input = input;
        let mut reader = SlimReader::new(&mut input);
        with_scratch(|scratch| match self.type_mode() {
            TypeMode::Default => deserialize::decode_call(
                &self.config,
                &mut reader,
                &mut scratch.registry,
                &mut scratch.pool,
            ),
            TypeMode::Batch => self
                .with_batch(|registry| {
                    deserialize::decode_call(&self.config, &mut reader, registry, &mut scratch.pool)
                })
                .map_err(|e| e.in_deserialization("batch state")),
        })
    }

    /// [`Slim::serialize`] into a fresh buffer.
    pub fn to_bytes(&self, root: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.serialize(&mut out, root)?;
        Ok(out)
    }

    /// [`Slim::deserialize`] from a byte slice.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Value> {
        let mut input = bytes;
        self.deserialize(&mut input)
    }

    /// Run `f` against the batch registry, resetting it if `f` fails.
    fn with_batch<T>(&self, f: impl FnOnce(&mut TypeRegistry) -> Result<T>) -> Result<T> {
        let mut batch = self.batch.try_lock().ok_or(Error::BatchInUse)?;
        let before = batch.registry.len();
        match f(&mut batch.registry) {
            Ok(value) => {
                self.registered_new
                    .store(batch.registry.len() != before, Ordering::Release);
                Ok(value)
            }
            Err(e) => {
                log::warn!("[slim::engine] batch call failed, resetting registry: {}", e);
                batch.registry.reset();
                self.registered_new.store(false, Ordering::Release);
                Err(e)
            }
        }
    }
}

impl Default for Slim {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Slim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slim")
            .field("config", &self.config)
            .field("type_mode", &self.type_mode())
            .finish_non_exhaustive()
    }
}

static DEFAULT_ENGINE: OnceLock<Slim> = OnceLock::new();

fn default_engine() -> &'static Slim {
    DEFAULT_ENGINE.get_or_init(Slim::new)
}

/// Serialize with the process-wide default engine.
pub fn serialize<W: Write + ?Sized>(out: &mut W, root: &Value) -> Result<()> {
    default_engine().serialize(out, root)
}

/// Deserialize with the process-wide default engine.
pub fn deserialize<R: Read + ?Sized>(input: &mut R) -> Result<Value> {
    default_engine().deserialize(input)
}
