// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-call (or per-batch) type registry.
//!
//! Assigns each type a small handle on first use. Writer and reader grow
//! their registries in the same order, so the full type name crosses the
//! wire only once per registry lifetime and every later reference is an
//! integer.
//!
//! Slots 0..=3 are reserved: the null marker, `object`, `object[]`, `byte[]`.

use crate::config::{CHECKSUM_PRIME, CHECKSUM_SEED, NULL_TYPE_HANDLE, RESERVED_TYPE_SLOTS};
use crate::error::{Error, Result};
use crate::types::{catalog, SlimType};
use crate::wire::HandleToken;
use std::collections::HashMap;
use std::sync::Arc;

/// Handle <-> type table with a running checksum.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    slots: Vec<Option<SlimType>>,
    by_name: HashMap<Arc<str>, u32>,
    checksum: u64,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            slots: Vec::with_capacity(16),
            by_name: HashMap::with_capacity(16),
            checksum: CHECKSUM_SEED,
        };
        registry.seed();
        registry
    }

    fn seed(&mut self) {
        self.slots.push(None);
        let catalog = catalog();
        for ty in [catalog.object(), catalog.object_array(), catalog.byte_array()] {
            self.add(ty);
        }
        debug_assert_eq!(self.len(), RESERVED_TYPE_SLOTS);
    }

    /// Register `ty` if new; returns its handle either way.
    pub fn add(&mut self, ty: &SlimType) -> u32 {
        if let Some(&handle) = self.by_name.get(ty.name()) {
            return handle;
        }
        let handle = self.slots.len() as u32;
        self.checksum = checksum_step(self.checksum, ty.name());
        self.by_name.insert(ty.name_arc().clone(), handle);
        self.slots.push(Some(ty.clone()));
        handle
    }

    /// Handle of an already-registered type.
    pub fn handle_of(&self, ty: &SlimType) -> Option<u32> {
        self.by_name.get(ty.name()).copied()
    }

    /// `Index` on a hit; otherwise registers the type and returns its `Name`.
    pub fn handle_for(&mut self, ty: &SlimType) -> HandleToken {
        match self.handle_of(ty) {
            Some(handle) => HandleToken::Index(handle),
            None => {
                self.add(ty);
                HandleToken::Name(ty.name_arc().clone())
            }
        }
    }

    /// Resolve a token read from the stream.
    ///
    /// `Index(0)` is the null marker. A `Name` is looked up in the catalog
    /// and registered, mirroring the writer.
    pub fn resolve(&mut self, token: &HandleToken) -> Result<Option<SlimType>> {
        match token {
            HandleToken::Index(NULL_TYPE_HANDLE) => Ok(None),
            HandleToken::Index(handle) => match self.slots.get(*handle as usize) {
                Some(Some(ty)) => Ok(Some(ty.clone())),
                _ => Err(Error::InvalidTypeHandle(format!(
                    "${} (registry holds {} types)",
                    handle,
                    self.slots.len()
                ))),
            },
            HandleToken::Name(name) => {
                if let Some(&handle) = self.by_name.get(&**name) {
                    return Ok(self.slots[handle as usize].clone());
                }
                let ty = catalog().resolve(name)?;
                self.add(&ty);
                Ok(Some(ty))
            }
        }
    }

    /// Type registered under `handle`.
    pub fn get(&self, handle: u32) -> Option<&SlimType> {
        self.slots.get(handle as usize)?.as_ref()
    }

    /// Number of slots, reserved ones included.
    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    /// `true` when only the reserved slots are present.
    pub fn is_pristine(&self) -> bool {
        self.len() == RESERVED_TYPE_SLOTS
    }

    pub fn checksum(&self) -> u64 {
        self.checksum
    }

    /// Back to the reserved slots only.
    pub fn reset(&mut self) {
        if self.is_pristine() {
            return;
        }
        self.slots.clear();
        self.by_name.clear();
        self.checksum = CHECKSUM_SEED;
        self.seed();
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One checksum step over a type name: length and first/last bytes, mixed
/// FNV style.
fn checksum_step(checksum: u64, name: &str) -> u64 {
    let bytes = name.as_bytes();
    let first = u64::from(bytes.first().copied().unwrap_or(0));
    let last = u64::from(bytes.last().copied().unwrap_or(0));
    let contribution = ((bytes.len() as u64) << 32) | (first << 8) | last;
    checksum.wrapping_mul(CHECKSUM_PRIME).wrapping_add(contribution)
}
