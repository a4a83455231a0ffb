// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reference pool: per-call table of heap objects keyed by identity.
//!
//! Slot 0 is permanently null. The writer gives every pooled object a slot on
//! first sighting and reuses it on later sightings, which preserves sharing
//! and terminates cycles. The reader registers each new slot before decoding
//! its body, so a back-reference to an object still being filled resolves
//! to that same object.

mod fixup;
mod meta_handle;

pub use fixup::FixupQueue;
pub use meta_handle::{MetaHandle, MetaTag};

use crate::config::POOL_HASH_THRESHOLD;
use crate::error::{Error, Result};
use crate::types::NativeRefKind;
use crate::value::{ObjectRef, Value};
use std::collections::HashMap;

/// Identity-keyed slot table.
pub struct ReferencePool {
    slots: Vec<Option<ObjectRef>>,
    /// Identity -> slot, built once the pool outgrows linear scanning.
    index: Option<HashMap<usize, u32>>,
    /// Next slot whose body has not been encoded/decoded yet.
    cursor: usize,
    fixups: FixupQueue,
}

impl ReferencePool {
    pub fn new() -> Self {
        Self {
            slots: vec![None],
            index: None,
            cursor: 1,
            fixups: FixupQueue::new(),
        }
    }

    /// Number of slots, the null slot included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.len() <= 1
    }

    /// Index the next registered slot will get.
    pub fn next_index(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Slot of an already-pooled object.
    pub fn lookup(&self, object: &ObjectRef) -> Option<u32> {
        match &self.index {
            Some(index) => index.get(&object.identity()).copied(),
            None => self
                .slots
                .iter()
                .skip(1)
                .position(|slot| slot.as_ref().is_some_and(|o| o.ptr_eq(object)))
                .map(|pos| pos as u32 + 1),
        }
    }

    /// Slot of `object`, allocating one on first sighting.
    pub fn intern(&mut self, object: &ObjectRef) -> (u32, bool) {
        if let Some(index) = self.lookup(object) {
            return (index, false);
        }
        (self.push(object.clone()), true)
    }

    fn push(&mut self, object: ObjectRef) -> u32 {
        let index = self.slots.len() as u32;
        match &mut self.index {
            Some(map) => {
                map.insert(object.identity(), index);
            }
            None if self.slots.len() >= POOL_HASH_THRESHOLD => {
                let mut map = HashMap::with_capacity(self.slots.len() * 2);
                for (i, slot) in self.slots.iter().enumerate().skip(1) {
                    if let Some(o) = slot {
                        map.insert(o.identity(), i as u32);
                    }
                }
                map.insert(object.identity(), index);
                self.index = Some(map);
            }
            None => {}
        }
        self.slots.push(Some(object));
        index
    }

    /// Encode-side classification of a reference-typed value.
    pub fn meta_handle<'v>(&mut self, value: &'v Value) -> MetaHandle<'v> {
        match value {
            Value::Null => MetaHandle::Null,
            Value::String(s) => MetaHandle::Str(s),
            Value::Type(_) => MetaHandle::Native(NativeRefKind::Type, value),
            Value::Version(_) => MetaHandle::Native(NativeRefKind::Version, value),
            Value::Object(object) => {
                let (index, first) = self.intern(object);
                MetaHandle::Indexed { index, first }
            }
            _ => MetaHandle::Boxed(value),
        }
    }

    /// Decode side: object of an announced slot.
    pub fn get(&self, index: u32) -> Result<ObjectRef> {
        match self.slots.get(index as usize) {
            Some(Some(object)) => Ok(object.clone()),
            _ => Err(Error::DanglingReference(index)),
        }
    }

    /// Decode side: register a freshly allocated object, before its body is read.
    pub fn register(&mut self, index: u32, object: ObjectRef) -> Result<()> {
        let expected = self.next_index();
        if index != expected {
            return Err(Error::PoolOutOfOrder {
                expected,
                found: index,
            });
        }
        self.push(object);
        Ok(())
    }

    /// Next slot whose body is still outstanding.
    pub fn next_pending(&mut self) -> Option<(u32, ObjectRef)> {
        while self.cursor < self.slots.len() {
            let index = self.cursor;
            self.cursor += 1;
            if let Some(object) = &self.slots[index] {
                return Some((index as u32, object.clone()));
            }
        }
        None
    }

    pub fn fixups_mut(&mut self) -> &mut FixupQueue {
        &mut self.fixups
    }

    /// Run the deferred fixups of a decode.
    pub fn run_fixups(&mut self) -> Result<()> {
        self.fixups.run()
    }

    /// Drop every reference but keep the allocations.
    pub fn clear(&mut self) {
        self.slots.truncate(1);
        self.index = None;
        self.cursor = 1;
        self.fixups.clear();
    }

    /// Release the slot table if it grew above `limit` slots.
    pub fn shrink_to(&mut self, limit: usize) {
        if self.slots.capacity() > limit {
            self.slots.shrink_to(limit.max(1));
        }
    }
}

impl Default for ReferencePool {
    fn default() -> Self {
        Self::new()
    }
}
