// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide schema cache.
//!
//! Readers load an immutable snapshot through [`ArcSwap`] and never block.
//! A miss compiles the schema outside any lock, then publishes a new
//! snapshot under a writer mutex; when two threads race on the same type,
//! the first published schema wins and both callers get it.

use super::compile::compile;
use super::TypeSchema;
use crate::error::Result;
use crate::types::SlimType;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

type SchemaMap = HashMap<Arc<str>, Arc<TypeSchema>>;

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Copy-on-write map of compiled schemas.
pub struct SchemaCache {
    snapshot: ArcSwap<SchemaMap>,
    write_lock: Mutex<()>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SchemaCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(HashMap::new()),
            write_lock: Mutex::new(()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached schema, if `name` was compiled already.
    pub fn get(&self, name: &str) -> Option<Arc<TypeSchema>> {
        self.snapshot.load().get(name).cloned()
    }

    pub fn get_or_compile(&self, ty: &SlimType) -> Result<Arc<TypeSchema>> {
        if let Some(hit) = self.peek(ty) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        // Compile failures are not cached.
        let compiled = Arc::new(compile(ty)?);
        self.misses.fetch_add(1, Ordering::Relaxed);

        let _guard = self.write_lock.lock();
        let current = self.snapshot.load_full();
        if let Some(existing) = current.get(ty.name()) {
            if existing.ty().ptr_eq(ty) {
                return Ok(Arc::clone(existing));
            }
        }
        let mut next: SchemaMap = (*current).clone();
        next.insert(Arc::clone(ty.name_arc()), Arc::clone(&compiled));
        self.snapshot.store(Arc::new(next));
        Ok(compiled)
    }

    /// Snapshot hit, provided it was compiled from this exact definition.
    fn peek(&self, ty: &SlimType) -> Option<Arc<TypeSchema>> {
        let snapshot = self.snapshot.load();
        let schema = snapshot.get(ty.name())?;
        schema.ty().ptr_eq(ty).then(|| Arc::clone(schema))
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        LookupStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

static SCHEMA_CACHE: OnceLock<SchemaCache> = OnceLock::new();

/// The process-wide cache used by every engine.
pub fn schema_cache() -> &'static SchemaCache {
    SCHEMA_CACHE.get_or_init(SchemaCache::new)
}
