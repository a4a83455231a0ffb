// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Thread-local reusable call state.
//!
//! One [`Scratch`] per thread is lent to each call and returned afterwards,
//! cleared but with its allocations intact. A call made while the thread's
//! scratch is already lent out (a hook serializing something, for example)
//! gets a fresh instance instead.

use crate::config::SCRATCH_RETAIN_BYTES;
use crate::pool::ReferencePool;
use crate::registry::TypeRegistry;
use crate::wire::SlimWriter;
use std::cell::RefCell;

/// Pool slots kept across calls; larger tables are released.
const POOL_RETAIN_SLOTS: usize = 4096;

pub(crate) struct Scratch {
    pub(crate) writer: SlimWriter,
    pub(crate) registry: TypeRegistry,
    pub(crate) pool: ReferencePool,
}

impl Scratch {
    fn new() -> Self {
        Self {
            writer: SlimWriter::new(),
            registry: TypeRegistry::new(),
            pool: ReferencePool::new(),
        }
    }

    /// Drop every object reference and oversized buffer.
    fn recycle(&mut self) {
        self.writer.clear();
        self.writer.shrink_to(SCRATCH_RETAIN_BYTES);
        self.pool.clear();
        self.pool.shrink_to(POOL_RETAIN_SLOTS);
        self.registry.reset();
    }
}

thread_local! {
    static SCRATCH: RefCell<Option<Scratch>> = const { RefCell::new(None) };
}

/// Run `f` with this thread's scratch, or a fresh one if it is lent out.
pub(crate) fn with_scratch<T>(f: impl FnOnce(&mut Scratch) -> T) -> T {
    let cached = SCRATCH.with(|cell| cell.borrow_mut().take());
    let mut scratch = match cached {
        Some(scratch) => scratch,
        None => {
            log::trace!("[slim::engine] allocating call scratch");
            Scratch::new()
        }
    };

    let out = f(&mut scratch);

    scratch.recycle();
    SCRATCH.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(scratch);
        }
    });
    out
}
