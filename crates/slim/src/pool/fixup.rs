// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deferred work run once every pool slot of a decode is resolved.
//!
//! Order is fixed: custom-contract construction, then after-deserialize
//! hooks, then deserialization-complete hooks. Within a queue, entries run in
//! pool-slot order.

use crate::error::Result;
use crate::types::{invoke_hook, CustomFactory, HookFn, HookStage};
use crate::value::{ObjectBody, ObjectRef, SerializationInfo};

struct PendingContract {
    object: ObjectRef,
    info: SerializationInfo,
    factory: CustomFactory,
}

/// Deferred fixups of one decode call.
#[derive(Default)]
pub struct FixupQueue {
    contracts: Vec<PendingContract>,
    after_deserialize: Vec<(ObjectRef, HookFn)>,
    deserialized: Vec<(ObjectRef, HookFn)>,
}

impl FixupQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defer construction of a custom-contract object from its entry bag.
    pub fn push_contract(&mut self, object: ObjectRef, info: SerializationInfo, factory: CustomFactory) {
        self.contracts.push(PendingContract {
            object,
            info,
            factory,
        });
    }

    /// Defer a hook; only the two deferred stages are queued.
    pub fn push_hook(&mut self, stage: HookStage, object: ObjectRef, hook: HookFn) {
        match stage {
            HookStage::AfterDeserialize => self.after_deserialize.push((object, hook)),
            HookStage::Deserialized => self.deserialized.push((object, hook)),
            _ => log::warn!("[slim::pool] {} hooks run inline, not deferred", stage),
        }
    }

    pub fn len(&self) -> usize {
        self.contracts.len() + self.after_deserialize.len() + self.deserialized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run and drain every queue in order. Stops at the first failure.
    pub fn run(&mut self) -> Result<()> {
        let contracts = std::mem::take(&mut self.contracts);
        let after = std::mem::take(&mut self.after_deserialize);
        let done = std::mem::take(&mut self.deserialized);
        if !contracts.is_empty() || !after.is_empty() || !done.is_empty() {
            log::trace!(
                "[slim::pool] fixups: {} contracts, {} after-deserialize, {} deserialized",
                contracts.len(),
                after.len(),
                done.len()
            );
        }

        for pending in contracts {
            let custom = (pending.factory)(&pending.info)?;
            pending.object.replace_body(ObjectBody::Custom(custom));
        }
        for (object, hook) in &after {
            invoke_hook(HookStage::AfterDeserialize, hook, object)?;
        }
        for (object, hook) in &done {
            invoke_hook(HookStage::Deserialized, hook, object)?;
        }
        Ok(())
    }

    /// Drop everything queued without running it.
    pub fn clear(&mut self) {
        self.contracts.clear();
        self.after_deserialize.clear();
        self.deserialized.clear();
    }
}
