// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lifecycle hooks attached to reference types.

use crate::error::{Error, Result};
use crate::value::ObjectRef;
use std::fmt;
use std::sync::Arc;

/// Error type returned by user hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// A lifecycle callback.
pub type HookFn = Arc<dyn Fn(&ObjectRef) -> core::result::Result<(), HookError> + Send + Sync>;

/// Point in a call at which a hook fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    /// Inline, before the object's body is written.
    BeforeSerialize,
    /// Inline, after the object's body is written.
    AfterSerialize,
    /// Inline, before the object's body is read (the object is still unpopulated).
    BeforeDeserialize,
    /// Deferred until every pool slot is resolved.
    AfterDeserialize,
    /// Deferred, runs after every `AfterDeserialize` hook of the call.
    Deserialized,
}

impl HookStage {
    pub const ALL: [HookStage; 5] = [
        Self::BeforeSerialize,
        Self::AfterSerialize,
        Self::BeforeDeserialize,
        Self::AfterDeserialize,
        Self::Deserialized,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::BeforeSerialize => "before-serialize",
            Self::AfterSerialize => "after-serialize",
            Self::BeforeDeserialize => "before-deserialize",
            Self::AfterDeserialize => "after-deserialize",
            Self::Deserialized => "deserialized",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hook set of one type, one optional callback per stage.
#[derive(Clone, Default)]
pub struct TypeHooks {
    slots: [Option<HookFn>; 5],
}

impl TypeHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stage: HookStage) -> Option<&HookFn> {
        self.slots[stage.index()].as_ref()
    }

    pub fn set(&mut self, stage: HookStage, hook: HookFn) {
        self.slots[stage.index()] = Some(hook);
    }

    /// Builder form of [`TypeHooks::set`].
    pub fn with<F>(mut self, stage: HookStage, hook: F) -> Self
    where
        F: Fn(&ObjectRef) -> core::result::Result<(), HookError> + Send + Sync + 'static,
    {
        self.set(stage, Arc::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Run the hook for `stage` on `object`, if one is installed.
    pub(crate) fn run(&self, stage: HookStage, object: &ObjectRef) -> Result<()> {
        match self.get(stage) {
            Some(hook) => invoke(stage, hook, object),
            None => Ok(()),
        }
    }
}

/// Invoke `hook`, mapping its failure into [`Error::Hook`].
pub(crate) fn invoke(stage: HookStage, hook: &HookFn, object: &ObjectRef) -> Result<()> {
    hook(object).map_err(|source| Error::Hook {
        stage,
        type_name: object.ty().name().to_string(),
        source,
    })
}

impl fmt::Debug for TypeHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let installed: Vec<&str> = HookStage::ALL
            .iter()
            .filter(|stage| self.get(**stage).is_some())
            .map(|stage| stage.name())
            .collect();
        f.debug_struct("TypeHooks")
            .field("installed", &installed)
            .finish()
    }
}
