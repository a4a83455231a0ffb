// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Slim Global Configuration - Single Source of Truth
//!
//! This module centralizes ALL wire constants and runtime configuration.
//! **NEVER hardcode elsewhere!**
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: Compile-time constants (header magic, ceilings, thresholds)
//! - **Level 2 (Dynamic)**: [`SlimConfig`] for per-engine settings (crosscheck, type mode, depth)
//!
//! # Example
//!
//! ```rust
//! use slim::config::{SlimConfig, TypeMode, MAX_ARRAY_RANK};
//!
//! let config = SlimConfig::new()
//!     .with_crosscheck(false)
//!     .with_type_mode(TypeMode::Batch);
//! assert!(!config.crosscheck);
//! assert_eq!(MAX_ARRAY_RANK, 37);
//! ```

// =======================================================================
// Stream Header
// =======================================================================

/// Header magic, written little-endian after two zero bytes.
///
/// On the wire: `00 00 53 4D`.
pub const HEADER_MAGIC: u16 = 0x4D53;

/// Header length in bytes (two zero bytes + 2-byte magic).
pub const HEADER_LEN: usize = 4;

// =======================================================================
// Type Registry
// =======================================================================

/// Number of reserved registry slots (null marker, `object`, `object[]`, `byte[]`).
pub const RESERVED_TYPE_SLOTS: u32 = 4;

/// Handle of the null-type marker.
pub const NULL_TYPE_HANDLE: u32 = 0;

/// Handle of `object`.
pub const OBJECT_TYPE_HANDLE: u32 = 1;

/// Handle of `object[]` (also used by the `$2|<length>` array shorthand).
pub const OBJECT_ARRAY_TYPE_HANDLE: u32 = 2;

/// Handle of `byte[]`.
pub const BYTE_ARRAY_TYPE_HANDLE: u32 = 3;

/// Handles below this bound are emitted from a precomputed token table.
pub const SHORT_TOKEN_COUNT: usize = 512;

/// FNV-1a 64-bit offset basis (registry checksum seed).
pub const CHECKSUM_SEED: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV 64-bit prime (registry checksum multiplier).
pub const CHECKSUM_PRIME: u64 = 0x0000_0100_0000_01b3;

// =======================================================================
// Reference Pool
// =======================================================================

/// Pool size past which identity lookup switches from linear scan to a hash index.
pub const POOL_HASH_THRESHOLD: usize = 32;

/// Scratch buffers above this capacity are shrunk when returned to the thread cache.
pub const SCRATCH_RETAIN_BYTES: usize = 1 << 20;

// =======================================================================
// Array Ceilings
// =======================================================================

/// Maximum array rank accepted on either side of the wire.
pub const MAX_ARRAY_RANK: usize = 37;

/// Per-rank element allowance (10 Mi).
pub const ARRAY_ELEMENTS_PER_RANK: u64 = 10 * 1024 * 1024;

/// Maximum total element count of a single array (37 x 10 Mi = 387,973,120).
pub const MAX_ARRAY_ELEMENTS: u64 = MAX_ARRAY_RANK as u64 * ARRAY_ELEMENTS_PER_RANK;

/// Maximum number of bracket groups in one array type name (`int[][,][]` has three).
pub const MAX_ARRAY_NESTING: usize = MAX_ARRAY_RANK;

/// Maximum length in bytes of a type name resolved through the catalog.
pub const MAX_TYPE_NAME_LEN: usize = 4096;

// =======================================================================
// Decoder Limits
// =======================================================================

/// Default bound on nested value recursion (structs inside structs, boxed values).
pub const DEFAULT_MAX_DEPTH: usize = 256;

// =======================================================================
// Runtime Configuration
// =======================================================================

/// Lifetime of the type registry across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeMode {
    /// Fresh registry for every call; safe for concurrent calls.
    #[default]
    Default,
    /// Registry persists across calls on one engine until `reset_batch()`.
    ///
    /// Not for concurrent use: a second call while one is running fails with
    /// [`crate::Error::BatchInUse`].
    Batch,
}

impl TypeMode {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            TypeMode::Default => 0,
            TypeMode::Batch => 1,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        if raw == 1 {
            TypeMode::Batch
        } else {
            TypeMode::Default
        }
    }
}

/// Per-engine settings.
///
/// Writer and reader must agree on `crosscheck`: the block is not
/// self-announcing in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlimConfig {
    /// Emit/expect the registry crosscheck block (type count + checksum).
    pub crosscheck: bool,
    /// Initial registry lifetime mode.
    pub type_mode: TypeMode,
    /// Maximum nesting of inline values during decode and encode.
    pub max_depth: usize,
}

impl SlimConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            crosscheck: true,
            type_mode: TypeMode::Default,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub const fn with_crosscheck(mut self, enabled: bool) -> Self {
        self.crosscheck = enabled;
        self
    }

    #[must_use]
    pub const fn with_type_mode(mut self, mode: TypeMode) -> Self {
        self.type_mode = mode;
        self
    }

    /// Set the nesting bound (clamped to at least 1).
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = if depth == 0 { 1 } else { depth };
        self
    }
}

impl Default for SlimConfig {
    fn default() -> Self {
        Self::new()
    }
}
