// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for Slim operations.

use crate::types::{HookError, HookStage};
use crate::wire::WireError;

/// Errors returned by Slim operations.
///
/// Every failure escaping [`crate::Slim::serialize`] is wrapped exactly once in
/// [`Error::Serialization`]; every failure escaping
/// [`crate::Slim::deserialize`] in [`Error::Deserialization`]. The inner
/// error stays reachable through [`std::error::Error::source`] and
/// [`Error::root_cause`].
///
/// # Example
///
/// ```rust
/// use slim::{Error, Slim};
///
/// let err = Slim::new().from_bytes(&[0xFF, 0, 0, 0]).unwrap_err();
/// match err.root_cause() {
///     Error::BadHeader { found } => assert_eq!(found[0], 0xFF),
///     other => panic!("unexpected: {}", other),
/// }
/// ```
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Call Wrappers
    // ========================================================================
    /// Encoding the graph failed; `source` is the failure that aborted the call.
    Serialization { context: String, source: Box<Error> },
    /// Decoding the stream failed; `source` is the failure that aborted the call.
    Deserialization { context: String, source: Box<Error> },

    // ========================================================================
    // Type Errors
    // ========================================================================
    /// A type handle or type name cannot be resolved.
    InvalidTypeHandle(String),
    /// The type opted out of ever being serialized.
    SerializationProhibited(String),
    /// A type definition is malformed (bad name, self-containing struct, ...).
    InvalidTypeDefinition(String),
    /// A type with this name is already registered in the catalog.
    DuplicateType(String),

    // ========================================================================
    // Stream Corruption
    // ========================================================================
    /// Header bytes are not `00 00` + magic.
    BadHeader { found: [u8; 4] },
    /// Registry crosscheck block disagrees with the local registry state.
    RegistryMismatch {
        expected_count: u32,
        found_count: u32,
        expected_checksum: u64,
        found_checksum: u64,
    },
    /// Array rank above the ceiling (or zero).
    ArrayRankExceeded { rank: usize },
    /// Array element count above the ceiling.
    ArrayTooLarge { elements: u64 },
    /// Array descriptor string is malformed.
    InvalidArrayDescriptor(String),
    /// Pool reference to a slot that was never announced.
    DanglingReference(u32),
    /// New pool reference announced out of sequence.
    PoolOutOfOrder { expected: u32, found: u32 },
    /// Inline value nesting exceeded the configured depth.
    DepthExceeded { limit: usize },
    /// Low-level read failure (EOF, bad varint, bad UTF-8, unknown tag).
    Wire(WireError),

    // ========================================================================
    // Data Errors
    // ========================================================================
    /// Value does not match the declared type.
    TypeMismatch { expected: String, found: String },
    /// Field name unknown for the type.
    FieldNotFound { type_name: String, field: String },
    /// Direct assignment to a read-only field.
    ReadOnlyField { type_name: String, field: String },
    /// Array index outside the declared bounds.
    IndexOutOfBounds(String),
    /// A lifecycle hook returned an error.
    Hook {
        stage: HookStage,
        type_name: String,
        source: HookError,
    },
    /// A custom contract type failed to expose or rebuild its entries.
    Contract { type_name: String, message: String },

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// A batch-mode call is already running on this engine.
    BatchInUse,
    /// The caller's stream failed.
    Io(std::io::Error),
}

impl Error {
    /// Innermost error, skipping the call wrappers.
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Serialization { source, .. } | Error::Deserialization { source, .. } =
            current
        {
            current = source;
        }
        current
    }

    /// `true` for [`Error::Serialization`].
    pub fn is_serialization(&self) -> bool {
        matches!(self, Error::Serialization { .. })
    }

    /// `true` for [`Error::Deserialization`].
    pub fn is_deserialization(&self) -> bool {
        matches!(self, Error::Deserialization { .. })
    }

    /// Wrap in [`Error::Serialization`] unless already wrapped.
    pub(crate) fn in_serialization(self, context: impl Into<String>) -> Self {
        if self.is_serialization() {
            self
        } else {
            Error::Serialization {
                context: context.into(),
                source: Box::new(self),
            }
        }
    }

    /// Wrap in [`Error::Deserialization`] unless already wrapped.
    pub(crate) fn in_deserialization(self, context: impl Into<String>) -> Self {
        if self.is_deserialization() {
            self
        } else {
            Error::Deserialization {
                context: context.into(),
                source: Box::new(self),
            }
        }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl std::fmt::Display for Error {
    // @audit-ok: Simple pattern matching - error message dispatch table
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Wrappers
            Error::Serialization { context, source } => {
                write!(f, "Serialization failed ({}): {}", context, source)
            }
            Error::Deserialization { context, source } => {
                write!(f, "Deserialization failed ({}): {}", context, source)
            }
            // Types
            Error::InvalidTypeHandle(handle) => write!(f, "Invalid type handle: {}", handle),
            Error::SerializationProhibited(name) => {
                write!(f, "Type `{}` is marked non-serializable", name)
            }
            Error::InvalidTypeDefinition(msg) => write!(f, "Invalid type definition: {}", msg),
            Error::DuplicateType(name) => write!(f, "Type `{}` is already registered", name),
            // Corruption
            Error::BadHeader { found } => write!(
                f,
                "Bad stream header: {:02X} {:02X} {:02X} {:02X}",
                found[0], found[1], found[2], found[3]
            ),
            Error::RegistryMismatch {
                expected_count,
                found_count,
                expected_checksum,
                found_checksum,
            } => write!(
                f,
                "Type registry mismatch: local {} types / 0x{:016X}, stream {} types / 0x{:016X}",
                expected_count, expected_checksum, found_count, found_checksum
            ),
            Error::ArrayRankExceeded { rank } => write!(
                f,
                "Array rank {} outside 1..={}",
                rank,
                crate::config::MAX_ARRAY_RANK
            ),
            Error::ArrayTooLarge { elements } => write!(
                f,
                "Array of {} elements exceeds the {} element ceiling",
                elements,
                crate::config::MAX_ARRAY_ELEMENTS
            ),
            Error::InvalidArrayDescriptor(desc) => {
                write!(f, "Invalid array descriptor: {:?}", desc)
            }
            Error::DanglingReference(index) => {
                write!(f, "Reference to unknown pool slot {}", index)
            }
            Error::PoolOutOfOrder { expected, found } => write!(
                f,
                "Pool slot announced out of order: expected {}, found {}",
                expected, found
            ),
            Error::DepthExceeded { limit } => {
                write!(f, "Value nesting exceeds depth limit {}", limit)
            }
            Error::Wire(e) => write!(f, "Wire error: {}", e),
            // Data
            Error::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, found)
            }
            Error::FieldNotFound { type_name, field } => {
                write!(f, "Type `{}` has no field `{}`", type_name, field)
            }
            Error::ReadOnlyField { type_name, field } => {
                write!(f, "Field `{}.{}` is read-only", type_name, field)
            }
            Error::IndexOutOfBounds(msg) => write!(f, "Index out of bounds: {}", msg),
            Error::Hook {
                stage,
                type_name,
                source,
            } => write!(f, "{} hook of `{}` failed: {}", stage, type_name, source),
            Error::Contract { type_name, message } => {
                write!(f, "Custom contract of `{}` failed: {}", type_name, message)
            }
            // Engine
            Error::BatchInUse => write!(f, "A batch-mode call is already in progress"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Serialization { source, .. } | Error::Deserialization { source, .. } => {
                Some(source.as_ref())
            }
            Error::Wire(e) => Some(e),
            Error::Hook { source, .. } => Some(source.as_ref()),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WireError> for Error {
    fn from(e: WireError) -> Self {
        Error::Wire(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result alias for Slim operations.
pub type Result<T> = core::result::Result<T, Error>;
