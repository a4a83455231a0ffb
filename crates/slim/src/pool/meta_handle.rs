// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! MetaHandles: how a reference-typed slot is written.

use crate::types::NativeRefKind;
use crate::value::Value;

/// How a reference-typed value is encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetaHandle<'v> {
    Null,
    /// Inline string.
    Str(&'v str),
    /// Inline boxed value type (primitive, enum, struct held as `object`).
    Boxed(&'v Value),
    /// Inline format-native reference (`type`, `version`).
    Native(NativeRefKind, &'v Value),
    /// Pool slot; `first` when this is the slot's first sighting in the call.
    Indexed { index: u32, first: bool },
}

impl MetaHandle<'_> {
    pub fn tag(&self) -> MetaTag {
        match self {
            MetaHandle::Null => MetaTag::Null,
            MetaHandle::Str(_) => MetaTag::Str,
            MetaHandle::Boxed(_) => MetaTag::Boxed,
            MetaHandle::Native(..) => MetaTag::Native,
            MetaHandle::Indexed { first: false, .. } => MetaTag::Ref,
            MetaHandle::Indexed { first: true, .. } => MetaTag::NewRef,
        }
    }
}

/// Tag byte leading every MetaHandle on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MetaTag {
    Null = 0,
    /// `varint len` + UTF-8.
    Str = 1,
    /// Type token + inline value.
    Boxed = 2,
    /// Native kind byte + payload.
    Native = 3,
    /// `varint index` of an announced slot.
    Ref = 4,
    /// `varint index` + type payload of a new slot.
    NewRef = 5,
}

impl MetaTag {
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Null),
            1 => Some(Self::Str),
            2 => Some(Self::Boxed),
            3 => Some(Self::Native),
            4 => Some(Self::Ref),
            5 => Some(Self::NewRef),
            _ => None,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_bytes() {
        for raw in 0..=5u8 {
            assert_eq!(MetaTag::from_u8(raw).map(MetaTag::as_u8), Some(raw));
        }
        assert_eq!(MetaTag::from_u8(6), None);
        assert_eq!(
            MetaHandle::Indexed {
                index: 1,
                first: true
            }
            .tag(),
            MetaTag::NewRef
        );
        assert_eq!(MetaHandle::Str("x").tag(), MetaTag::Str);
    }
}
