// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Format-native primitive and reference kinds.

/// Primitive type kinds.
///
/// Every kind has a fixed wire width. Names are the built-in catalog names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// Unicode scalar value, 4 bytes on the wire.
    Char,
    /// 16 raw bytes.
    Guid,
    /// Signed 64-bit tick count.
    Timestamp,
    /// Signed 64-bit tick count.
    Duration,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 15] = [
        Self::Bool,
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Char,
        Self::Guid,
        Self::Timestamp,
        Self::Duration,
    ];

    /// Catalog name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "sbyte",
            Self::U8 => "byte",
            Self::I16 => "short",
            Self::U16 => "ushort",
            Self::I32 => "int",
            Self::U32 => "uint",
            Self::I64 => "long",
            Self::U64 => "ulong",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::Char => "char",
            Self::Guid => "guid",
            Self::Timestamp => "timestamp",
            Self::Duration => "duration",
        }
    }

    /// Get the size in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 | Self::Char => 4,
            Self::I64 | Self::U64 | Self::F64 | Self::Timestamp | Self::Duration => 8,
            Self::Guid => 16,
        }
    }

    /// Integer kinds usable as an enum's underlying type.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::U8
                | Self::I16
                | Self::U16
                | Self::I32
                | Self::U32
                | Self::I64
                | Self::U64
        )
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Reference types the format encodes inline instead of pooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeRefKind {
    /// A type handle, payload is a type token.
    Type,
    /// Four-part version number, payload is 4 x `i32`.
    Version,
}

impl NativeRefKind {
    pub const ALL: [NativeRefKind; 2] = [Self::Type, Self::Version];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Version => "version",
        }
    }

    /// Kind byte written after the native MetaHandle tag.
    pub const fn code(self) -> u8 {
        match self {
            Self::Type => 1,
            Self::Version => 2,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Type),
            2 => Some(Self::Version),
            _ => None,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}
