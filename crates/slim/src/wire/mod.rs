// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive writer/reader for the Slim wire format.
//!
//! Everything above this layer (registry, pool, schemas) talks to the stream
//! exclusively through [`SlimWriter`] and [`SlimReader`]. Fixed-width values
//! are little-endian; lengths, counts and handles are unsigned LEB128.

pub mod reader;
pub mod token;
pub mod writer;

pub use reader::SlimReader;
pub use token::HandleToken;
pub use writer::SlimWriter;

use std::fmt;

/// Low-level stream error, tagged with the byte offset where it happened.
#[derive(Debug)]
pub enum WireError {
    UnexpectedEof { offset: u64 },
    VarintOverflow { offset: u64 },
    InvalidUtf8 { offset: u64 },
    InvalidChar { offset: u64, value: u32 },
    InvalidTag { offset: u64, tag: u8 },
    Io { offset: u64, source: std::io::Error },
}

impl WireError {
    /// Byte offset in the stream where the error was detected.
    pub fn offset(&self) -> u64 {
        match self {
            WireError::UnexpectedEof { offset }
            | WireError::VarintOverflow { offset }
            | WireError::InvalidUtf8 { offset }
            | WireError::InvalidChar { offset, .. }
            | WireError::InvalidTag { offset, .. }
            | WireError::Io { offset, .. } => *offset,
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::UnexpectedEof { offset } => {
                write!(f, "unexpected end of stream at offset {}", offset)
            }
            WireError::VarintOverflow { offset } => {
                write!(f, "varint overflow at offset {}", offset)
            }
            WireError::InvalidUtf8 { offset } => {
                write!(f, "invalid UTF-8 string at offset {}", offset)
            }
            WireError::InvalidChar { offset, value } => {
                write!(f, "invalid char scalar 0x{:X} at offset {}", value, offset)
            }
            WireError::InvalidTag { offset, tag } => {
                write!(f, "unknown tag 0x{:02X} at offset {}", tag, offset)
            }
            WireError::Io { offset, source } => {
                write!(f, "I/O error at offset {}: {}", offset, source)
            }
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WireError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type WireResult<T> = core::result::Result<T, WireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_error_display_variants() {
        let err = WireError::UnexpectedEof { offset: 12 };
        assert_eq!(err.to_string(), "unexpected end of stream at offset 12");

        let err = WireError::InvalidTag { offset: 4, tag: 0x2A };
        assert_eq!(err.to_string(), "unknown tag 0x2A at offset 4");

        let err = WireError::InvalidChar {
            offset: 9,
            value: 0xD800,
        };
        assert_eq!(err.to_string(), "invalid char scalar 0xD800 at offset 9");
        assert_eq!(err.offset(), 9);
    }
}
