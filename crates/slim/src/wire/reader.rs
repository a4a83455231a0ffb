// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked little-endian reader over a caller-owned stream.
//!
//! The reader never reads ahead: it consumes exactly the bytes of one Slim
//! message, so several messages may be read back-to-back from one stream.

use super::token::HandleToken;
use super::{WireError, WireResult};
use std::io::{ErrorKind, Read};
use std::sync::Arc;

/// Generate read methods for fixed-width primitives.
///
/// Each generated method:
/// 1. Reads exactly N bytes (EOF -> `WireError::UnexpectedEof`)
/// 2. Converts bytes to value via `from_le_bytes()`
/// 3. Advances offset
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        #[inline]
        pub fn $name(&mut self) -> WireResult<$type> {
            let mut bytes = [0u8; $size];
            self.fill(&mut bytes)?;
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Chunk size used when reading length-prefixed payloads, so a corrupt length
/// never triggers a large up-front allocation.
const READ_CHUNK: usize = 4096;

/// Reader for one Slim call.
pub struct SlimReader<'r> {
    inner: &'r mut dyn Read,
    offset: u64,
}

impl<'r> SlimReader<'r> {
    pub fn new(inner: &'r mut dyn Read) -> Self {
        Self { inner, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn fill(&mut self, buf: &mut [u8]) -> WireResult<()> {
        let offset = self.offset;
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(WireError::UnexpectedEof { offset })
            }
            Err(source) => Err(WireError::Io { offset, source }),
        }
    }

    impl_read_le!(read_u8, u8, 1);
    impl_read_le!(read_i8, i8, 1);
    impl_read_le!(read_u16, u16, 2);
    impl_read_le!(read_i16, i16, 2);
    impl_read_le!(read_u32, u32, 4);
    impl_read_le!(read_i32, i32, 4);
    impl_read_le!(read_u64, u64, 8);
    impl_read_le!(read_i64, i64, 8);
    impl_read_le!(read_f32, f32, 4);
    impl_read_le!(read_f64, f64, 8);

    pub fn read_bool(&mut self) -> WireResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_char(&mut self) -> WireResult<char> {
        let offset = self.offset;
        let value = self.read_u32()?;
        char::from_u32(value).ok_or(WireError::InvalidChar { offset, value })
    }

    pub fn read_array<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        let mut bytes = [0u8; N];
        self.fill(&mut bytes)?;
        Ok(bytes)
    }

    /// Read exactly `len` bytes, growing the buffer chunk by chunk.
    pub fn read_bytes(&mut self, len: usize) -> WireResult<Vec<u8>> {
        let mut out = Vec::with_capacity(len.min(READ_CHUNK));
        let mut chunk = [0u8; READ_CHUNK];
        let mut remaining = len;
        while remaining > 0 {
            let step = remaining.min(READ_CHUNK);
            self.fill(&mut chunk[..step])?;
            out.extend_from_slice(&chunk[..step]);
            remaining -= step;
        }
        Ok(out)
    }

    /// Unsigned LEB128, at most 10 bytes.
    pub fn read_varint(&mut self) -> WireResult<u64> {
        let start = self.offset;
        let mut result: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            if shift == 63 && byte > 1 {
                return Err(WireError::VarintOverflow { offset: start });
            }
            result |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 63 {
                return Err(WireError::VarintOverflow { offset: start });
            }
        }
    }

    /// LEB128 that must fit a `u32`.
    pub fn read_varint_u32(&mut self) -> WireResult<u32> {
        let offset = self.offset;
        let value = self.read_varint()?;
        u32::try_from(value).map_err(|_| WireError::VarintOverflow { offset })
    }

    fn read_utf8(&mut self, len: usize) -> WireResult<String> {
        let offset = self.offset;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8 { offset })
    }

    /// Length-prefixed UTF-8 (never null).
    pub fn read_str(&mut self) -> WireResult<String> {
        let len = self.read_varint_u32()? as usize;
        self.read_utf8(len)
    }

    /// `varint(len + 1)` + UTF-8, `0` for null.
    pub fn read_nullable_str(&mut self) -> WireResult<Option<String>> {
        match self.read_varint_u32()? {
            0 => Ok(None),
            n => self.read_utf8(n as usize - 1).map(Some),
        }
    }

    /// Type-handle token (see [`HandleToken`]).
    pub fn read_token(&mut self) -> WireResult<HandleToken> {
        let offset = self.offset;
        let raw = self.read_varint()?;
        let payload = u32::try_from(raw >> 1).map_err(|_| WireError::VarintOverflow { offset })?;
        if raw & 1 == 0 {
            Ok(HandleToken::Index(payload))
        } else {
            let name = self.read_utf8(payload as usize)?;
            Ok(HandleToken::Name(Arc::from(name)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::SlimWriter;

    #[test]
    fn test_reader_roundtrips_writer_output() {
        let mut w = SlimWriter::new();
        w.write_u8(0xAB);
        w.write_i16(-300);
        w.write_f64(std::f64::consts::PI);
        w.write_char('λ');
        w.write_varint(u64::MAX);
        w.write_nullable_str(Some("héllo"));
        w.write_nullable_str(None);
        w.write_token(&HandleToken::Index(513));
        w.write_token(&HandleToken::Name(Arc::from("demo.Node")));

        let bytes = w.into_buffer();
        let mut src = bytes.as_slice();
        let mut r = SlimReader::new(&mut src);
        assert_eq!(r.read_u8().unwrap(), 0xAB);
        assert_eq!(r.read_i16().unwrap(), -300);
        assert_eq!(r.read_f64().unwrap(), std::f64::consts::PI);
        assert_eq!(r.read_char().unwrap(), 'λ');
        assert_eq!(r.read_varint().unwrap(), u64::MAX);
        assert_eq!(r.read_nullable_str().unwrap().as_deref(), Some("héllo"));
        assert_eq!(r.read_nullable_str().unwrap(), None);
        assert_eq!(r.read_token().unwrap(), HandleToken::Index(513));
        assert_eq!(
            r.read_token().unwrap(),
            HandleToken::Name(Arc::from("demo.Node"))
        );
        assert_eq!(r.offset(), bytes.len() as u64);
    }

    #[test]
    fn test_eof_reports_offset() {
        let bytes = [0x01u8, 0x02];
        let mut src = &bytes[..];
        let mut r = SlimReader::new(&mut src);
        r.read_u8().unwrap();
        match r.read_u32() {
            Err(WireError::UnexpectedEof { offset }) => assert_eq!(offset, 1),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_varint_overflow_rejected() {
        let bytes = [0xFFu8; 11];
        let mut src = &bytes[..];
        let mut r = SlimReader::new(&mut src);
        assert!(matches!(
            r.read_varint(),
            Err(WireError::VarintOverflow { offset: 0 })
        ));
    }

    #[test]
    fn test_invalid_char_rejected() {
        let bytes = 0xD800u32.to_le_bytes();
        let mut src = &bytes[..];
        let mut r = SlimReader::new(&mut src);
        assert!(matches!(
            r.read_char(),
            Err(WireError::InvalidChar { value: 0xD800, .. })
        ));
    }

    #[test]
    fn test_huge_length_fails_without_allocating() {
        // Claims a 4 GiB string but carries 3 bytes.
        let mut w = SlimWriter::new();
        w.write_varint(u64::from(u32::MAX));
        w.write_bytes(b"abc");
        let bytes = w.into_buffer();
        let mut src = bytes.as_slice();
        let mut r = SlimReader::new(&mut src);
        assert!(matches!(
            r.read_nullable_str(),
            Err(WireError::UnexpectedEof { .. })
        ));
    }
}
