// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable little-endian writer.
//!
//! The writer never touches the caller's stream: a call encodes the whole
//! graph into this buffer and the orchestrator flushes it once at the end, so
//! a failed call leaves no partial output behind.

use super::token::{short_token, HandleToken};

/// Generate write methods for fixed-width primitives.
///
/// Each generated method appends `to_le_bytes()` of the value.
macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        #[inline]
        pub fn $name(&mut self, value: $type) {
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
    };
}

/// Buffered writer for one Slim call.
#[derive(Debug, Default)]
pub struct SlimWriter {
    buffer: Vec<u8>,
}

impl SlimWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Reuse an existing allocation (cleared first).
    pub fn from_buffer(mut buffer: Vec<u8>) -> Self {
        buffer.clear();
        Self { buffer }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Drop excess capacity above `limit` bytes.
    pub fn shrink_to(&mut self, limit: usize) {
        if self.buffer.capacity() > limit {
            self.buffer.shrink_to(limit);
        }
    }

    impl_write_le!(write_u8, u8);
    impl_write_le!(write_i8, i8);
    impl_write_le!(write_u16, u16);
    impl_write_le!(write_i16, i16);
    impl_write_le!(write_u32, u32);
    impl_write_le!(write_i32, i32);
    impl_write_le!(write_u64, u64);
    impl_write_le!(write_i64, i64);
    impl_write_le!(write_f32, f32);
    impl_write_le!(write_f64, f64);

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    #[inline]
    pub fn write_char(&mut self, value: char) {
        self.write_u32(value as u32);
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Unsigned LEB128.
    pub fn write_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buffer.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buffer.push(value as u8);
    }

    /// Length-prefixed UTF-8 (never null).
    pub fn write_str(&mut self, value: &str) {
        self.write_varint(value.len() as u64);
        self.buffer.extend_from_slice(value.as_bytes());
    }

    /// `varint(len + 1)` + UTF-8, `0` for null.
    pub fn write_nullable_str(&mut self, value: Option<&str>) {
        match value {
            None => self.write_varint(0),
            Some(s) => {
                self.write_varint(s.len() as u64 + 1);
                self.buffer.extend_from_slice(s.as_bytes());
            }
        }
    }

    /// Type-handle token (see [`HandleToken`]).
    pub fn write_token(&mut self, token: &HandleToken) {
        match token {
            HandleToken::Index(n) => match short_token(*n) {
                Some(bytes) => self.buffer.extend_from_slice(bytes),
                None => self.write_varint(u64::from(*n) << 1),
            },
            HandleToken::Name(name) => {
                self.write_varint(((name.len() as u64) << 1) | 1);
                self.buffer.extend_from_slice(name.as_bytes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fixed_width_little_endian() {
        let mut w = SlimWriter::new();
        w.write_u16(0xABCD);
        w.write_i32(-2);
        w.write_u64(0x0102_0304_0506_0708);
        assert_eq!(
            w.as_bytes(),
            &[
                0xCD, 0xAB, 0xFE, 0xFF, 0xFF, 0xFF, 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02,
                0x01
            ]
        );
    }

    #[test]
    fn test_varint_encoding() {
        let mut w = SlimWriter::new();
        w.write_varint(0);
        w.write_varint(127);
        w.write_varint(128);
        w.write_varint(300);
        assert_eq!(w.as_bytes(), &[0x00, 0x7F, 0x80, 0x01, 0xAC, 0x02]);
    }

    #[test]
    fn test_nullable_string() {
        let mut w = SlimWriter::new();
        w.write_nullable_str(None);
        w.write_nullable_str(Some(""));
        w.write_nullable_str(Some("ab"));
        assert_eq!(w.as_bytes(), &[0x00, 0x01, 0x03, b'a', b'b']);
    }

    #[test]
    fn test_token_index_and_name() {
        let mut w = SlimWriter::new();
        w.write_token(&HandleToken::Index(2));
        w.write_token(&HandleToken::Index(600));
        w.write_token(&HandleToken::Name(Arc::from("a.B")));
        // 600 << 1 = 1200 = 0x4B0 -> [0xB0, 0x09]
        assert_eq!(
            w.as_bytes(),
            &[0x04, 0xB0, 0x09, 0x07, b'a', b'.', b'B']
        );
    }

    #[test]
    fn test_from_buffer_clears() {
        let w = SlimWriter::from_buffer(vec![1, 2, 3]);
        assert_eq!(w.len(), 0);
    }
}
