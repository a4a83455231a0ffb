// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-handle tokens ("VarIntStr").
//!
//! A token is either a small integer (registry hit) or a fully-qualified type
//! name (first use in the current registry lifetime). On the wire both share a
//! single LEB128 prefix whose low bit discriminates them:
//!
//! ```text
//! varint(n << 1)            -> Index(n)
//! varint(len << 1 | 1) name -> Name(name)
//! ```

use crate::config::SHORT_TOKEN_COUNT;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Compact stand-in for a type in the stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandleToken {
    /// Registry index of an already-announced type.
    Index(u32),
    /// Fully-qualified name, announcing a type for the first time.
    Name(Arc<str>),
}

impl HandleToken {
    /// Textual form used inside array descriptors: `$<n>` or the type name.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            HandleToken::Index(n) => Cow::Owned(format!("${}", n)),
            HandleToken::Name(name) => Cow::Borrowed(name),
        }
    }

    /// Parse the textual form produced by [`HandleToken::render`].
    ///
    /// Returns `None` for an empty string or a malformed `$` index.
    pub fn parse_rendered(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        match text.strip_prefix('$') {
            Some(digits) => {
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                digits.parse::<u32>().ok().map(HandleToken::Index)
            }
            None => Some(HandleToken::Name(Arc::from(text))),
        }
    }
}

impl fmt::Display for HandleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Precomputed `[len, byte0, byte1]` encodings of `Index(n)` for `n < 512`.
pub(crate) static SHORT_TOKENS: [[u8; 3]; SHORT_TOKEN_COUNT] = build_short_tokens();

const fn build_short_tokens() -> [[u8; 3]; SHORT_TOKEN_COUNT] {
    let mut table = [[0u8; 3]; SHORT_TOKEN_COUNT];
    let mut i = 0;
    while i < SHORT_TOKEN_COUNT {
        let v = (i as u32) << 1;
        if v < 0x80 {
            table[i] = [1, v as u8, 0];
        } else {
            table[i] = [2, ((v as u8) & 0x7F) | 0x80, (v >> 7) as u8];
        }
        i += 1;
    }
    table
}

/// Short literal encoding of `Index(n)`, if `n` is in the table.
#[inline]
pub(crate) fn short_token(n: u32) -> Option<&'static [u8]> {
    let entry = SHORT_TOKENS.get(n as usize)?;
    Some(&entry[1..1 + entry[0] as usize])
}
