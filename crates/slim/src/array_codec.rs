// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Array descriptor codec.
//!
//! An array's shape travels as a descriptor string prefixed by the array
//! type's handle:
//!
//! ```text
//! <handle>|<lb0>~<ub0>,<lb1>~<ub1>,...     upper bounds inclusive
//! $2|<length>                              zero-based 1-D object[] shorthand
//! ```
//!
//! Parsing validates rank and total element count before anything is
//! allocated.

use crate::config::{MAX_ARRAY_ELEMENTS, MAX_ARRAY_RANK, OBJECT_ARRAY_TYPE_HANDLE};
use crate::error::{Error, Result};
use crate::types::SlimType;
use crate::value::{checked_element_count, Dimension};
use crate::wire::HandleToken;
use std::fmt::Write as _;

/// Rank and bounds of one array, plus the handle of its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDescriptor {
    pub type_token: HandleToken,
    pub dims: Vec<Dimension>,
}

impl ArrayDescriptor {
    pub fn new(type_token: HandleToken, dims: Vec<Dimension>) -> Self {
        Self { type_token, dims }
    }

    fn is_shorthand(&self) -> bool {
        self.type_token == HandleToken::Index(OBJECT_ARRAY_TYPE_HANDLE)
            && self.dims.len() == 1
            && self.dims[0].lower == 0
    }

    /// Descriptor string.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(8 + self.dims.len() * 8);
        out.push_str(&self.type_token.render());
        out.push('|');
        if self.is_shorthand() {
            let _ = write!(out, "{}", self.dims[0].length);
            return out;
        }
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}~{}", dim.lower, dim.upper());
        }
        out
    }

    /// Parse and validate a descriptor string.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidArrayDescriptor(text.to_string());

        let (handle, bounds) = text.split_once('|').ok_or_else(invalid)?;
        let type_token = HandleToken::parse_rendered(handle).ok_or_else(invalid)?;
        if bounds.is_empty() {
            return Err(invalid());
        }

        if !bounds.contains('~') {
            // Only the object[] handle may use the bare-length shorthand.
            if type_token != HandleToken::Index(OBJECT_ARRAY_TYPE_HANDLE) {
                return Err(invalid());
            }
            let length = match parse_length(bounds) {
                Some(length) => length?,
                None => return Err(invalid()),
            };
            return Ok(Self {
                type_token,
                dims: vec![Dimension::zero_based(length)],
            });
        }

        let rank = bounds.split(',').count();
        if rank > MAX_ARRAY_RANK {
            return Err(Error::ArrayRankExceeded { rank });
        }
        let mut dims = Vec::with_capacity(rank);
        for part in bounds.split(',') {
            let (lower, upper) = part.split_once('~').ok_or_else(invalid)?;
            let lower = parse_bound(lower).ok_or_else(invalid)?;
            let upper = parse_bound(upper).ok_or_else(invalid)?;
            let dim = Dimension::from_bounds(lower, upper).ok_or_else(invalid)?;
            if dim.length as u64 > MAX_ARRAY_ELEMENTS {
                return Err(Error::ArrayTooLarge {
                    elements: dim.length as u64,
                });
            }
            dims.push(dim);
        }
        checked_element_count(&dims)?;
        Ok(Self { type_token, dims })
    }

    /// The resolved array type must have the descriptor's rank.
    pub fn check_type(&self, ty: &SlimType) -> Result<()> {
        match ty.array_shape() {
            Some(shape) if shape.rank == self.dims.len() => Ok(()),
            Some(shape) => Err(Error::InvalidArrayDescriptor(format!(
                "rank {} for `{}` of rank {}",
                self.dims.len(),
                ty.name(),
                shape.rank
            ))),
            None => Err(Error::mismatch("array type", ty.name())),
        }
    }

    /// Total element count (already validated by [`ArrayDescriptor::parse`]).
    pub fn element_count(&self) -> Result<usize> {
        checked_element_count(&self.dims)
    }
}

fn is_decimal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_bound(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !is_decimal(digits) {
        return None;
    }
    text.parse().ok()
}

/// `None` for malformed text; lengths past the ceiling are `ArrayTooLarge`.
fn parse_length(text: &str) -> Option<Result<usize>> {
    if !is_decimal(text) {
        return None;
    }
    // All-digit text that overflows u64 is still a length, just a huge one.
    let length: u64 = text.parse().unwrap_or(u64::MAX);
    if length > MAX_ARRAY_ELEMENTS {
        return Some(Err(Error::ArrayTooLarge { elements: length }));
    }
    Some(usize::try_from(length).map_err(|_| Error::ArrayTooLarge { elements: length }))
}
