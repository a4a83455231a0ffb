// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Multi-dimensional arrays with arbitrary lower bounds.

use super::Value;
use crate::config::MAX_ARRAY_ELEMENTS;
use crate::error::{Error, Result};
use crate::types::{catalog, PrimitiveKind, SlimType};

/// One array dimension: lower bound and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub lower: i64,
    pub length: usize,
}

impl Dimension {
    pub const fn new(lower: i64, length: usize) -> Self {
        Self { lower, length }
    }

    pub const fn zero_based(length: usize) -> Self {
        Self { lower: 0, length }
    }

    /// From inclusive bounds; `upper == lower - 1` is an empty dimension.
    pub fn from_bounds(lower: i64, upper: i64) -> Option<Self> {
        let length = i128::from(upper) - i128::from(lower) + 1;
        if length < 0 {
            return None;
        }
        let length = usize::try_from(length).ok()?;
        Some(Self { lower, length })
    }

    /// Inclusive upper bound.
    pub fn upper(&self) -> i64 {
        let upper = i128::from(self.lower) + self.length as i128 - 1;
        i64::try_from(upper).unwrap_or(i64::MAX)
    }

    pub fn contains(&self, index: i64) -> bool {
        let offset = i128::from(index) - i128::from(self.lower);
        offset >= 0 && offset < self.length as i128
    }
}

/// Total element count, rejecting anything above the array ceiling.
pub(crate) fn checked_element_count(dims: &[Dimension]) -> Result<usize> {
    let mut total: u64 = 1;
    for dim in dims {
        total = total
            .checked_mul(dim.length as u64)
            .filter(|n| *n <= MAX_ARRAY_ELEMENTS)
            .ok_or(Error::ArrayTooLarge {
                elements: total.saturating_mul(dim.length as u64),
            })?;
    }
    Ok(total as usize)
}

#[derive(Debug, Clone, PartialEq)]
enum ArrayData {
    /// Element type `byte`: stored and streamed as one raw block.
    Bytes(Vec<u8>),
    Values(Vec<Value>),
}

/// Array value: array type, dimensions, row-major elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    ty: SlimType,
    dims: Vec<Dimension>,
    data: ArrayData,
}

impl ArrayValue {
    /// Array of type `ty` with every element at its default.
    pub fn new(ty: &SlimType, dims: Vec<Dimension>) -> Result<Self> {
        let count = validate_layout(ty, &dims)?;
        let element = element_of(ty)?;
        let data = if element.primitive_kind() == Some(PrimitiveKind::U8) {
            ArrayData::Bytes(vec![0; count])
        } else {
            let default = Value::default_for(&element)?;
            ArrayData::Values(vec![default; count])
        };
        Ok(Self {
            ty: ty.clone(),
            dims,
            data,
        })
    }

    /// Array of type `ty` holding `values` in row-major order.
    pub fn from_values(ty: &SlimType, dims: Vec<Dimension>, values: Vec<Value>) -> Result<Self> {
        let count = validate_layout(ty, &dims)?;
        if values.len() != count {
            return Err(Error::IndexOutOfBounds(format!(
                "{} values for {} elements of `{}`",
                values.len(),
                count,
                ty.name()
            )));
        }
        let element = element_of(ty)?;
        for value in &values {
            value.ensure_assignable(&element)?;
        }
        let data = if element.primitive_kind() == Some(PrimitiveKind::U8) {
            ArrayData::Bytes(
                values
                    .iter()
                    .map(|v| match v {
                        Value::U8(b) => *b,
                        _ => 0,
                    })
                    .collect(),
            )
        } else {
            ArrayData::Values(values)
        };
        Ok(Self {
            ty: ty.clone(),
            dims,
            data,
        })
    }

    /// Validated layout with empty storage, filled by the decoder once the
    /// body has been read.
    pub(crate) fn unfilled(ty: &SlimType, dims: Vec<Dimension>) -> Result<Self> {
        validate_layout(ty, &dims)?;
        let element = element_of(ty)?;
        let data = if element.primitive_kind() == Some(PrimitiveKind::U8) {
            ArrayData::Bytes(Vec::new())
        } else {
            ArrayData::Values(Vec::new())
        };
        Ok(Self {
            ty: ty.clone(),
            dims,
            data,
        })
    }

    /// Install decoded elements; the count must match the dimensions.
    pub(crate) fn fill_values(&mut self, values: Vec<Value>) -> Result<()> {
        self.check_fill(values.len())?;
        match &mut self.data {
            ArrayData::Values(slot) => {
                *slot = values;
                Ok(())
            }
            ArrayData::Bytes(_) => Err(Error::mismatch("byte block", self.ty.name())),
        }
    }

    /// Install a decoded raw byte block.
    pub(crate) fn fill_bytes(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.check_fill(bytes.len())?;
        match &mut self.data {
            ArrayData::Bytes(slot) => {
                *slot = bytes;
                Ok(())
            }
            ArrayData::Values(_) => Err(Error::mismatch(self.ty.name(), "byte block")),
        }
    }

    fn check_fill(&self, found: usize) -> Result<()> {
        let expected = self.element_count();
        if found != expected {
            return Err(Error::IndexOutOfBounds(format!(
                "{} decoded elements for {} of `{}`",
                found,
                expected,
                self.ty.name()
            )));
        }
        Ok(())
    }

    /// One-dimensional, zero-based array of `element`.
    pub fn vector(element: &SlimType, values: Vec<Value>) -> Result<Self> {
        let ty = catalog().array_of(element, 1)?;
        let dims = vec![Dimension::zero_based(values.len())];
        Self::from_values(&ty, dims, values)
    }

    /// `byte[]` over raw bytes.
    pub fn bytes(data: Vec<u8>) -> Self {
        Self {
            ty: catalog().byte_array().clone(),
            dims: vec![Dimension::zero_based(data.len())],
            data: ArrayData::Bytes(data),
        }
    }

    /// Array type (not the element type).
    pub fn ty(&self) -> &SlimType {
        &self.ty
    }

    pub fn element_type(&self) -> Option<&SlimType> {
        self.ty.array_shape().map(|shape| &shape.element)
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ArrayData::Bytes(b) => b.len(),
            ArrayData::Values(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Product of the dimension lengths.
    pub fn element_count(&self) -> usize {
        self.dims.iter().map(|d| d.length).product()
    }

    /// Raw storage of a byte array.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            ArrayData::Bytes(b) => Some(b),
            ArrayData::Values(_) => None,
        }
    }

    /// Elements of a non-byte array.
    pub fn values(&self) -> Option<&[Value]> {
        match &self.data {
            ArrayData::Values(v) => Some(v),
            ArrayData::Bytes(_) => None,
        }
    }

    /// Element by row-major position.
    pub fn get_flat(&self, index: usize) -> Option<Value> {
        match &self.data {
            ArrayData::Bytes(b) => b.get(index).map(|v| Value::U8(*v)),
            ArrayData::Values(v) => v.get(index).cloned(),
        }
    }

    /// Element at `indices`, one per dimension.
    pub fn get(&self, indices: &[i64]) -> Result<Value> {
        let flat = self.flat_index(indices)?;
        self.get_flat(flat)
            .ok_or_else(|| Error::IndexOutOfBounds(format!("{:?}", indices)))
    }

    pub fn set(&mut self, indices: &[i64], value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if let Some(element) = self.element_type() {
            value.ensure_assignable(element)?;
        }
        let flat = self.flat_index(indices)?;
        self.store_flat(flat, value)
    }

    /// Store by row-major position; the value must already be assignable.
    pub(crate) fn store_flat(&mut self, index: usize, value: Value) -> Result<()> {
        let slot_missing = || Error::IndexOutOfBounds(format!("flat index {}", index));
        match &mut self.data {
            ArrayData::Bytes(bytes) => {
                let slot = bytes.get_mut(index).ok_or_else(slot_missing)?;
                match value {
                    Value::U8(b) => {
                        *slot = b;
                        Ok(())
                    }
                    other => Err(Error::mismatch("byte", other.type_label())),
                }
            }
            ArrayData::Values(values) => {
                let slot = values.get_mut(index).ok_or_else(slot_missing)?;
                *slot = value;
                Ok(())
            }
        }
    }

    fn flat_index(&self, indices: &[i64]) -> Result<usize> {
        if indices.len() != self.dims.len() {
            return Err(Error::IndexOutOfBounds(format!(
                "{} indices for rank {}",
                indices.len(),
                self.dims.len()
            )));
        }
        let mut flat: usize = 0;
        for (index, dim) in indices.iter().zip(&self.dims) {
            if !dim.contains(*index) {
                return Err(Error::IndexOutOfBounds(format!(
                    "{} outside {}..={}",
                    index,
                    dim.lower,
                    dim.upper()
                )));
            }
            let offset = (i128::from(*index) - i128::from(dim.lower)) as usize;
            flat = flat * dim.length + offset;
        }
        Ok(flat)
    }
}

fn element_of(ty: &SlimType) -> Result<SlimType> {
    ty.array_shape()
        .map(|shape| shape.element.clone())
        .ok_or_else(|| Error::mismatch("array type", ty.name()))
}

/// Check rank against the type and the element count against the ceiling.
fn validate_layout(ty: &SlimType, dims: &[Dimension]) -> Result<usize> {
    let shape = ty
        .array_shape()
        .ok_or_else(|| Error::mismatch("array type", ty.name()))?;
    if dims.len() != shape.rank {
        return Err(Error::InvalidArrayDescriptor(format!(
            "{} dimensions for `{}`",
            dims.len(),
            ty.name()
        )));
    }
    let count = checked_element_count(dims)?;
    // Lengths are bounded by the element ceiling from here on.
    for dim in dims {
        if dim.length > 0 && dim.lower.checked_add(dim.length as i64 - 1).is_none() {
            return Err(Error::InvalidArrayDescriptor(format!(
                "upper bound overflows at lower bound {}",
                dim.lower
            )));
        }
    }
    Ok(count)
}
