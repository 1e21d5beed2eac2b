//! This module contains the pure, stateless kernels for allocating filled buffers.
//!
//! Every kernel takes an optional element type (default `Float64`) and a memory
//! order, mirroring the usual `zeros(shape, dtype, order)` signature of numeric
//! array libraries.

use crate::error::ArrayClassError;
use crate::traits::Element;
use crate::types::{checked_len, dispatch, with_element_type, ArrayData, ElementType};
use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use serde::{Deserialize, Serialize};

/// Element type used when a caller does not name one.
pub const DEFAULT_DTYPE: ElementType = ElementType::Float64;

/// Memory layout of an allocated buffer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemoryOrder {
    /// Row-major (C-style).
    #[default]
    C,
    /// Column-major (Fortran-style).
    F,
}

impl MemoryOrder {
    pub fn is_fortran(&self) -> bool {
        matches!(self, MemoryOrder::F)
    }
}

//==================================================================================
// 1. Private Core Logic
//==================================================================================

fn filled<T: Element>(
    shape: &[usize],
    value: T,
    order: MemoryOrder,
) -> Result<ArrayData, ArrayClassError> {
    checked_len::<T>(shape)?;
    Ok(T::into_data(ArrayD::from_elem(IxDyn(shape).set_f(order.is_fortran()), value)))
}

/// Copies `source` into a fresh buffer with the requested layout.
fn relayout<T: Element>(source: &ArrayD<T>, order: MemoryOrder) -> ArrayData {
    let mut target = ArrayD::from_elem(source.raw_dim().set_f(order.is_fortran()), T::zero());
    target.assign(source);
    T::into_data(target)
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Fails with an `Overflow` shape error when `shape` is too large to allocate.
pub fn zeros(
    shape: &[usize],
    dtype: Option<ElementType>,
    order: MemoryOrder,
) -> Result<ArrayData, ArrayClassError> {
    with_element_type!(dtype.unwrap_or(DEFAULT_DTYPE), T => filled::<T>(shape, T::zero(), order))
}

pub fn ones(
    shape: &[usize],
    dtype: Option<ElementType>,
    order: MemoryOrder,
) -> Result<ArrayData, ArrayClassError> {
    with_element_type!(dtype.unwrap_or(DEFAULT_DTYPE), T => filled::<T>(shape, T::one(), order))
}

/// Allocates a buffer whose contents the caller must not rely on.
///
/// Safe Rust never reads uninitialized memory, so the buffer is filled with
/// the element type's zero value.
pub fn empty(
    shape: &[usize],
    dtype: Option<ElementType>,
    order: MemoryOrder,
) -> Result<ArrayData, ArrayClassError> {
    zeros(shape, dtype, order)
}

/// Broadcasts `fill_value` (a scalar or any broadcastable array) to `shape`.
///
/// Without an explicit `dtype` the fill value's own element type is kept.
pub fn full(
    shape: &[usize],
    fill_value: &ArrayData,
    dtype: Option<ElementType>,
    order: MemoryOrder,
) -> Result<ArrayData, ArrayClassError> {
    let typed = match dtype {
        Some(dtype) => fill_value.astype(dtype)?,
        None => fill_value.clone(),
    };
    let broadcast = typed.broadcast_to(shape)?;

    match order {
        MemoryOrder::C => Ok(broadcast),
        MemoryOrder::F => Ok(dispatch!(&broadcast, array => relayout(array, order))),
    }
}
