//! A dynamically typed n-dimensional buffer.
//!
//! `ArrayData` is the value every constructor consumes and every labeled array
//! stores. It holds one `ndarray::ArrayD<T>` per supported `ElementType`, and
//! the two macros below let generic code run against whichever variant is
//! present (`dispatch!`) or against a variant chosen at runtime
//! (`with_element_type!`).

use crate::error::ArrayClassError;
use crate::traits::Element;
use crate::types::{ElementType, Scalar};
use ndarray::{Array, ArrayD, Dimension, ErrorKind, IxDyn, ShapeError};

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Boolean(ArrayD<bool>),
    Int8(ArrayD<i8>),
    Int16(ArrayD<i16>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    UInt8(ArrayD<u8>),
    UInt16(ArrayD<u16>),
    UInt32(ArrayD<u32>),
    UInt64(ArrayD<u64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

/// Runs `$body` with `$arr` bound to the inner `ArrayD<T>` of whichever
/// variant `$data` holds.
macro_rules! dispatch {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            $crate::types::ArrayData::Boolean($arr) => $body,
            $crate::types::ArrayData::Int8($arr) => $body,
            $crate::types::ArrayData::Int16($arr) => $body,
            $crate::types::ArrayData::Int32($arr) => $body,
            $crate::types::ArrayData::Int64($arr) => $body,
            $crate::types::ArrayData::UInt8($arr) => $body,
            $crate::types::ArrayData::UInt16($arr) => $body,
            $crate::types::ArrayData::UInt32($arr) => $body,
            $crate::types::ArrayData::UInt64($arr) => $body,
            $crate::types::ArrayData::Float32($arr) => $body,
            $crate::types::ArrayData::Float64($arr) => $body,
        }
    };
}

/// Runs `$body` with `$T` aliased to the Rust primitive of `$dtype`.
macro_rules! with_element_type {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            $crate::types::ElementType::Boolean => {
                type $T = bool;
                $body
            }
            $crate::types::ElementType::Int8 => {
                type $T = i8;
                $body
            }
            $crate::types::ElementType::Int16 => {
                type $T = i16;
                $body
            }
            $crate::types::ElementType::Int32 => {
                type $T = i32;
                $body
            }
            $crate::types::ElementType::Int64 => {
                type $T = i64;
                $body
            }
            $crate::types::ElementType::UInt8 => {
                type $T = u8;
                $body
            }
            $crate::types::ElementType::UInt16 => {
                type $T = u16;
                $body
            }
            $crate::types::ElementType::UInt32 => {
                type $T = u32;
                $body
            }
            $crate::types::ElementType::UInt64 => {
                type $T = u64;
                $body
            }
            $crate::types::ElementType::Float32 => {
                type $T = f32;
                $body
            }
            $crate::types::ElementType::Float64 => {
                type $T = f64;
                $body
            }
        }
    };
}

pub(crate) use dispatch;
pub(crate) use with_element_type;

//==================================================================================
// 1. Generic Helpers
//==================================================================================

fn element_type_of<T: Element>(_: &ArrayD<T>) -> ElementType {
    T::ELEMENT_TYPE
}

/// Casts element-by-element, failing on the first value `T` cannot represent.
fn cast_array<S: Element, T: Element>(source: &ArrayD<S>) -> Result<ArrayD<T>, ArrayClassError> {
    let mut converted = Vec::with_capacity(source.len());
    for &value in source.iter() {
        let scalar = value.to_scalar();
        match T::from_scalar(scalar) {
            Some(cast) => converted.push(cast),
            None => {
                return Err(ArrayClassError::TypeConversion {
                    from: S::ELEMENT_TYPE,
                    to: T::ELEMENT_TYPE,
                    value: scalar.to_string(),
                })
            }
        }
    }
    Ok(ArrayD::from_shape_vec(source.raw_dim(), converted)?)
}

/// Element count of `shape`, or an `Overflow` shape error when `ndarray`
/// would refuse the shape or a buffer of `T` that large cannot be allocated.
///
/// `ndarray` bounds the product of the non-zero axis lengths, so `[0, usize::MAX]`
/// overflows even though it holds no elements.
pub(crate) fn checked_len<T>(shape: &[usize]) -> Result<usize, ShapeError> {
    let overflow = || ShapeError::from_kind(ErrorKind::Overflow);
    let element_size = std::mem::size_of::<T>().max(1);

    let len = IxDyn(shape).size_checked().ok_or_else(overflow)?;
    let non_zero = shape
        .iter()
        .filter(|&&axis| axis != 0)
        .try_fold(1usize, |acc, &axis| acc.checked_mul(axis))
        .ok_or_else(overflow)?;
    let bytes = len.checked_mul(element_size).ok_or_else(overflow)?;

    if non_zero > isize::MAX as usize || bytes > isize::MAX as usize {
        return Err(overflow());
    }
    Ok(len)
}

fn broadcast_array<T: Element>(
    source: &ArrayD<T>,
    shape: &[usize],
) -> Result<ArrayData, ArrayClassError> {
    checked_len::<T>(shape)?;
    let view = source
        .broadcast(IxDyn(shape))
        .ok_or_else(|| ShapeError::from_kind(ErrorKind::IncompatibleShape))?;
    Ok(T::into_data(view.to_owned()))
}

fn scalars_to_data<T: Element>(
    shape: &[usize],
    scalars: &[Scalar],
) -> Result<ArrayData, ArrayClassError> {
    let mut values = Vec::with_capacity(scalars.len());
    for &scalar in scalars {
        let value = T::from_scalar(scalar).ok_or_else(|| ArrayClassError::TypeConversion {
            from: scalar.element_type(),
            to: T::ELEMENT_TYPE,
            value: scalar.to_string(),
        })?;
        values.push(value);
    }
    Ok(T::into_data(ArrayD::from_shape_vec(IxDyn(shape), values)?))
}

//==================================================================================
// 2. Public API
//==================================================================================

impl ArrayData {
    pub fn element_type(&self) -> ElementType {
        dispatch!(self, array => element_type_of(array))
    }

    pub fn shape(&self) -> &[usize] {
        dispatch!(self, array => array.shape())
    }

    pub fn ndim(&self) -> usize {
        dispatch!(self, array => array.ndim())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, array => array.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the inner array if it holds elements of type `T`.
    pub fn as_array<T: Element>(&self) -> Option<&ArrayD<T>> {
        T::view_data(self)
    }

    /// All elements in logical (row-major) order.
    pub fn to_scalars(&self) -> Vec<Scalar> {
        dispatch!(self, array => array.iter().map(|v| v.to_scalar()).collect())
    }

    /// Checked element cast. Casting to the current type is a plain clone.
    pub fn astype(&self, to: ElementType) -> Result<ArrayData, ArrayClassError> {
        if self.element_type() == to {
            return Ok(self.clone());
        }
        with_element_type!(to, T => {
            let cast: ArrayD<T> = dispatch!(self, array => cast_array(array)?);
            Ok(T::into_data(cast))
        })
    }

    /// Broadcasts to `shape` with NumPy rules. An incompatible shape surfaces
    /// `ndarray`'s own `ShapeError`.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<ArrayData, ArrayClassError> {
        dispatch!(self, array => broadcast_array(array, shape))
    }

    /// Builds an array of `shape` from row-major scalars, casting each to `dtype`.
    pub fn from_scalars(
        shape: &[usize],
        scalars: &[Scalar],
        dtype: ElementType,
    ) -> Result<ArrayData, ArrayClassError> {
        with_element_type!(dtype, T => scalars_to_data::<T>(shape, scalars))
    }

    /// Converts a JSON scalar or (nested, rectangular) list into an array.
    ///
    /// The element type is inferred the way a numeric library would: all
    /// booleans give `Boolean`, any float gives `Float64`, otherwise integers
    /// give `Int64` (or `UInt64` when a value exceeds `i64::MAX`).
    pub fn from_json(value: &serde_json::Value) -> Result<ArrayData, ArrayClassError> {
        let mut shape = Vec::new();
        let mut scalars = Vec::new();
        collect_json(value, 0, &mut shape, &mut scalars)?;

        let dtype = infer_element_type(&scalars);
        Self::from_scalars(&shape, &scalars, dtype)
    }
}

fn collect_json(
    value: &serde_json::Value,
    depth: usize,
    shape: &mut Vec<usize>,
    scalars: &mut Vec<Scalar>,
) -> Result<(), ArrayClassError> {
    use serde_json::Value;

    match value {
        Value::Array(items) => {
            if depth == shape.len() {
                if !scalars.is_empty() {
                    return Err(ragged());
                }
                shape.push(items.len());
            } else if depth > shape.len() || shape[depth] != items.len() {
                return Err(ragged());
            }
            for item in items {
                collect_json(item, depth + 1, shape, scalars)?;
            }
            Ok(())
        }
        leaf => {
            if depth != shape.len() {
                return Err(ragged());
            }
            scalars.push(json_scalar(leaf)?);
            Ok(())
        }
    }
}

fn json_scalar(value: &serde_json::Value) -> Result<Scalar, ArrayClassError> {
    use serde_json::Value;

    match value {
        Value::Bool(b) => Ok(Scalar::Bool(*b)),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(Scalar::Int(v))
            } else if let Some(v) = n.as_u64() {
                Ok(Scalar::UInt(v))
            } else {
                Ok(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        other => Err(ArrayClassError::InvalidDeclaration(format!(
            "array values must be numbers or booleans, got {}",
            other
        ))),
    }
}

fn infer_element_type(scalars: &[Scalar]) -> ElementType {
    if !scalars.is_empty() && scalars.iter().all(|s| matches!(s, Scalar::Bool(_))) {
        ElementType::Boolean
    } else if scalars.iter().any(|s| matches!(s, Scalar::Float(_))) || scalars.is_empty() {
        ElementType::Float64
    } else if scalars.iter().any(|s| matches!(s, Scalar::UInt(_))) {
        ElementType::UInt64
    } else {
        ElementType::Int64
    }
}

fn ragged() -> ArrayClassError {
    ArrayClassError::InvalidDeclaration("nested lists must be rectangular".to_string())
}

//==================================================================================
// 3. Conversions
//==================================================================================

impl<T: Element, D: Dimension> From<Array<T, D>> for ArrayData {
    fn from(array: Array<T, D>) -> Self {
        T::into_data(array.into_dyn())
    }
}

impl<T: Element> From<Vec<T>> for ArrayData {
    fn from(values: Vec<T>) -> Self {
        T::into_data(ndarray::Array1::from(values).into_dyn())
    }
}

impl From<Scalar> for ArrayData {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Bool(v) => ArrayData::from(v),
            Scalar::Int(v) => ArrayData::from(v),
            Scalar::UInt(v) => ArrayData::from(v),
            Scalar::Float(v) => ArrayData::from(v),
        }
    }
}

// Scalars become 0-d arrays, which broadcast to any shape.
macro_rules! impl_data_from_scalar {
    ($($T:ty),+) => {
        $(
            impl From<$T> for ArrayData {
                fn from(value: $T) -> Self {
                    <$T as Element>::into_data(ArrayD::from_elem(IxDyn(&[]), value))
                }
            }
        )+
    };
}

impl_data_from_scalar!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
