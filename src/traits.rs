//! This module defines shared traits used across the array and class layers.

use crate::class::Schema;
use crate::types::{ArrayData, ElementType, Scalar};
use ndarray::ArrayD;
use num_traits::{NumCast, One, Zero};
use std::fmt;

/// A primitive that can live inside an `ArrayData`.
///
/// Each implementor maps to exactly one `ElementType` variant and one
/// `ArrayData` variant.
pub trait Element: Copy + PartialOrd + fmt::Debug + Send + Sync + 'static {
    const ELEMENT_TYPE: ElementType;

    fn zero() -> Self;
    fn one() -> Self;

    fn to_scalar(self) -> Scalar;

    /// Returns `None` when the value has no representation in `Self`
    /// (out of range, or NaN/inf for integers).
    fn from_scalar(value: Scalar) -> Option<Self>;

    fn into_data(array: ArrayD<Self>) -> ArrayData;
    fn view_data(data: &ArrayData) -> Option<&ArrayD<Self>>;
}

impl Element for bool {
    const ELEMENT_TYPE: ElementType = ElementType::Boolean;

    fn zero() -> Self {
        false
    }

    fn one() -> Self {
        true
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Bool(self)
    }

    fn from_scalar(value: Scalar) -> Option<Self> {
        Some(match value {
            Scalar::Bool(b) => b,
            Scalar::Int(v) => v != 0,
            Scalar::UInt(v) => v != 0,
            Scalar::Float(v) => v != 0.0,
        })
    }

    fn into_data(array: ArrayD<Self>) -> ArrayData {
        ArrayData::Boolean(array)
    }

    fn view_data(data: &ArrayData) -> Option<&ArrayD<Self>> {
        match data {
            ArrayData::Boolean(array) => Some(array),
            _ => None,
        }
    }
}

// Implement `Element` for all numeric primitives. Casting goes through
// `NumCast`, which refuses lossy range conversions.
macro_rules! impl_numeric_element {
    ($T:ty, $variant:ident) => {
        impl Element for $T {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;

            fn zero() -> Self {
                <$T as Zero>::zero()
            }

            fn one() -> Self {
                <$T as One>::one()
            }

            fn to_scalar(self) -> Scalar {
                Scalar::from(self)
            }

            fn from_scalar(value: Scalar) -> Option<Self> {
                match value {
                    Scalar::Bool(b) => <$T as NumCast>::from(b as u8),
                    Scalar::Int(v) => <$T as NumCast>::from(v),
                    Scalar::UInt(v) => <$T as NumCast>::from(v),
                    Scalar::Float(v) => <$T as NumCast>::from(v),
                }
            }

            fn into_data(array: ArrayD<Self>) -> ArrayData {
                ArrayData::$variant(array)
            }

            fn view_data(data: &ArrayData) -> Option<&ArrayD<Self>> {
                match data {
                    ArrayData::$variant(array) => Some(array),
                    _ => None,
                }
            }
        }
    };
}

impl_numeric_element!(i8, Int8);
impl_numeric_element!(i16, Int16);
impl_numeric_element!(i32, Int32);
impl_numeric_element!(i64, Int64);
impl_numeric_element!(u8, UInt8);
impl_numeric_element!(u16, UInt16);
impl_numeric_element!(u32, UInt32);
impl_numeric_element!(u64, UInt64);
impl_numeric_element!(f32, Float32);
impl_numeric_element!(f64, Float64);

/// Anything that carries a resolved `Schema`.
///
/// This is the capability check for coordinate declarations: any schema
/// carrier can be turned into a `CoordinateSpec`.
pub trait HasSchema {
    fn schema(&self) -> &Schema;
}

impl HasSchema for Schema {
    fn schema(&self) -> &Schema {
        self
    }
}
