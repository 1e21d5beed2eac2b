// In: src/labeled/mod.rs

//! A minimal labeled n-dimensional array.
//!
//! `LabeledArray` pairs an `ArrayData` buffer with one name per axis, an
//! optional array name, free-form attributes, and named coordinate arrays
//! laid along a subset of its axes. It is the object every array-class
//! constructor produces.

use crate::error::ArrayClassError;
use crate::types::{ArrayData, ElementType};
use ndarray::{ErrorKind, ShapeError};
use std::collections::BTreeMap;

/// Free-form metadata attached to an array.
pub type Attrs = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    data: ArrayData,
    axes: Vec<String>,
    name: Option<String>,
    attrs: Attrs,
    coords: Vec<(String, LabeledArray)>,
}

impl LabeledArray {
    /// Labels `data` with one axis name per dimension.
    pub fn new(
        data: ArrayData,
        axes: Vec<String>,
        name: Option<String>,
        attrs: Attrs,
    ) -> Result<Self, ArrayClassError> {
        if data.ndim() != axes.len() {
            return Err(ArrayClassError::DimensionMismatch {
                expected: axes.len(),
                found: data.ndim(),
            });
        }
        Ok(Self {
            data,
            axes,
            name,
            attrs,
            coords: Vec::new(),
        })
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    pub fn axes(&self) -> &[String] {
        &self.axes
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Casts the data; coordinates are carried over untouched.
    pub fn astype(&self, to: ElementType) -> Result<Self, ArrayClassError> {
        Ok(Self {
            data: self.data.astype(to)?,
            ..self.clone()
        })
    }

    /// Size of each axis, keyed by axis name.
    pub fn axis_sizes(&self) -> BTreeMap<String, usize> {
        self.axes
            .iter()
            .cloned()
            .zip(self.shape().iter().copied())
            .collect()
    }

    /// Attaches (or replaces) a coordinate. Every axis of the coordinate must
    /// exist on this array with the same length.
    pub fn set_coordinate(
        &mut self,
        name: impl Into<String>,
        coordinate: LabeledArray,
    ) -> Result<(), ArrayClassError> {
        let name = name.into();
        let sizes = self.axis_sizes();

        for (axis, &length) in coordinate.axes.iter().zip(coordinate.shape()) {
            match sizes.get(axis) {
                None => {
                    return Err(ArrayClassError::UnknownAxis {
                        coordinate: name,
                        axis: axis.clone(),
                    })
                }
                Some(&expected) if expected != length => {
                    return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into())
                }
                Some(_) => {}
            }
        }

        match self.coords.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = coordinate,
            None => self.coords.push((name, coordinate)),
        }
        Ok(())
    }

    pub fn coordinate(&self, name: &str) -> Option<&LabeledArray> {
        self.coords
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, coordinate)| coordinate)
    }

    /// Coordinates in attachment order.
    pub fn coordinates(&self) -> impl Iterator<Item = (&str, &LabeledArray)> {
        self.coords.iter().map(|(name, coordinate)| (name.as_str(), coordinate))
    }

    //==============================================================================
    // Reductions and element-wise arithmetic
    //==============================================================================

    /// Largest element, as `f64`. NaN elements are skipped.
    pub fn max(&self) -> Result<f64, ArrayClassError> {
        self.data
            .to_scalars()
            .iter()
            .map(|s| s.as_f64())
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
            .ok_or_else(|| {
                ArrayClassError::InvalidOperation(
                    "max() of an empty array has no value".to_string(),
                )
            })
    }

    /// Element-wise division by a scalar. The result is `Float64`; labels and
    /// coordinates are preserved.
    pub fn divide(&self, divisor: f64) -> Result<Self, ArrayClassError> {
        let data = match self.data.astype(ElementType::Float64)? {
            ArrayData::Float64(array) => ArrayData::Float64(array.mapv(|v| v / divisor)),
            other => other,
        };
        Ok(Self {
            data,
            ..self.clone()
        })
    }
}
