//! The resolved description of one labeled-array kind, and the declaration
//! values that produce it.

use crate::labeled::Attrs;
use crate::traits::HasSchema;
use crate::types::ElementType;
use std::sync::Arc;

//==================================================================================
// I. Declarations
//==================================================================================

/// An ordered list of axis names as declared.
///
/// A single bare name converts to a one-element list, so `"x"` and `["x"]`
/// declare the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisNames(Vec<String>);

impl AxisNames {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for AxisNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for AxisNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for AxisNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for AxisNames {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for AxisNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AxisNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[String]> for AxisNames {
    fn from(names: &[String]) -> Self {
        Self(names.to_vec())
    }
}

/// Declaration of one coordinate: its axes, element type and description.
///
/// A coordinate is itself a small array class with no coordinates of its own.
/// Its axes should be a subset of the owning class's axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateSpec {
    pub(crate) axes: AxisNames,
    pub(crate) element_type: Option<ElementType>,
    pub(crate) description: Option<String>,
}

impl CoordinateSpec {
    /// A coordinate laid along `axes`. An empty list declares a scalar
    /// coordinate.
    pub fn new(axes: impl Into<AxisNames>) -> Self {
        Self {
            axes: axes.into(),
            ..Self::default()
        }
    }

    pub fn element_type(mut self, element_type: ElementType) -> Self {
        self.element_type = Some(element_type);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn axes(&self) -> &[String] {
        self.axes.as_slice()
    }
}

/// Any schema carrier (another array class, a resolved schema) can be used
/// as a coordinate declaration.
impl<S: HasSchema> From<&S> for CoordinateSpec {
    fn from(source: &S) -> Self {
        let schema = source.schema();
        Self {
            axes: AxisNames::from(schema.axis_names()),
            element_type: schema.element_type(),
            description: Some(schema.description().to_string()),
        }
    }
}

//==================================================================================
// II. Resolved Schema
//==================================================================================

/// The validated, immutable description of an array class.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub(crate) class_name: String,
    pub(crate) axis_names: Vec<String>,
    pub(crate) element_type: Option<ElementType>,
    pub(crate) description: String,
    pub(crate) coordinates: Vec<(String, Arc<Schema>)>,
    pub(crate) accessor_name: Option<String>,
    pub(crate) default_name: Option<String>,
    pub(crate) default_attrs: Attrs,
}

impl Schema {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn axis_names(&self) -> &[String] {
        &self.axis_names
    }

    /// `None` means data of any element type is accepted as-is.
    pub fn element_type(&self) -> Option<ElementType> {
        self.element_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Coordinate schemas in declaration order (inherited ones first).
    pub fn coordinates(&self) -> &[(String, Arc<Schema>)] {
        &self.coordinates
    }

    pub fn coordinate(&self, name: &str) -> Option<&Arc<Schema>> {
        self.coordinates
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, schema)| schema)
    }

    pub fn accessor_name(&self) -> Option<&str> {
        self.accessor_name.as_deref()
    }

    /// Array name used when a constructor call does not give one.
    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Attributes used when a constructor call does not give any.
    pub fn default_attrs(&self) -> &Attrs {
        &self.default_attrs
    }
}
