// In: src/class/constructor.rs

//! Stage 3 of the class pipeline: the constructor synthesizer.
//!
//! An `ArrayClass` is the built class. It owns its resolved `Schema`, the
//! coordinate defaults, its relocated method table, and the five constructors
//! bound to all of them:
//!
//! - `new(data, overrides)`: label, cast, attach coordinates.
//! - `empty` / `zeros` / `ones` / `full`: allocate a buffer through
//!   `kernels::fill`, then delegate to `new`.
//!
//! Coordinate values resolve strictly as: explicit override, then class-level
//! default, then `MissingCoordinateValue`.

use crate::class::accessor::{Accessor, AccessorDescriptor, AccessorRegistry};
use crate::class::builder::ArrayClassBuilder;
use crate::class::docstring::{ConstructorDocs, ConstructorKind};
use crate::class::schema::Schema;
use crate::error::ArrayClassError;
use crate::kernels::{self, MemoryOrder};
use crate::labeled::{Attrs, LabeledArray};
use crate::traits::HasSchema;
use crate::types::{ArrayData, ElementType};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

//==================================================================================
// I. Call Arguments
//==================================================================================

/// Per-call construction arguments: array name, attributes and coordinate
/// values. Anything left unset falls back to the class-level defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    name: Option<String>,
    attrs: Option<Attrs>,
    coords: BTreeMap<String, ArrayData>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = Some(attrs);
        self
    }

    /// Value for one declared coordinate: a scalar or any array that
    /// broadcasts to the coordinate's shape.
    pub fn coord(mut self, name: impl Into<String>, value: impl Into<ArrayData>) -> Self {
        self.coords.insert(name.into(), value.into());
        self
    }
}

/// Buffer settings for the filled constructors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferSpec {
    /// Advisory: the class's own element type, when set, wins.
    pub dtype: Option<ElementType>,
    pub order: MemoryOrder,
}

impl BufferSpec {
    pub fn dtype(mut self, dtype: ElementType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    pub fn order(mut self, order: MemoryOrder) -> Self {
        self.order = order;
        self
    }
}

//==================================================================================
// II. The Built Class
//==================================================================================

pub(crate) struct ClassInner {
    pub(crate) schema: Arc<Schema>,
    /// Base chain, direct base first.
    pub(crate) ancestors: Vec<Arc<Schema>>,
    pub(crate) defaults: BTreeMap<String, ArrayData>,
    pub(crate) descriptor: Arc<AccessorDescriptor>,
    pub(crate) private_accessor: String,
    pub(crate) registry: Arc<AccessorRegistry>,
    pub(crate) docs: ConstructorDocs,
}

/// A built array class. Cheap to clone; clones share the same class.
#[derive(Clone)]
pub struct ArrayClass {
    pub(crate) inner: Arc<ClassInner>,
}

impl ArrayClass {
    /// Starts declaring a new class.
    pub fn builder(class_name: impl Into<String>) -> ArrayClassBuilder {
        ArrayClassBuilder::new(class_name)
    }

    /// Starts declaring a class derived from this one. Axes, element type,
    /// description, accessor name, construction defaults, coordinates and
    /// methods are inherited unless redeclared.
    pub fn subclass(&self, class_name: impl Into<String>) -> ArrayClassBuilder {
        ArrayClassBuilder::derived(class_name, self.clone())
    }

    pub fn name(&self) -> &str {
        self.inner.schema.class_name()
    }

    /// Base classes' schemas, direct base first.
    pub fn ancestors(&self) -> &[Arc<Schema>] {
        &self.inner.ancestors
    }

    /// `true` if `other` is this class or one of its bases.
    pub fn is_subclass_of(&self, other: &ArrayClass) -> bool {
        Arc::ptr_eq(&self.inner.schema, &other.inner.schema)
            || self
                .inner
                .ancestors
                .iter()
                .any(|ancestor| Arc::ptr_eq(ancestor, &other.inner.schema))
    }

    /// Class-level default for a coordinate, if one was declared or inherited.
    pub fn coordinate_default(&self, name: &str) -> Option<&ArrayData> {
        self.inner.defaults.get(name)
    }

    pub fn descriptor(&self) -> &Arc<AccessorDescriptor> {
        &self.inner.descriptor
    }

    /// Generated name of the accessor holding only this class's methods.
    pub fn private_accessor_name(&self) -> &str {
        &self.inner.private_accessor
    }

    /// Name `ClassArray::accessor` resolves: the public accessor name if the
    /// class has one, else the private one.
    pub fn accessor_name(&self) -> &str {
        self.inner
            .schema
            .accessor_name()
            .unwrap_or(self.inner.private_accessor.as_str())
    }

    pub fn registry(&self) -> &Arc<AccessorRegistry> {
        &self.inner.registry
    }

    pub fn doc(&self, kind: ConstructorKind) -> &str {
        self.inner.docs.get(kind)
    }

    /// The class summary block (description, axes, element type, coordinates).
    pub fn summary(&self) -> &str {
        self.inner.docs.summary()
    }

    //==============================================================================
    // Constructors
    //==============================================================================

    /// Creates a labeled array from `data`: labels it with the class axes,
    /// casts it to the class element type (if any), and attaches every
    /// declared coordinate.
    pub fn new(
        &self,
        data: impl Into<ArrayData>,
        overrides: &Overrides,
    ) -> Result<ClassArray, ArrayClassError> {
        let array = construct(&self.inner.schema, &self.inner.defaults, data.into(), overrides)?;
        Ok(ClassArray {
            array,
            class: self.clone(),
        })
    }

    /// Creates a labeled array whose values must not be relied on.
    pub fn empty(
        &self,
        shape: &[usize],
        buffer: BufferSpec,
        overrides: &Overrides,
    ) -> Result<ClassArray, ArrayClassError> {
        self.new(kernels::empty(shape, buffer.dtype, buffer.order)?, overrides)
    }

    pub fn zeros(
        &self,
        shape: &[usize],
        buffer: BufferSpec,
        overrides: &Overrides,
    ) -> Result<ClassArray, ArrayClassError> {
        self.new(kernels::zeros(shape, buffer.dtype, buffer.order)?, overrides)
    }

    pub fn ones(
        &self,
        shape: &[usize],
        buffer: BufferSpec,
        overrides: &Overrides,
    ) -> Result<ClassArray, ArrayClassError> {
        self.new(kernels::ones(shape, buffer.dtype, buffer.order)?, overrides)
    }

    pub fn full(
        &self,
        shape: &[usize],
        fill_value: impl Into<ArrayData>,
        buffer: BufferSpec,
        overrides: &Overrides,
    ) -> Result<ClassArray, ArrayClassError> {
        let data = kernels::full(shape, &fill_value.into(), buffer.dtype, buffer.order)?;
        self.new(data, overrides)
    }
}

impl HasSchema for ArrayClass {
    fn schema(&self) -> &Schema {
        &self.inner.schema
    }
}

impl fmt::Debug for ArrayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayClass")
            .field("schema", &self.inner.schema)
            .field("accessor", &self.accessor_name())
            .field("methods", &self.inner.descriptor)
            .finish()
    }
}

//==================================================================================
// III. Construction Core
//==================================================================================

/// Shared by every class and, recursively, by every coordinate schema.
pub(crate) fn construct(
    schema: &Schema,
    defaults: &BTreeMap<String, ArrayData>,
    data: ArrayData,
    overrides: &Overrides,
) -> Result<LabeledArray, ArrayClassError> {
    for unknown in overrides
        .coords
        .keys()
        .filter(|name| schema.coordinate(name).is_none())
    {
        log::warn!(
            "Ignoring value for '{}': class '{}' declares no such coordinate",
            unknown,
            schema.class_name()
        );
    }

    let name = overrides
        .name
        .clone()
        .or_else(|| schema.default_name().map(str::to_string));
    let attrs = overrides
        .attrs
        .clone()
        .unwrap_or_else(|| schema.default_attrs().clone());

    let mut array = LabeledArray::new(data, schema.axis_names().to_vec(), name, attrs)?;

    if let Some(element_type) = schema.element_type() {
        array = array.astype(element_type)?;
    }

    let sizes = array.axis_sizes();
    for (coordinate_name, coordinate) in schema.coordinates() {
        let shape = coordinate
            .axis_names()
            .iter()
            .map(|axis| {
                sizes.get(axis).copied().ok_or_else(|| ArrayClassError::UnknownAxis {
                    coordinate: coordinate_name.clone(),
                    axis: axis.clone(),
                })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let value = overrides
            .coords
            .get(coordinate_name)
            .or_else(|| defaults.get(coordinate_name))
            .ok_or_else(|| ArrayClassError::MissingCoordinateValue(coordinate_name.clone()))?;

        // A coordinate is built like its own class's `full(shape, value)`.
        let values = kernels::full(&shape, value, None, MemoryOrder::C)?;
        let labeled = construct(coordinate, &BTreeMap::new(), values, &Overrides::default())?;
        array.set_coordinate(coordinate_name.clone(), labeled)?;
    }

    crate::log_metric!(
        "event" = "construct",
        "class" = schema.class_name(),
        "shape" = format!("{:?}", array.shape()),
        "coords" = schema.coordinates().len()
    );
    Ok(array)
}

//==================================================================================
// IV. Produced Arrays
//==================================================================================

/// A labeled array produced by an `ArrayClass`.
///
/// Dereferences to the `LabeledArray`; additionally remembers its class so
/// the class's methods can be reached through `accessor()`.
#[derive(Clone)]
pub struct ClassArray {
    array: LabeledArray,
    class: ArrayClass,
}

impl ClassArray {
    pub fn class(&self) -> &ArrayClass {
        &self.class
    }

    /// The class's accessor: the shared one if the class declares an accessor
    /// name, otherwise its private one.
    pub fn accessor(&self) -> Result<Accessor<'_>, ArrayClassError> {
        self.class
            .registry()
            .accessor(self.class.accessor_name(), &self.array)
    }

    /// The accessor holding only this class's (and its bases') methods.
    pub fn own_accessor(&self) -> Result<Accessor<'_>, ArrayClassError> {
        self.class
            .registry()
            .accessor(self.class.private_accessor_name(), &self.array)
    }

    /// Any accessor registered in the class's registry.
    pub fn accessor_named(&self, name: &str) -> Result<Accessor<'_>, ArrayClassError> {
        self.class.registry().accessor(name, &self.array)
    }

    pub fn as_labeled(&self) -> &LabeledArray {
        &self.array
    }

    pub fn into_inner(self) -> LabeledArray {
        self.array
    }
}

impl Deref for ClassArray {
    type Target = LabeledArray;

    fn deref(&self) -> &LabeledArray {
        &self.array
    }
}

impl fmt::Debug for ClassArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassArray")
            .field("class", &self.class.name())
            .field("array", &self.array)
            .finish()
    }
}
