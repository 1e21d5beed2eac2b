// In: src/class/builder.rs

//! Declares an array class and runs the four-stage pipeline that builds it.
//!
//! ```text
//! ArrayClassBuilder
//!   -> validator        (axes / element type vs. every base, description)
//!   -> coordinate map   (inherited + own declarations, in order)
//!   -> constructors     (ArrayClass + generated help text)
//!   -> relocator        (method table registered with the AccessorRegistry)
//! ```
//!
//! A failure at any stage aborts the build; nothing is registered unless all
//! earlier stages succeeded.

use crate::class::accessor::{Accessor, AccessorDescriptor, AccessorRegistry, Method, Value};
use crate::class::constructor::{ArrayClass, ClassInner};
use crate::class::coords::collect_coordinates;
use crate::class::docstring::ConstructorDocs;
use crate::class::schema::{AxisNames, CoordinateSpec, Schema};
use crate::class::validator::{ensure_schema, DescriptionSources};
use crate::config::ClassOptions;
use crate::document::SchemaDocument;
use crate::error::ArrayClassError;
use crate::labeled::Attrs;
use crate::traits::HasSchema;
use crate::types::{ArrayData, ElementType, Scalar};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Declaration of an array class.
///
/// Obtained from `ArrayClass::builder` (a fresh class) or
/// `ArrayClass::subclass` (a class derived from an existing one, with every
/// inheritable setting pre-populated from the base).
pub struct ArrayClassBuilder {
    class_name: String,
    base: Option<ArrayClass>,
    axes: Option<AxisNames>,
    element_type: Option<ElementType>,
    description: Option<String>,
    doc: Option<String>,
    options: ClassOptions,
    default_name: Option<String>,
    default_attrs: Attrs,
    coordinates: Vec<(String, CoordinateSpec)>,
    defaults: BTreeMap<String, ArrayData>,
    methods: Vec<(String, Method)>,
}

impl ArrayClassBuilder {
    pub(crate) fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            base: None,
            axes: None,
            element_type: None,
            description: None,
            doc: None,
            options: ClassOptions::default(),
            default_name: None,
            default_attrs: Attrs::new(),
            coordinates: Vec::new(),
            defaults: BTreeMap::new(),
            methods: Vec::new(),
        }
    }

    pub(crate) fn derived(class_name: impl Into<String>, base: ArrayClass) -> Self {
        let schema = base.schema();
        let mut builder = Self::new(class_name);
        builder.axes = Some(AxisNames::from(schema.axis_names()));
        builder.element_type = schema.element_type();
        builder.options.accessor = schema.accessor_name().map(str::to_string);
        builder.default_name = schema.default_name().map(str::to_string);
        builder.default_attrs = schema.default_attrs().clone();
        builder.defaults = base.inner.defaults.clone();
        builder.base = Some(base);
        builder
    }

    //==============================================================================
    // Declaration
    //==============================================================================

    /// Axis names of the array. Required.
    pub fn axes(mut self, axes: impl Into<AxisNames>) -> Self {
        self.axes = Some(axes.into());
        self
    }

    /// Element type every produced array is cast to. Unset accepts any.
    pub fn element_type(mut self, element_type: ElementType) -> Self {
        self.element_type = Some(element_type);
        self
    }

    /// Like `element_type`, but unsets an inherited type.
    pub fn any_element_type(mut self) -> Self {
        self.element_type = None;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Free-form documentation text. Used as the description when no explicit
    /// one is given; its line breaks collapse to spaces.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn accessor(mut self, name: impl Into<String>) -> Self {
        self.options.accessor = Some(name.into());
        self
    }

    pub fn strict_dims(mut self, strict: bool) -> Self {
        self.options.strict_dims = strict;
        self
    }

    pub fn strict_dtype(mut self, strict: bool) -> Self {
        self.options.strict_dtype = strict;
        self
    }

    /// Replaces the accessor name and both strictness flags at once.
    pub fn options(mut self, options: ClassOptions) -> Self {
        self.options = options;
        self
    }

    pub fn default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = Some(name.into());
        self
    }

    pub fn default_attrs(mut self, attrs: Attrs) -> Self {
        self.default_attrs = attrs;
        self
    }

    /// Declares (or redeclares) a coordinate. Accepts a `CoordinateSpec` or
    /// any schema carrier, e.g. another `ArrayClass`.
    pub fn coordinate(mut self, name: impl Into<String>, spec: impl Into<CoordinateSpec>) -> Self {
        let name = name.into();
        let spec = spec.into();
        match self.coordinates.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = spec,
            None => self.coordinates.push((name, spec)),
        }
        self
    }

    /// Class-level value used when a construction call gives none.
    pub fn coordinate_default(mut self, name: impl Into<String>, value: impl Into<ArrayData>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    pub fn coordinate_with_default(
        self,
        name: impl Into<String>,
        spec: impl Into<CoordinateSpec>,
        value: impl Into<ArrayData>,
    ) -> Self {
        let name = name.into();
        self.coordinate(name.clone(), spec)
            .coordinate_default(name, value)
    }

    /// Adds a user method. It is reachable only through the class's accessor,
    /// never on the arrays themselves.
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Accessor<'_>, &[Scalar]) -> Result<Value, ArrayClassError> + Send + Sync + 'static,
    {
        let name = name.into();
        let method: Method = Arc::new(method);
        match self.methods.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = method,
            None => self.methods.push((name, method)),
        }
        self
    }

    /// Applies a declaration document: every key present in it overrides the
    /// builder's current setting, coordinates are declared in document order
    /// and their defaults stored.
    pub fn include(mut self, document: &SchemaDocument) -> Result<Self, ArrayClassError> {
        if let Some(dims) = &document.dims {
            self.axes = Some(dims.clone());
        }
        if let Some(dtype) = document.dtype {
            self.element_type = Some(dtype);
        }
        if let Some(desc) = &document.desc {
            self.description = Some(desc.clone());
        }
        if let Some(accessor) = &document.accessor {
            self.options.accessor = Some(accessor.clone());
        }
        for (name, entry) in &document.coords {
            let default = entry.default_value()?;
            self = self.coordinate(name.clone(), entry.spec());
            if let Some(value) = default {
                self = self.coordinate_default(name.clone(), value);
            }
        }
        Ok(self)
    }

    //==============================================================================
    // Pipeline
    //==============================================================================

    /// Validates the declaration, builds the class and registers its accessor
    /// with `registry`.
    pub fn build(self, registry: &Arc<AccessorRegistry>) -> Result<ArrayClass, ArrayClassError> {
        let class_name = self.class_name;
        log::debug!("Building array class '{}'", class_name);

        let ancestors: Vec<Arc<Schema>> = match &self.base {
            Some(base) => std::iter::once(Arc::clone(&base.inner.schema))
                .chain(base.inner.ancestors.iter().cloned())
                .collect(),
            None => Vec::new(),
        };

        // --- Stage 1: validator ---
        let head = ensure_schema(
            &class_name,
            self.axes.as_ref(),
            self.element_type,
            DescriptionSources {
                explicit: self.description.as_deref(),
                doc: self.doc.as_deref(),
                inherited: ancestors.first().map(|base| base.description()),
            },
            &ancestors,
            &self.options,
        )?;
        crate::log_metric!(
            "event" = "validate",
            "class" = &class_name,
            "axes" = format!("{:?}", head.axis_names),
            "ancestors" = ancestors.len()
        );

        // --- Stage 2: coordinate registry ---
        let coordinates =
            collect_coordinates(&class_name, &head.axis_names, &ancestors, &self.coordinates)?;
        if let Some(orphan) = self
            .defaults
            .keys()
            .find(|name| !coordinates.iter().any(|(declared, _)| declared == *name))
        {
            return Err(ArrayClassError::InvalidDeclaration(format!(
                "class '{}' has a default for undeclared coordinate '{}'",
                class_name, orphan
            )));
        }
        crate::log_metric!(
            "event" = "collect_coordinates",
            "class" = &class_name,
            "count" = coordinates.len(),
            "defaults" = self.defaults.len()
        );

        // --- Stage 3: constructor synthesizer ---
        let schema = Arc::new(Schema {
            class_name: class_name.clone(),
            axis_names: head.axis_names,
            element_type: head.element_type,
            description: head.description,
            coordinates,
            accessor_name: self.options.accessor.clone(),
            default_name: self.default_name,
            default_attrs: self.default_attrs,
        });
        let docs = ConstructorDocs::generate(&schema);

        // --- Stage 4: accessor relocator ---
        let inherited = self.base.as_ref().map(|base| base.descriptor().as_ref());
        let descriptor = Arc::new(AccessorDescriptor::relocate(
            &class_name,
            inherited,
            self.methods,
        )?);
        if let Some(name) = &self.options.accessor {
            registry.register(name, Arc::clone(&descriptor))?;
        }
        let private_accessor = registry.register_private(Arc::clone(&descriptor));
        crate::log_metric!(
            "event" = "relocate",
            "class" = &class_name,
            "methods" = descriptor.method_names().count(),
            "accessor" = schema.accessor_name().unwrap_or(private_accessor.as_str())
        );

        log::info!(
            "Built array class '{}' with axes {:?} and {} coordinate(s)",
            class_name,
            schema.axis_names(),
            schema.coordinates().len()
        );

        Ok(ArrayClass {
            inner: Arc::new(ClassInner {
                schema,
                ancestors,
                defaults: self.defaults,
                descriptor,
                private_accessor,
                registry: Arc::clone(registry),
                docs,
            }),
        })
    }
}
