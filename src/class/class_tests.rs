use std::sync::Arc;

use crate::class::{
    AccessorRegistry, ArrayClass, BufferSpec, ConstructorKind, CoordinateSpec, Overrides, Value,
};
use crate::document::SchemaDocument;
use crate::error::ArrayClassError;
use crate::kernels::{self, MemoryOrder};
use crate::labeled::Attrs;
use crate::traits::HasSchema;
use crate::types::{ArrayData, ElementType, Scalar};

use ndarray::array;

// Test Helpers
fn registry() -> Arc<AccessorRegistry> {
    Arc::new(AccessorRegistry::new())
}

/// Two-axis float image with integer row/column coordinates defaulting to 0,
/// and a `normalize` method reachable through the `img` accessor.
fn image_class(registry: &Arc<AccessorRegistry>) -> ArrayClass {
    ArrayClass::builder("Image")
        .doc("DataArray class\n    to represent images.")
        .axes(["x", "y"])
        .element_type(ElementType::Float64)
        .accessor("img")
        .coordinate_with_default(
            "x",
            CoordinateSpec::new("x").element_type(ElementType::Int64),
            0i64,
        )
        .coordinate_with_default(
            "y",
            CoordinateSpec::new("y").element_type(ElementType::Int64),
            0i64,
        )
        .method("normalize", |acc, _| Ok(Value::from(acc.divide(acc.max()?)?)))
        .build(registry)
        .unwrap()
}

fn sample() -> ArrayData {
    ArrayData::from(array![[0.0, 1.0], [2.0, 3.0]])
}

//==================================================================================
// Construction
//==================================================================================

#[test]
fn test_new_labels_and_casts() {
    let registry = registry();
    let image = image_class(&registry);

    // Integer input is cast to the class element type.
    let arr = image.new(array![[0, 1], [2, 3]], &Overrides::new()).unwrap();

    assert_eq!(arr.shape(), &[2, 2]);
    assert_eq!(arr.element_type(), ElementType::Float64);
    let keys: Vec<String> = arr.axis_sizes().into_keys().collect();
    assert_eq!(keys, vec!["x", "y"]);
    assert_eq!(arr.data(), &sample());
}

#[test]
fn test_coordinate_default_and_override() {
    // 1. Arrange
    let registry = registry();
    let image = image_class(&registry);

    // 2. Act
    let defaulted = image.new(sample(), &Overrides::new()).unwrap();
    let overridden = image
        .new(sample(), &Overrides::new().coord("x", vec![5i64, 6]))
        .unwrap();

    // 3. Assert
    let x = defaulted.coordinate("x").unwrap();
    assert_eq!(x.data(), &ArrayData::from(vec![0i64, 0]));
    assert_eq!(x.axes(), &["x".to_string()]);

    assert_eq!(
        overridden.coordinate("x").unwrap().data(),
        &ArrayData::from(vec![5i64, 6])
    );
    assert_eq!(
        overridden.coordinate("y").unwrap().data(),
        &ArrayData::from(vec![0i64, 0])
    );
}

#[test]
fn test_coordinate_override_is_cast_to_coordinate_type() {
    let registry = registry();
    let image = image_class(&registry);

    let arr = image
        .new(sample(), &Overrides::new().coord("y", vec![1.0, 2.0]))
        .unwrap();
    assert_eq!(
        arr.coordinate("y").unwrap().data(),
        &ArrayData::from(vec![1i64, 2])
    );

    let err = image
        .new(sample(), &Overrides::new().coord("y", vec![f64::NAN, 2.0]))
        .unwrap_err();
    assert!(matches!(err, ArrayClassError::TypeConversion { .. }));
}

#[test]
fn test_filled_constructors_match_new() {
    let registry = registry();
    let image = image_class(&registry);
    let none = Overrides::new();

    let zeros = image.zeros(&[2, 3], BufferSpec::default(), &none).unwrap();
    let expected = image
        .new(kernels::zeros(&[2, 3], None, MemoryOrder::C).unwrap(), &none)
        .unwrap();
    assert_eq!(zeros.as_labeled(), expected.as_labeled());

    let ones = image
        .ones(&[2, 3], BufferSpec::default().order(MemoryOrder::F), &none)
        .unwrap();
    let expected = image
        .new(kernels::ones(&[2, 3], None, MemoryOrder::C).unwrap(), &none)
        .unwrap();
    assert_eq!(ones.as_labeled(), expected.as_labeled());

    let full = image.full(&[2, 3], 3.5, BufferSpec::default(), &none).unwrap();
    let expected = image
        .new(kernels::full(&[2, 3], &ArrayData::from(3.5), None, MemoryOrder::C).unwrap(), &none)
        .unwrap();
    assert_eq!(full.as_labeled(), expected.as_labeled());
    assert_eq!(full.max().unwrap(), 3.5);

    let empty = image.empty(&[2, 3], BufferSpec::default(), &none).unwrap();
    assert_eq!(empty.shape(), &[2, 3]);
    assert_eq!(empty.coordinate("y").unwrap().shape(), &[3]);
}

#[test]
fn test_filled_constructors_reject_oversized_shape() {
    let registry = registry();
    let image = image_class(&registry);
    let none = Overrides::new();
    let huge = [usize::MAX, 2];

    let results = [
        image.zeros(&huge, BufferSpec::default(), &none),
        image.ones(&huge, BufferSpec::default(), &none),
        image.empty(&huge, BufferSpec::default(), &none),
        image.full(&huge, 1.0, BufferSpec::default(), &none),
    ];
    for result in results {
        assert!(matches!(result, Err(ArrayClassError::Shape(_))));
    }
}

#[test]
fn test_class_element_type_overrides_buffer_dtype() {
    let registry = registry();
    let image = image_class(&registry);

    let arr = image
        .zeros(&[1, 1], BufferSpec::default().dtype(ElementType::Int32), &Overrides::new())
        .unwrap();
    assert_eq!(arr.element_type(), ElementType::Float64);

    let untyped = ArrayClass::builder("Untyped")
        .axes("t")
        .build(&registry)
        .unwrap();
    let arr = untyped
        .ones(&[4], BufferSpec::default().dtype(ElementType::UInt8), &Overrides::new())
        .unwrap();
    assert_eq!(arr.element_type(), ElementType::UInt8);
}

#[test]
fn test_name_and_attrs_defaults() {
    let registry = registry();
    let mut attrs = Attrs::new();
    attrs.insert("units".to_string(), serde_json::json!("counts"));

    let image = ArrayClass::builder("Image")
        .axes(["x", "y"])
        .default_name("image")
        .default_attrs(attrs.clone())
        .build(&registry)
        .unwrap();

    let arr = image.new(sample(), &Overrides::new()).unwrap();
    assert_eq!(arr.name(), Some("image"));
    assert_eq!(arr.attrs(), &attrs);

    let arr = image
        .new(sample(), &Overrides::new().name("other").attrs(Attrs::new()))
        .unwrap();
    assert_eq!(arr.name(), Some("other"));
    assert!(arr.attrs().is_empty());
}

//==================================================================================
// Construction errors
//==================================================================================

#[test]
fn test_missing_coordinate_value_names_each_coordinate() {
    let registry = registry();
    let grid = ArrayClass::builder("Grid")
        .axes(["x", "y"])
        .coordinate("x", CoordinateSpec::new("x"))
        .coordinate("y", CoordinateSpec::new("y"))
        .build(&registry)
        .unwrap();

    for (missing, given) in [("x", "y"), ("y", "x")] {
        let overrides = Overrides::new().coord(given, 0i64);
        match grid.new(sample(), &overrides).unwrap_err() {
            ArrayClassError::MissingCoordinateValue(name) => assert_eq!(name, missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    let err = grid.new(sample(), &Overrides::new()).unwrap_err();
    assert!(err.to_string().contains("coordinate x"));
}

#[test]
fn test_unknown_axis_at_construction() {
    let registry = registry();
    let image = ArrayClass::builder("Image")
        .axes(["x", "y"])
        .coordinate_with_default("t", CoordinateSpec::new("time"), 0i64)
        .build(&registry)
        .unwrap();

    match image.new(sample(), &Overrides::new()).unwrap_err() {
        ArrayClassError::UnknownAxis { coordinate, axis } => {
            assert_eq!(coordinate, "t");
            assert_eq!(axis, "time");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_data_errors() {
    let registry = registry();
    let image = image_class(&registry);
    let bytes = ArrayClass::builder("Bytes")
        .axes("x")
        .element_type(ElementType::Int8)
        .build(&registry)
        .unwrap();

    assert!(matches!(
        image.new(vec![1.0, 2.0], &Overrides::new()),
        Err(ArrayClassError::DimensionMismatch { expected: 2, found: 1 })
    ));
    assert!(matches!(
        bytes.new(vec![1i64, 1000], &Overrides::new()),
        Err(ArrayClassError::TypeConversion { to: ElementType::Int8, .. })
    ));
    assert!(matches!(
        image.new(sample(), &Overrides::new().coord("x", vec![1i64, 2, 3])),
        Err(ArrayClassError::Shape(_))
    ));
}

#[test]
fn test_undeclared_coordinate_override_is_ignored() {
    let registry = registry();
    let image = image_class(&registry);

    let arr = image
        .new(sample(), &Overrides::new().coord("z", 1i64).coord("x", vec![5i64, 6]))
        .unwrap();

    assert!(arr.coordinate("z").is_none());
    let names: Vec<&str> = arr.coordinates().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert_eq!(
        arr.coordinate("x").unwrap().data(),
        &ArrayData::from(vec![5i64, 6])
    );
}

//==================================================================================
// Inheritance
//==================================================================================

#[test]
fn test_subclass_keeps_inherited_defaults() {
    // 1. Arrange
    let registry = registry();
    let image = image_class(&registry);

    // 2. Act
    let weighted = image
        .subclass("WeightedImage")
        .coordinate_with_default(
            "w",
            CoordinateSpec::new(["x", "y"]).element_type(ElementType::Float64),
            1.0,
        )
        .build(&registry)
        .unwrap();
    let arr = weighted.new(sample(), &Overrides::new()).unwrap();

    // 3. Assert
    let names: Vec<&str> = arr.coordinates().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["x", "y", "w"]);
    assert_eq!(arr.coordinate("x").unwrap().data(), &ArrayData::from(vec![0i64, 0]));
    assert_eq!(
        arr.coordinate("w").unwrap().data(),
        &ArrayData::from(array![[1.0, 1.0], [1.0, 1.0]])
    );

    assert!(weighted.is_subclass_of(&image));
    assert!(!image.is_subclass_of(&weighted));
    assert_eq!(weighted.ancestors().len(), 1);
    assert_eq!(weighted.schema().description(), image.schema().description());
}

#[test]
fn test_subclass_may_override_inherited_default() {
    let registry = registry();
    let image = image_class(&registry);
    let shifted = image
        .subclass("Shifted")
        .coordinate_default("x", 7i64)
        .build(&registry)
        .unwrap();

    let arr = shifted.new(sample(), &Overrides::new()).unwrap();
    assert_eq!(arr.coordinate("x").unwrap().data(), &ArrayData::from(vec![7i64, 7]));
    assert_eq!(image.coordinate_default("x"), Some(&ArrayData::from(0i64)));
}

#[test]
fn test_axis_strictness_against_base() {
    let registry = registry();
    let image = image_class(&registry);

    // Strict subset: rejected in both modes.
    for strict in [true, false] {
        let err = image
            .subclass("Line")
            .axes("x")
            .strict_dims(strict)
            .build(&registry)
            .unwrap_err();
        assert!(matches!(err, ArrayClassError::InconsistentSchema { .. }));
    }

    // Superset: accepted only when lenient.
    assert!(image
        .subclass("Movie")
        .axes(["x", "y", "t"])
        .build(&registry)
        .is_ok());
    assert!(image
        .subclass("Movie")
        .axes(["x", "y", "t"])
        .strict_dims(true)
        .build(&registry)
        .is_err());

    // Reordered: same set.
    assert!(image
        .subclass("Transposed")
        .axes(["y", "x"])
        .strict_dims(true)
        .build(&registry)
        .is_ok());
}

#[test]
fn test_dtype_strictness_against_base() {
    let registry = registry();
    let image = image_class(&registry);

    assert!(image
        .subclass("IntImage")
        .element_type(ElementType::Int32)
        .build(&registry)
        .is_ok());
    assert!(matches!(
        image
            .subclass("IntImage")
            .element_type(ElementType::Int32)
            .strict_dtype(true)
            .build(&registry),
        Err(ArrayClassError::InconsistentSchema { .. })
    ));
}

//==================================================================================
// Accessors
//==================================================================================

#[test]
fn test_method_through_accessor_matches_free_function() {
    let registry = registry();
    let image = image_class(&registry);
    let arr = image.new(sample(), &Overrides::new()).unwrap();

    let accessor = arr.accessor().unwrap();
    assert_eq!(accessor.accessor_name(), "img");

    let normalized = accessor.call("normalize", &[]).unwrap().into_array().unwrap();
    let direct = arr.divide(arr.max().unwrap()).unwrap();
    assert_eq!(normalized, direct);
    assert_eq!(
        normalized.data(),
        &ArrayData::from(array![[0.0, 1.0 / 3.0], [2.0 / 3.0, 1.0]])
    );

    // Methods are not members of the array itself.
    assert!(matches!(
        accessor.call("zeros", &[]),
        Err(ArrayClassError::NoSuchAttribute { .. })
    ));
}

#[test]
fn test_shared_accessor_union_and_precedence() {
    // 1. Arrange: two unrelated classes under one accessor name.
    let registry = registry();
    let first = ArrayClass::builder("First")
        .axes("x")
        .accessor("shared")
        .method("only_first", |_, _| Ok(Value::from(1.0)))
        .method("both", |_, _| Ok(Value::from(1.0)))
        .build(&registry)
        .unwrap();
    let second = ArrayClass::builder("Second")
        .axes("x")
        .accessor("shared")
        .method("only_second", |_, _| Ok(Value::from(2.0)))
        .method("both", |_, _| Ok(Value::from(2.0)))
        .build(&registry)
        .unwrap();

    // 2. Act
    let arr = first.new(vec![1.0, 2.0], &Overrides::new()).unwrap();
    let accessor = arr.accessor().unwrap();

    // 3. Assert
    let members: Vec<String> = accessor.members().into_iter().collect();
    assert_eq!(members, vec!["both", "only_first", "only_second"]);
    assert_eq!(accessor.owners(), vec!["Second", "First"]);
    assert_eq!(accessor.call("both", &[]).unwrap(), Value::from(2.0));
    assert_eq!(accessor.call("only_first", &[]).unwrap(), Value::from(1.0));

    // The private accessors stay separate.
    let own = arr.own_accessor().unwrap();
    assert_eq!(own.call("both", &[]).unwrap(), Value::from(1.0));
    assert!(!own.has("only_second"));
    assert_ne!(first.private_accessor_name(), second.private_accessor_name());
    assert_eq!(registry.names(), vec!["shared"]);
}

#[test]
fn test_subclass_methods_layer_over_base() {
    let registry = registry();
    let image = image_class(&registry);
    let scaled = image
        .subclass("Scaled")
        .accessor("scaled")
        .method("scale", |acc, args| {
            let factor = args.first().map(Scalar::as_f64).unwrap_or(1.0);
            Ok(Value::from(acc.divide(1.0 / factor)?))
        })
        .build(&registry)
        .unwrap();

    let arr = scaled.new(sample(), &Overrides::new()).unwrap();
    let accessor = arr.accessor().unwrap();

    assert!(accessor.has("normalize"));
    let doubled = accessor
        .call("scale", &[Scalar::Float(2.0)])
        .unwrap()
        .into_array()
        .unwrap();
    assert_eq!(doubled.max().unwrap(), 6.0);
    assert!(registry.accessor("img", &arr).unwrap().has("normalize"));
}

#[test]
fn test_class_without_accessor_name_uses_private_one() {
    let registry = registry();
    let plain = ArrayClass::builder("Plain")
        .axes("x")
        .method("peak", |acc, _| Ok(Value::from(acc.max()?)))
        .build(&registry)
        .unwrap();

    let arr = plain.new(vec![3.0, 9.0], &Overrides::new()).unwrap();
    assert_eq!(plain.accessor_name(), plain.private_accessor_name());
    assert_eq!(arr.accessor().unwrap().call("peak", &[]).unwrap(), Value::from(9.0));
    assert!(registry.names().is_empty());
}

//==================================================================================
// Declaration errors
//==================================================================================

#[test]
fn test_declaration_errors() {
    let registry = registry();
    registry.reserve("plot", "plotting namespace").unwrap();

    assert!(matches!(
        ArrayClass::builder("NoAxes").build(&registry),
        Err(ArrayClassError::MissingDeclaration { .. })
    ));
    assert!(matches!(
        ArrayClass::builder("Plot").axes("x").accessor("plot").build(&registry),
        Err(ArrayClassError::AccessorConflict { .. })
    ));
    assert!(matches!(
        ArrayClass::builder("Dunder")
            .axes("x")
            .method("__call__", |_, _| Ok(Value::from(0.0)))
            .build(&registry),
        Err(ArrayClassError::InvalidDeclaration(_))
    ));
    assert!(matches!(
        ArrayClass::builder("Orphan")
            .axes("x")
            .coordinate_default("x", 0i64)
            .build(&registry),
        Err(ArrayClassError::InvalidDeclaration(_))
    ));
}

//==================================================================================
// Schema carriers, documents and help text
//==================================================================================

#[test]
fn test_coordinate_declared_from_another_class() {
    let registry = registry();
    let time = ArrayClass::builder("Time")
        .axes("t")
        .element_type(ElementType::Float32)
        .description("Seconds since start.")
        .build(&registry)
        .unwrap();
    let series = ArrayClass::builder("Series")
        .axes("t")
        .coordinate_with_default("time", &time, 0.0)
        .build(&registry)
        .unwrap();

    let arr = series.new(vec![1.0, 2.0, 3.0], &Overrides::new()).unwrap();
    let coordinate = arr.coordinate("time").unwrap();
    assert_eq!(coordinate.element_type(), ElementType::Float32);
    assert!(series.summary().contains("`time`"));
    assert!(series
        .doc(ConstructorKind::New)
        .contains("dtype: `float32`) Seconds since start."));
}

#[test]
fn test_include_document_equals_declaration() {
    let registry = registry();
    let doc = SchemaDocument::from_json_str(
        r#"{
            "dims": ["x", "y"],
            "dtype": "float",
            "desc": "DataArray class to represent images.",
            "accessor": "pic",
            "coords": {
                "x": {"dims": "x", "dtype": "int", "default": 0},
                "y": {"dims": "y", "dtype": "int", "default": 0}
            }
        }"#,
    )
    .unwrap();

    let included = ArrayClass::builder("Image")
        .include(&doc)
        .unwrap()
        .build(&registry)
        .unwrap();
    let declared = image_class(&registry);

    let a = included.new(sample(), &Overrides::new()).unwrap();
    let b = declared.new(sample(), &Overrides::new()).unwrap();
    assert_eq!(a.as_labeled(), b.as_labeled());
    assert_eq!(included.accessor_name(), "pic");
    assert_eq!(included.summary(), declared.summary());
}

#[test]
fn test_help_text() {
    let registry = registry();
    let image = image_class(&registry);

    assert!(image
        .summary()
        .contains("- **desc:** DataArray class to represent images."));
    for kind in ConstructorKind::ALL {
        assert!(image.doc(kind).contains("Coordinates:"));
    }
    assert!(image.doc(ConstructorKind::Ones).starts_with("Create a custom labeled array filled with ones."));
}
