//! Stage 2 of the class pipeline: the coordinate registry.
//!
//! Resolves each `CoordinateSpec` into a nested `Schema` and merges the
//! declarations of the whole base chain into one ordered list. Most-base
//! declarations come first; a redeclaration replaces the earlier entry in
//! place so inherited order is stable.

use crate::class::schema::{CoordinateSpec, Schema};
use crate::class::validator::{ensure_unique, resolve_description, DescriptionSources};
use crate::error::ArrayClassError;
use crate::labeled::Attrs;
use std::sync::Arc;

/// Resolves a coordinate declaration. Unlike a class, a coordinate may have
/// no axes at all.
pub(crate) fn resolve_coordinate(
    name: &str,
    spec: &CoordinateSpec,
) -> Result<Schema, ArrayClassError> {
    let axis_names = spec.axes().to_vec();
    ensure_unique(name, &axis_names)?;

    Ok(Schema {
        class_name: name.to_string(),
        axis_names,
        element_type: spec.element_type,
        description: resolve_description(DescriptionSources {
            explicit: spec.description.as_deref(),
            ..DescriptionSources::default()
        }),
        coordinates: Vec::new(),
        accessor_name: None,
        default_name: None,
        default_attrs: Attrs::new(),
    })
}

/// Builds the ordered coordinate map for a class.
///
/// `ancestors` is the base chain, direct base first; it is walked in reverse
/// so that nearer declarations override farther ones. `own` are the class's
/// own declarations, applied last.
pub(crate) fn collect_coordinates(
    class_name: &str,
    axis_names: &[String],
    ancestors: &[Arc<Schema>],
    own: &[(String, CoordinateSpec)],
) -> Result<Vec<(String, Arc<Schema>)>, ArrayClassError> {
    let mut coordinates: Vec<(String, Arc<Schema>)> = Vec::new();

    for ancestor in ancestors.iter().rev() {
        for (name, schema) in ancestor.coordinates() {
            upsert(&mut coordinates, name, Arc::clone(schema));
        }
    }

    for (name, spec) in own {
        let schema = Arc::new(resolve_coordinate(name, spec)?);
        upsert(&mut coordinates, name, schema);
    }

    // Not an error here: the axis is looked up against the built array, where
    // a missing one fails with `UnknownAxis`.
    for (name, schema) in &coordinates {
        for axis in schema.axis_names() {
            if !axis_names.contains(axis) {
                log::warn!(
                    "Coordinate '{}' of class '{}' refers to axis '{}' which the class does not declare",
                    name,
                    class_name,
                    axis
                );
            }
        }
    }

    Ok(coordinates)
}

fn upsert(coordinates: &mut Vec<(String, Arc<Schema>)>, name: &str, schema: Arc<Schema>) {
    match coordinates.iter_mut().find(|(existing, _)| existing == name) {
        Some(slot) => slot.1 = schema,
        None => coordinates.push((name.to_string(), schema)),
    }
}
