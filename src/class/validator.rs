// In: src/class/validator.rs

//! Stage 1 of the class pipeline: the schema validator.
//!
//! Confirms that a declaration carries axis names, checks axis names and
//! element type against every ancestor under the configured strictness, and
//! resolves the description text. Nothing here touches data; every failure is
//! a declaration-time error.

use crate::class::schema::{AxisNames, Schema};
use crate::config::ClassOptions;
use crate::error::ArrayClassError;
use crate::types::ElementType;
use crate::utils::{normalize_description, NO_DESCRIPTION};
use std::collections::BTreeSet;
use std::sync::Arc;

/// The validated head of a schema: everything except coordinates and
/// construction defaults.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedHead {
    pub axis_names: Vec<String>,
    pub element_type: Option<ElementType>,
    pub description: String,
}

/// Candidate texts for the description, in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DescriptionSources<'a> {
    pub explicit: Option<&'a str>,
    pub doc: Option<&'a str>,
    pub inherited: Option<&'a str>,
}

/// Runs every check for one class declaration.
///
/// `ancestors` lists the base chain, direct base first.
pub(crate) fn ensure_schema(
    class_name: &str,
    axes: Option<&AxisNames>,
    element_type: Option<ElementType>,
    description: DescriptionSources<'_>,
    ancestors: &[Arc<Schema>],
    options: &ClassOptions,
) -> Result<ResolvedHead, ArrayClassError> {
    let axis_names = ensure_axes(class_name, axes, ancestors, options.strict_dims)?;
    ensure_element_type(class_name, element_type, ancestors, options.strict_dtype)?;

    Ok(ResolvedHead {
        axis_names,
        element_type,
        description: resolve_description(description),
    })
}

/// Axis names are mandatory; there is no sensible default.
pub(crate) fn ensure_axes(
    class_name: &str,
    axes: Option<&AxisNames>,
    ancestors: &[Arc<Schema>],
    strict: bool,
) -> Result<Vec<String>, ArrayClassError> {
    let axes = match axes {
        Some(axes) if !axes.is_empty() => axes.as_slice().to_vec(),
        _ => {
            return Err(ArrayClassError::MissingDeclaration {
                class: class_name.to_string(),
                attribute: "axis names",
            })
        }
    };
    ensure_unique(class_name, &axes)?;

    let own: BTreeSet<&str> = axes.iter().map(String::as_str).collect();
    for ancestor in ancestors {
        let theirs: BTreeSet<&str> = ancestor.axis_names().iter().map(String::as_str).collect();

        let reason = if strict && own != theirs {
            Some("axis names must be equal to the base class's")
        } else if !strict && !own.is_superset(&theirs) {
            Some("axis names must be a superset of the base class's")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(ArrayClassError::InconsistentSchema {
                class: class_name.to_string(),
                base: ancestor.class_name().to_string(),
                reason: format!("{} ({:?} vs {:?})", reason, axes, ancestor.axis_names()),
            });
        }
    }
    Ok(axes)
}

/// Under strict mode the element type must equal every ancestor's. Otherwise
/// element types are not compared at all.
pub(crate) fn ensure_element_type(
    class_name: &str,
    element_type: Option<ElementType>,
    ancestors: &[Arc<Schema>],
    strict: bool,
) -> Result<(), ArrayClassError> {
    if !strict {
        return Ok(());
    }
    match ancestors
        .iter()
        .find(|ancestor| ancestor.element_type() != element_type)
    {
        Some(ancestor) => Err(ArrayClassError::InconsistentSchema {
            class: class_name.to_string(),
            base: ancestor.class_name().to_string(),
            reason: format!(
                "element type must be equal to the base class's ({} vs {})",
                display_element_type(element_type),
                display_element_type(ancestor.element_type()),
            ),
        }),
        None => Ok(()),
    }
}

pub(crate) fn ensure_unique(owner: &str, axes: &[String]) -> Result<(), ArrayClassError> {
    let mut seen = BTreeSet::new();
    for axis in axes {
        if !seen.insert(axis.as_str()) {
            return Err(ArrayClassError::InvalidDeclaration(format!(
                "'{}' declares axis '{}' more than once",
                owner, axis
            )));
        }
    }
    Ok(())
}

/// First source that is not blank wins; line breaks and the indentation after
/// them collapse to single spaces.
pub(crate) fn resolve_description(sources: DescriptionSources<'_>) -> String {
    [sources.explicit, sources.doc, sources.inherited]
        .into_iter()
        .flatten()
        .find(|text| !text.trim().is_empty())
        .map(normalize_description)
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

pub(crate) fn display_element_type(element_type: Option<ElementType>) -> String {
    match element_type {
        Some(element_type) => element_type.to_string(),
        None => "any".to_string(),
    }
}
