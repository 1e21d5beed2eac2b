//! Help text for the synthesized constructors.
//!
//! Each constructor has a fixed template with two slots: `{summary}` (the
//! class's description, axes, element type and coordinate names) and
//! `{coords_doc}` (one entry per coordinate). The text is generated once when
//! a class is built and has no effect on behavior.

use crate::class::schema::Schema;
use crate::class::validator::display_element_type;
use crate::utils::{indent, wrap};

const WIDTH: usize = 80;
const HALF_INDENT: &str = "  ";
const INDENT: &str = "    ";

/// The five synthesized constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructorKind {
    New,
    Empty,
    Zeros,
    Ones,
    Full,
}

impl ConstructorKind {
    pub const ALL: [ConstructorKind; 5] = [
        Self::New,
        Self::Empty,
        Self::Zeros,
        Self::Ones,
        Self::Full,
    ];

    fn template(&self) -> &'static str {
        match self {
            Self::New => NEW_TEMPLATE,
            Self::Empty => EMPTY_TEMPLATE,
            Self::Zeros => ZEROS_TEMPLATE,
            Self::Ones => ONES_TEMPLATE,
            Self::Full => FULL_TEMPLATE,
        }
    }
}

const NEW_TEMPLATE: &str = "\
Create a custom labeled array from data and coordinates.

{summary}

Arguments:
    data: Values of the array. Its rank must match the class axes.
        If the class element type is set, the data is cast to it.
    overrides: Array name, attributes and coordinate values.
        Name and attributes default to the class-level defaults.

Returns:
    Custom labeled array.

{coords_doc}";

const EMPTY_TEMPLATE: &str = "\
Create a custom labeled array whose values must not be relied on.

{summary}

Arguments:
    shape: Shape of the array. Its length must match the class axes.
    buffer: Element type (default float64, ignored if the class sets one)
        and memory order (C: row-major, F: column-major).
    overrides: Array name, attributes and coordinate values.

Returns:
    Custom labeled array with unspecified values.

{coords_doc}";

const ZEROS_TEMPLATE: &str = "\
Create a custom labeled array filled with zeros.

{summary}

Arguments:
    shape: Shape of the array. Its length must match the class axes.
    buffer: Element type (default float64, ignored if the class sets one)
        and memory order (C: row-major, F: column-major).
    overrides: Array name, attributes and coordinate values.

Returns:
    Custom labeled array filled with zeros.

{coords_doc}";

const ONES_TEMPLATE: &str = "\
Create a custom labeled array filled with ones.

{summary}

Arguments:
    shape: Shape of the array. Its length must match the class axes.
    buffer: Element type (default float64, ignored if the class sets one)
        and memory order (C: row-major, F: column-major).
    overrides: Array name, attributes and coordinate values.

Returns:
    Custom labeled array filled with ones.

{coords_doc}";

const FULL_TEMPLATE: &str = "\
Create a custom labeled array filled with `fill_value`.

{summary}

Arguments:
    shape: Shape of the array. Its length must match the class axes.
    fill_value: Scalar (or broadcastable array) to fill the array with.
    buffer: Element type (default: that of fill_value, ignored if the
        class sets one) and memory order (C: row-major, F: column-major).
    overrides: Array name, attributes and coordinate values.

Returns:
    Custom labeled array filled with `fill_value`.

{coords_doc}";

/// Rendered help text for all five constructors of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConstructorDocs {
    summary: String,
    docs: [String; 5],
}

impl ConstructorDocs {
    pub(crate) fn generate(schema: &Schema) -> Self {
        let summary = create_summary(schema);
        let coords_doc = create_coords_doc(schema);
        let docs = ConstructorKind::ALL.map(|kind| {
            kind.template()
                .replace("{summary}", &summary)
                .replace("{coords_doc}", &coords_doc)
                .trim_end()
                .to_string()
        });
        Self { summary, docs }
    }

    pub(crate) fn summary(&self) -> &str {
        &self.summary
    }

    pub(crate) fn get(&self, kind: ConstructorKind) -> &str {
        let index = ConstructorKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        &self.docs[index]
    }
}

fn create_summary(schema: &Schema) -> String {
    let coords: Vec<String> = schema
        .coordinates()
        .iter()
        .map(|(name, _)| format!("`{}`", name))
        .collect();

    let lines = [
        format!("- **desc:** {}", schema.description()),
        format!("- **dims:** `{:?}`", schema.axis_names()),
        format!("- **dtype:** `{}`", display_element_type(schema.element_type())),
        format!("- **coords:** {}", coords.join(", ")),
    ];

    lines
        .iter()
        .map(|line| wrap(line, WIDTH, HALF_INDENT))
        .collect::<Vec<_>>()
        .join("\n")
}

fn create_coords_doc(schema: &Schema) -> String {
    if schema.coordinates().is_empty() {
        return String::new();
    }

    let mut docs = vec!["Coordinates:".to_string()];
    for (name, coordinate) in schema.coordinates() {
        let entry = format!(
            "{}: (dims: `{:?}`, dtype: `{}`) {}",
            name,
            coordinate.axis_names(),
            display_element_type(coordinate.element_type()),
            coordinate.description()
        );
        docs.push(indent(&wrap(&entry, WIDTH - INDENT.len(), INDENT), INDENT));
    }
    docs.join("\n")
}
