// In: src/document.rs

//! Array-class declarations kept in a JSON, TOML or YAML document.
//!
//! Recognized keys:
//!
//! - `dims`: axis names, a string or a list of strings.
//! - `dtype`: element type name (`"float"`, `"int32"`, ...).
//! - `desc`: short description.
//! - `accessor`: public accessor name.
//! - `coords`: map of coordinate name to `{dims, dtype, desc, default}`.
//!
//! The crate never reads files; callers pass the text and, if they have a
//! path, use `DocumentFormat::from_path` to pick the parser. A parsed document
//! is applied with `ArrayClassBuilder::include`.

use crate::class::{AxisNames, CoordinateSpec};
use crate::error::ArrayClassError;
use crate::types::{ArrayData, ElementType};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
    Yaml,
}

impl DocumentFormat {
    /// Classifies a path by its extension. No I/O is performed.
    pub fn from_path(path: &Path) -> Result<Self, ArrayClassError> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => Ok(DocumentFormat::Json),
            "toml" => Ok(DocumentFormat::Toml),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            _ => Err(ArrayClassError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// One entry under `coords`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoordinateEntry {
    #[serde(default, deserialize_with = "deserialize_dims")]
    pub dims: Option<AxisNames>,
    #[serde(default)]
    pub dtype: Option<ElementType>,
    #[serde(default)]
    pub desc: Option<String>,
    /// Raw default value: a scalar or a nested rectangular list.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

impl CoordinateEntry {
    /// The declaration part of the entry. Missing `dims` declares a scalar
    /// coordinate.
    pub fn spec(&self) -> CoordinateSpec {
        let mut spec = CoordinateSpec::new(self.dims.clone().unwrap_or_default());
        if let Some(dtype) = self.dtype {
            spec = spec.element_type(dtype);
        }
        if let Some(desc) = &self.desc {
            spec = spec.description(desc.clone());
        }
        spec
    }

    pub fn default_value(&self) -> Result<Option<ArrayData>, ArrayClassError> {
        self.default.as_ref().map(ArrayData::from_json).transpose()
    }
}

/// A parsed declaration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default, deserialize_with = "deserialize_dims")]
    pub dims: Option<AxisNames>,
    #[serde(default)]
    pub dtype: Option<ElementType>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub accessor: Option<String>,
    /// Coordinates in document order.
    #[serde(default, deserialize_with = "deserialize_coords")]
    pub coords: Vec<(String, CoordinateEntry)>,
}

impl SchemaDocument {
    pub fn from_json_str(text: &str) -> Result<Self, ArrayClassError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ArrayClassError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ArrayClassError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, ArrayClassError> {
        match format {
            DocumentFormat::Json => Self::from_json_str(text),
            DocumentFormat::Toml => Self::from_toml_str(text),
            DocumentFormat::Yaml => Self::from_yaml_str(text),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DimsRepr {
    One(String),
    Many(Vec<String>),
}

fn deserialize_dims<'de, D>(deserializer: D) -> Result<Option<AxisNames>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<DimsRepr>::deserialize(deserializer)?.map(|repr| match repr {
            DimsRepr::One(name) => AxisNames::from(name),
            DimsRepr::Many(names) => AxisNames::from(names),
        }),
    )
}

// A plain map type would lose the document's coordinate order.
fn deserialize_coords<'de, D>(deserializer: D) -> Result<Vec<(String, CoordinateEntry)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CoordsVisitor;

    impl<'de> Visitor<'de> for CoordsVisitor {
        type Value = Vec<(String, CoordinateEntry)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of coordinate name to coordinate entry")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries: Vec<(String, CoordinateEntry)> = Vec::new();
            while let Some((name, entry)) = map.next_entry::<String, CoordinateEntry>()? {
                if entries.iter().any(|(existing, _)| *existing == name) {
                    return Err(de::Error::custom(format!("duplicate coordinate '{}'", name)));
                }
                entries.push((name, entry));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(CoordsVisitor)
}
