// In: src/config.rs

//! Declaration options for an array class.
//!
//! `ClassOptions` carries the knobs a class author passes alongside the
//! declaration itself: the accessor name and the two strictness policies used
//! when the class is checked against its base classes. It is plain data, so it
//! can also be loaded from JSON next to a schema document.

use crate::error::ArrayClassError;
use serde::{Deserialize, Serialize};

/// Options applied when an `ArrayClassBuilder` is built.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ClassOptions {
    /// Public accessor name. When set, the class's methods are reachable through
    /// the shared accessor registered under this name. When unset, they are
    /// only reachable through the class's private accessor.
    #[serde(default)]
    pub accessor: Option<String>,

    /// If true, the axis names must be set-equal to every base class's axis
    /// names. If false, they must be a superset.
    #[serde(default)]
    pub strict_dims: bool,

    /// If true, the element type must equal every base class's element type.
    /// If false, element types are not compared.
    #[serde(default)]
    pub strict_dtype: bool,
}

impl ClassOptions {
    pub fn from_json_str(text: &str) -> Result<Self, ArrayClassError> {
        Ok(serde_json::from_str(text)?)
    }
}
