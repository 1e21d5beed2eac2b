// In: src/error.rs

//! This module defines the single, unified error type for the entire arrayclass library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Declaration-time errors (`MissingDeclaration`, `InconsistentSchema`,
//! `InvalidDeclaration`, `AccessorConflict`) stop `ArrayClassBuilder::build`
//! before any class exists. The rest surface per construction call or per
//! accessor lookup.

use crate::types::ElementType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArrayClassError {
    // =========================================================================
    // === Declaration-Time Errors
    // =========================================================================
    #[error("Class '{class}' must declare {attribute}")]
    MissingDeclaration {
        class: String,
        attribute: &'static str,
    },

    #[error("Class '{class}' is inconsistent with base class '{base}': {reason}")]
    InconsistentSchema {
        class: String,
        base: String,
        reason: String,
    },

    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Accessor name '{name}' cannot be registered: {reason}")]
    AccessorConflict { name: String, reason: String },

    // =========================================================================
    // === Construction-Time Errors
    // =========================================================================
    #[error("Coordinate '{coordinate}' refers to axis '{axis}' which the array does not have")]
    UnknownAxis { coordinate: String, axis: String },

    #[error(
        "Default value for a coordinate {0} is not defined. \
         It must be given as an override ({0}=<value>)."
    )]
    MissingCoordinateValue(String),

    #[error("Cannot cast value {value} from {from} to {to}")]
    TypeConversion {
        from: ElementType,
        to: ElementType,
        value: String,
    },

    #[error("Data has {found} dimension(s) but {expected} axis name(s) were given")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    // =========================================================================
    // === Accessor Errors
    // =========================================================================
    #[error("No array class registered under accessor '{accessor}' has attribute '{name}'")]
    NoSuchAttribute { accessor: String, name: String },

    // =========================================================================
    // === Schema Document Errors
    // =========================================================================
    #[error("Unsupported schema document format: {0}")]
    UnsupportedFormat(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// A broadcast or reshape rejected by `ndarray`, passed through unchanged.
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Serde YAML error: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("Serde TOML error: {0}")]
    SerdeToml(#[from] toml::de::Error),
}
