//! This file is the root of the `arrayclass` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`class`, `kernels`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the public surface: `ArrayClass` and its builder, the
//!     accessor registry, the labeled-array types and the error type.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use arrayclass::{AccessorRegistry, ArrayClass, CoordinateSpec, ElementType, Overrides, Value};
//!
//! let registry = Arc::new(AccessorRegistry::new());
//! let image = ArrayClass::builder("Image")
//!     .axes(["x", "y"])
//!     .element_type(ElementType::Float64)
//!     .accessor("img")
//!     .coordinate_with_default("x", CoordinateSpec::new("x").element_type(ElementType::Int64), 0i64)
//!     .method("normalize", |acc, _| Ok(Value::from(acc.divide(acc.max()?)?)))
//!     .build(&registry)?;
//!
//! let arr = image.new(ndarray::array![[0.0, 1.0], [2.0, 3.0]], &Overrides::new())?;
//! let normalized = arr.accessor()?.call("normalize", &[])?.into_array()?;
//! assert_eq!(normalized.max()?, 1.0);
//! # Ok::<(), arrayclass::ArrayClassError>(())
//! ```

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod class;
pub mod config;
pub mod document;
pub mod kernels;
pub mod labeled;

mod error;
mod traits;
mod types;
mod utils;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use class::{
    Accessor, AccessorDescriptor, AccessorRegistry, ArrayClass, ArrayClassBuilder, AxisNames,
    BufferSpec, ClassArray, ConstructorKind, CoordinateSpec, Method, Overrides, Schema, Value,
};
pub use config::ClassOptions;
pub use document::{DocumentFormat, SchemaDocument};
pub use error::ArrayClassError;
pub use labeled::{Attrs, LabeledArray};
pub use observability::enable_verbose_logging;
pub use traits::{Element, HasSchema};
pub use types::{ArrayData, ElementType, Scalar};

// Used by `log_metric!` expansions in downstream crates.
#[doc(hidden)]
pub use log;
