//! This module defines the core, strongly-typed data representations used
//! throughout arrayclass.
//!
//! It includes the canonical `ElementType` enum, the `Scalar` every cast passes
//! through, and `ArrayData`, the dynamically typed n-d buffer that constructors
//! consume.

pub mod array_data;
pub mod element_type;

// Re-export the main type(s) for easier access.
pub use array_data::ArrayData;
pub use element_type::{ElementType, Scalar};

pub(crate) use array_data::{checked_len, dispatch, with_element_type};
