//! Array classes: declare a labeled-array schema once, get typed constructors
//! and an accessor namespace for it.
//!
//! The pipeline stages live in their own modules and run in this order when
//! `ArrayClassBuilder::build` is called:
//!
//! 1. `validator`   - axis names and element type against every base class.
//! 2. `coords`      - ordered coordinate schemas, inherited ones first.
//! 3. `constructor` - `ArrayClass` with its five constructors (`docstring`
//!                    renders their help text).
//! 4. `accessor`    - user methods relocated into a registered namespace.

mod accessor;
mod builder;
mod constructor;
mod coords;
mod docstring;
mod schema;
mod validator;

pub use accessor::{Accessor, AccessorDescriptor, AccessorRegistry, Method, Value};
pub use builder::ArrayClassBuilder;
pub use constructor::{ArrayClass, BufferSpec, ClassArray, Overrides};
pub use docstring::ConstructorKind;
pub use schema::{AxisNames, CoordinateSpec, Schema};

#[cfg(test)]
mod class_tests;
