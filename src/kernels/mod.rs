//! Pure, stateless buffer kernels.
//!
//! These are the numeric fill primitives the filled-array constructors
//! (`empty`, `zeros`, `ones`, `full`) allocate through before handing the
//! buffer to the primary constructor for labeling.

pub mod fill;

pub use fill::{empty, full, ones, zeros, MemoryOrder, DEFAULT_DTYPE};
