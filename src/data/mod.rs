//! Data module: tracked containers and dependency-tracked computed data
#![warn(missing_docs)]

pub mod array;
pub mod computed;
pub mod dependency;
pub mod holder;
pub mod modified;
pub mod storage;
pub mod tracked_array;
pub mod unique;

pub use crate::debug_invariants::DebugInvariants;

pub use array::{ArrayLike, Element, NdArray};
pub use computed::{ComputedData, EvalOptions, Holder};
pub use dependency::{CachedValue, DependencyGraph, DependencyGraphBuilder};
pub use holder::DataHolder;
pub use modified::{ModifiedFlag, ModifiedState};
pub use tracked_array::{Operand, TrackedArray, make_tracked_array};
pub use unique::{Unique2dFloats, Unique2dIntegers};
