#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-cache
//!
//! mesh-cache provides mutation-tracked numeric arrays and a
//! dependency-tracked cache of derived quantities, the substrate geometry
//! holders (vertices, faces, ...) use to compute things like unique vertices,
//! bounding boxes or boundary edges lazily and drop them as soon as an input
//! array changes in place.
//!
//! ## Features
//! - [`TrackedArray`](data::tracked_array::TrackedArray): n-d buffer whose
//!   in-place mutators set a modified flag, propagated from views to their
//!   root container
//! - [`DependencyGraph`](data::dependency::DependencyGraph): per-type
//!   registration of which attributes each derived quantity reads
//! - [`ComputedData`](data::computed::ComputedData): per-instance cache with
//!   recompute and saved-only access
//! - [`utils::arr`]: unique/close rows, bounds, range selection, rotations
//! - [`mesh`]: reference holders wiring it all together
//!
//! ## Threading
//!
//! Holders and their caches are single-threaded (`Rc`/`Cell` based). Only the
//! per-type dependency graphs are shared, through `once_cell` statics.
//!
//! ## Usage
//! ```rust
//! use mesh_cache::prelude::*;
//!
//! let mut faces = Faces::new(
//!     vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
//!     vec![[0usize, 1, 2]],
//! )?;
//! assert_eq!(faces.single_edges()?.len(), 3);
//! faces.vertices_mut().add_assign(1.0)?;
//! assert_eq!(faces.bounds()?.to_rows(), vec![vec![1.0, 1.0], vec![2.0, 2.0]]);
//! # Ok::<(), MeshCacheError>(())
//! ```

pub mod data;
pub mod debug_invariants;
pub mod mesh;
pub mod mesh_error;
pub mod settings;
pub mod utils;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::data::array::{ArrayLike, NdArray};
    pub use crate::data::computed::{ComputedData, EvalOptions, Holder};
    pub use crate::data::dependency::DependencyGraph;
    pub use crate::data::modified::ModifiedState;
    pub use crate::data::tracked_array::{TrackedArray, make_tracked_array};
    pub use crate::data::unique::{Unique2dFloats, Unique2dIntegers};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh::{Faces, VertexHolder, Vertices};
    pub use crate::mesh_error::MeshCacheError;
    pub use crate::settings::Settings;
}
