//! Mesh holders: raw tracked attributes plus derived quantities.
//!
//! [`Vertices`] and [`Faces`] own their arrays as [`TrackedArray`]s and a
//! [`ComputedData`] cache. Every derived quantity is registered once per type
//! in a static [`DependencyGraph`] and recomputed only after one of its
//! dependencies was mutated.
//!
//! ```rust
//! use mesh_cache::mesh::{VertexHolder, Vertices};
//!
//! let mut v = Vertices::new(vec![[0.0, 0.0], [2.0, 1.0]])?;
//! assert_eq!(*v.bounds_mean()?, vec![1.0, 0.5]);
//! v.vertices_mut().mul_assign(2.0)?;
//! assert_eq!(*v.bounds_mean()?, vec![2.0, 1.0]);
//! # Ok::<(), mesh_cache::mesh_error::MeshCacheError>(())
//! ```
//!
//! [`ComputedData`]: crate::data::computed::ComputedData

use std::cell::Cell;
use std::rc::Rc;

use once_cell::sync::Lazy;

use crate::data::array::NdArray;
use crate::data::computed::{EvalOptions, Holder};
use crate::data::dependency::{DependencyGraph, DependencyGraphBuilder};
use crate::data::tracked_array::TrackedArray;
use crate::data::unique::Unique2dFloats;
use crate::mesh_error::MeshCacheError;
use crate::settings::Settings;
use crate::utils::arr;

pub mod faces;
pub mod vertices;

pub use faces::Faces;
pub use vertices::Vertices;

/// A holder with a float `vertices` attribute and the quantities derived
/// from it.
pub trait VertexHolder: Holder {
    /// `(n, d)` vertex coordinates.
    fn vertices(&self) -> &TrackedArray<f64>;

    /// Settings of this instance.
    fn settings(&self) -> &Settings;

    /// Tolerance used by the next `unique_vertices` computation, if it
    /// differs from the settings.
    #[doc(hidden)]
    fn tolerance_override(&self) -> &Cell<Option<f64>>;

    /// Vertices collapsed within the configured tolerance.
    fn unique_vertices(&self) -> Result<Rc<Unique2dFloats<f64>>, MeshCacheError> {
        self.evaluate("unique_vertices", EvalOptions::CACHED)
    }

    /// Vertices collapsed within `tolerance`. Always recomputes.
    fn unique_vertices_with(&self, tolerance: f64) -> Result<Rc<Unique2dFloats<f64>>, MeshCacheError> {
        Settings { tolerance }.validate()?;
        self.tolerance_override().set(Some(tolerance));
        let result = self.evaluate("unique_vertices", EvalOptions::RECOMPUTE);
        self.tolerance_override().set(None);
        result
    }

    /// `(2, d)` per-axis minimum and maximum.
    fn bounds(&self) -> Result<Rc<NdArray<f64>>, MeshCacheError> {
        self.evaluate("bounds", EvalOptions::CACHED)
    }

    /// Extent along each axis.
    fn bounds_diagonal(&self) -> Result<Rc<Vec<f64>>, MeshCacheError> {
        self.evaluate("bounds_diagonal", EvalOptions::CACHED)
    }

    /// Length of the bounding box diagonal.
    fn bounds_norm(&self) -> Result<f64, MeshCacheError> {
        self.evaluate::<f64>("bounds_norm", EvalOptions::CACHED)
            .map(|n| *n)
    }

    /// Centre of the bounding box.
    fn bounds_mean(&self) -> Result<Rc<Vec<f64>>, MeshCacheError> {
        self.evaluate("bounds_mean", EvalOptions::CACHED)
    }
}

/// Register the vertex-derived quantities on a holder type's graph.
pub(crate) fn register_vertex_quantities<H: VertexHolder>(
    builder: DependencyGraphBuilder<H>,
) -> DependencyGraphBuilder<H> {
    builder
        .depends_on("unique_vertices", &["vertices"], |h: &H| {
            let tolerance = h
                .tolerance_override()
                .get()
                .unwrap_or(h.settings().tolerance);
            arr::close_rows(&h.vertices().duplicate()?, Some(tolerance))
        })
        .depends_on("bounds", &["vertices"], |h: &H| {
            arr::bounds(&h.vertices().duplicate()?)
        })
        .depends_on("bounds_diagonal", &["vertices"], |h: &H| {
            arr::bounds_diagonal(&h.vertices().duplicate()?)
        })
        .depends_on("bounds_norm", &["vertices"], |h: &H| {
            arr::bounds_norm(&h.vertices().duplicate()?)
        })
        // reads the cached bounds instead of the raw vertices
        .depends_on("bounds_mean", &["bounds"], |h: &H| {
            let b = h.evaluate::<NdArray<f64>>("bounds", EvalOptions::CACHED)?;
            let (min, max) = b.as_slice().split_at(b.row_len());
            Ok(min.iter().zip(max).map(|(lo, hi)| (lo + hi) / 2.0).collect::<Vec<f64>>())
        })
}

/// Resolve a holder type's static graph.
pub(crate) fn static_graph<H>(
    graph: &'static Lazy<Result<DependencyGraph<H>, MeshCacheError>>,
) -> Result<&'static DependencyGraph<H>, MeshCacheError> {
    Lazy::force(graph).as_ref().map_err(Clone::clone)
}

/// Vertex arrays must be `(n, d)`.
pub(crate) fn check_vertices(vertices: &TrackedArray<f64>) -> Result<(), MeshCacheError> {
    arr::is_shape(vertices.shape(), &[-1, -1], true).map(|_| ())
}
