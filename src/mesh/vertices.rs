//! Point cloud holder.

use std::cell::Cell;

use once_cell::sync::Lazy;

use crate::data::array::ArrayLike;
use crate::data::computed::{ComputedData, Holder};
use crate::data::dependency::DependencyGraph;
use crate::data::modified::ModifiedState;
use crate::data::tracked_array::{TrackedArray, make_tracked_array};
use crate::mesh::{VertexHolder, check_vertices, register_vertex_quantities, static_graph};
use crate::mesh_error::MeshCacheError;
use crate::settings::Settings;

static VERTICES_GRAPH: Lazy<Result<DependencyGraph<Vertices>, MeshCacheError>> =
    Lazy::new(|| register_vertex_quantities(DependencyGraph::builder("Vertices")).build());

/// `(n, d)` points with cached derived quantities.
#[derive(Debug)]
pub struct Vertices {
    vertices: TrackedArray<f64>,
    settings: Settings,
    tolerance_override: Cell<Option<f64>>,
    computed: ComputedData<Vertices>,
}

impl Vertices {
    /// Vertices with default [`Settings`].
    pub fn new<A: ArrayLike<f64>>(vertices: A) -> Result<Self, MeshCacheError> {
        Self::with_settings(vertices, Settings::default())
    }

    /// Vertices with explicit settings.
    ///
    /// # Errors
    /// `Shape` if `vertices` is not 2-d, `InvalidSettings` if the settings do
    /// not validate.
    pub fn with_settings<A: ArrayLike<f64>>(vertices: A, settings: Settings) -> Result<Self, MeshCacheError> {
        settings.validate()?;
        let vertices = make_tracked_array(Some(vertices))?;
        check_vertices(&vertices)?;
        Ok(Self {
            vertices,
            settings,
            tolerance_override: Cell::new(None),
            computed: ComputedData::new(static_graph(&VERTICES_GRAPH)?),
        })
    }

    /// In-place access to the vertex array. Writes through it invalidate
    /// everything derived from `vertices`.
    pub fn vertices_mut(&mut self) -> &mut TrackedArray<f64> {
        &mut self.vertices
    }

    /// Replace the vertex array.
    pub fn set_vertices<A: ArrayLike<f64>>(&mut self, vertices: A) -> Result<(), MeshCacheError> {
        let vertices = make_tracked_array(Some(vertices))?;
        check_vertices(&vertices)?;
        log::debug!("Vertices: replaced vertex array, shape {:?}", vertices.shape());
        self.vertices = vertices;
        Ok(())
    }
}

impl Holder for Vertices {
    fn tracked(&self, name: &str) -> Option<&dyn ModifiedState> {
        match name {
            "vertices" => Some(&self.vertices),
            _ => None,
        }
    }

    fn computed(&self) -> &ComputedData<Self> {
        &self.computed
    }
}

impl VertexHolder for Vertices {
    fn vertices(&self) -> &TrackedArray<f64> {
        &self.vertices
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn tolerance_override(&self) -> &Cell<Option<f64>> {
        &self.tolerance_override
    }
}
