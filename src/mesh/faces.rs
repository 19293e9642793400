//! Polygonal surface holder (triangles or quadrilaterals).
//!
//! Edge quantities form a chain of cached entries: `edges` reads the raw
//! `faces`, `sorted_edges` reads `edges`, `unique_edges` reads
//! `sorted_edges` and `single_edges` reads `unique_edges`. A change to
//! `faces` reaches every link of the chain.

use std::cell::Cell;
use std::rc::Rc;

use itertools::Itertools;
use once_cell::sync::Lazy;

use crate::data::array::{ArrayLike, NdArray};
use crate::data::computed::{ComputedData, EvalOptions, Holder};
use crate::data::dependency::DependencyGraph;
use crate::data::modified::ModifiedState;
use crate::data::tracked_array::{TrackedArray, make_tracked_array};
use crate::data::unique::Unique2dIntegers;
use crate::mesh::{VertexHolder, check_vertices, register_vertex_quantities, static_graph};
use crate::mesh_error::MeshCacheError;
use crate::settings::Settings;
use crate::utils::{arr, connec};

static FACES_GRAPH: Lazy<Result<DependencyGraph<Faces>, MeshCacheError>> = Lazy::new(|| {
    register_vertex_quantities(DependencyGraph::builder("Faces"))
        .depends_on("edges", &["faces"], |f: &Faces| {
            connec::faces_to_edges(&f.faces.duplicate()?)
        })
        .depends_on("sorted_edges", &["edges"], |f: &Faces| {
            connec::sorted_rows(&*f.edges()?)
        })
        .depends_on("unique_edges", &["sorted_edges"], |f: &Faces| {
            arr::unique_rows(&*f.sorted_edges()?)
        })
        .depends_on("single_edges", &["unique_edges"], |f: &Faces| {
            let unique = f.unique_edges()?;
            let ids = unique
                .counts
                .iter()
                .positions(|&c| c == 1)
                .collect::<Vec<_>>();
            unique.values.take_rows(&ids)
        })
        .depends_on("centers", &["vertices", "faces"], |f: &Faces| f.compute_centers())
        .build()
});

fn check_faces(faces: &TrackedArray<usize>) -> Result<(), MeshCacheError> {
    arr::is_one_of_shapes(faces.shape(), &[&[-1, 3], &[-1, 4]], true).map(|_| ())
}

/// Vertices plus `(m, 3)` triangle or `(m, 4)` quad connectivity.
#[derive(Debug)]
pub struct Faces {
    vertices: TrackedArray<f64>,
    faces: TrackedArray<usize>,
    settings: Settings,
    tolerance_override: Cell<Option<f64>>,
    computed: ComputedData<Faces>,
}

impl Faces {
    /// Faces with default [`Settings`].
    pub fn new<V, F>(vertices: V, faces: F) -> Result<Self, MeshCacheError>
    where
        V: ArrayLike<f64>,
        F: ArrayLike<usize>,
    {
        Self::with_settings(vertices, faces, Settings::default())
    }

    /// Faces with explicit settings.
    ///
    /// Connectivity is not checked against the vertex count here; quantities
    /// that dereference it report `IndexOutOfBounds`.
    pub fn with_settings<V, F>(vertices: V, faces: F, settings: Settings) -> Result<Self, MeshCacheError>
    where
        V: ArrayLike<f64>,
        F: ArrayLike<usize>,
    {
        settings.validate()?;
        let vertices = make_tracked_array(Some(vertices))?;
        check_vertices(&vertices)?;
        let faces = make_tracked_array(Some(faces))?;
        check_faces(&faces)?;
        Ok(Self {
            vertices,
            faces,
            settings,
            tolerance_override: Cell::new(None),
            computed: ComputedData::new(static_graph(&FACES_GRAPH)?),
        })
    }

    /// Connectivity array.
    pub fn faces(&self) -> &TrackedArray<usize> {
        &self.faces
    }

    /// In-place access to the connectivity.
    pub fn faces_mut(&mut self) -> &mut TrackedArray<usize> {
        &mut self.faces
    }

    /// In-place access to the vertex array.
    pub fn vertices_mut(&mut self) -> &mut TrackedArray<f64> {
        &mut self.vertices
    }

    /// Replace the connectivity.
    pub fn set_faces<F: ArrayLike<usize>>(&mut self, faces: F) -> Result<(), MeshCacheError> {
        let faces = make_tracked_array(Some(faces))?;
        check_faces(&faces)?;
        self.faces = faces;
        Ok(())
    }

    /// Replace the vertex array.
    pub fn set_vertices<V: ArrayLike<f64>>(&mut self, vertices: V) -> Result<(), MeshCacheError> {
        let vertices = make_tracked_array(Some(vertices))?;
        check_vertices(&vertices)?;
        self.vertices = vertices;
        Ok(())
    }

    /// `(m * k, 2)` edges of every face, in cyclic order.
    pub fn edges(&self) -> Result<Rc<NdArray<usize>>, MeshCacheError> {
        self.evaluate("edges", EvalOptions::CACHED)
    }

    /// [`edges`](Self::edges) with each row sorted.
    pub fn sorted_edges(&self) -> Result<Rc<NdArray<usize>>, MeshCacheError> {
        self.evaluate("sorted_edges", EvalOptions::CACHED)
    }

    /// Unique undirected edges.
    pub fn unique_edges(&self) -> Result<Rc<Unique2dIntegers<usize>>, MeshCacheError> {
        self.evaluate("unique_edges", EvalOptions::CACHED)
    }

    /// Edges used by exactly one face, i.e. the boundary.
    pub fn single_edges(&self) -> Result<Rc<NdArray<usize>>, MeshCacheError> {
        self.evaluate("single_edges", EvalOptions::CACHED)
    }

    /// Vertex average of every face.
    pub fn centers(&self) -> Result<Rc<NdArray<f64>>, MeshCacheError> {
        self.evaluate("centers", EvalOptions::CACHED)
    }

    fn compute_centers(&self) -> Result<NdArray<f64>, MeshCacheError> {
        let vertices = self.vertices.duplicate()?;
        let d = vertices.row_len();
        let mut out = Vec::with_capacity(self.faces.len() * d);
        let faces = self.faces.duplicate()?;
        for face in faces.rows() {
            let mut center = vec![0.0; d];
            for &vid in face {
                let v = vertices
                    .row(vid)
                    .ok_or_else(|| MeshCacheError::IndexOutOfBounds {
                        index: vec![vid],
                        shape: vertices.shape().to_vec(),
                    })?;
                center.iter_mut().zip(v).for_each(|(c, x)| *c += x);
            }
            out.extend(center.into_iter().map(|c| c / face.len() as f64));
        }
        NdArray::new(out, vec![faces.len(), d])
    }
}

impl Holder for Faces {
    fn tracked(&self, name: &str) -> Option<&dyn ModifiedState> {
        match name {
            "vertices" => Some(&self.vertices),
            "faces" => Some(&self.faces),
            _ => None,
        }
    }

    fn computed(&self) -> &ComputedData<Self> {
        &self.computed
    }
}

impl VertexHolder for Faces {
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

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit square split into two triangles.
    fn two_triangles() -> Faces {
        Faces::new(
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![[0usize, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn edge_chain() {
        let f = two_triangles();
        assert_eq!(f.edges().unwrap().len(), 6);
        let u = f.unique_edges().unwrap();
        assert_eq!(
            u.values.to_rows(),
            vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![2, 3]]
        );
        assert_eq!(u.counts, vec![1, 2, 1, 1, 1]);
        assert_eq!(
            f.single_edges().unwrap().to_rows(),
            vec![vec![0, 1], vec![0, 3], vec![1, 2], vec![2, 3]]
        );
    }

    #[test]
    fn faces_mutation_reaches_end_of_chain() {
        let mut f = two_triangles();
        assert_eq!(f.single_edges().unwrap().len(), 4);
        // both triangles identical: every edge now used twice
        f.faces_mut().set_row(1, &[0, 1, 2]).unwrap();
        assert_eq!(f.single_edges().unwrap().len(), 0);
        assert_eq!(f.unique_edges().unwrap().counts, vec![2, 2, 2]);
    }

    #[test]
    fn centers_depend_on_both_arrays() {
        let mut f = two_triangles();
        let c = f.centers().unwrap();
        assert!((c.as_slice()[0] - 2.0 / 3.0).abs() < 1e-12);
        f.vertices_mut().mul_assign(3.0).unwrap();
        assert!((f.centers().unwrap().as_slice()[0] - 2.0).abs() < 1e-12);
        f.faces_mut().set(&[0, 0], 9).unwrap();
        assert!(matches!(
            f.centers(),
            Err(MeshCacheError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn vertex_quantities_are_shared() {
        let f = two_triangles();
        assert_eq!(*f.bounds_mean().unwrap(), vec![0.5, 0.5]);
        assert_eq!(f.unique_vertices().unwrap().ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn rejects_line_connectivity() {
        assert!(Faces::new(vec![[0.0, 0.0], [1.0, 0.0]], vec![[0usize, 1]]).is_err());
    }
}
