//! Connectivity conversions between faces and edges.

use crate::data::array::NdArray;
use crate::mesh_error::MeshCacheError;

/// Edges of polygonal faces, `k` per face in cyclic order.
///
/// `(n, k)` faces become `(n * k, 2)` edges: `[f0, f1], [f1, f2], .., [fk-1, f0]`.
pub fn faces_to_edges(faces: &NdArray<usize>) -> Result<NdArray<usize>, MeshCacheError> {
    if faces.ndim() != 2 || faces.row_len() < 2 {
        return Err(MeshCacheError::Shape(format!(
            "faces need shape (n, k >= 2), got {:?}",
            faces.shape()
        )));
    }
    let k = faces.row_len();
    let mut out = Vec::with_capacity(faces.len() * k * 2);
    for face in faces.rows() {
        for j in 0..k {
            out.push(face[j]);
            out.push(face[(j + 1) % k]);
        }
    }
    NdArray::new(out, vec![faces.len() * k, 2])
}

/// Copy of `arr` with each row sorted ascending.
pub fn sorted_rows(arr: &NdArray<usize>) -> Result<NdArray<usize>, MeshCacheError> {
    let mut data = arr.as_slice().to_vec();
    let w = arr.row_len();
    if w > 0 {
        data.chunks_mut(w).for_each(<[usize]>::sort_unstable);
    }
    NdArray::new(data, arr.shape().to_vec())
}
