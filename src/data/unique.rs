//! Fixed-field result records of row-uniqueness computations.
//!
//! Every 2-d tracked quantity exposes its unique information through the same
//! field names, e.g. `mesh.unique_vertices()?.ids`.

use serde::{Deserialize, Serialize};

use crate::data::array::NdArray;

/// Unique information of float rows.
///
/// For floats "close enough" is a better word than unique: rows within the
/// tolerance of each other collapse into one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unique2dFloats<F> {
    /// `(n, d)` representative rows.
    pub values: NdArray<F>,
    /// `(n)` index of each representative in the input.
    pub ids: Vec<usize>,
    /// `(m)` index into `values` for every input row.
    pub inverse: Vec<usize>,
    /// `(m)` for every input row, all input rows within tolerance, itself
    /// included, ascending.
    pub intersection: Vec<Vec<usize>>,
}

impl<F> Unique2dFloats<F> {
    /// Positional form `(values, ids, inverse, intersection)`.
    pub fn into_parts(self) -> (NdArray<F>, Vec<usize>, Vec<usize>, Vec<Vec<usize>>) {
        (self.values, self.ids, self.inverse, self.intersection)
    }
}

/// Unique information of integer rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unique2dIntegers<I> {
    /// `(n, d)` unique rows, lexicographically ascending.
    pub values: NdArray<I>,
    /// `(n)` index of the first occurrence of each unique row.
    pub ids: Vec<usize>,
    /// `(m)` index into `values` for every input row.
    pub inverse: Vec<usize>,
    /// `(n)` occurrences of each unique row.
    pub counts: Vec<usize>,
}

impl<I> Unique2dIntegers<I> {
    /// Positional form `(values, ids, inverse, counts)`.
    pub fn into_parts(self) -> (NdArray<I>, Vec<usize>, Vec<usize>, Vec<usize>) {
        (self.values, self.ids, self.inverse, self.counts)
    }
}
