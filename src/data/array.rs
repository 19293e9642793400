//! Plain n-dimensional buffers and array-like input.
//!
//! [`NdArray`] is the detached, untracked counterpart of a
//! [`TrackedArray`](crate::data::tracked_array::TrackedArray): a C-ordered
//! `Vec` plus a shape. It is what `duplicate()` hands out and what most
//! derived computations return.
//!
//! [`ArrayLike`] is implemented by everything the tracked-array factory
//! accepts. Nested inputs must be rectangular; ragged input fails with
//! [`MeshCacheError::Shape`].

use std::fmt::Debug;

use num_traits::{Num, NumCast};
use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshCacheError;

/// Numeric element type storable in tracked arrays.
pub trait Element: Copy + Default + PartialOrd + Debug + Num + NumCast + 'static {}

impl<T> Element for T where T: Copy + Default + PartialOrd + Debug + Num + NumCast + 'static {}

/// Number of elements described by `shape` (1 for a 0-d shape).
#[inline]
pub fn flat_len(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Owned, C-contiguous n-dimensional buffer without change tracking.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdArray<T> {
    data: Vec<T>,
    shape: Vec<usize>,
}

impl<T: Element> NdArray<T> {
    /// Wrap `data` with the given `shape`.
    ///
    /// # Errors
    /// `Shape` if the product of `shape` differs from `data.len()`.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> Result<Self, MeshCacheError> {
        if flat_len(&shape) != data.len() {
            return Err(MeshCacheError::Shape(format!(
                "cannot reshape {} elements into {:?}",
                data.len(),
                shape
            )));
        }
        Ok(Self { data, shape })
    }

    /// Empty 1-d array.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            shape: vec![0],
        }
    }

    /// Build a 2-d array from rectangular rows.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self, MeshCacheError> {
        let (data, shape) = rows_to_parts(rows)?;
        Ok(Self { data, shape })
    }

    /// Shape of the array.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Extent along the first axis (1 for 0-d arrays).
    #[inline]
    pub fn len(&self) -> usize {
        self.shape.first().copied().unwrap_or(1)
    }

    /// `true` if the array holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Elements per entry along the first axis.
    #[inline]
    pub fn row_len(&self) -> usize {
        flat_len(self.shape.get(1..).unwrap_or(&[]))
    }

    /// Flat, C-ordered elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume into the flat element vector.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Consume into `(data, shape)`.
    pub fn into_parts(self) -> (Vec<T>, Vec<usize>) {
        (self.data, self.shape)
    }

    /// Row `i` along the first axis.
    pub fn row(&self, i: usize) -> Option<&[T]> {
        let w = self.row_len();
        if self.ndim() == 0 || i >= self.len() {
            return None;
        }
        Some(&self.data[i * w..(i + 1) * w])
    }

    /// Iterate over rows along the first axis.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        let n = if self.ndim() == 0 { 0 } else { self.len() };
        (0..n).map(move |i| {
            let w = self.row_len();
            &self.data[i * w..(i + 1) * w]
        })
    }

    /// Element at a multi-index.
    pub fn get(&self, index: &[usize]) -> Option<T> {
        flat_index(&self.shape, index).map(|i| self.data[i])
    }

    /// Gather rows by index, e.g. `values.take_rows(&inverse)`.
    pub fn take_rows(&self, ids: &[usize]) -> Result<Self, MeshCacheError> {
        let w = self.row_len();
        let mut data = Vec::with_capacity(ids.len() * w);
        for &i in ids {
            let row = self.row(i).ok_or_else(|| MeshCacheError::IndexOutOfBounds {
                index: vec![i],
                shape: self.shape.clone(),
            })?;
            data.extend_from_slice(row);
        }
        let mut shape = self.shape.clone();
        if let Some(first) = shape.first_mut() {
            *first = ids.len();
        }
        Ok(Self { data, shape })
    }

    /// Rows collected as owned vectors.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(<[T]>::to_vec).collect()
    }
}

/// Flat offset of `index` within a C-ordered `shape`.
pub(crate) fn flat_index(shape: &[usize], index: &[usize]) -> Option<usize> {
    if index.len() != shape.len() {
        return None;
    }
    let mut flat = 0usize;
    for (&i, &extent) in index.iter().zip(shape) {
        if i >= extent {
            return None;
        }
        flat = flat * extent + i;
    }
    Some(flat)
}

fn rows_to_parts<T: Copy, R: AsRef<[T]>>(
    rows: &[R],
) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
    let Some(first) = rows.first() else {
        return Ok((Vec::new(), vec![0]));
    };
    let width = first.as_ref().len();
    let mut data = Vec::with_capacity(rows.len() * width);
    for (i, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != width {
            return Err(MeshCacheError::Shape(format!(
                "ragged input: row {i} has {} entries, expected {width}",
                row.len()
            )));
        }
        data.extend_from_slice(row);
    }
    Ok((data, vec![rows.len(), width]))
}

/// Anything that can be coerced into a rectangular, C-ordered buffer.
pub trait ArrayLike<T> {
    /// Flatten into `(data, shape)`.
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError>;
}

impl<T: Element> ArrayLike<T> for Vec<T> {
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
        let n = self.len();
        Ok((self, vec![n]))
    }
}

impl<T: Element> ArrayLike<T> for &[T] {
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
        Ok((self.to_vec(), vec![self.len()]))
    }
}

impl<T: Element> ArrayLike<T> for Vec<Vec<T>> {
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
        rows_to_parts(&self)
    }
}

impl<T: Element> ArrayLike<T> for &[Vec<T>] {
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
        rows_to_parts(self)
    }
}

impl<T: Element, const N: usize> ArrayLike<T> for Vec<[T; N]> {
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
        let n = self.len();
        Ok((self.into_iter().flatten().collect(), vec![n, N]))
    }
}

impl<T: Element, const N: usize> ArrayLike<T> for &[[T; N]] {
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
        Ok((self.iter().flatten().copied().collect(), vec![self.len(), N]))
    }
}

impl<T: Element, const N: usize, const M: usize> ArrayLike<T> for &[[T; N]; M] {
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
        <&[[T; N]] as ArrayLike<T>>::into_parts(self.as_slice())
    }
}

impl<T: Element> ArrayLike<T> for NdArray<T> {
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
        Ok(NdArray::into_parts(self))
    }
}

impl<T: Element> ArrayLike<T> for &NdArray<T> {
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
        Ok((self.data.clone(), self.shape.clone()))
    }
}

impl<T: Element> ArrayLike<T> for (Vec<T>, Vec<usize>) {
    fn into_parts(self) -> Result<(Vec<T>, Vec<usize>), MeshCacheError> {
        NdArray::new(self.0, self.1).map(NdArray::into_parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged_input() {
        let ragged = vec![vec![1, 2], vec![3]];
        assert!(matches!(
            <Vec<Vec<i32>> as ArrayLike<i32>>::into_parts(ragged),
            Err(MeshCacheError::Shape(_))
        ));
    }

    #[test]
    fn empty_rows_give_empty_array() {
        let rows: Vec<Vec<f64>> = Vec::new();
        let (data, shape) = <Vec<Vec<f64>> as ArrayLike<f64>>::into_parts(rows).unwrap();
        assert!(data.is_empty());
        assert_eq!(shape, vec![0]);
    }

    #[test]
    fn take_rows_reorders() {
        let a = NdArray::from_rows(&[[1, 2], [3, 4]]).unwrap();
        let b = a.take_rows(&[1, 0, 1]).unwrap();
        assert_eq!(b.shape(), &[3, 2]);
        assert_eq!(b.as_slice(), &[3, 4, 1, 2, 3, 4]);
        assert!(a.take_rows(&[2]).is_err());
    }

    #[test]
    fn multi_index_lookup() {
        let a = NdArray::new((0..6).collect::<Vec<i32>>(), vec![2, 3]).unwrap();
        assert_eq!(a.get(&[1, 2]), Some(5));
        assert_eq!(a.get(&[2, 0]), None);
        assert_eq!(a.get(&[0]), None);
        assert_eq!(a.row(1), Some(&[3, 4, 5][..]));
    }
}
