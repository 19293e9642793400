//! TrackedArray: a numeric buffer that records whether it has been modified.
//!
//! Every in-place mutator sets the container's modified flag and, for a view,
//! the flag of the root container the view was derived from. Computed data
//! caches read and clear these flags to decide when derived quantities are
//! stale (see [`ComputedData`](crate::data::computed::ComputedData)).
//!
//! # Views
//! [`TrackedArray::view`], [`TrackedArray::row`] and [`TrackedArray::rows`]
//! return containers that share storage with their origin and start
//! write-protected. The back-reference to the root is a [`Weak`] handle on the
//! root's modified flag: a view never keeps its source alive, and view chains
//! always resolve to the root (one hop).
//!
//! # Example
//! ```rust
//! use mesh_cache::data::modified::ModifiedState;
//! use mesh_cache::data::tracked_array::make_tracked_array;
//!
//! let a = make_tracked_array::<f64, _>(Some(vec![[0.0, 1.0], [2.0, 3.0]]))?;
//! a.set_modified(false);
//!
//! let mut v = a.row(1)?;
//! assert!(v.set(&[0], 9.0).is_err());
//! v.set_mutable(true);
//! v.add_assign(1.0)?;
//! assert!(a.is_modified());
//! assert_eq!(a.to_vec()?, vec![0.0, 1.0, 3.0, 4.0]);
//! # Ok::<(), mesh_cache::mesh_error::MeshCacheError>(())
//! ```

use std::cell::{Ref, RefMut};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Range, Shl, Shr};
use std::rc::{Rc, Weak};

use num_traits::{NumCast, Pow};

use crate::data::array::{ArrayLike, Element, NdArray, flat_index, flat_len};
use crate::data::modified::{ModifiedFlag, ModifiedState};
use crate::data::storage::SharedStorage;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshCacheError;

/// Right-hand side of an in-place operation.
///
/// A slice operand is broadcast: it may cover the whole container, a single
/// row (applied to every row), or be a single element.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a, T> {
    /// Same value for every element.
    Scalar(T),
    /// Element-wise or row-broadcast values.
    Slice(&'a [T]),
}

impl<T: Element> From<T> for Operand<'_, T> {
    fn from(v: T) -> Self {
        Operand::Scalar(v)
    }
}

impl<'a, T> From<&'a [T]> for Operand<'a, T> {
    fn from(v: &'a [T]) -> Self {
        Operand::Slice(v)
    }
}

impl<'a, T> From<&'a Vec<T>> for Operand<'a, T> {
    fn from(v: &'a Vec<T>) -> Self {
        Operand::Slice(v.as_slice())
    }
}

impl<'a, T, const N: usize> From<&'a [T; N]> for Operand<'a, T> {
    fn from(v: &'a [T; N]) -> Self {
        Operand::Slice(v.as_slice())
    }
}

impl<'a, T: Element> From<&'a NdArray<T>> for Operand<'a, T> {
    fn from(v: &'a NdArray<T>) -> Self {
        Operand::Slice(v.as_slice())
    }
}

/// Mutation-tracked, contiguous n-dimensional array.
///
/// Intentionally not `Clone`: a clone sharing storage would be an untracked
/// alias. Use [`duplicate`](Self::duplicate) for a detached copy and
/// [`view`](Self::view) for a tracked alias.
pub struct TrackedArray<T> {
    storage: SharedStorage<T>,
    offset: usize,
    shape: Vec<usize>,
    writeable: bool,
    modified: Rc<ModifiedFlag>,
    /// Root container's flag when this array is a view.
    source: Option<Weak<ModifiedFlag>>,
}

/// Wrap array-like input into a new root [`TrackedArray`].
///
/// `None` yields an empty container. Owned input is adopted without copying;
/// borrowed input is copied into fresh contiguous storage. The result starts
/// modified.
///
/// # Errors
/// `Shape` if nested input is ragged.
pub fn make_tracked_array<T, A>(array: Option<A>) -> Result<TrackedArray<T>, MeshCacheError>
where
    T: Element,
    A: ArrayLike<T>,
{
    let (data, shape) = match array {
        Some(a) => a.into_parts()?,
        None => (Vec::new(), vec![0]),
    };
    TrackedArray::from_parts(data, shape)
}

impl<T: Element> TrackedArray<T> {
    /// New root container from flat `data` and its `shape`.
    pub fn from_parts(data: Vec<T>, shape: Vec<usize>) -> Result<Self, MeshCacheError> {
        if flat_len(&shape) != data.len() {
            return Err(MeshCacheError::Shape(format!(
                "cannot reshape {} elements into {:?}",
                data.len(),
                shape
            )));
        }
        let array = Self {
            storage: SharedStorage::from_vec(data),
            offset: 0,
            shape,
            writeable: true,
            modified: Rc::new(ModifiedFlag::default()),
            source: None,
        };
        crate::debug_invariants!(array.validate_invariants(), "TrackedArray::from_parts");
        Ok(array)
    }

    /// Empty root container.
    pub fn empty() -> Self {
        Self {
            storage: SharedStorage::from_vec(Vec::new()),
            offset: 0,
            shape: vec![0],
            writeable: true,
            modified: Rc::new(ModifiedFlag::default()),
            source: None,
        }
    }

    // ---------------------------------------------------------------- shape

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
        self.size() == 0
    }

    /// Total number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        flat_len(&self.shape)
    }

    /// Elements per entry along the first axis.
    #[inline]
    pub fn row_len(&self) -> usize {
        flat_len(self.shape.get(1..).unwrap_or(&[]))
    }

    // ---------------------------------------------------------------- flags

    /// Whether in-place writes are allowed.
    #[inline]
    pub fn mutable(&self) -> bool {
        self.writeable
    }

    /// Toggle write protection. Does not affect source linkage: writes through
    /// a view made mutable still mark the root modified.
    #[inline]
    pub fn set_mutable(&mut self, mutable: bool) {
        self.writeable = mutable;
    }

    /// `true` if this container was derived from another one.
    #[inline]
    pub fn is_view(&self) -> bool {
        self.source.is_some()
    }

    /// `true` if this container is a view whose root is `root`.
    pub fn is_view_of(&self, root: &TrackedArray<T>) -> bool {
        match &self.source {
            Some(src) if !root.is_view() => Weak::ptr_eq(src, &Rc::downgrade(&root.modified)),
            _ => false,
        }
    }

    /// Modified state of the root, if this is a view and the root is alive.
    pub fn source_modified(&self) -> Option<bool> {
        self.source
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|flag| flag.is_modified())
    }

    /// `true` if both containers address the same storage.
    pub fn shares_storage_with(&self, other: &TrackedArray<T>) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    fn root_flag(&self) -> Weak<ModifiedFlag> {
        match &self.source {
            Some(src) => src.clone(),
            None => Rc::downgrade(&self.modified),
        }
    }

    fn mark_modified(&self) {
        self.modified.set_modified(true);
        if let Some(root) = self.source.as_ref().and_then(Weak::upgrade) {
            root.set_modified(true);
        }
    }

    // ---------------------------------------------------------------- reads

    /// Borrow the elements in C order.
    ///
    /// # Errors
    /// `WriteProtection` while the shared storage is being written through
    /// another handle.
    pub fn data(&self) -> Result<Ref<'_, [T]>, MeshCacheError> {
        self.storage.window(self.offset, self.size())
    }

    /// Element at a multi-index, `None` if the index is out of bounds.
    pub fn get(&self, index: &[usize]) -> Result<Option<T>, MeshCacheError> {
        match flat_index(&self.shape, index) {
            Some(i) => Ok(Some(self.data()?[i])),
            None => Ok(None),
        }
    }

    /// Copy of the elements in C order.
    pub fn to_vec(&self) -> Result<Vec<T>, MeshCacheError> {
        self.storage.read_vec(self.offset, self.size())
    }

    /// Plain, fully independent copy with no tracking and no source linkage.
    pub fn duplicate(&self) -> Result<NdArray<T>, MeshCacheError> {
        NdArray::new(self.to_vec()?, self.shape.clone())
    }

    /// Convert element type, producing a fresh root container.
    ///
    /// # Errors
    /// `Cast` if an element is not representable in `U`.
    pub fn cast<U: Element>(&self) -> Result<TrackedArray<U>, MeshCacheError> {
        let data = self
            .data()?
            .iter()
            .enumerate()
            .map(|(i, &v)| <U as NumCast>::from(v).ok_or(MeshCacheError::Cast(i)))
            .collect::<Result<Vec<U>, _>>()?;
        TrackedArray::from_parts(data, self.shape.clone())
    }

    // ---------------------------------------------------------------- views

    /// Write-protected view sharing storage with `self`.
    pub fn view(&self) -> TrackedArray<T> {
        self.derive(self.offset, self.shape.clone())
    }

    /// Write-protected view of entry `i` along the first axis.
    pub fn row(&self, i: usize) -> Result<TrackedArray<T>, MeshCacheError> {
        if self.ndim() == 0 || i >= self.len() {
            return Err(MeshCacheError::IndexOutOfBounds {
                index: vec![i],
                shape: self.shape.clone(),
            });
        }
        let w = self.row_len();
        Ok(self.derive(self.offset + i * w, self.shape[1..].to_vec()))
    }

    /// Write-protected view of entries `range` along the first axis.
    pub fn rows(&self, range: Range<usize>) -> Result<TrackedArray<T>, MeshCacheError> {
        if self.ndim() == 0 || range.start > range.end || range.end > self.len() {
            return Err(MeshCacheError::IndexOutOfBounds {
                index: vec![range.start, range.end],
                shape: self.shape.clone(),
            });
        }
        let w = self.row_len();
        let mut shape = self.shape.clone();
        shape[0] = range.end - range.start;
        Ok(self.derive(self.offset + range.start * w, shape))
    }

    fn derive(&self, offset: usize, shape: Vec<usize>) -> TrackedArray<T> {
        TrackedArray {
            storage: self.storage.share(),
            offset,
            shape,
            writeable: false,
            modified: Rc::new(ModifiedFlag::default()),
            source: Some(self.root_flag()),
        }
    }

    // ------------------------------------------------------------- mutation

    fn check_writeable(&self) -> Result<(), MeshCacheError> {
        if self.writeable {
            Ok(())
        } else {
            Err(MeshCacheError::WriteProtection(if self.is_view() {
                "view"
            } else {
                "array"
            }))
        }
    }

    fn window_mut(&self) -> Result<RefMut<'_, [T]>, MeshCacheError> {
        self.check_writeable()?;
        self.storage.window_mut(self.offset, self.size())
    }

    /// Run `f` on a private copy of the elements and write the copy back.
    ///
    /// No borrow of the storage is held while `f` runs, so `f` may read this
    /// container or any view of it.
    fn update<R>(&mut self, f: impl FnOnce(&mut [T]) -> R) -> Result<R, MeshCacheError> {
        self.check_writeable()?;
        let mut buf = self.to_vec()?;
        let out = f(&mut buf);
        self.storage.write_at(self.offset, &buf)?;
        self.mark_modified();
        Ok(out)
    }

    /// Apply `op(element, rhs)` to every element, broadcasting `rhs`.
    fn apply<F>(&mut self, rhs: Operand<'_, T>, op: F) -> Result<(), MeshCacheError>
    where
        F: Fn(T, T) -> T,
    {
        let size = self.size();
        let row_len = self.row_len().max(1);
        {
            let mut buf = self.window_mut()?;
            match rhs {
                Operand::Scalar(s) => buf.iter_mut().for_each(|x| *x = op(*x, s)),
                Operand::Slice(s) if s.len() == 1 => {
                    buf.iter_mut().for_each(|x| *x = op(*x, s[0]))
                }
                Operand::Slice(s) if s.len() == size => buf
                    .iter_mut()
                    .zip(s)
                    .for_each(|(x, &y)| *x = op(*x, y)),
                Operand::Slice(s) if s.len() == row_len => buf
                    .chunks_mut(row_len)
                    .for_each(|row| row.iter_mut().zip(s).for_each(|(x, &y)| *x = op(*x, y))),
                Operand::Slice(s) => {
                    return Err(MeshCacheError::Shape(format!(
                        "operand of {} elements cannot be broadcast to {:?}",
                        s.len(),
                        self.shape
                    )));
                }
            }
        }
        self.mark_modified();
        Ok(())
    }

    /// In-place `+=`.
    pub fn add_assign<'a>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<(), MeshCacheError> {
        self.apply(rhs.into(), |a, b| a + b)
    }

    /// In-place `-=`.
    pub fn sub_assign<'a>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<(), MeshCacheError> {
        self.apply(rhs.into(), |a, b| a - b)
    }

    /// In-place `*=`.
    pub fn mul_assign<'a>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<(), MeshCacheError> {
        self.apply(rhs.into(), |a, b| a * b)
    }

    /// In-place `/=`.
    pub fn div_assign<'a>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<(), MeshCacheError> {
        self.apply(rhs.into(), |a, b| a / b)
    }

    /// In-place `%=`.
    pub fn rem_assign<'a>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<(), MeshCacheError> {
        self.apply(rhs.into(), |a, b| a % b)
    }

    /// In-place power with a scalar exponent.
    pub fn pow_assign<E>(&mut self, exponent: E) -> Result<(), MeshCacheError>
    where
        E: Copy,
        T: Pow<E, Output = T>,
    {
        self.map_in_place(|x| x.pow(exponent))
    }

    /// In-place `&=`.
    pub fn bitand_assign<'a>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<(), MeshCacheError>
    where
        T: BitAnd<Output = T>,
    {
        self.apply(rhs.into(), |a, b| a & b)
    }

    /// In-place `|=`.
    pub fn bitor_assign<'a>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<(), MeshCacheError>
    where
        T: BitOr<Output = T>,
    {
        self.apply(rhs.into(), |a, b| a | b)
    }

    /// In-place `^=`.
    pub fn bitxor_assign<'a>(&mut self, rhs: impl Into<Operand<'a, T>>) -> Result<(), MeshCacheError>
    where
        T: BitXor<Output = T>,
    {
        self.apply(rhs.into(), |a, b| a ^ b)
    }

    /// In-place `<<=`.
    pub fn shl_assign(&mut self, bits: u32) -> Result<(), MeshCacheError>
    where
        T: Shl<u32, Output = T>,
    {
        self.map_in_place(|x| x << bits)
    }

    /// In-place `>>=`.
    pub fn shr_assign(&mut self, bits: u32) -> Result<(), MeshCacheError>
    where
        T: Shr<u32, Output = T>,
    {
        self.map_in_place(|x| x >> bits)
    }

    /// In-place `rows @= matrix` for a square `(d, d)` matrix given in C order,
    /// where `d` is the row length.
    pub fn matmul_assign(&mut self, matrix: &[T]) -> Result<(), MeshCacheError> {
        let d = self.row_len();
        if self.ndim() != 2 || matrix.len() != d * d {
            return Err(MeshCacheError::Shape(format!(
                "matmul needs a ({d}, {d}) matrix for shape {:?}, got {} elements",
                self.shape,
                matrix.len()
            )));
        }
        {
            let mut buf = self.window_mut()?;
            let mut tmp = vec![T::zero(); d];
            for row in buf.chunks_mut(d) {
                for (j, t) in tmp.iter_mut().enumerate() {
                    *t = (0..d).fold(T::zero(), |acc, k| acc + row[k] * matrix[k * d + j]);
                }
                row.copy_from_slice(&tmp);
            }
        }
        self.mark_modified();
        Ok(())
    }

    /// Replace every element by `f(element)`.
    pub fn map_in_place<F>(&mut self, mut f: F) -> Result<(), MeshCacheError>
    where
        F: FnMut(T) -> T,
    {
        self.update(|buf| buf.iter_mut().for_each(|x| *x = f(*x)))
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) -> Result<(), MeshCacheError> {
        self.window_mut()?.fill(value);
        self.mark_modified();
        Ok(())
    }

    /// Item assignment at a multi-index.
    pub fn set(&mut self, index: &[usize], value: T) -> Result<(), MeshCacheError> {
        let i = flat_index(&self.shape, index).ok_or_else(|| MeshCacheError::IndexOutOfBounds {
            index: index.to_vec(),
            shape: self.shape.clone(),
        })?;
        self.window_mut()?[i] = value;
        self.mark_modified();
        Ok(())
    }

    /// Overwrite entry `i` along the first axis.
    pub fn set_row(&mut self, i: usize, values: &[T]) -> Result<(), MeshCacheError> {
        self.assign_rows(i..i + 1, Operand::Slice(values))
    }

    /// Slice assignment: overwrite entries `range` along the first axis,
    /// broadcasting `rhs` like the arithmetic operators do.
    pub fn assign_rows<'a>(
        &mut self,
        range: Range<usize>,
        rhs: impl Into<Operand<'a, T>>,
    ) -> Result<(), MeshCacheError> {
        if self.ndim() == 0 || range.start > range.end || range.end > self.len() {
            return Err(MeshCacheError::IndexOutOfBounds {
                index: vec![range.start, range.end],
                shape: self.shape.clone(),
            });
        }
        self.check_writeable()?;
        let w = self.row_len();
        let n = (range.end - range.start) * w;
        let block = match rhs.into() {
            Operand::Scalar(s) => vec![s; n],
            Operand::Slice(s) if s.len() == n => s.to_vec(),
            Operand::Slice(s) if s.len() == 1 => vec![s[0]; n],
            Operand::Slice(s) if w > 0 && s.len() == w => s.repeat(range.end - range.start),
            Operand::Slice(s) => {
                return Err(MeshCacheError::Shape(format!(
                    "cannot assign {} elements to {} rows of width {w}",
                    s.len(),
                    range.end - range.start
                )));
            }
        };
        self.storage.write_at(self.offset + range.start * w, &block)?;
        self.mark_modified();
        Ok(())
    }

    /// Scoped raw mutable access. Counts as a modification once `f` runs.
    ///
    /// `f` works on a copy that is written back afterwards; reading the
    /// container or its views from inside `f` sees the values from before
    /// the call.
    pub fn with_mut<R>(&mut self, f: impl FnOnce(&mut [T]) -> R) -> Result<R, MeshCacheError> {
        self.update(f)
    }
}

impl<T> ModifiedState for TrackedArray<T> {
    #[inline]
    fn is_modified(&self) -> bool {
        self.modified.is_modified()
    }

    #[inline]
    fn set_modified(&self, modified: bool) {
        self.modified.set_modified(modified);
    }
}

impl<T: Element> Default for TrackedArray<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for TrackedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedArray")
            .field("shape", &self.shape)
            .field("offset", &self.offset)
            .field("modified", &self.modified.is_modified())
            .field("mutable", &self.writeable)
            .field("view", &self.source.is_some())
            .finish()
    }
}

impl<T: Element> DebugInvariants for TrackedArray<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "TrackedArray");
    }

    fn validate_invariants(&self) -> Result<(), MeshCacheError> {
        let end = self
            .offset
            .checked_add(self.size())
            .ok_or_else(|| MeshCacheError::Shape("window end overflows".into()))?;
        if end > self.storage.len() {
            return Err(MeshCacheError::Shape(format!(
                "window [{}..{end}) exceeds storage of {}",
                self.offset,
                self.storage.len()
            )));
        }
        if let Some(src) = &self.source {
            if Weak::ptr_eq(src, &Rc::downgrade(&self.modified)) {
                return Err(MeshCacheError::Shape("view lists itself as source".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrackedArray<f64> {
        make_tracked_array(Some(vec![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]])).unwrap()
    }

    #[test]
    fn fresh_array_is_modified() {
        let a = sample();
        assert!(a.is_modified());
        assert_eq!(a.shape(), &[3, 2]);
        let e = make_tracked_array::<i32, Vec<i32>>(None).unwrap();
        assert!(e.is_empty());
        assert!(e.is_modified());
    }

    #[test]
    fn ragged_input_is_shape_error() {
        let r = make_tracked_array::<i32, _>(Some(vec![vec![1, 2], vec![3]]));
        assert!(matches!(r, Err(MeshCacheError::Shape(_))));
    }

    #[test]
    fn scalar_row_and_full_operands() {
        let mut a = sample();
        a.add_assign(1.0).unwrap();
        assert_eq!(a.to_vec().unwrap(), vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        a.sub_assign(&[1.0, 2.0]).unwrap();
        assert_eq!(a.to_vec().unwrap(), vec![1.0, 1.0, 3.0, 3.0, 5.0, 5.0]);
        a.mul_assign(&vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(a.to_vec().unwrap(), vec![1.0, 2.0, 9.0, 12.0, 25.0, 30.0]);
        assert!(matches!(
            a.div_assign(&[1.0, 2.0, 3.0]),
            Err(MeshCacheError::Shape(_))
        ));
    }

    #[test]
    fn every_mutator_sets_modified() {
        let mut a = make_tracked_array::<i64, _>(Some(vec![[4i64, 8], [12, 16]])).unwrap();
        type Op = fn(&mut TrackedArray<i64>) -> Result<(), MeshCacheError>;
        let ops: [(&str, Op); 18] = [
            ("add", |a: &mut TrackedArray<i64>| a.add_assign(1i64)),
            ("sub", |a: &mut TrackedArray<i64>| a.sub_assign(1i64)),
            ("mul", |a: &mut TrackedArray<i64>| a.mul_assign(2i64)),
            ("div", |a: &mut TrackedArray<i64>| a.div_assign(2i64)),
            ("rem", |a: &mut TrackedArray<i64>| a.rem_assign(7i64)),
            ("pow", |a: &mut TrackedArray<i64>| a.pow_assign(2u32)),
            ("and", |a: &mut TrackedArray<i64>| a.bitand_assign(0xffi64)),
            ("or", |a: &mut TrackedArray<i64>| a.bitor_assign(1i64)),
            ("xor", |a: &mut TrackedArray<i64>| a.bitxor_assign(2i64)),
            ("shl", |a: &mut TrackedArray<i64>| a.shl_assign(1)),
            ("shr", |a: &mut TrackedArray<i64>| a.shr_assign(1)),
            ("matmul", |a: &mut TrackedArray<i64>| a.matmul_assign(&[1, 0, 0, 1])),
            ("set", |a: &mut TrackedArray<i64>| a.set(&[0, 1], 3)),
            ("set_row", |a: &mut TrackedArray<i64>| a.set_row(1, &[1, 2])),
            ("assign_rows", |a: &mut TrackedArray<i64>| a.assign_rows(0..2, 5i64)),
            ("fill", |a: &mut TrackedArray<i64>| a.fill(0)),
            ("map", |a: &mut TrackedArray<i64>| a.map_in_place(|x| x + 1)),
            ("with_mut", |a: &mut TrackedArray<i64>| a.with_mut(|buf| buf[0] = 9)),
        ];
        for (name, op) in ops {
            a.set_modified(false);
            op(&mut a).unwrap();
            assert!(a.is_modified(), "`{name}` did not set modified");
        }
    }

    #[test]
    fn view_is_write_protected_and_shares_storage() {
        let mut a = sample();
        let mut v = a.view();
        assert!(v.is_view_of(&a));
        assert!(v.shares_storage_with(&a));
        assert!(!v.mutable());
        assert!(matches!(
            v.set(&[0, 0], 0.0),
            Err(MeshCacheError::WriteProtection(_))
        ));
        // source stays writable
        a.set(&[0, 0], 10.0).unwrap();
        assert_eq!(v.get(&[0, 0]).unwrap(), Some(10.0));
    }

    #[test]
    fn mutable_view_propagates_to_root() {
        let a = sample();
        a.set_modified(false);
        let mut v = a.rows(1..3).unwrap();
        v.set_mutable(true);
        v.set_modified(false);
        v.set_row(0, &[0.0, 0.0]).unwrap();
        assert!(v.is_modified());
        assert!(a.is_modified());
        assert_eq!(a.to_vec().unwrap(), vec![1.0, 2.0, 0.0, 0.0, 5.0, 6.0]);
    }

    #[test]
    fn view_of_view_resolves_to_root() {
        let a = sample();
        let v = a.view();
        let vv = v.row(2).unwrap();
        assert!(vv.is_view_of(&a));
        assert!(!vv.is_view_of(&v));
        assert_eq!(vv.to_vec().unwrap(), vec![5.0, 6.0]);
    }

    #[test]
    fn view_does_not_keep_source_alive() {
        let a = sample();
        let v = a.row(0).unwrap();
        assert_eq!(v.source_modified(), Some(true));
        drop(a);
        assert_eq!(v.source_modified(), None);
        assert_eq!(v.to_vec().unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn duplicate_is_detached() {
        let mut a = sample();
        let d = a.duplicate().unwrap();
        a.fill(0.0).unwrap();
        assert_eq!(d.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(d.shape(), &[3, 2]);
    }

    #[test]
    fn with_mut_closure_may_read_views() {
        let mut a = sample();
        let v = a.view();
        let old = a
            .with_mut(|buf| {
                let seen = v.to_vec().unwrap();
                buf[0] = seen[1] + 10.0;
                seen[0]
            })
            .unwrap();
        assert_eq!(old, 1.0);
        assert_eq!(a.get(&[0, 0]).unwrap(), Some(12.0));
        assert_eq!(v.get(&[0, 0]).unwrap(), Some(12.0));

        let row = a.row(2).unwrap();
        a.map_in_place(|x| x + row.get(&[0]).unwrap().unwrap_or(0.0))
            .unwrap();
        assert_eq!(a.to_vec().unwrap(), vec![17.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn writes_fail_while_data_is_borrowed() {
        let mut a = sample();
        let v = a.view();
        let guard = v.data().unwrap();
        a.set_modified(false);
        assert!(matches!(
            a.fill(0.0),
            Err(MeshCacheError::WriteProtection(_))
        ));
        assert!(a.with_mut(|buf| buf[0] = 0.0).is_err());
        assert!(a.set_row(0, &[0.0, 0.0]).is_err());
        assert!(!a.is_modified());
        assert_eq!(guard[0], 1.0);
        drop(guard);
        assert!(a.fill(0.0).is_ok());
    }

    #[test]
    fn set_row_and_assign_rows_touch_only_their_rows() {
        let mut a = sample();
        a.set_row(1, &[7.0, 8.0]).unwrap();
        assert_eq!(a.to_vec().unwrap(), vec![1.0, 2.0, 7.0, 8.0, 5.0, 6.0]);
        a.assign_rows(1..3, &[0.5, -0.5]).unwrap();
        assert_eq!(a.to_vec().unwrap(), vec![1.0, 2.0, 0.5, -0.5, 0.5, -0.5]);
        assert!(matches!(
            a.set_row(0, &[1.0, 2.0, 3.0]),
            Err(MeshCacheError::Shape(_))
        ));
        assert!(a.set_row(3, &[1.0, 2.0]).is_err());
    }

    #[test]
    fn matmul_rotates_rows() {
        let mut a = make_tracked_array::<f64, _>(Some(vec![[1.0, 0.0]])).unwrap();
        // rows @ [[0, 1], [-1, 0]]
        a.matmul_assign(&[0.0, 1.0, -1.0, 0.0]).unwrap();
        assert_eq!(a.to_vec().unwrap(), vec![0.0, 1.0]);
        assert!(a.matmul_assign(&[1.0]).is_err());
    }

    #[test]
    fn cast_changes_dtype() {
        let a = make_tracked_array::<f64, _>(Some(vec![1.5, 2.0])).unwrap();
        let b: TrackedArray<i32> = a.cast().unwrap();
        assert_eq!(b.to_vec().unwrap(), vec![1, 2]);
        assert!(!b.is_view());
        let big = make_tracked_array::<i64, _>(Some(vec![i64::MAX])).unwrap();
        assert_eq!(big.cast::<i32>().unwrap_err(), MeshCacheError::Cast(0));
    }

    #[test]
    fn write_protected_root_rejects_writes() {
        let mut a = sample();
        a.set_mutable(false);
        a.set_modified(false);
        assert!(a.add_assign(1.0).is_err());
        assert!(!a.is_modified());
        a.set_mutable(true);
        assert!(a.add_assign(1.0).is_ok());
    }
}
