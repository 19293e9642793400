//! Shared contiguous storage for tracked arrays.
//!
//! A root [`TrackedArray`](crate::data::tracked_array::TrackedArray) and all of
//! its views point into the same [`SharedStorage`]. Each container addresses a
//! window `[offset .. offset + len)` of the flat buffer. Execution is
//! single-threaded, so the buffer lives behind `Rc<RefCell<..>>`; conflicting
//! borrows are reported as errors instead of aborting.

use core::fmt::{self, Debug};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::mesh_error::MeshCacheError;

/// Reference-counted, contiguous buffer of `V`.
pub struct SharedStorage<V>(Rc<RefCell<Vec<V>>>);

impl<V> Debug for SharedStorage<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStorage")
            .field("len", &self.len())
            .field("handles", &Rc::strong_count(&self.0))
            .finish()
    }
}

impl<V> SharedStorage<V> {
    /// Adopt `data` as a new buffer without copying.
    pub fn from_vec(data: Vec<V>) -> Self {
        Self(Rc::new(RefCell::new(data)))
    }

    /// Another handle onto the same buffer.
    pub(crate) fn share(&self) -> Self {
        Self(Rc::clone(&self.0))
    }

    /// `true` if both handles address the same buffer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Current length in elements.
    ///
    /// Returns 0 while the buffer is mutably borrowed.
    pub fn len(&self) -> usize {
        self.0.try_borrow().map(|v| v.len()).unwrap_or(0)
    }

    /// `true` when the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only window `[offset .. offset + len)`.
    ///
    /// # Errors
    /// `WriteProtection` while a write borrow of the buffer is alive,
    /// `Shape` if the window does not fit the buffer.
    pub fn window(&self, offset: usize, len: usize) -> Result<Ref<'_, [V]>, MeshCacheError> {
        let buf = self
            .0
            .try_borrow()
            .map_err(|_| MeshCacheError::WriteProtection("buffer is being written"))?;
        let end = checked_end(offset, len, buf.len())?;
        Ok(Ref::map(buf, |v| &v[offset..end]))
    }

    /// Mutable window `[offset .. offset + len)`.
    ///
    /// # Errors
    /// `WriteProtection` if any read or write borrow of the buffer is alive,
    /// `Shape` if the window does not fit the buffer.
    pub fn window_mut(&self, offset: usize, len: usize) -> Result<RefMut<'_, [V]>, MeshCacheError> {
        let buf = self
            .0
            .try_borrow_mut()
            .map_err(|_| MeshCacheError::WriteProtection("buffer is borrowed elsewhere"))?;
        let end = checked_end(offset, len, buf.len())?;
        Ok(RefMut::map(buf, |v| &mut v[offset..end]))
    }

    /// Copy `src` into the range `[offset .. offset + src.len())`.
    ///
    /// The write borrow is released before returning, so callers never hand
    /// a live `RefMut` to code that may read the buffer again.
    pub fn write_at(&self, offset: usize, src: &[V]) -> Result<(), MeshCacheError>
    where
        V: Clone,
    {
        let mut dst = self.window_mut(offset, src.len())?;
        dst.clone_from_slice(src);
        Ok(())
    }

    /// Copy the window `[offset .. offset + len)` out into a fresh `Vec`.
    pub fn read_vec(&self, offset: usize, len: usize) -> Result<Vec<V>, MeshCacheError>
    where
        V: Clone,
    {
        Ok(self.window(offset, len)?.to_vec())
    }
}

fn checked_end(offset: usize, len: usize, buf_len: usize) -> Result<usize, MeshCacheError> {
    offset
        .checked_add(len)
        .filter(|&end| end <= buf_len)
        .ok_or_else(|| {
            MeshCacheError::Shape(format!(
                "window [{offset}..{offset}+{len}) exceeds buffer of {buf_len}"
            ))
        })
}
