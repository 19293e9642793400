//! Modified-state tracking shared by tracked arrays and computed entries.

use std::cell::Cell;

/// Anything a computed quantity can depend on exposes whether it changed
/// since a cache last consumed it.
///
/// The setter takes `&self`: consuming a dependency during evaluation must not
/// require exclusive access to the holder that owns it.
pub trait ModifiedState {
    /// `true` if the value changed since it was last consumed.
    fn is_modified(&self) -> bool;
    /// Set or clear the modified state.
    fn set_modified(&self, modified: bool);
}

// Blanket impl for Box<T>
impl<T: ModifiedState + ?Sized> ModifiedState for Box<T> {
    #[inline]
    fn is_modified(&self) -> bool {
        (**self).is_modified()
    }

    #[inline]
    fn set_modified(&self, modified: bool) {
        (**self).set_modified(modified);
    }
}

impl<T: ModifiedState + ?Sized> ModifiedState for &T {
    #[inline]
    fn is_modified(&self) -> bool {
        (**self).is_modified()
    }

    #[inline]
    fn set_modified(&self, modified: bool) {
        (**self).set_modified(modified);
    }
}

/// A single dirty bit. Starts set: fresh data has not been consumed yet.
#[derive(Debug)]
pub struct ModifiedFlag(Cell<bool>);

impl Default for ModifiedFlag {
    fn default() -> Self {
        Self(Cell::new(true))
    }
}

impl ModifiedFlag {
    /// New flag in the given state.
    pub fn new(modified: bool) -> Self {
        Self(Cell::new(modified))
    }
}

impl ModifiedState for ModifiedFlag {
    #[inline]
    fn is_modified(&self) -> bool {
        self.0.get()
    }

    #[inline]
    fn set_modified(&self, modified: bool) {
        self.0.set(modified);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_modified() {
        let f = ModifiedFlag::default();
        assert!(f.is_modified());
        f.set_modified(false);
        assert!(!f.is_modified());
    }

    #[test]
    fn boxed_and_borrowed_forward() {
        let b: Box<dyn ModifiedState> = Box::new(ModifiedFlag::new(false));
        b.set_modified(true);
        assert!(b.is_modified());
        let r = &*b;
        r.set_modified(false);
        assert!(!b.is_modified());
    }
}
