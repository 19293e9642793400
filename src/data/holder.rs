//! DataHolder: read-mostly keyed store behind computed data.
//!
//! Behaves like a map for reading (`get`, `keys`, `values`, `items`, indexed
//! lookup through [`DataHolder::try_get`]) but refuses direct assignment:
//! values enter only through the crate's own evaluation protocol, so nothing
//! can bypass invalidation.

use std::cell::RefCell;
use hashbrown::HashMap;

use crate::mesh_error::MeshCacheError;

/// Keyed store owned by a single holder instance.
#[derive(Debug)]
pub struct DataHolder<V> {
    helpee: &'static str,
    saved: RefCell<HashMap<String, V>>,
    /// Insertion order of live keys.
    order: RefCell<Vec<String>>,
}

impl<V: Clone> DataHolder<V> {
    /// Empty store for a holder named `helpee`.
    pub fn new(helpee: &'static str) -> Self {
        Self {
            helpee,
            saved: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
        }
    }

    /// Name of the owning holder type.
    #[inline]
    pub fn helpee(&self) -> &'static str {
        self.helpee
    }

    /// Stored value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<V> {
        self.saved.borrow().get(key).cloned()
    }

    /// Stored value for `key`, or `default`.
    pub fn get_or(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    /// Indexed lookup.
    ///
    /// # Errors
    /// `KeyNotFound` if nothing is stored under `key`.
    pub fn try_get(&self, key: &str) -> Result<V, MeshCacheError> {
        self.get(key).ok_or_else(|| MeshCacheError::KeyNotFound {
            key: key.to_owned(),
            holder: self.helpee,
        })
    }

    /// `true` if a value is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.saved.borrow().contains_key(key)
    }

    /// Stored keys, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.order.borrow().clone()
    }

    /// Stored values, in insertion order.
    pub fn values(&self) -> Vec<V> {
        self.items().into_iter().map(|(_, v)| v).collect()
    }

    /// Stored `(key, value)` pairs, in insertion order.
    pub fn items(&self) -> Vec<(String, V)> {
        let saved = self.saved.borrow();
        self.order
            .borrow()
            .iter()
            .filter_map(|k| saved.get(k).map(|v| (k.clone(), v.clone())))
            .collect()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.saved.borrow().len()
    }

    /// `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct assignment. Always rejected.
    ///
    /// # Errors
    /// Always `DirectWriteRejected`.
    pub fn set_item(&self, key: &str, _value: V) -> Result<(), MeshCacheError> {
        log::warn!(
            "rejected direct write of `{key}` into data of {}",
            self.helpee
        );
        Err(MeshCacheError::DirectWriteRejected(self.helpee))
    }

    pub(crate) fn store(&self, key: &str, value: V) {
        if self.saved.borrow_mut().insert(key.to_owned(), value).is_none() {
            self.order.borrow_mut().push(key.to_owned());
        }
    }

    pub(crate) fn evict(&self, key: &str) -> Option<V> {
        let removed = self.saved.borrow_mut().remove(key);
        if removed.is_some() {
            self.order.borrow_mut().retain(|k| k != key);
        }
        removed
    }
}
