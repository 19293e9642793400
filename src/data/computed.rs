//! ComputedData: dependency-tracked cache of derived quantities.
//!
//! Each holder instance owns one `ComputedData`, keyed by operation name and
//! bound to the holder type's [`DependencyGraph`]. Values are computed lazily
//! through [`ComputedData::evaluate`]:
//!
//! 1. With `return_saved_only`, return the stored value (unless `recompute`)
//!    or fail with `NotComputed`. Nothing is computed.
//! 2. For each dependency of the operation that reports modified, evict every
//!    operation depending on that same name, not only the one evaluated.
//! 3. Return the stored value if there still is one and `recompute` is unset.
//! 4. Otherwise compute, store, and clear the modified state of this
//!    operation's dependencies.
//!
//! Only the consuming operation clears flags. If `f` and `g` both depend on
//! `x`, mutating `x` and evaluating `g` leaves `x` clean, but `f` was evicted
//! during `g`'s sweep and recomputes on its next call.
//!
//! A dependency name resolves to another registered operation if the graph
//! knows it, and to a tracked attribute of the holder otherwise. A computed
//! dependency counts as modified when it is not stored, was recomputed since
//! last consumed, or one of its own dependencies is modified.

use std::any::{Any, type_name};
use hashbrown::HashMap;
use std::rc::Rc;

use crate::data::dependency::{CachedValue, DependencyGraph};
use crate::data::holder::DataHolder;
use crate::data::modified::{ModifiedFlag, ModifiedState};
use crate::mesh_error::MeshCacheError;

/// Call-time flags of [`ComputedData::evaluate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Ignore any stored value and compute again.
    pub recompute: bool,
    /// Never compute; return the stored value or fail with `NotComputed`.
    pub return_saved_only: bool,
}

impl EvalOptions {
    /// Use the stored value when it is still valid.
    pub const CACHED: Self = Self {
        recompute: false,
        return_saved_only: false,
    };

    /// Always compute.
    pub const RECOMPUTE: Self = Self {
        recompute: true,
        return_saved_only: false,
    };

    /// Only return what is already stored.
    pub const SAVED_ONLY: Self = Self {
        recompute: false,
        return_saved_only: true,
    };
}

/// An object owning tracked attributes and a [`ComputedData`] over them.
pub trait Holder: Sized + 'static {
    /// Tracked attribute called `name`, if the holder has one.
    fn tracked(&self, name: &str) -> Option<&dyn ModifiedState>;

    /// The holder's computed data.
    fn computed(&self) -> &ComputedData<Self>;

    /// Evaluate a registered operation and read it as `V`.
    fn evaluate<V: Any>(&self, operation: &str, options: EvalOptions) -> Result<Rc<V>, MeshCacheError> {
        self.computed().evaluate(self, operation, options)
    }
}

/// Dependency-tracked store of derived values for one holder instance.
pub struct ComputedData<H: 'static> {
    graph: &'static DependencyGraph<H>,
    saved: DataHolder<CachedValue>,
    /// Per operation: recomputed since a dependent last consumed it.
    fresh: HashMap<&'static str, ModifiedFlag>,
}

impl<H: Holder> ComputedData<H> {
    /// Empty cache bound to the holder type's graph.
    pub fn new(graph: &'static DependencyGraph<H>) -> Self {
        let fresh = graph
            .operations()
            .map(|op| (op, ModifiedFlag::default()))
            .collect();
        Self {
            graph,
            saved: DataHolder::new(graph.holder()),
            fresh,
        }
    }

    /// The dependency graph this cache follows.
    #[inline]
    pub fn graph(&self) -> &'static DependencyGraph<H> {
        self.graph
    }

    /// Read access to the stored values.
    #[inline]
    pub fn data(&self) -> &DataHolder<CachedValue> {
        &self.saved
    }

    /// Names of the operations with a stored value.
    pub fn keys(&self) -> Vec<String> {
        self.saved.keys()
    }

    /// `true` if `operation` currently has a stored value.
    pub fn contains_key(&self, operation: &str) -> bool {
        self.saved.contains_key(operation)
    }

    /// Typed read of a stored value without evaluating anything.
    pub fn get<V: Any>(&self, operation: &str) -> Result<Option<Rc<V>>, MeshCacheError> {
        self.saved
            .get(operation)
            .map(|v| downcast(v, operation))
            .transpose()
    }

    /// Direct assignment. Always rejected.
    pub fn set_item(&self, key: &str, value: CachedValue) -> Result<(), MeshCacheError> {
        self.saved.set_item(key, value)
    }

    /// Evaluate `operation` for `holder`, computing only when stale.
    ///
    /// `holder` must be the instance owning this cache.
    ///
    /// # Errors
    /// - `UnknownOperation` if the graph has no such operation.
    /// - `NotComputed` for saved-only access without a stored value.
    /// - `UnknownAttribute` if a dependency name does not resolve.
    /// - `TypeMismatch` if the value is not a `V`.
    /// - whatever the computation itself returns.
    pub fn evaluate<V: Any>(
        &self,
        holder: &H,
        operation: &str,
        options: EvalOptions,
    ) -> Result<Rc<V>, MeshCacheError> {
        self.evaluate_erased(holder, operation, options)
            .and_then(|v| downcast(v, operation))
    }

    /// [`evaluate`](Self::evaluate) without the typed read.
    pub fn evaluate_erased(
        &self,
        holder: &H,
        operation: &str,
        options: EvalOptions,
    ) -> Result<CachedValue, MeshCacheError> {
        let deps = self
            .graph
            .dependencies(operation)
            .ok_or_else(|| MeshCacheError::UnknownOperation {
                operation: operation.to_owned(),
                holder: self.graph.holder(),
            })?;

        if options.return_saved_only {
            return match self.saved.get(operation) {
                Some(v) if !options.recompute => Ok(v),
                _ => Err(MeshCacheError::NotComputed(operation.to_owned())),
            };
        }

        for &dep in deps {
            if self.is_dependency_modified(holder, dep)? {
                for &stale in self.graph.dependents(dep) {
                    if self.saved.evict(stale).is_some() {
                        log::trace!(
                            "{}: `{dep}` modified, evicted `{stale}`",
                            self.graph.holder()
                        );
                    }
                }
            }
        }

        if !options.recompute {
            if let Some(v) = self.saved.get(operation) {
                return Ok(v);
            }
        }

        log::debug!("{}: computing `{operation}`", self.graph.holder());
        let computed = self.graph.compute(operation, holder)?;
        self.saved.store(operation, Rc::clone(&computed));
        if let Some(flag) = self.fresh.get(operation) {
            flag.set_modified(true);
        }

        for &dep in deps {
            self.clear_dependency(holder, dep)?;
        }
        Ok(computed)
    }

    fn is_dependency_modified(&self, holder: &H, dep: &str) -> Result<bool, MeshCacheError> {
        if self.graph.contains(dep) {
            if !self.saved.contains_key(dep) || self.fresh.get(dep).is_some_and(|f| f.is_modified()) {
                return Ok(true);
            }
            for &upstream in self.graph.dependencies(dep).unwrap_or(&[]) {
                if self.is_dependency_modified(holder, upstream)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }
        self.resolve(holder, dep).map(|d| d.is_modified())
    }

    fn clear_dependency(&self, holder: &H, dep: &str) -> Result<(), MeshCacheError> {
        if self.graph.contains(dep) {
            if let Some(flag) = self.fresh.get(dep) {
                flag.set_modified(false);
            }
            return Ok(());
        }
        self.resolve(holder, dep)?.set_modified(false);
        Ok(())
    }

    fn resolve<'h>(&self, holder: &'h H, dep: &str) -> Result<&'h dyn ModifiedState, MeshCacheError> {
        holder
            .tracked(dep)
            .ok_or_else(|| MeshCacheError::UnknownAttribute {
                attribute: dep.to_owned(),
                holder: self.graph.holder(),
            })
    }
}

impl<H: 'static> std::fmt::Debug for ComputedData<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputedData")
            .field("holder", &self.graph.holder())
            .field("saved", &self.saved.keys())
            .finish()
    }
}

fn downcast<V: Any>(value: CachedValue, operation: &str) -> Result<Rc<V>, MeshCacheError> {
    value
        .downcast::<V>()
        .map_err(|_| MeshCacheError::TypeMismatch {
            operation: operation.to_owned(),
            expected: type_name::<V>(),
        })
}
