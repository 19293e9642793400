//! DependencyGraph: which raw attributes each derived quantity reads.
//!
//! A holder type builds its graph once, in its own static initialization, and
//! hands a `&'static` reference to every [`ComputedData`] it creates. After
//! [`DependencyGraphBuilder::build`] the graph is immutable.
//!
//! For every registered operation the graph stores
//! - the ordered list of dependency names (`depends_on`),
//! - the computation producing the value,
//!
//! and for every dependency name the operations that read it
//! (`inv_depends_on`). A dependency name is either a tracked attribute of the
//! holder or another registered operation.
//!
//! [`ComputedData`]: crate::data::computed::ComputedData

use std::any::Any;
use hashbrown::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshCacheError;

/// Type-erased cached value. Stored values are shared and never mutated.
pub type CachedValue = Rc<dyn Any>;

type Computation<H> = Box<dyn Fn(&H) -> Result<CachedValue, MeshCacheError> + Send + Sync>;

/// Immutable, per-holder-type dependency graph.
pub struct DependencyGraph<H> {
    holder: &'static str,
    depends_on: HashMap<&'static str, Vec<&'static str>>,
    inv_depends_on: HashMap<&'static str, Vec<&'static str>>,
    computations: HashMap<&'static str, Computation<H>>,
    /// Registration order of operations.
    order: Vec<&'static str>,
}

impl<H> DependencyGraph<H> {
    /// Start building the graph of holder type `holder`.
    pub fn builder(holder: &'static str) -> DependencyGraphBuilder<H> {
        DependencyGraphBuilder {
            graph: DependencyGraph {
                holder,
                depends_on: HashMap::new(),
                inv_depends_on: HashMap::new(),
                computations: HashMap::new(),
                order: Vec::new(),
            },
        }
    }

    /// Name of the holder type, used in error messages.
    #[inline]
    pub fn holder(&self) -> &'static str {
        self.holder
    }

    /// `true` if `operation` is registered.
    #[inline]
    pub fn contains(&self, operation: &str) -> bool {
        self.depends_on.contains_key(operation)
    }

    /// Dependencies of `operation`, in registration order.
    pub fn dependencies(&self, operation: &str) -> Option<&[&'static str]> {
        self.depends_on.get(operation).map(Vec::as_slice)
    }

    /// Operations that read `dependency`.
    pub fn dependents(&self, dependency: &str) -> &[&'static str] {
        self.inv_depends_on
            .get(dependency)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Registered operations, in registration order.
    pub fn operations(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    /// Run the computation of `operation` on `holder`.
    pub(crate) fn compute(&self, operation: &str, holder: &H) -> Result<CachedValue, MeshCacheError> {
        let f = self
            .computations
            .get(operation)
            .ok_or_else(|| MeshCacheError::UnknownOperation {
                operation: operation.to_owned(),
                holder: self.holder,
            })?;
        f(holder)
    }

    fn find_cycle(&self) -> Option<&'static str> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Active,
            Done,
        }
        fn visit<H>(
            g: &DependencyGraph<H>,
            op: &'static str,
            marks: &mut HashMap<&'static str, Mark>,
        ) -> Option<&'static str> {
            match marks.get(op) {
                Some(Mark::Done) => return None,
                Some(Mark::Active) => return Some(op),
                None => {}
            }
            marks.insert(op, Mark::Active);
            for &dep in g.dependencies(op).unwrap_or(&[]) {
                if g.contains(dep) {
                    if let Some(c) = visit(g, dep, marks) {
                        return Some(c);
                    }
                }
            }
            marks.insert(op, Mark::Done);
            None
        }

        let mut marks = HashMap::new();
        self.order.iter().find_map(|&op| visit(self, op, &mut marks))
    }
}

impl<H> fmt::Debug for DependencyGraph<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("holder", &self.holder)
            .field("depends_on", &self.depends_on)
            .field("inv_depends_on", &self.inv_depends_on)
            .finish()
    }
}

impl<H> DebugInvariants for DependencyGraph<H> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "DependencyGraph");
    }

    /// Forward and inverse index must describe the same multiset of edges, and
    /// every operation needs a non-empty dependency list and a computation.
    fn validate_invariants(&self) -> Result<(), MeshCacheError> {
        let count = |list: &[&'static str], name: &str| list.iter().filter(|&&n| n == name).count();
        for (&op, deps) in &self.depends_on {
            if deps.is_empty() {
                return Err(MeshCacheError::InvalidDependency(format!(
                    "`{op}` of {} has an empty dependency list",
                    self.holder
                )));
            }
            if !self.computations.contains_key(op) {
                return Err(MeshCacheError::InvalidDependency(format!(
                    "`{op}` of {} has no computation",
                    self.holder
                )));
            }
            for &dep in deps {
                if count(deps, dep) != count(self.dependents(dep), op) {
                    return Err(MeshCacheError::InvalidDependency(format!(
                        "inverse index of `{dep}` out of sync with `{op}`"
                    )));
                }
            }
        }
        for (&dep, ops) in &self.inv_depends_on {
            for &op in ops {
                if !self.dependencies(op).is_some_and(|d| d.contains(&dep)) {
                    return Err(MeshCacheError::InvalidDependency(format!(
                        "`{op}` listed as dependent of `{dep}` but does not depend on it"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Builder collecting registrations for a [`DependencyGraph`].
pub struct DependencyGraphBuilder<H> {
    graph: DependencyGraph<H>,
}

impl<H: 'static> DependencyGraphBuilder<H> {
    /// Declare that `operation` reads `dependencies`.
    ///
    /// Registrations accumulate: calling this again for the same operation
    /// appends to its list.
    pub fn register(mut self, operation: &'static str, dependencies: &[&'static str]) -> Self {
        let g = &mut self.graph;
        if !g.depends_on.contains_key(operation) {
            g.order.push(operation);
        }
        g.depends_on
            .entry(operation)
            .or_default()
            .extend_from_slice(dependencies);
        for &dep in dependencies {
            g.inv_depends_on.entry(dep).or_default().push(operation);
        }
        self
    }

    /// Attach (or replace) the computation of `operation`.
    pub fn compute_with<V, F>(mut self, operation: &'static str, f: F) -> Self
    where
        V: Any,
        F: Fn(&H) -> Result<V, MeshCacheError> + Send + Sync + 'static,
    {
        let erased: Computation<H> = Box::new(move |h: &H| f(h).map(|v| Rc::new(v) as CachedValue));
        self.graph.computations.insert(operation, erased);
        self
    }

    /// [`register`](Self::register) and [`compute_with`](Self::compute_with)
    /// in one call.
    pub fn depends_on<V, F>(
        self,
        operation: &'static str,
        dependencies: &[&'static str],
        f: F,
    ) -> Self
    where
        V: Any,
        F: Fn(&H) -> Result<V, MeshCacheError> + Send + Sync + 'static,
    {
        self.register(operation, dependencies).compute_with(operation, f)
    }

    /// Freeze the graph.
    ///
    /// # Errors
    /// `InvalidDependency` if an operation has no dependencies or no
    /// computation, a computation was attached to an unregistered operation,
    /// or operations depend on each other cyclically.
    pub fn build(self) -> Result<DependencyGraph<H>, MeshCacheError> {
        let g = self.graph;
        if let Some(&op) = g.computations.keys().find(|op| !g.contains(op)) {
            return Err(MeshCacheError::InvalidDependency(format!(
                "`{op}` of {} has a computation but no dependencies",
                g.holder
            )));
        }
        g.validate_invariants()?;
        if let Some(op) = g.find_cycle() {
            return Err(MeshCacheError::InvalidDependency(format!(
                "`{op}` of {} depends on itself",
                g.holder
            )));
        }
        log::debug!(
            "dependency graph of {} built with {} operations",
            g.holder,
            g.order.len()
        );
        Ok(g)
    }
}
