#![allow(dead_code)]
use std::cell::Cell;

use mesh_cache::prelude::*;
use once_cell::sync::Lazy;

/// Install a test logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Holder with two tracked arrays and per-operation call counters.
pub struct Counter {
    pub x: TrackedArray<i64>,
    pub y: TrackedArray<i64>,
    pub f_calls: Cell<u32>,
    pub g_calls: Cell<u32>,
    computed: ComputedData<Counter>,
}

static COUNTER_GRAPH: Lazy<Result<DependencyGraph<Counter>, MeshCacheError>> = Lazy::new(|| {
    DependencyGraph::builder("Counter")
        .depends_on("f", &["x"], |c: &Counter| {
            c.f_calls.set(c.f_calls.get() + 1);
            Ok(c.x.to_vec()?.iter().sum::<i64>())
        })
        .depends_on("g", &["x"], |c: &Counter| {
            c.g_calls.set(c.g_calls.get() + 1);
            Ok(c.x.to_vec()?.iter().product::<i64>())
        })
        .depends_on("h", &["x", "y"], |c: &Counter| {
            Ok(c.x.to_vec()?.len() + c.y.to_vec()?.len())
        })
        .build()
});

impl Counter {
    pub fn new(x: Vec<i64>, y: Vec<i64>) -> Self {
        let graph = Lazy::force(&COUNTER_GRAPH).as_ref().unwrap();
        Self {
            x: make_tracked_array(Some(x)).unwrap(),
            y: make_tracked_array(Some(y)).unwrap(),
            f_calls: Cell::new(0),
            g_calls: Cell::new(0),
            computed: ComputedData::new(graph),
        }
    }

    pub fn f(&self) -> i64 {
        *self.evaluate::<i64>("f", EvalOptions::CACHED).unwrap()
    }

    pub fn g(&self) -> i64 {
        *self.evaluate::<i64>("g", EvalOptions::CACHED).unwrap()
    }
}

impl Holder for Counter {
    fn tracked(&self, name: &str) -> Option<&dyn ModifiedState> {
        match name {
            "x" => Some(&self.x),
            "y" => Some(&self.y),
            _ => None,
        }
    }

    fn computed(&self) -> &ComputedData<Self> {
        &self.computed
    }
}

/// Rows of `values` picked by `inverse` must rebuild `original`.
pub fn assert_reconstructs<T: mesh_cache::data::array::Element + Eq>(
    values: &NdArray<T>,
    inverse: &[usize],
    original: &NdArray<T>,
) {
    let rebuilt = values.take_rows(inverse).unwrap();
    assert_eq!(&rebuilt, original, "values[inverse] != original");
}
