//! MeshCacheError: Unified error type for mesh-cache public APIs
//!
//! Every fallible operation on tracked arrays, dependency graphs and computed
//! data returns this error. Failures are local and synchronous; nothing is
//! retried or swallowed internally.

use thiserror::Error;

/// Unified error type for mesh-cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshCacheError {
    /// Input could not be coerced into a rectangular numeric buffer, or an
    /// operand does not fit the target's shape.
    #[error("Shape error: {0}")]
    Shape(String),
    /// Mutation attempted on a write-protected container (e.g. a view).
    #[error("Write protection error: container is read-only ({0})")]
    WriteProtection(&'static str),
    /// A stored key was requested without a default and is not present.
    #[error("`{key}` is not stored for {holder}")]
    KeyNotFound { key: String, holder: &'static str },
    /// Saved-only access on an operation that has not been computed yet.
    #[error("`{0}` has not been computed yet")]
    NotComputed(String),
    /// Direct item assignment into a data holder is never allowed.
    #[error("Sorry, you can't set items directly for {0}")]
    DirectWriteRejected(&'static str),
    /// Evaluation of an operation the dependency graph does not know.
    #[error("`{operation}` is not a registered computation of {holder}")]
    UnknownOperation {
        operation: String,
        holder: &'static str,
    },
    /// A declared dependency name could not be resolved on the holder.
    #[error("{holder} has no tracked attribute `{attribute}`")]
    UnknownAttribute {
        attribute: String,
        holder: &'static str,
    },
    /// A cached value was requested as a type it was not computed as.
    #[error("cached value `{operation}` is not a `{expected}`")]
    TypeMismatch {
        operation: String,
        expected: &'static str,
    },
    /// The dependency graph of a holder type is misconfigured.
    #[error("Invalid dependency configuration: {0}")]
    InvalidDependency(String),
    /// Index outside of the container's shape.
    #[error("index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },
    /// A configuration value is outside of its valid range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    /// Numeric value could not be represented in the requested element type.
    #[error("value at flat index {0} cannot be cast to the requested element type")]
    Cast(usize),
}
