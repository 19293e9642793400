//! Numeric helpers shared by the mesh holders.
//!
//! - [`arr`]: row uniqueness, bounds, range selection, rotations, shape checks
//! - [`connec`]: connectivity conversions

pub mod arr;
pub mod connec;
