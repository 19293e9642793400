//! Array and point-set helpers used by derived computations.
//!
//! All functions work on 2-d [`NdArray`]s interpreted as one point (or one
//! connectivity entry) per row.
//!
//! # Examples
//! ```rust
//! use mesh_cache::data::array::NdArray;
//! use mesh_cache::utils::arr::unique_rows;
//!
//! let edges = NdArray::from_rows(&[[1, 2], [1, 2], [3, 4]])?;
//! let u = unique_rows(&edges)?;
//! assert_eq!(u.values.to_rows(), vec![vec![1, 2], vec![3, 4]]);
//! assert_eq!(u.inverse, vec![0, 0, 1]);
//! assert_eq!(u.counts, vec![2, 1]);
//! assert_eq!(u.values.take_rows(&u.inverse)?, edges);
//! # Ok::<(), mesh_cache::mesh_error::MeshCacheError>(())
//! ```

use hashbrown::HashMap;
use itertools::Itertools;
use num_traits::{Float, NumCast};

use crate::data::array::{Element, NdArray};
use crate::data::unique::{Unique2dFloats, Unique2dIntegers};
use crate::mesh_error::MeshCacheError;
use crate::settings::TOLERANCE;

fn require_2d<T: Element>(arr: &NdArray<T>, what: &str) -> Result<(), MeshCacheError> {
    if arr.ndim() != 2 {
        return Err(MeshCacheError::Shape(format!(
            "{what} can be only applied for 2D arrays, got shape {:?}",
            arr.shape()
        )));
    }
    Ok(())
}

/// Unique rows of an integer array.
///
/// Unique rows come out lexicographically ascending; `ids` holds the first
/// occurrence of each.
pub fn unique_rows<T: Element + Ord>(arr: &NdArray<T>) -> Result<Unique2dIntegers<T>, MeshCacheError> {
    require_2d(arr, "unique_rows")?;
    let rows: Vec<&[T]> = arr.rows().collect();
    let mut order: Vec<usize> = (0..rows.len()).collect();
    // stable: equal rows keep ascending input order
    order.sort_by(|&a, &b| rows[a].cmp(rows[b]));

    let mut ids = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut inverse = vec![0usize; rows.len()];
    for (pos, &i) in order.iter().enumerate() {
        let new_group = pos == 0 || rows[order[pos - 1]] != rows[i];
        if new_group {
            ids.push(i);
            counts.push(0);
        }
        inverse[i] = ids.len() - 1;
        if let Some(c) = counts.last_mut() {
            *c += 1;
        }
    }
    let values = arr.take_rows(&ids)?;
    Ok(Unique2dIntegers {
        values,
        ids,
        inverse,
        counts,
    })
}

/// Above this row length the 3^d neighbourhood walk of the grid costs more
/// than comparing every pair.
const GRID_MAX_DIM: usize = 4;

/// Upper bound on grid cells per axis; keeps cell indices far from `i64`
/// overflow whatever the coordinate magnitude.
const MAX_CELLS_PER_AXIS: u64 = 1 << 40;

fn dist2<F: Float>(a: &[F], b: &[F]) -> F {
    a.iter()
        .zip(b)
        .fold(F::zero(), |acc, (&x, &y)| acc + (x - y) * (x - y))
}

fn pairwise_neighbors<F: Element + Float>(arr: &NdArray<F>, tol2: F) -> Vec<Vec<usize>> {
    log::debug!(
        "close_rows: pairwise scan of {} rows of length {}",
        arr.len(),
        arr.row_len()
    );
    let rows: Vec<&[F]> = arr.rows().collect();
    rows.iter()
        .map(|row| {
            rows.iter()
                .positions(|other| dist2(*row, *other) <= tol2)
                .collect()
        })
        .collect()
}

/// Rows within `tolerance` (euclidean, inclusive) of each row, ascending.
fn radius_neighbors<F: Element + Float>(
    arr: &NdArray<F>,
    tolerance: F,
) -> Result<Vec<Vec<usize>>, MeshCacheError> {
    let n = arr.len();
    let d = arr.row_len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if d == 0 {
        return Ok(vec![(0..n).collect(); n]);
    }
    if let Some(x) = arr.as_slice().iter().find(|x| !x.is_finite()) {
        return Err(MeshCacheError::Shape(format!(
            "close_rows needs finite coordinates, got {x:?}"
        )));
    }

    if tolerance <= F::zero() {
        log::warn!("close_rows with non-positive tolerance: grouping identical rows only");
        let mut groups: HashMap<Vec<u64>, Vec<usize>> = HashMap::new();
        for (i, row) in arr.rows().enumerate() {
            let key = row
                .iter()
                .map(|&x| (x + F::zero()).to_f64().unwrap_or(f64::NAN).to_bits())
                .collect();
            groups.entry(key).or_default().push(i);
        }
        let mut out = vec![Vec::new(); n];
        for members in groups.values() {
            for &i in members {
                out[i] = members.clone();
            }
        }
        return Ok(out);
    }

    let tol2 = tolerance * tolerance;
    if d > GRID_MAX_DIM {
        return Ok(pairwise_neighbors(arr, tol2));
    }

    // cells are anchored at the per-column minimum and never smaller than
    // `tolerance`, so every neighbour sits in an adjacent cell
    let limits = bounds(arr)?;
    let (lo, hi) = limits.as_slice().split_at(d);
    let extent = lo
        .iter()
        .zip(hi)
        .fold(F::zero(), |acc, (&a, &b)| acc.max(b - a));
    let max_cells = <F as NumCast>::from(MAX_CELLS_PER_AXIS).unwrap_or_else(F::max_value);
    let cell = tolerance.max(extent / max_cells);
    if !cell.is_finite() {
        return Ok(pairwise_neighbors(arr, tol2));
    }

    let cell_of = |row: &[F]| -> Result<Vec<i64>, MeshCacheError> {
        row.iter()
            .zip(lo)
            .map(|(&x, &min)| {
                ((x - min) / cell).floor().to_i64().ok_or_else(|| {
                    MeshCacheError::Shape(format!("coordinate {x:?} cannot be binned"))
                })
            })
            .collect()
    };

    let mut grid: HashMap<Vec<i64>, Vec<usize>> = HashMap::new();
    let mut cells = Vec::with_capacity(n);
    for (i, row) in arr.rows().enumerate() {
        let c = cell_of(row)?;
        grid.entry(c.clone()).or_default().push(i);
        cells.push(c);
    }

    let offsets: Vec<Vec<i64>> = (0..d).map(|_| -1i64..=1).multi_cartesian_product().collect();
    let mut out = Vec::with_capacity(n);
    let mut key = vec![0i64; d];
    for (i, row) in arr.rows().enumerate() {
        let mut found = Vec::new();
        for off in &offsets {
            for ((k, &c), &o) in key.iter_mut().zip(&cells[i]).zip(off) {
                *k = c + o;
            }
            let Some(members) = grid.get(&key) else {
                continue;
            };
            for &j in members {
                let other = arr.row(j).unwrap_or(&[]);
                if dist2(row, other) <= tol2 {
                    found.push(j);
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        out.push(found);
    }
    Ok(out)
}

/// Like [`unique_rows`], for floats: rows within `tolerance` of each other
/// collapse onto the smallest index among them.
///
/// `tolerance` defaults to [`TOLERANCE`].
pub fn close_rows<F: Element + Float>(
    arr: &NdArray<F>,
    tolerance: Option<F>,
) -> Result<Unique2dFloats<F>, MeshCacheError> {
    require_2d(arr, "close_rows")?;
    let tolerance = match tolerance {
        Some(t) => t,
        None => <F as NumCast>::from(TOLERANCE).unwrap_or_else(F::epsilon),
    };
    if tolerance.is_nan() {
        return Err(MeshCacheError::Shape("close_rows tolerance is NaN".into()));
    }
    let neighbors = radius_neighbors(arr, tolerance)?;

    // representative of each row: smallest neighbour (itself at worst)
    let o_inverse: Vec<usize> = neighbors
        .iter()
        .enumerate()
        .map(|(i, n)| n.first().copied().unwrap_or(i))
        .collect();
    let reps: Vec<usize> = o_inverse.iter().copied().sorted_unstable().dedup().collect();

    let mut ids = vec![usize::MAX; reps.len()];
    let mut inverse = Vec::with_capacity(o_inverse.len());
    for (pos, r) in o_inverse.iter().enumerate() {
        let k = reps.binary_search(r).unwrap_or_default();
        if ids[k] == usize::MAX {
            ids[k] = pos;
        }
        inverse.push(k);
    }
    let values = arr.take_rows(&ids)?;
    Ok(Unique2dFloats {
        values,
        ids,
        inverse,
        intersection: neighbors,
    })
}

/// Per-column `[min, max]` as a `(2, d)` array.
pub fn bounds<T: Element>(arr: &NdArray<T>) -> Result<NdArray<T>, MeshCacheError> {
    require_2d(arr, "bounds")?;
    let mut rows = arr.rows();
    let first = rows
        .next()
        .ok_or_else(|| MeshCacheError::Shape("bounds of an empty array".into()))?;
    let mut lo = first.to_vec();
    let mut hi = first.to_vec();
    for row in rows {
        for ((l, h), &x) in lo.iter_mut().zip(hi.iter_mut()).zip(row) {
            if x < *l {
                *l = x;
            }
            if x > *h {
                *h = x;
            }
        }
    }
    let d = lo.len();
    lo.extend(hi);
    NdArray::new(lo, vec![2, d])
}

/// `bounds[1] - bounds[0]`.
pub fn bounds_diagonal<T: Element>(arr: &NdArray<T>) -> Result<Vec<T>, MeshCacheError> {
    let b = bounds(arr)?;
    let (lo, hi) = b.as_slice().split_at(b.row_len());
    Ok(hi.iter().zip(lo).map(|(&h, &l)| h - l).collect())
}

/// Euclidean norm of the bounds diagonal.
pub fn bounds_norm<F: Element + Float>(arr: &NdArray<F>) -> Result<F, MeshCacheError> {
    Ok(bounds_diagonal(arr)?
        .into_iter()
        .fold(F::zero(), |acc, x| acc + x * x)
        .sqrt())
}

/// Centre of the bounds.
pub fn bounds_mean<F: Element + Float>(arr: &NdArray<F>) -> Result<Vec<F>, MeshCacheError> {
    let b = bounds(arr)?;
    let (lo, hi) = b.as_slice().split_at(b.row_len());
    let two = F::one() + F::one();
    Ok(lo.iter().zip(hi).map(|(&l, &h)| (l + h) / two).collect())
}

/// Indices of rows inside per-column ranges `(greater_than, less_than)`.
///
/// `None` skips a column. A range with `less_than <= greater_than` selects the
/// outside instead: `x > greater_than || x < less_than`. Selected rows satisfy
/// every given range.
pub fn select_with_ranges<T: Element>(
    arr: &NdArray<T>,
    ranges: &[Option<(T, T)>],
) -> Result<Vec<usize>, MeshCacheError> {
    require_2d(arr, "select_with_ranges")?;
    if ranges.len() > arr.row_len() {
        return Err(MeshCacheError::Shape(format!(
            "{} ranges given for {} columns",
            ranges.len(),
            arr.row_len()
        )));
    }
    if ranges.iter().all(Option::is_none) {
        return Err(MeshCacheError::Shape("at least one range is required".into()));
    }
    let inside = |row: &[T]| {
        ranges.iter().enumerate().all(|(i, r)| match *r {
            None => true,
            Some((lower, upper)) => {
                let (gt, lt) = (row[i] > lower, row[i] < upper);
                if upper > lower { gt && lt } else { gt || lt }
            }
        })
    };
    Ok(arr
        .rows()
        .enumerate()
        .filter(|(_, row)| inside(row))
        .map(|(i, _)| i)
        .collect())
}

fn to_radians(angle: f64, degree: bool) -> f64 {
    if degree { angle.to_radians() } else { angle }
}

/// Rotation matrix from a 2D angle (`[theta]`, about the virtual z-axis) or a
/// 3D rotation vector (`[x, y, z]`).
pub fn rotation_matrix(rotation: &[f64], degree: bool) -> Result<NdArray<f64>, MeshCacheError> {
    match *rotation {
        [theta] => {
            let t = to_radians(theta, degree);
            let (s, c) = t.sin_cos();
            NdArray::new(vec![c, -s, s, c], vec![2, 2])
        }
        [x, y, z] => {
            let v = [to_radians(x, degree), to_radians(y, degree), to_radians(z, degree)];
            let theta = v.iter().map(|a| a * a).sum::<f64>().sqrt();
            if theta == 0.0 {
                return NdArray::new(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0], vec![3, 3]);
            }
            rodrigues([v[0] / theta, v[1] / theta, v[2] / theta], theta)
        }
        _ => Err(MeshCacheError::Shape(format!(
            "rotation needs 1 (2D) or 3 (3D) entries, got {}",
            rotation.len()
        ))),
    }
}

/// `I + sin(t) K + (1 - cos(t)) K^2` for unit axis `k`.
fn rodrigues(k: [f64; 3], theta: f64) -> Result<NdArray<f64>, MeshCacheError> {
    let km = [
        [0.0, -k[2], k[1]],
        [k[2], 0.0, -k[0]],
        [-k[1], k[0], 0.0],
    ];
    let (s, c) = theta.sin_cos();
    let mut out = Vec::with_capacity(9);
    for i in 0..3 {
        for j in 0..3 {
            let k2: f64 = (0..3).map(|m| km[i][m] * km[m][j]).sum();
            let eye = if i == j { 1.0 } else { 0.0 };
            out.push(eye + s * km[i][j] + (1.0 - c) * k2);
        }
    }
    NdArray::new(out, vec![3, 3])
}

/// Rows times matrix, `arr @ m`.
fn matmul_rows(arr: &NdArray<f64>, m: &NdArray<f64>) -> Result<NdArray<f64>, MeshCacheError> {
    let d = arr.row_len();
    if m.shape() != [d, d] {
        return Err(MeshCacheError::Shape(format!(
            "cannot multiply rows of width {d} with {:?}",
            m.shape()
        )));
    }
    let m = m.as_slice();
    let mut out = Vec::with_capacity(arr.as_slice().len());
    for row in arr.rows() {
        for j in 0..d {
            out.push((0..d).map(|k| row[k] * m[k * d + j]).sum());
        }
    }
    NdArray::new(out, arr.shape().to_vec())
}

/// Rotate `(n, 2)` or `(n, 3)` points, optionally about `rotation_axis`.
pub fn rotate(
    arr: &NdArray<f64>,
    rotation: &[f64],
    rotation_axis: Option<&[f64]>,
    degree: bool,
) -> Result<NdArray<f64>, MeshCacheError> {
    require_2d(arr, "rotate")?;
    let r = rotation_matrix(rotation, degree)?;
    let Some(center) = rotation_axis else {
        return matmul_rows(arr, &r);
    };
    let d = arr.row_len();
    if center.len() != d {
        return Err(MeshCacheError::Shape(format!(
            "rotation axis has {} entries for {d}D points",
            center.len()
        )));
    }
    let shifted: Vec<f64> = arr
        .rows()
        .flat_map(|row| row.iter().zip(center).map(|(x, c)| x - c))
        .collect();
    let rotated = matmul_rows(&NdArray::new(shifted, arr.shape().to_vec())?, &r)?;
    let back: Vec<f64> = rotated
        .rows()
        .flat_map(|row| row.iter().zip(center).map(|(x, c)| x + c))
        .collect();
    NdArray::new(back, arr.shape().to_vec())
}

/// Rotation by `rotation` about `axis` (3D), or about the virtual z-axis when
/// `axis` is `None` (2D).
pub fn rotation_matrix_around_axis(
    axis: Option<&[f64]>,
    rotation: f64,
    degree: bool,
) -> Result<NdArray<f64>, MeshCacheError> {
    let theta = to_radians(rotation, degree);
    let Some(axis) = axis else {
        let (s, c) = theta.sin_cos();
        return NdArray::new(vec![c, -s, s, c], vec![2, 2]);
    };
    let [x, y, z] = *axis else {
        return Err(MeshCacheError::Shape("Axis dimension must be 3D".into()));
    };
    let norm = (x * x + y * y + z * z).sqrt();
    if norm == 0.0 {
        return Err(MeshCacheError::Shape("rotation axis must be non-zero".into()));
    }
    rodrigues([x / norm, y / norm, z / norm], theta)
}

/// Does `shape` match `expected`? Negative entries match any extent.
///
/// With `strict`, a mismatch is an error instead of `false`.
pub fn is_shape(shape: &[usize], expected: &[isize], strict: bool) -> Result<bool, MeshCacheError> {
    if shape.len() != expected.len() {
        if strict {
            return Err(MeshCacheError::Shape(format!(
                "array should be {}D",
                expected.len()
            )));
        }
        return Ok(false);
    }
    for (i, (&a, &s)) in shape.iter().zip(expected).enumerate() {
        if s < 0 {
            continue;
        }
        if a as isize != s {
            if strict {
                return Err(MeshCacheError::Shape(format!(
                    "array should have {s} shape in {i}-D"
                )));
            }
            return Ok(false);
        }
    }
    Ok(true)
}

/// [`is_shape`] against several acceptable shapes.
pub fn is_one_of_shapes(
    shape: &[usize],
    shapes: &[&[isize]],
    strict: bool,
) -> Result<bool, MeshCacheError> {
    let matches = shapes
        .iter()
        .any(|s| is_shape(shape, s, false).unwrap_or(false));
    if !matches && strict {
        return Err(MeshCacheError::Shape(format!(
            "array's shape {shape:?} is not one of {shapes:?}"
        )));
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-12)
    }

    #[test]
    fn unique_rows_basic() {
        let a = NdArray::from_rows(&[[3, 4], [1, 2], [3, 4], [1, 2], [0, 9]]).unwrap();
        let u = unique_rows(&a).unwrap();
        assert_eq!(u.values.to_rows(), vec![vec![0, 9], vec![1, 2], vec![3, 4]]);
        assert_eq!(u.ids, vec![4, 1, 0]);
        assert_eq!(u.inverse, vec![2, 1, 2, 1, 0]);
        assert_eq!(u.counts, vec![1, 2, 2]);
        assert_eq!(u.values.take_rows(&u.inverse).unwrap(), a);
    }

    #[test]
    fn unique_rows_needs_2d() {
        let a = NdArray::new(vec![1, 2, 3], vec![3]).unwrap();
        assert!(matches!(unique_rows(&a), Err(MeshCacheError::Shape(_))));
    }

    #[test]
    fn close_rows_collapses_within_tolerance() {
        let a = NdArray::from_rows(&[[0.0, 0.0], [5.0, 5.0], [0.05, 0.0]]).unwrap();
        let u = close_rows(&a, Some(0.1)).unwrap();
        assert_eq!(u.intersection, vec![vec![0, 2], vec![1], vec![0, 2]]);
        assert_eq!(u.ids, vec![0, 1]);
        assert_eq!(u.inverse, vec![0, 1, 0]);
        assert_eq!(u.values.to_rows(), vec![vec![0.0, 0.0], vec![5.0, 5.0]]);
    }

    #[test]
    fn close_rows_zero_tolerance_groups_identical() {
        let a = NdArray::from_rows(&[[1.0, 2.0], [1.0, 2.0], [-0.0, 0.0], [0.0, 0.0]]).unwrap();
        let u = close_rows(&a, Some(0.0)).unwrap();
        assert_eq!(u.inverse, vec![0, 0, 1, 1]);
        assert_eq!(u.ids, vec![0, 2]);
    }

    #[test]
    fn close_rows_handles_large_coordinates() {
        // 1e9 / 1e-10 does not fit an i64 cell index
        let a = NdArray::from_rows(&[[1e9, 0.0], [1e9, 0.0], [2e9, 0.0]]).unwrap();
        let u = close_rows(&a, None).unwrap();
        assert_eq!(u.ids, vec![0, 2]);
        assert_eq!(u.inverse, vec![0, 0, 1]);

        let far = NdArray::from_rows(&[[-1e300, 1.0], [1e300, 1.0], [1e300, 1.0]]).unwrap();
        assert_eq!(close_rows(&far, Some(1.0)).unwrap().inverse, vec![0, 1, 1]);

        // extent overflows to infinity
        let wide = NdArray::from_rows(&[[-1e308, 0.0], [1e308, 0.0], [-1e308, 0.0]]).unwrap();
        assert_eq!(close_rows(&wide, Some(1.0)).unwrap().inverse, vec![0, 1, 0]);
    }

    #[test]
    fn close_rows_long_rows_use_pairwise_scan() {
        let d = 20;
        let mut data = vec![0.0; 3 * d];
        data[d] = 0.05;
        data[2 * d + 7] = 3.0;
        let a = NdArray::new(data, vec![3, d]).unwrap();
        let u = close_rows(&a, Some(0.1)).unwrap();
        assert_eq!(u.intersection, vec![vec![0, 1], vec![0, 1], vec![2]]);
        assert_eq!(u.ids, vec![0, 2]);
        assert_eq!(u.inverse, vec![0, 0, 1]);
    }

    #[test]
    fn close_rows_rejects_non_finite() {
        let a = NdArray::from_rows(&[[0.0, f64::NAN]]).unwrap();
        assert!(matches!(close_rows(&a, Some(0.1)), Err(MeshCacheError::Shape(_))));
        let b = NdArray::from_rows(&[[0.0, 1.0]]).unwrap();
        assert!(close_rows(&b, Some(f64::NAN)).is_err());
        let empty = NdArray::<f64>::new(vec![], vec![0, 3]).unwrap();
        assert!(close_rows(&empty, None).unwrap().ids.is_empty());
    }

    #[test]
    fn bounds_family() {
        let a = NdArray::from_rows(&[[0.0, 1.0, -2.0], [3.0, -1.0, 2.0]]).unwrap();
        assert_eq!(
            bounds(&a).unwrap().to_rows(),
            vec![vec![0.0, -1.0, -2.0], vec![3.0, 1.0, 2.0]]
        );
        assert_eq!(bounds_diagonal(&a).unwrap(), vec![3.0, 2.0, 4.0]);
        assert!((bounds_norm(&a).unwrap() - 29f64.sqrt()).abs() < 1e-12);
        assert_eq!(bounds_mean(&a).unwrap(), vec![1.5, 0.0, 0.0]);
        let empty = NdArray::<f64>::new(Vec::new(), vec![0, 3]).unwrap();
        assert!(bounds(&empty).is_err());
    }

    #[test]
    fn select_with_ranges_inside_and_wrapped() {
        let a = NdArray::from_rows(&[[0.0, 0.0], [1.0, 5.0], [2.0, 10.0], [3.0, 1.0]]).unwrap();
        assert_eq!(
            select_with_ranges(&a, &[Some((0.5, 2.5)), None]).unwrap(),
            vec![1, 2]
        );
        assert_eq!(
            select_with_ranges(&a, &[Some((0.5, 2.5)), Some((4.0, 6.0))]).unwrap(),
            vec![1]
        );
        // upper < lower selects the outside
        assert_eq!(
            select_with_ranges(&a, &[Some((2.5, 0.5))]).unwrap(),
            vec![0, 3]
        );
        assert!(select_with_ranges(&a, &[None, None]).is_err());
    }

    #[test]
    fn rotation_2d_and_3d() {
        let r = rotation_matrix(&[90.0], true).unwrap();
        assert!(close(r.as_slice(), &[0.0, -1.0, 1.0, 0.0]));
        let r = rotation_matrix(&[0.0, 0.0, 90.0], true).unwrap();
        assert!(close(
            r.as_slice(),
            &[0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]
        ));
        assert!(rotation_matrix(&[1.0, 2.0], true).is_err());
    }

    #[test]
    fn rotate_about_center() {
        let a = NdArray::from_rows(&[[2.0, 1.0]]).unwrap();
        // arr @ R with R = [[0, -1], [1, 0]] maps (x, y) to (y, -x)
        let out = rotate(&a, &[90.0], Some(&[1.0, 1.0]), true).unwrap();
        assert!(close(out.as_slice(), &[1.0, 0.0]));
    }

    #[test]
    fn rotation_around_axis_matches_rotvec() {
        let a = rotation_matrix_around_axis(Some(&[0.0, 0.0, 2.0]), 30.0, true).unwrap();
        let b = rotation_matrix(&[0.0, 0.0, 30.0], true).unwrap();
        assert!(close(a.as_slice(), b.as_slice()));
        let r2 = rotation_matrix_around_axis(None, 90.0, true).unwrap();
        assert_eq!(r2.shape(), &[2, 2]);
        assert!(rotation_matrix_around_axis(Some(&[1.0, 0.0]), 1.0, true).is_err());
    }

    #[test]
    fn shape_checks() {
        assert!(is_shape(&[4, 3], &[-1, 3], false).unwrap());
        assert!(!is_shape(&[4, 2], &[-1, 3], false).unwrap());
        assert!(is_shape(&[4, 2], &[-1, 3], true).is_err());
        assert!(!is_shape(&[4], &[-1, 3], false).unwrap());
        assert!(is_one_of_shapes(&[4, 2], &[&[-1, 3], &[-1, 2]], true).unwrap());
        assert!(is_one_of_shapes(&[4, 1], &[&[-1, 3], &[-1, 2]], true).is_err());
    }
}
