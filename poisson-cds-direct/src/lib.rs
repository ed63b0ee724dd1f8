//! Direct solvers used as references for the iterative poisson-cds solvers.
//!
//! - `gauss_solve` runs Gaussian elimination on a dense copy of the system,
//!   taking pivots in order on the diagonal without any pivot search. This
//!   is enough for the diagonally dominant matrices produced by assembly.
//! - `thomas_solve` solves a tridiagonal system in linear time.
//! - `solve_cds` densifies a `CdsMat` and hands it to `gauss_solve`.
//!
//! A pivot smaller than `PIVOT_TOL` in magnitude aborts the solve with
//! `DirectError::SingularPivot`.
//!
//! # Example
//!
//! ```rust
//! use ndarray::{arr1, arr2};
//! use poisson_cds_direct::gauss_solve;
//!
//! let a = arr2(&[[4., -1.], [-1., 4.]]);
//! let b = arr1(&[3., 3.]);
//! let x = gauss_solve(a.view(), b.view()).unwrap();
//! assert!((x[0] - 1.).abs() < 1e-12 && (x[1] - 1.).abs() < 1e-12);
//! ```
use ndarray::{s, Array1, ArrayView1, ArrayView2};
use poisson_cds::CdsMat;
use tracing::debug;

/// Pivots below this magnitude are treated as zero.
pub const PIVOT_TOL: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DirectError {
    #[error("singular pivot {pivot:e} at row {row}")]
    SingularPivot { row: usize, pivot: f64 },
    #[error("dimension mismatch: expected {expected}, got {found}")]
    IncompatibleDimensions { expected: usize, found: usize },
}

fn check_dim(expected: usize, found: usize) -> Result<(), DirectError> {
    if expected == found {
        Ok(())
    } else {
        Err(DirectError::IncompatibleDimensions { expected, found })
    }
}

fn check_pivot(row: usize, pivot: f64) -> Result<(), DirectError> {
    if pivot.abs() < PIVOT_TOL {
        Err(DirectError::SingularPivot { row, pivot })
    } else {
        Ok(())
    }
}

/// Solve `a x = b` by Gaussian elimination followed by back substitution.
///
/// The inputs are not modified, elimination works on owned copies.
pub fn gauss_solve(
    a: ArrayView2<f64>,
    b: ArrayView1<f64>,
) -> Result<Array1<f64>, DirectError> {
    let (rows, cols) = a.dim();
    check_dim(rows, cols)?;
    check_dim(rows, b.len())?;
    let n = rows;
    let mut a = a.to_owned();
    let mut b = b.to_owned();

    for k in 0..n {
        let pivot = a[[k, k]];
        check_pivot(k, pivot)?;
        let pivot_row = a.slice(s![k, k..]).to_owned();
        for i in k + 1..n {
            let factor = a[[i, k]] / pivot;
            if factor == 0. {
                continue;
            }
            a.slice_mut(s![i, k..])
                .scaled_add(-factor, &pivot_row);
            b[i] -= factor * b[k];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let tail = a.slice(s![i, i + 1..]).dot(&x.slice(s![i + 1..]));
        x[i] = (b[i] - tail) / a[[i, i]];
    }
    debug!(size = n, "dense gaussian elimination done");
    Ok(x)
}

/// Solve a tridiagonal system with the Thomas algorithm.
///
/// `lower[i]` is `A[i + 1, i]` and `upper[i]` is `A[i, i + 1]`, both of
/// length `diag.len() - 1`.
pub fn thomas_solve(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[f64],
) -> Result<Vec<f64>, DirectError> {
    let n = diag.len();
    check_dim(n, rhs.len())?;
    check_dim(n.saturating_sub(1), lower.len())?;
    check_dim(n.saturating_sub(1), upper.len())?;
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut c = vec![0.; n];
    let mut d = vec![0.; n];
    check_pivot(0, diag[0])?;
    if n > 1 {
        c[0] = upper[0] / diag[0];
    }
    d[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = diag[i] - lower[i - 1] * c[i - 1];
        check_pivot(i, denom)?;
        if i + 1 < n {
            c[i] = upper[i] / denom;
        }
        d[i] = (rhs[i] - lower[i - 1] * d[i - 1]) / denom;
    }

    let mut x = d;
    for i in (0..n - 1).rev() {
        x[i] -= c[i] * x[i + 1];
    }
    Ok(x)
}

/// Solve `a x = b` for a compressed diagonal matrix through its dense copy.
pub fn solve_cds(
    a: &CdsMat<f64>,
    b: &[f64],
) -> Result<Vec<f64>, DirectError> {
    check_dim(a.size(), b.len())?;
    let dense = a.to_dense();
    let x = gauss_solve(dense.view(), ArrayView1::from(b))?;
    Ok(x.to_vec())
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, arr2};
    use poisson_cds::{assemble, Grid};

    #[test]
    fn gauss_3x3() {
        let a = arr2(&[[2., 1., -1.], [-3., -1., 2.], [-2., 1., 2.]]);
        let b = arr1(&[8., -11., -3.]);
        let x = gauss_solve(a.view(), b.view()).unwrap();
        assert_abs_diff_eq!(x[0], 2., epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 3., epsilon = 1e-12);
        assert_abs_diff_eq!(x[2], -1., epsilon = 1e-12);
    }

    #[test]
    fn gauss_inputs_untouched() {
        let a = arr2(&[[4., -1.], [-1., 4.]]);
        let b = arr1(&[3., 3.]);
        let a_copy = a.clone();
        gauss_solve(a.view(), b.view()).unwrap();
        assert_eq!(a, a_copy);
        assert_eq!(b, arr1(&[3., 3.]));
    }

    #[test]
    fn singular_pivot() {
        // no pivot search: a zero in the leading position fails
        let a = arr2(&[[0., 1.], [1., 0.]]);
        let b = arr1(&[1., 1.]);
        assert_eq!(
            gauss_solve(a.view(), b.view()),
            Err(DirectError::SingularPivot { row: 0, pivot: 0. })
        );
        let a = arr2(&[[1., 2.], [2., 4.]]);
        match gauss_solve(a.view(), b.view()) {
            Err(DirectError::SingularPivot { row, .. }) => assert_eq!(row, 1),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn gauss_bad_shapes() {
        let a = arr2(&[[1., 2., 3.], [2., 4., 5.]]);
        let b = arr1(&[1., 1.]);
        assert_eq!(
            gauss_solve(a.view(), b.view()),
            Err(DirectError::IncompatibleDimensions {
                expected: 2,
                found: 3
            })
        );
        let a = arr2(&[[1., 0.], [0., 1.]]);
        let b = arr1(&[1., 1., 1.]);
        assert!(gauss_solve(a.view(), b.view()).is_err());
    }

    #[test]
    fn thomas_matches_gauss() {
        let n = 7;
        let lower: Vec<f64> =
            (0..n - 1).map(|i| -1. - 0.1 * i as f64).collect();
        let upper: Vec<f64> =
            (0..n - 1).map(|i| -0.5 + 0.05 * i as f64).collect();
        let diag = vec![4.; n];
        let rhs: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
        let x = thomas_solve(&lower, &diag, &upper, &rhs).unwrap();

        let mut dense = ndarray::Array2::zeros((n, n));
        for i in 0..n {
            dense[[i, i]] = diag[i];
            if i + 1 < n {
                dense[[i, i + 1]] = upper[i];
                dense[[i + 1, i]] = lower[i];
            }
        }
        let expected =
            gauss_solve(dense.view(), ArrayView1::from(&rhs[..])).unwrap();
        for (u, v) in x.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(u, v, epsilon = 1e-12);
        }
    }

    #[test]
    fn thomas_edge_cases() {
        let empty = thomas_solve(&[], &[], &[], &[]).unwrap();
        assert_eq!(empty, Vec::<f64>::new());
        assert_eq!(thomas_solve(&[], &[2.], &[], &[3.]).unwrap(), vec![1.5]);
        assert!(matches!(
            thomas_solve(&[1.], &[1., 1.], &[1.], &[1., 1.]),
            Err(DirectError::SingularPivot { row: 1, .. })
        ));
        assert!(matches!(
            thomas_solve(&[1., 1.], &[1., 1.], &[1.], &[1., 1.]),
            Err(DirectError::IncompatibleDimensions { .. })
        ));
    }

    #[test]
    fn cds_harmonic() {
        let grid = Grid::unit_square(4, 3).unwrap();
        let (a, b) = assemble(&grid, |_, _| 0., |x, y| x + y).unwrap();
        let x = solve_cds(&a, &b).unwrap();
        for j in 0..grid.ny() {
            for i in 0..grid.nx() {
                let (px, py) = grid.point(i, j);
                assert_abs_diff_eq!(
                    x[grid.index(i, j)],
                    px + py,
                    epsilon = 1e-10
                );
            }
        }
        assert!(solve_cds(&a, &b[1..]).is_err());
    }
}
