//! Test problem, error metric and memory estimates.
use std::f64::consts::PI;

use poisson_cds::{CdsMat, Grid};

const BYTES_PER_MIB: f64 = 1024. * 1024.;

/// Exact solution of the test problem, `sin(pi x) sin(pi y)`.
pub fn exact(x: f64, y: f64) -> f64 {
    (PI * x).sin() * (PI * y).sin()
}

/// Source term matching `exact`: `-Δu = 2 pi² u`.
pub fn source(x: f64, y: f64) -> f64 {
    2. * PI * PI * exact(x, y)
}

/// Largest pointwise deviation from `exact` over the interior points.
pub fn linf_error<E>(grid: &Grid, solution: &[f64], exact: E) -> f64
where
    E: Fn(f64, f64) -> f64,
{
    let mut max_err = 0f64;
    for j in 0..grid.ny() {
        for i in 0..grid.nx() {
            let (x, y) = grid.point(i, j);
            let err = (solution[grid.index(i, j)] - exact(x, y)).abs();
            max_err = max_err.max(err);
        }
    }
    max_err
}

/// Memory of a dense `size x size` matrix of doubles, in MiB.
pub fn dense_memory_mb(size: usize) -> f64 {
    (size * size * std::mem::size_of::<f64>()) as f64 / BYTES_PER_MIB
}

/// Memory of the stored diagonals, in MiB.
pub fn cds_memory_mb(mat: &CdsMat<f64>) -> f64 {
    mat.storage_bytes() as f64 / BYTES_PER_MIB
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exact_vanishes_on_boundary() {
        for t in [0., 0.3, 0.5, 1.] {
            assert_abs_diff_eq!(exact(0., t), 0., epsilon = 1e-15);
            assert_abs_diff_eq!(exact(1., t), 0., epsilon = 1e-15);
            assert_abs_diff_eq!(exact(t, 0.), 0., epsilon = 1e-15);
            assert_abs_diff_eq!(exact(t, 1.), 0., epsilon = 1e-15);
        }
        assert_abs_diff_eq!(exact(0.5, 0.5), 1., epsilon = 1e-15);
    }

    #[test]
    fn linf_picks_worst_point() {
        let grid = Grid::unit_square(2, 2).unwrap();
        let mut sol = vec![0.; 4];
        sol[3] = 0.5;
        let err = linf_error(&grid, &sol, |_, _| 0.);
        assert_eq!(err, 0.5);
        let err = linf_error(&grid, &sol, |_, _| 1.);
        assert_eq!(err, 1.);
    }

    #[test]
    fn memory_estimates() {
        assert_abs_diff_eq!(dense_memory_mb(1024), 8., epsilon = 1e-12);
        // 10x10 grid: 100 + 2 * 99 + 2 * 90 stored slots
        let grid = Grid::unit_square(10, 10).unwrap();
        let mat = CdsMat::<f64>::for_grid(&grid);
        let expected = (100 + 2 * 99 + 2 * 90) as f64 * 8. / BYTES_PER_MIB;
        assert_abs_diff_eq!(cds_memory_mb(&mat), expected, epsilon = 1e-15);
    }
}
