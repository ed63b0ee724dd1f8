//! Assembly of the five-point discretization of `-Δu = f` with Dirichlet
//! boundary conditions `u = g`.
//!
//! Interior point `(i, j)` couples to its left and right neighbors with
//! weight `-1 / step_x²`, to its bottom and top neighbors with weight
//! `-1 / step_y²`, and to itself with `2 (1 / step_x² + 1 / step_y²)`.
//! Links towards the boundary are dropped from the matrix, the known boundary
//! value moving to the right hand side instead.
use smallvec::SmallVec;
use tracing::debug;

use crate::errors::StructureError;
use crate::grid::Grid;
use crate::sparse::CdsMat;

/// Stencil entries of interior point `(i, j)` as `(col, value)`, in
/// increasing column order.
fn grid_neighbors4(
    grid: &Grid,
    i: usize,
    j: usize,
) -> SmallVec<[(usize, f64); 5]> {
    let (nx, ny) = (grid.nx(), grid.ny());
    let inv_x2 = 1. / (grid.step_x() * grid.step_x());
    let inv_y2 = 1. / (grid.step_y() * grid.step_y());
    let bottom_row = j == 0;
    let top_row = j + 1 == ny;
    let left_col = i == 0;
    let right_col = i + 1 == nx;

    let mut res = SmallVec::new();
    if !bottom_row {
        res.push((grid.index(i, j - 1), -inv_y2));
    }
    if !left_col {
        res.push((grid.index(i - 1, j), -inv_x2));
    }
    res.push((grid.index(i, j), 2. * (inv_x2 + inv_y2)));
    if !right_col {
        res.push((grid.index(i + 1, j), -inv_x2));
    }
    if !top_row {
        res.push((grid.index(i, j + 1), -inv_y2));
    }
    res
}

/// Build the discrete laplacian of `grid`.
///
/// Every entry goes through [`CdsMat::set`], so a stencil entry falling
/// outside the stored diagonals aborts the assembly.
pub fn build_matrix(grid: &Grid) -> Result<CdsMat<f64>, StructureError> {
    let mut mat = CdsMat::for_grid(grid);
    for j in 0..grid.ny() {
        for i in 0..grid.nx() {
            let row = grid.index(i, j);
            for (col, val) in grid_neighbors4(grid, i, j) {
                mat.set(row, col, val)?;
            }
        }
    }
    debug!(
        nx = grid.nx(),
        ny = grid.ny(),
        stored = mat.nnz_stored(),
        "assembled five-point laplacian"
    );
    Ok(mat)
}

/// Build the right hand side: the source `f` at every interior point, plus
/// the Dirichlet data `g` of each boundary the point is adjacent to, scaled
/// by the inverse squared step across that boundary.
///
/// Corner points pick up one contribution per axis.
pub fn build_rhs<F, G>(grid: &Grid, f: F, g: G) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64,
    G: Fn(f64, f64) -> f64,
{
    let (nx, ny) = (grid.nx(), grid.ny());
    let inv_x2 = 1. / (grid.step_x() * grid.step_x());
    let inv_y2 = 1. / (grid.step_y() * grid.step_y());
    let (left, right) = grid.x_bounds();
    let (bottom, top) = grid.y_bounds();

    let mut rhs = Vec::with_capacity(grid.size());
    for j in 0..ny {
        for i in 0..nx {
            let (x, y) = grid.point(i, j);
            let mut val = f(x, y);
            if i == 0 {
                val += inv_x2 * g(left, y);
            }
            if i + 1 == nx {
                val += inv_x2 * g(right, y);
            }
            if j == 0 {
                val += inv_y2 * g(x, bottom);
            }
            if j + 1 == ny {
                val += inv_y2 * g(x, top);
            }
            rhs.push(val);
        }
    }
    rhs
}

/// Build the linear system `(A, b)` of the Poisson problem on `grid`.
pub fn assemble<F, G>(
    grid: &Grid,
    f: F,
    g: G,
) -> Result<(CdsMat<f64>, Vec<f64>), StructureError>
where
    F: Fn(f64, f64) -> f64,
    G: Fn(f64, f64) -> f64,
{
    let mat = build_matrix(grid)?;
    let rhs = build_rhs(grid, f, g);
    Ok((mat, rhs))
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn laplacian_3x3() {
        let grid = Grid::unit_square(3, 3).unwrap();
        let mat = build_matrix(&grid).unwrap();
        assert_eq!(mat.size(), 9);
        assert_eq!(mat.span(), 3);
        for row in 0..9 {
            assert_eq!(mat.get(row, row), 64.);
        }
        assert_eq!(mat.get(0, 1), -16.);
        assert_eq!(mat.get(1, 0), -16.);
        assert_eq!(mat.get(0, 3), -16.);
        assert_eq!(mat.get(3, 0), -16.);
        // no coupling across grid rows
        assert_eq!(mat.get(2, 3), 0.);
        assert_eq!(mat.get(3, 2), 0.);
        assert_eq!(mat.get(5, 6), 0.);
        assert!(mat.respects_grid_rows());
        // center point has 4 neighbors, corners 2, edges 3
        assert_eq!(mat.nnz(), 9 + 2 * 12);
        let dense = mat.to_dense();
        assert_eq!(dense, dense.t());
    }

    #[test]
    fn anisotropic_steps() {
        let grid = Grid::new(4, 2, 0.5, 0.25).unwrap();
        let mat = build_matrix(&grid).unwrap();
        assert_eq!(mat.get(0, 0), 2. * (4. + 16.));
        assert_eq!(mat.get(1, 2), -4.);
        assert_eq!(mat.get(1, 5), -16.);
        assert_eq!(mat.get(3, 4), 0.);
    }

    #[test]
    fn diagonally_dominant() {
        let grid = Grid::unit_square(5, 4).unwrap();
        let mat = build_matrix(&grid).unwrap();
        for row in 0..mat.size() {
            let off: f64 = mat
                .row(row)
                .iter()
                .filter(|&&(col, _)| col != row)
                .map(|&(_, v)| v.abs())
                .sum();
            assert!(mat.diag(row) >= off);
        }
    }

    #[test]
    fn single_row_grid() {
        let grid = Grid::unit_square(4, 1).unwrap();
        let mat = build_matrix(&grid).unwrap();
        assert_eq!(mat.size(), 4);
        assert_abs_diff_eq!(mat.get(1, 2), -25., epsilon = 1e-10);
        assert_eq!(mat.get(0, 4), 0.);
        let grid = Grid::unit_square(1, 4).unwrap();
        let mat = build_matrix(&grid).unwrap();
        assert_eq!(mat.span(), 1);
        assert_abs_diff_eq!(mat.get(1, 2), -25., epsilon = 1e-10);
        assert_abs_diff_eq!(mat.get(0, 0), 2. * (4. + 25.), epsilon = 1e-10);
    }

    #[test]
    fn rhs_boundary_folding() {
        let grid = Grid::unit_square(3, 3).unwrap();
        let rhs = build_rhs(&grid, |_, _| 1., |_, _| 1.);
        // corner: two boundary contributions
        assert_eq!(rhs[0], 1. + 16. + 16.);
        assert_eq!(rhs[8], 1. + 16. + 16.);
        // edge: one contribution
        assert_eq!(rhs[1], 1. + 16.);
        assert_eq!(rhs[3], 1. + 16.);
        // center: source only
        assert_eq!(rhs[4], 1.);
    }

    #[test]
    fn rhs_boundary_coordinates() {
        let grid = Grid::unit_square(3, 3).unwrap();
        // g is x on the left/right walls and 10 y on the bottom/top walls
        // to tell the contributions apart
        let rhs = build_rhs(&grid, |_, _| 0., |x, y| {
            if x == 0. || x == 1. {
                x
            } else {
                10. * y
            }
        });
        // (0, 0): left wall x = 0, bottom wall y = 0
        assert_abs_diff_eq!(rhs[0], 0.);
        // (2, 0): right wall x = 1, bottom wall y = 0
        assert_abs_diff_eq!(rhs[2], 16.);
        // (2, 2): right wall x = 1, top wall y = 1
        assert_abs_diff_eq!(rhs[8], 16. + 160.);
        // (1, 2): top wall only
        assert_abs_diff_eq!(rhs[7], 160.);
    }

    #[test]
    fn invalid_grid_is_rejected_before_assembly() {
        assert!(Grid::new(0, 3, 0.25, 0.25).is_err());
    }
}
