//! Some matrices and systems used in tests

use crate::assemble;
use crate::grid::Grid;
use crate::sparse::CdsMat;

/// Graph laplacian of a 3x3 grid with a shifted diagonal: 4 on the
/// diagonal, -1 for each in-row or in-column neighbor.
pub fn tridiag_block() -> CdsMat<f64> {
    let mut mat = CdsMat::zeros(9, 3);
    for row in 0..9 {
        mat.set(row, row, 4.).unwrap();
        if row % 3 != 2 {
            mat.set(row, row + 1, -1.).unwrap();
            mat.set(row + 1, row, -1.).unwrap();
        }
        if row + 3 < 9 {
            mat.set(row, row + 3, -1.).unwrap();
            mat.set(row + 3, row, -1.).unwrap();
        }
    }
    mat
}

/// Poisson system on the unit square with harmonic boundary data
/// `g(x, y) = x + y` and no source, whose exact solution is `x + y`.
pub fn harmonic_system(nx: usize, ny: usize) -> (Grid, CdsMat<f64>, Vec<f64>) {
    let grid = Grid::unit_square(nx, ny).unwrap();
    let (mat, rhs) =
        assemble::assemble(&grid, |_, _| 0., |x, y| x + y).unwrap();
    (grid, mat, rhs)
}

/// Poisson system with a smooth source, `u = sin(pi x) sin(pi y)`.
pub fn sine_system(nx: usize, ny: usize) -> (Grid, CdsMat<f64>, Vec<f64>) {
    use std::f64::consts::PI;
    let grid = Grid::unit_square(nx, ny).unwrap();
    let (mat, rhs) = assemble::assemble(
        &grid,
        |x, y| 2. * PI * PI * (PI * x).sin() * (PI * y).sin(),
        |x, y| (PI * x).sin() * (PI * y).sin(),
    )
    .unwrap();
    (grid, mat, rhs)
}
