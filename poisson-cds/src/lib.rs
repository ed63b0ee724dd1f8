/*!
# poisson-cds

poisson-cds solves the five-point discretization of the 2D Poisson equation
`-Δu = f` on the unit square, with Dirichlet boundary data `u = g`.

It features a matrix type, `CdsMat`, storing only the five diagonals of the
stencil (compressed diagonal storage), an assembler building `CdsMat` and the
right hand side from `f` and `g`, and three iterative solvers: Jacobi,
Gauss-Seidel and checkerboard (red/black) Gauss-Seidel.

Unknowns are the interior grid points, stored at linear index `j * nx + i`.

## Examples

Assembly and solve

```rust
use poisson_cds::linalg::{solve, Method};
use poisson_cds::{assemble, Grid};

let grid = Grid::unit_square(3, 3).unwrap();
let (a, b) = assemble(&grid, |_, _| 0., |x, y| x + y).unwrap();
assert_eq!(a.size(), 9);
assert_eq!(a.get(0, 0), 64.);
assert_eq!(a.get(2, 3), 0.);

let sol = solve(Method::GaussSeidel, &a, &b, &[0.; 9], 1000, 1e-10).unwrap();
assert!(sol.converged());
```

Writing outside the stored diagonals

```rust
use poisson_cds::{CdsMat, StructureError};

let mut a = CdsMat::zeros(9, 3);
assert!(a.set(4, 7, -1.).is_ok());
assert!(matches!(
    a.set(0, 2, 1.),
    Err(StructureError::OutOfBandWrite { .. })
));
assert_eq!(a.get(0, 2), 0.);
```

## Features

- `multi_thread` (default): run the checkerboard phases on a rayon pool.
- `serde`: serialization of `CdsMat` and `Grid`.
- `approx`: approximate comparison of `CdsMat`.
*/

pub mod assemble;
pub mod errors;
pub mod grid;
pub mod sparse;

#[cfg(feature = "serde")]
mod serde_traits;

pub use crate::assemble::{assemble, build_matrix, build_rhs};
pub use crate::errors::{SolveError, StructureError};
pub use crate::grid::{Color, Grid};
pub use crate::sparse::linalg;
pub use crate::sparse::prod;
pub use crate::sparse::{CdsMat, Diagonal};

#[cfg(test)]
mod test_data;
