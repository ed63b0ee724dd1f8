//! Interior grid of the unit square.
//!
//! Unknowns live on the interior points only: point `(i, j)` with
//! `0 <= i < nx` and `0 <= j < ny` sits at
//! `((i + 1) * step_x, (j + 1) * step_y)` and is stored at linear index
//! `j * nx + i`. Boundary values never become unknowns, they are folded into
//! the right hand side during assembly.

use crate::errors::StructureError;

#[cfg(feature = "serde")]
use crate::serde_traits::GridShadow;

/// Dimensions and discretization steps of an interior grid.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GridShadow"))]
pub struct Grid {
    nx: usize,
    ny: usize,
    step_x: f64,
    step_y: f64,
}

/// Checkerboard color of a grid point, given by the parity of `i + j`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Color of grid point `(i, j)`.
    #[inline(always)]
    pub fn of(i: usize, j: usize) -> Self {
        if (i + j) % 2 == 0 {
            Color::Red
        } else {
            Color::Black
        }
    }
}

/// Split `0..size` into the red and black classes of a grid with rows of
/// `span` points, each in increasing order.
pub(crate) fn color_classes(
    size: usize,
    span: usize,
) -> (Vec<usize>, Vec<usize>) {
    (0..size).partition(|&idx| Color::of(idx % span, idx / span) == Color::Red)
}

impl Grid {
    /// Grid with arbitrary steps.
    pub fn new(
        nx: usize,
        ny: usize,
        step_x: f64,
        step_y: f64,
    ) -> Result<Self, StructureError> {
        if nx == 0 || ny == 0 {
            return Err(StructureError::InvalidGrid(
                "interior point counts must be positive",
            ));
        }
        let valid_step = |h: f64| h.is_finite() && h > 0.;
        if !valid_step(step_x) || !valid_step(step_y) {
            return Err(StructureError::InvalidGrid(
                "steps must be finite and strictly positive",
            ));
        }
        Ok(Self {
            nx,
            ny,
            step_x,
            step_y,
        })
    }

    /// Grid covering `[0, 1] x [0, 1]`, with steps `1 / (nx + 1)` and
    /// `1 / (ny + 1)`.
    pub fn unit_square(nx: usize, ny: usize) -> Result<Self, StructureError> {
        Self::new(nx, ny, 1. / (nx + 1) as f64, 1. / (ny + 1) as f64)
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn step_x(&self) -> f64 {
        self.step_x
    }

    pub fn step_y(&self) -> f64 {
        self.step_y
    }

    /// Number of unknowns, `nx * ny`.
    pub fn size(&self) -> usize {
        self.nx * self.ny
    }

    #[inline(always)]
    pub fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        j * self.nx + i
    }

    /// Inverse of `index`.
    #[inline(always)]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.nx, idx / self.nx)
    }

    /// Physical location of the interior point `(i, j)`.
    pub fn point(&self, i: usize, j: usize) -> (f64, f64) {
        ((i + 1) as f64 * self.step_x, (j + 1) as f64 * self.step_y)
    }

    /// Abscissae of the left and right boundaries.
    pub fn x_bounds(&self) -> (f64, f64) {
        (0., (self.nx + 1) as f64 * self.step_x)
    }

    /// Ordinates of the bottom and top boundaries.
    pub fn y_bounds(&self) -> (f64, f64) {
        (0., (self.ny + 1) as f64 * self.step_y)
    }

    pub fn color(&self, idx: usize) -> Color {
        let (i, j) = self.coords(idx);
        Color::of(i, j)
    }

    /// Linear indices of one color class, in increasing order.
    pub fn color_indices(&self, color: Color) -> Vec<usize> {
        let (red, black) = color_classes(self.size(), self.nx);
        match color {
            Color::Red => red,
            Color::Black => black,
        }
    }
}
