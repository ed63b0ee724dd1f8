//! Compressed diagonal storage for five-point stencil matrices.
//!
//! A `CdsMat` of order `size` stores exactly five diagonals, at offsets
//! `0`, `+1`, `-1`, `+span` and `-span` from the main diagonal. `span` is the
//! distance between vertically adjacent grid points, i.e. the number of
//! interior points in a grid row. Every other entry is an implicit zero.
//!
//! The diagonals are laid out as follows:
//!
//! ```text
//! main[row]          = A[row, row]
//! upper[row]         = A[row, row + 1]        (len size - 1)
//! lower[row - 1]     = A[row, row - 1]        (len size - 1)
//! far_upper[row]     = A[row, row + span]     (len size - span)
//! far_lower[row - s] = A[row, row - span]     (len size - span)
//! ```
//!
//! The storage itself does not know about grid rows: a coupling at offset
//! `+1` between the end of a grid row and the start of the next one is
//! storable. Assembly is responsible for never writing one, see
//! [`CdsMat::respects_grid_rows`].
//!
//! When `span == 1` the far diagonals coincide with the near ones. Near
//! diagonals take precedence and the far slots stay empty.

use ndarray::Array2;
use num_traits::{Num, Zero};
use smallvec::SmallVec;

use crate::errors::StructureError;
use crate::grid::Grid;

#[cfg(feature = "serde")]
use crate::serde_traits::CdsMatShadow;

/// Five-diagonal matrix in compressed diagonal storage.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "CdsMatShadow<N>",
        bound(deserialize = "N: serde::Deserialize<'de> + Copy + Zero")
    )
)]
pub struct CdsMat<N> {
    size: usize,
    span: usize,
    main: Vec<N>,
    upper: Vec<N>,
    lower: Vec<N>,
    far_upper: Vec<N>,
    far_lower: Vec<N>,
}

/// One of the five stored diagonals.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Diagonal {
    Main,
    Upper,
    Lower,
    FarUpper,
    FarLower,
}

impl<N: Copy + Zero> CdsMat<N> {
    /// Create a matrix of order `size` with all stored entries set to zero.
    ///
    /// # Panics
    ///
    /// If `span` is zero.
    pub fn zeros(size: usize, span: usize) -> Self {
        assert!(span > 0, "the far diagonal offset must be positive");
        let near = size.saturating_sub(1);
        let far = if span == 1 { 0 } else { size.saturating_sub(span) };
        Self {
            size,
            span,
            main: vec![N::zero(); size],
            upper: vec![N::zero(); near],
            lower: vec![N::zero(); near],
            far_upper: vec![N::zero(); far],
            far_lower: vec![N::zero(); far],
        }
    }

    /// Empty matrix with the sparsity pattern of the five-point stencil on
    /// `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        Self::zeros(grid.size(), grid.nx())
    }

    /// Build a matrix from its diagonals, checking their lengths.
    pub fn from_diagonals(
        size: usize,
        span: usize,
        main: Vec<N>,
        upper: Vec<N>,
        lower: Vec<N>,
        far_upper: Vec<N>,
        far_lower: Vec<N>,
    ) -> Result<Self, StructureError> {
        if span == 0 {
            return Err(StructureError::InvalidGrid(
                "the far diagonal offset must be positive",
            ));
        }
        let near = size.saturating_sub(1);
        let far = if span == 1 { 0 } else { size.saturating_sub(span) };
        let checks = [
            (Diagonal::Main, size, main.len()),
            (Diagonal::Upper, near, upper.len()),
            (Diagonal::Lower, near, lower.len()),
            (Diagonal::FarUpper, far, far_upper.len()),
            (Diagonal::FarLower, far, far_lower.len()),
        ];
        for (diagonal, expected, found) in checks {
            if expected != found {
                return Err(StructureError::BadDiagonalLength {
                    diagonal,
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            size,
            span,
            main,
            upper,
            lower,
            far_upper,
            far_lower,
        })
    }

    /// Order of the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Offset of the far diagonals.
    pub fn span(&self) -> usize {
        self.span
    }

    /// Locate the storage slot of `(row, col)`, if any.
    fn slot(&self, row: usize, col: usize) -> Option<(Diagonal, usize)> {
        if row >= self.size || col >= self.size {
            return None;
        }
        let span = self.span;
        if col == row {
            Some((Diagonal::Main, row))
        } else if col == row + 1 {
            Some((Diagonal::Upper, row))
        } else if col + 1 == row {
            Some((Diagonal::Lower, col))
        } else if span > 1 && col == row + span {
            Some((Diagonal::FarUpper, row))
        } else if span > 1 && col + span == row {
            Some((Diagonal::FarLower, col))
        } else {
            None
        }
    }

    fn diagonal_mut(&mut self, diagonal: Diagonal) -> &mut [N] {
        match diagonal {
            Diagonal::Main => &mut self.main,
            Diagonal::Upper => &mut self.upper,
            Diagonal::Lower => &mut self.lower,
            Diagonal::FarUpper => &mut self.far_upper,
            Diagonal::FarLower => &mut self.far_lower,
        }
    }

    /// Stored values of one diagonal.
    pub fn diagonal(&self, diagonal: Diagonal) -> &[N] {
        match diagonal {
            Diagonal::Main => &self.main,
            Diagonal::Upper => &self.upper,
            Diagonal::Lower => &self.lower,
            Diagonal::FarUpper => &self.far_upper,
            Diagonal::FarLower => &self.far_lower,
        }
    }

    /// Value at `(row, col)`. Anything outside the five diagonals, or outside
    /// the matrix, is zero.
    pub fn get(&self, row: usize, col: usize) -> N {
        match self.slot(row, col) {
            Some((diagonal, pos)) => self.diagonal(diagonal)[pos],
            None => N::zero(),
        }
    }

    /// Diagonal entry of `row`.
    ///
    /// # Panics
    ///
    /// If `row` is out of bounds.
    #[inline(always)]
    pub fn diag(&self, row: usize) -> N {
        self.main[row]
    }

    /// Number of storage slots, zero or not.
    pub fn nnz_stored(&self) -> usize {
        self.main.len()
            + self.upper.len()
            + self.lower.len()
            + self.far_upper.len()
            + self.far_lower.len()
    }

    /// Memory used by the stored values, in bytes.
    pub fn storage_bytes(&self) -> usize {
        self.nnz_stored() * std::mem::size_of::<N>()
    }

    /// Stored entries of a row as `(col, value)`, in increasing column
    /// order. Explicit zeros are included.
    pub fn row(&self, row: usize) -> SmallVec<[(usize, N); 5]> {
        let mut res = SmallVec::new();
        if row >= self.size {
            return res;
        }
        let span = self.span;
        let far = span > 1;
        if far && row >= span {
            res.push((row - span, self.far_lower[row - span]));
        }
        if row > 0 {
            res.push((row - 1, self.lower[row - 1]));
        }
        res.push((row, self.main[row]));
        if row + 1 < self.size {
            res.push((row + 1, self.upper[row]));
        }
        if far && row + span < self.size {
            res.push((row + span, self.far_upper[row]));
        }
        res
    }

    /// Iterate over the non-zero entries as `(row, col, value)`, in row-major
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, N)> + '_
    where
        N: PartialEq,
    {
        (0..self.size).flat_map(move |row| {
            self.row(row)
                .into_iter()
                .filter(|(_, val)| !val.is_zero())
                .map(move |(col, val)| (row, col, val))
        })
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize
    where
        N: PartialEq,
    {
        self.iter().count()
    }

    /// First row whose near-diagonal coupling crosses into the next grid row,
    /// i.e. a non-zero `A[r, r + 1]` or `A[r + 1, r]` with `r + 1` a multiple
    /// of `span`.
    pub fn row_crossing(&self) -> Option<usize>
    where
        N: PartialEq,
    {
        if self.span <= 1 || self.size <= self.span {
            return None;
        }
        (self.span - 1..self.size - 1)
            .step_by(self.span)
            .find(|&row| {
                !self.upper[row].is_zero() || !self.lower[row].is_zero()
            })
    }

    /// Whether the near diagonals stay within grid rows of width `span`.
    pub fn respects_grid_rows(&self) -> bool
    where
        N: PartialEq,
    {
        self.row_crossing().is_none()
    }

    /// Dense copy of the matrix.
    pub fn to_dense(&self) -> Array2<N>
    where
        N: PartialEq,
    {
        let mut res = Array2::zeros((self.size, self.size));
        for (row, col, val) in self.iter() {
            res[[row, col]] = val;
        }
        res
    }
}

impl<N: Copy + Zero + PartialEq> CdsMat<N> {
    /// Store `value` at `(row, col)`.
    ///
    /// Writing a non-zero value outside the five diagonals fails with
    /// `OutOfBandWrite`, and outside the matrix with `OutOfBoundsIndex`.
    /// Writing an explicit zero there is a no-op.
    pub fn set(
        &mut self,
        row: usize,
        col: usize,
        value: N,
    ) -> Result<(), StructureError> {
        match self.slot(row, col) {
            Some((diagonal, pos)) => {
                self.diagonal_mut(diagonal)[pos] = value;
                Ok(())
            }
            None if value.is_zero() => Ok(()),
            None if row >= self.size || col >= self.size => {
                Err(StructureError::OutOfBoundsIndex {
                    row,
                    col,
                    size: self.size,
                })
            }
            None => Err(StructureError::OutOfBandWrite {
                row,
                col,
                offset: col as isize - row as isize,
            }),
        }
    }
}

impl<N: Copy + Num> CdsMat<N> {
    /// `sum_{j != row} A[row, j] * x[j]`, touching at most four neighbors.
    ///
    /// # Panics
    ///
    /// If `row` is out of bounds or `x` is shorter than the matrix order.
    #[inline]
    pub fn off_diag_dot(&self, row: usize, x: &[N]) -> N {
        let span = self.span;
        let mut sum = N::zero();
        if row > 0 {
            sum = sum + self.lower[row - 1] * x[row - 1];
        }
        if row + 1 < self.size {
            sum = sum + self.upper[row] * x[row + 1];
        }
        if span > 1 {
            if row >= span {
                sum = sum + self.far_lower[row - span] * x[row - span];
            }
            if row + span < self.size {
                sum = sum + self.far_upper[row] * x[row + span];
            }
        }
        sum
    }

    /// `(A x)[row]`.
    #[inline]
    pub fn row_dot(&self, row: usize, x: &[N]) -> N {
        self.main[row] * x[row] + self.off_diag_dot(row, x)
    }
}

#[cfg(feature = "approx")]
mod approx_impls {
    use super::CdsMat;
    use approx::{AbsDiffEq, RelativeEq};

    impl<N> AbsDiffEq for CdsMat<N>
    where
        N: AbsDiffEq,
        N::Epsilon: Copy,
    {
        type Epsilon = N::Epsilon;

        fn default_epsilon() -> N::Epsilon {
            N::default_epsilon()
        }

        fn abs_diff_eq(&self, other: &Self, epsilon: N::Epsilon) -> bool {
            let same = |a: &[N], b: &[N]| {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.abs_diff_eq(y, epsilon))
            };
            self.size == other.size
                && self.span == other.span
                && same(&self.main, &other.main)
                && same(&self.upper, &other.upper)
                && same(&self.lower, &other.lower)
                && same(&self.far_upper, &other.far_upper)
                && same(&self.far_lower, &other.far_lower)
        }
    }

    impl<N> RelativeEq for CdsMat<N>
    where
        N: RelativeEq,
        N::Epsilon: Copy,
    {
        fn default_max_relative() -> N::Epsilon {
            N::default_max_relative()
        }

        fn relative_eq(
            &self,
            other: &Self,
            epsilon: N::Epsilon,
            max_relative: N::Epsilon,
        ) -> bool {
            let same = |a: &[N], b: &[N]| {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| x.relative_eq(y, epsilon, max_relative))
            };
            self.size == other.size
                && self.span == other.span
                && same(&self.main, &other.main)
                && same(&self.upper, &other.upper)
                && same(&self.lower, &other.lower)
                && same(&self.far_upper, &other.far_upper)
                && same(&self.far_lower, &other.far_lower)
        }
    }
}
