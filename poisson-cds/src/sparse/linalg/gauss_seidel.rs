//! Sequential Gauss-Seidel relaxation.
//!
//! Unknowns are overwritten in place in increasing index order, so when `x[i]`
//! is updated its left and bottom neighbors already hold this sweep's values,
//! while its right and top neighbors still hold the previous ones. The
//! increment of an entry is measured against the value it held before its
//! own update.
use num_traits::Float;

use super::{relax_row, Relaxation};
use crate::sparse::prod::nan_max;
use crate::sparse::CdsMat;

#[derive(Debug, Clone, Copy)]
pub(crate) struct GaussSeidel;

impl<N: Float> Relaxation<N> for GaussSeidel {
    fn sweep(&mut self, a: &CdsMat<N>, b: &[N], x: &mut [N]) -> N {
        let mut max_diff = N::zero();
        for row in 0..a.size() {
            let old = x[row];
            let new = relax_row(a, b, x, row);
            x[row] = new;
            max_diff = nan_max(max_diff, (new - old).abs());
        }
        max_diff
    }
}
