//! Jacobi relaxation.
//!
//! Every update of sweep `k + 1` reads the iterate of sweep `k` only:
//!
//! ```text
//! x'[i] = (b[i] - sum_{j != i} A[i, j] x[j]) / A[i, i]
//! ```
//!
//! The previous iterate is kept in a scratch buffer owned by the relaxation
//! for the duration of a solve.
use num_traits::Float;

use super::Relaxation;
use crate::sparse::prod::nan_max;
use crate::sparse::CdsMat;

#[derive(Debug, Clone)]
pub(crate) struct Jacobi<N> {
    prev: Vec<N>,
}

impl<N: Float> Jacobi<N> {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            prev: vec![N::zero(); size],
        }
    }
}

impl<N: Float> Relaxation<N> for Jacobi<N> {
    fn sweep(&mut self, a: &CdsMat<N>, b: &[N], x: &mut [N]) -> N {
        self.prev.copy_from_slice(x);
        let prev = &self.prev;
        let mut max_diff = N::zero();
        for (row, xi) in x.iter_mut().enumerate() {
            *xi = (b[row] - a.off_diag_dot(row, prev)) / a.diag(row);
            max_diff = nan_max(max_diff, (*xi - prev[row]).abs());
        }
        max_diff
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_data::tridiag_block;

    #[test]
    fn sweep_reads_previous_iterate_only() {
        let a = tridiag_block();
        let b = vec![2.; 9];
        let mut x = vec![0.; 9];
        let mut relax = Jacobi::new(9);
        let incr = relax.sweep(&a, &b, &mut x);
        // from a zero guess every entry becomes b / diag, whatever the order
        assert!(x.iter().all(|&v| v == 0.5));
        assert_eq!(incr, 0.5);

        let incr = relax.sweep(&a, &b, &mut x);
        // corner: 2 neighbors, edge: 3, center: 4
        assert_eq!(x[0], (2. + 2. * 0.5) / 4.);
        assert_eq!(x[1], (2. + 3. * 0.5) / 4.);
        assert_eq!(x[4], (2. + 4. * 0.5) / 4.);
        assert_eq!(incr, 0.5);
    }

    #[test]
    fn nan_entry_poisons_increment() {
        let a = tridiag_block();
        let b = vec![2.; 9];
        let mut x = vec![0.; 9];
        x[8] = f64::NAN;
        let incr = Jacobi::new(9).sweep(&a, &b, &mut x);
        assert!(incr.is_nan());
        // rows away from the nan entry still relax
        assert_eq!(x[0], 0.5);
    }
}
