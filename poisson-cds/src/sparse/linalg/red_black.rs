//! Checkerboard (red/black) Gauss-Seidel relaxation.
//!
//! Grid point `(i, j)` with linear index `i + j * span` is red when `i + j` is
//! even and black otherwise. In the five-point stencil every neighbor of a
//! red point is black and vice versa, so a sweep updates all red points from
//! the current black values, then all black points from the fresh red values.
//! Within a phase the updates are independent.
//!
//! With the `multi_thread` feature a phase computes its updates on a rayon
//! pool while the iterate is shared read-only, then writes them back. The
//! end of the parallel phase is the barrier: black updates never observe a
//! partially updated red phase. The result is identical to running the two
//! phases sequentially.
//!
//! The independence only holds if no near-diagonal coupling crosses a grid
//! row, which is checked when the relaxation is built.
use num_traits::Float;

use super::{relax_row, Relaxation};
use crate::errors::SolveError;
use crate::grid::{color_classes, Color};
use crate::sparse::prod::nan_max;
use crate::sparse::CdsMat;

#[cfg(feature = "multi_thread")]
use rayon::prelude::*;
#[cfg(feature = "multi_thread")]
use tracing::{debug, warn};

/// Phases with fewer points than this run on the calling thread.
#[cfg(feature = "multi_thread")]
const PAR_THRESHOLD: usize = 4096;

pub(crate) struct RedBlack {
    red: Vec<usize>,
    black: Vec<usize>,
    #[cfg(feature = "multi_thread")]
    pool: Option<rayon::ThreadPool>,
}

impl RedBlack {
    pub(crate) fn new<N: Float>(
        a: &CdsMat<N>,
        num_threads: Option<usize>,
    ) -> Result<Self, SolveError> {
        if let Some(row) = a.row_crossing() {
            return Err(SolveError::ColoringViolation { row });
        }
        let (red, black) = color_classes(a.size(), a.span());
        #[cfg(not(feature = "multi_thread"))]
        let _ = num_threads;
        Ok(Self {
            #[cfg(feature = "multi_thread")]
            pool: Self::build_pool(red.len(), num_threads),
            red,
            black,
        })
    }

    #[cfg(feature = "multi_thread")]
    fn build_pool(
        phase_len: usize,
        num_threads: Option<usize>,
    ) -> Option<rayon::ThreadPool> {
        if phase_len < PAR_THRESHOLD {
            return None;
        }
        let num_threads = num_threads.unwrap_or_else(num_cpus::get);
        if num_threads <= 1 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
        {
            Ok(pool) => {
                debug!(num_threads, "checkerboard phases run in parallel");
                Some(pool)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "cannot build thread pool, running sequentially"
                );
                None
            }
        }
    }

    /// Update every point of one color in place, sequentially.
    fn phase_seq<N: Float>(
        indices: &[usize],
        a: &CdsMat<N>,
        b: &[N],
        x: &mut [N],
    ) -> N {
        let mut max_diff = N::zero();
        for &row in indices {
            let new = relax_row(a, b, x, row);
            max_diff = nan_max(max_diff, (new - x[row]).abs());
            x[row] = new;
        }
        max_diff
    }

    /// Compute the updates of one color concurrently against the shared
    /// iterate, then write them back.
    #[cfg(feature = "multi_thread")]
    fn phase_par<N: Float + Send + Sync>(
        pool: &rayon::ThreadPool,
        indices: &[usize],
        a: &CdsMat<N>,
        b: &[N],
        x: &mut [N],
    ) -> N {
        let shared: &[N] = x;
        let updates: Vec<N> = pool.install(|| {
            indices
                .par_iter()
                .map(|&row| relax_row(a, b, shared, row))
                .collect()
        });
        let mut max_diff = N::zero();
        for (&row, &new) in indices.iter().zip(&updates) {
            max_diff = nan_max(max_diff, (new - x[row]).abs());
            x[row] = new;
        }
        max_diff
    }

    fn phase<N: Float + Send + Sync>(
        &self,
        color: Color,
        a: &CdsMat<N>,
        b: &[N],
        x: &mut [N],
    ) -> N {
        let indices = match color {
            Color::Red => &self.red,
            Color::Black => &self.black,
        };
        #[cfg(feature = "multi_thread")]
        if let Some(pool) = &self.pool {
            return Self::phase_par(pool, indices, a, b, x);
        }
        Self::phase_seq(indices, a, b, x)
    }
}

impl<N: Float + Send + Sync> Relaxation<N> for RedBlack {
    fn sweep(&mut self, a: &CdsMat<N>, b: &[N], x: &mut [N]) -> N {
        let red = self.phase(Color::Red, a, b, x);
        let black = self.phase(Color::Black, a, b, x);
        nan_max(red, black)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::linalg::{solve, Iterative, Method};
    use crate::test_data::{sine_system, tridiag_block};
    use approx::assert_abs_diff_eq;

    #[test]
    fn classes_alternate() {
        let (red, black) = color_classes(9, 3);
        assert_eq!(red, vec![0, 2, 4, 6, 8]);
        assert_eq!(black, vec![1, 3, 5, 7]);
        let (red, black) = color_classes(8, 4);
        assert_eq!(red, vec![0, 2, 5, 7]);
        assert_eq!(black, vec![1, 3, 4, 6]);
    }

    #[test]
    fn same_color_points_never_couple() {
        let (_, a, _) = sine_system(6, 5);
        let (red, black) = color_classes(a.size(), a.span());
        for class in [&red, &black] {
            for &row in class.iter() {
                for &col in class.iter() {
                    if row != col {
                        assert_eq!(a.get(row, col), 0.);
                    }
                }
            }
        }
    }

    #[test]
    fn sweep_order() {
        let a = tridiag_block();
        let b = vec![2.; 9];
        let mut x = vec![0.; 9];
        let mut relax = RedBlack::new(&a, None).unwrap();
        relax.sweep(&a, &b, &mut x);
        // red points only saw the zero black values
        for idx in [0, 2, 4, 6, 8] {
            assert_eq!(x[idx], 0.5);
        }
        // black points saw the fresh red values: 3 red neighbors each
        for idx in [1, 3, 5, 7] {
            assert_eq!(x[idx], (2. + 1.5) / 4.);
        }
    }

    #[test]
    fn matches_sequential_gauss_seidel() {
        let (_, a, b) = sine_system(12, 9);
        let x0 = vec![0.; a.size()];
        let gs =
            solve(Method::GaussSeidel, &a, &b, &x0, 20_000, 1e-11).unwrap();
        let rb =
            solve(Method::CheckerboardGaussSeidel, &a, &b, &x0, 20_000, 1e-9)
                .unwrap();
        assert!(gs.converged() && rb.converged());
        for (u, v) in gs.x().iter().zip(rb.x()) {
            assert_abs_diff_eq!(u, v, epsilon = 1e-6);
        }
    }

    #[test]
    fn nan_in_either_phase_poisons_increment() {
        let a = tridiag_block();
        let b = vec![2.; 9];
        // index 4 is red, index 7 is black
        for bad in [4, 7] {
            let mut x = vec![0.; 9];
            x[bad] = f64::NAN;
            let mut relax = RedBlack::new(&a, None).unwrap();
            assert!(relax.sweep(&a, &b, &mut x).is_nan());
        }
    }

    #[test]
    fn rejects_row_crossing() {
        let mut a = tridiag_block();
        a.set(2, 3, -1.).unwrap();
        let mut x = vec![0.; 9];
        assert_eq!(
            Iterative::new(Method::CheckerboardGaussSeidel).solve(
                &a,
                &[1.; 9],
                &mut x
            ),
            Err(SolveError::ColoringViolation { row: 2 })
        );
        // the other methods don't care
        assert!(Iterative::new(Method::GaussSeidel)
            .solve(&a, &[1.; 9], &mut x)
            .is_ok());
    }

    #[cfg(feature = "multi_thread")]
    #[test]
    fn parallel_phases_match_sequential() {
        // large enough for the phases to cross the parallel threshold
        let (_, a, b) = sine_system(100, 90);
        let mut x_par = vec![0.; a.size()];
        let mut x_seq = vec![0.; a.size()];
        let mut par = RedBlack::new(&a, Some(4)).unwrap();
        assert!(par.pool.is_some());
        let mut seq = RedBlack::new(&a, Some(1)).unwrap();
        assert!(seq.pool.is_none());
        for _ in 0..5 {
            let incr_par = par.sweep(&a, &b, &mut x_par);
            let incr_seq = seq.sweep(&a, &b, &mut x_seq);
            assert_eq!(incr_par, incr_seq);
        }
        assert_eq!(x_par, x_seq);
    }
}
