//! Iterative solvers for five-point stencil systems.
//!
//! Three relaxation schemes share one driver:
//!
//! - [`Method::Jacobi`] computes every update of a sweep from the previous
//!   iterate, double buffering the unknowns.
//! - [`Method::GaussSeidel`] overwrites the unknowns in place, in increasing
//!   index order, so later updates of a sweep see the earlier ones.
//! - [`Method::CheckerboardGaussSeidel`] updates all red points (`i + j`
//!   even), then all black points. Points of one color never couple, so each
//!   phase may run in parallel; with the `multi_thread` feature it does.
//!
//! # Example
//!
//! ```rust
//! use poisson_cds::assemble::assemble;
//! use poisson_cds::linalg::{Iterative, Method};
//! use poisson_cds::Grid;
//!
//! let grid = Grid::unit_square(8, 8).unwrap();
//! let (a, b) = assemble(&grid, |_, _| 0., |x, y| x + y).unwrap();
//! let mut x = vec![0.; grid.size()];
//!
//! let report = Iterative::new(Method::GaussSeidel)
//!     .tol(1e-10)
//!     .max_iter(5000)
//!     .solve(&a, &b, &mut x)
//!     .unwrap();
//! assert!(report.converged());
//!
//! // the discrete solution of harmonic linear data is exact
//! let (px, py) = grid.point(3, 5);
//! assert!((x[grid.index(3, 5)] - (px + py)).abs() < 1e-6);
//! ```
use std::fmt;

use num_traits::Float;
use tracing::{debug, trace, warn};

use super::prod::{
    check_dim, unchecked_residual_norm, unchecked_scaled_residual_max,
};
use super::CdsMat;
use crate::errors::SolveError;

mod gauss_seidel;
mod jacobi;
mod red_black;

/// Relaxation scheme.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Jacobi,
    GaussSeidel,
    CheckerboardGaussSeidel,
}

/// Stopping test evaluated after every sweep.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// Largest change of any unknown during the sweep, `max_i |x_i' - x_i|`.
    MaxIncrement,
    /// Euclidean norm of the residual `b - A x` after the sweep.
    ResidualL2,
}

impl Method {
    pub const ALL: [Method; 3] = [
        Method::Jacobi,
        Method::GaussSeidel,
        Method::CheckerboardGaussSeidel,
    ];

    /// Stopping test used when none is configured.
    pub fn default_criterion(self) -> Criterion {
        match self {
            Method::Jacobi | Method::GaussSeidel => Criterion::MaxIncrement,
            Method::CheckerboardGaussSeidel => Criterion::ResidualL2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Jacobi => "Jacobi",
            Method::GaussSeidel => "Gauss-Seidel",
            Method::CheckerboardGaussSeidel => "Checkerboard Gauss-Seidel",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One sweep of a relaxation scheme over all unknowns.
pub(crate) trait Relaxation<N> {
    /// Update `x` and return the largest change of any entry.
    fn sweep(&mut self, a: &CdsMat<N>, b: &[N], x: &mut [N]) -> N;
}

/// Gauss-Seidel style update of one unknown.
#[inline(always)]
pub(crate) fn relax_row<N: Float>(
    a: &CdsMat<N>,
    b: &[N],
    x: &[N],
    row: usize,
) -> N {
    (b[row] - a.off_diag_dot(row, x)) / a.diag(row)
}

/// Outcome of a solve.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolveReport {
    method: Method,
    criterion: Criterion,
    iterations: usize,
    err: f64,
    converged: bool,
}

impl SolveReport {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// Number of sweeps performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Last value of the stopping test.
    pub fn err(&self) -> f64 {
        self.err
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// Builder pattern structure to configure an iterative solve
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Iterative {
    method: Method,
    max_iter: usize,
    tol: f64,
    criterion: Option<Criterion>,
    num_threads: Option<usize>,
}

impl Iterative {
    pub const DEFAULT_MAX_ITER: usize = 20_000;
    pub const DEFAULT_TOL: f64 = 1e-9;

    pub fn new(method: Method) -> Self {
        Self {
            method,
            max_iter: Self::DEFAULT_MAX_ITER,
            tol: Self::DEFAULT_TOL,
            criterion: None,
            num_threads: None,
        }
    }

    pub fn max_iter(self, max_iter: usize) -> Self {
        Self { max_iter, ..self }
    }

    pub fn tol(self, tol: f64) -> Self {
        Self { tol, ..self }
    }

    /// Override the method's default stopping test.
    pub fn criterion(self, criterion: Criterion) -> Self {
        Self {
            criterion: Some(criterion),
            ..self
        }
    }

    /// Number of worker threads for the checkerboard phases. Defaults to the
    /// number of logical cpus. Has no effect without the `multi_thread`
    /// feature, or for the other methods.
    pub fn num_threads(self, num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads.max(1)),
            ..self
        }
    }

    pub fn effective_criterion(&self) -> Criterion {
        self.criterion
            .unwrap_or_else(|| self.method.default_criterion())
    }

    /// Solve `a x = b`, refining `x` in place from its current value.
    ///
    /// Returns `SolveError::NonConvergence` when `max_iter` sweeps do not
    /// meet the tolerance, or as soon as the stopping test turns NaN or
    /// infinite. `x` then holds the last iterate. A guess that already meets
    /// the tolerance is returned untouched after zero sweeps.
    pub fn solve<N>(
        &self,
        a: &CdsMat<N>,
        b: &[N],
        x: &mut [N],
    ) -> Result<SolveReport, SolveError>
    where
        N: Float + Send + Sync,
    {
        check_dim(a.size(), b.len())?;
        check_dim(a.size(), x.len())?;
        if let Some(row) = (0..a.size()).find(|&row| a.diag(row).is_zero()) {
            return Err(SolveError::ZeroDiagonal { row });
        }
        match self.method {
            Method::Jacobi => {
                let mut relax = jacobi::Jacobi::new(a.size());
                self.drive(&mut relax, a, b, x)
            }
            Method::GaussSeidel => {
                self.drive(&mut gauss_seidel::GaussSeidel, a, b, x)
            }
            Method::CheckerboardGaussSeidel => {
                let mut relax = red_black::RedBlack::new(a, self.num_threads)?;
                self.drive(&mut relax, a, b, x)
            }
        }
    }

    fn drive<N, R>(
        &self,
        relax: &mut R,
        a: &CdsMat<N>,
        b: &[N],
        x: &mut [N],
    ) -> Result<SolveReport, SolveError>
    where
        N: Float,
        R: Relaxation<N>,
    {
        let criterion = self.effective_criterion();
        let tol = N::from(self.tol).unwrap_or_else(N::zero);
        let report = |iterations: usize, err: N, converged: bool| SolveReport {
            method: self.method,
            criterion,
            iterations,
            err: err.to_f64().unwrap_or(f64::NAN),
            converged,
        };

        // The guess is measured with the Jacobi correction or the residual,
        // since no sweep has produced an increment yet.
        let mut err = match criterion {
            Criterion::MaxIncrement => unchecked_scaled_residual_max(a, b, x),
            Criterion::ResidualL2 => unchecked_residual_norm(a, b, x),
        };
        debug!(
            method = %self.method,
            ?criterion,
            size = a.size(),
            max_iter = self.max_iter,
            tol = self.tol,
            initial_err = ?err.to_f64(),
            "starting iterative solve"
        );
        if !err.is_finite() {
            warn!(method = %self.method, "initial guess is not finite");
            return Err(SolveError::NonConvergence {
                iterations: 0,
                err: report(0, err, false).err,
                tol: self.tol,
            });
        }
        if err < tol {
            debug!(method = %self.method, "initial guess meets the tolerance");
            return Ok(report(0, err, true));
        }

        for iteration in 1..=self.max_iter {
            let increment = relax.sweep(a, b, x);
            err = match criterion {
                Criterion::MaxIncrement => increment,
                Criterion::ResidualL2 => unchecked_residual_norm(a, b, x),
            };
            trace!(iteration, err = ?err.to_f64(), "sweep done");
            if !err.is_finite() {
                warn!(method = %self.method, iteration, "iterate diverged");
                return Err(SolveError::NonConvergence {
                    iterations: iteration,
                    err: report(iteration, err, false).err,
                    tol: self.tol,
                });
            }
            if err < tol {
                debug!(method = %self.method, iteration, "converged");
                return Ok(report(iteration, err, true));
            }
        }

        let err = report(self.max_iter, err, false).err;
        warn!(
            method = %self.method,
            max_iter = self.max_iter,
            err,
            tol = self.tol,
            "no convergence"
        );
        Err(SolveError::NonConvergence {
            iterations: self.max_iter,
            err,
            tol: self.tol,
        })
    }
}

/// Approximate solution returned by [`solve`].
#[derive(Clone, Debug, PartialEq)]
pub struct Solution<N> {
    x: Vec<N>,
    report: SolveReport,
}

impl<N> Solution<N> {
    /// The latest iterate.
    pub fn x(&self) -> &[N] {
        &self.x
    }

    pub fn into_x(self) -> Vec<N> {
        self.x
    }

    pub fn report(&self) -> &SolveReport {
        &self.report
    }

    pub fn iterations(&self) -> usize {
        self.report.iterations
    }

    pub fn converged(&self) -> bool {
        self.report.converged
    }

    pub fn err(&self) -> f64 {
        self.report.err
    }
}

/// Solve `a x = b` starting from `x0` with the default stopping test of
/// `method`.
///
/// Unlike [`Iterative::solve`], running out of iterations is not an error:
/// the last iterate is returned with `converged() == false`.
pub fn solve<N>(
    method: Method,
    a: &CdsMat<N>,
    b: &[N],
    x0: &[N],
    max_iter: usize,
    tol: f64,
) -> Result<Solution<N>, SolveError>
where
    N: Float + Send + Sync,
{
    let solver = Iterative::new(method).max_iter(max_iter).tol(tol);
    let mut x = x0.to_vec();
    let report = match solver.solve(a, b, &mut x) {
        Ok(report) => report,
        Err(SolveError::NonConvergence { iterations, err, .. }) => {
            SolveReport {
                method,
                criterion: solver.effective_criterion(),
                iterations,
                err,
                converged: false,
            }
        }
        Err(e) => return Err(e),
    };
    Ok(Solution { x, report })
}
