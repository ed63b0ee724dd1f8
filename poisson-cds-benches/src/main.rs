//! Compare the iterative CDS solvers and a dense direct solve on the model
//! problem `u = sin(pi x) sin(pi y)`, for a range of square grids.
//!
//! Usage: `poisson-cds-benches [OUTPUT_DIR]` (defaults to `bench-results`).
//! Log verbosity follows `RUST_LOG`.
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Instant;

use poisson_cds::linalg::{self, Method};
use poisson_cds::{assemble, CdsMat, Grid};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod analysis;
mod report;

use analysis::{cds_memory_mb, dense_memory_mb, exact, linf_error, source};
use report::{grid_file_name, save_grid, Record, ResultsWriter};

const DEFAULT_OUT_DIR: &str = "bench-results";
const RESULTS_FILE: &str = "benchmark_full_results.csv";
const CDS_SIZES: [usize; 5] = [10, 20, 40, 80, 100];
// elimination is cubic in the number of unknowns
const DENSE_SIZES: [usize; 4] = [10, 20, 30, 40];
const MAX_ITER: usize = 20_000;
const TOL: f64 = 1e-9;

#[derive(Copy, Clone, Debug, PartialEq)]
enum Solver {
    Cds(Method),
    DenseGauss,
}

impl Solver {
    const ALL: [Solver; 4] = [
        Solver::Cds(Method::Jacobi),
        Solver::Cds(Method::GaussSeidel),
        Solver::Cds(Method::CheckerboardGaussSeidel),
        Solver::DenseGauss,
    ];

    fn name(self) -> &'static str {
        match self {
            Solver::Cds(Method::Jacobi) => "Jacobi (CDS)",
            Solver::Cds(Method::GaussSeidel) => "Gauss-Seidel (CDS)",
            Solver::Cds(Method::CheckerboardGaussSeidel) => {
                "Checkerboard GS (CDS)"
            }
            Solver::DenseGauss => "Gauss (Dense)",
        }
    }

    fn sizes(self) -> &'static [usize] {
        match self {
            Solver::Cds(_) => &CDS_SIZES,
            Solver::DenseGauss => &DENSE_SIZES,
        }
    }
}

struct Run {
    grid: Grid,
    solution: Vec<f64>,
    record: Record,
}

fn build_system(
    grid: &Grid,
) -> Result<(CdsMat<f64>, Vec<f64>), Box<dyn Error>> {
    Ok(assemble(grid, source, exact)?)
}

/// Assemble and solve one grid, timing both steps together.
fn run_single(
    solver: Solver,
    n: usize,
    m: usize,
) -> Result<Run, Box<dyn Error>> {
    let grid = Grid::unit_square(n, m)?;
    let start = Instant::now();
    let (a, b) = build_system(&grid)?;
    let solution = match solver {
        Solver::Cds(method) => {
            let x0 = vec![0.; grid.size()];
            let sol = linalg::solve(method, &a, &b, &x0, MAX_ITER, TOL)?;
            if sol.converged() {
                info!(
                    solver = solver.name(),
                    iterations = sol.iterations(),
                    criterion = ?sol.report().criterion(),
                    "converged"
                );
            } else {
                warn!(
                    solver = solver.name(),
                    iterations = sol.iterations(),
                    criterion = ?sol.report().criterion(),
                    err = sol.err(),
                    "no convergence, keeping the last iterate"
                );
            }
            sol.into_x()
        }
        Solver::DenseGauss => poisson_cds_direct::solve_cds(&a, &b)?,
    };
    let time_ms = start.elapsed().as_secs_f64() * 1e3;

    let memory_mb = match solver {
        Solver::Cds(_) => cds_memory_mb(&a),
        Solver::DenseGauss => dense_memory_mb(grid.size()),
    };
    let record = Record {
        solver_name: solver.name(),
        n,
        m,
        size: grid.size(),
        h: grid.step_y(),
        error_l_inf: linf_error(&grid, &solution, exact),
        time_ms,
        memory_mb,
    };
    Ok(Run {
        grid,
        solution,
        record,
    })
}

fn run_all(out_dir: &Path) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(out_dir)?;
    let results_path = out_dir.join(RESULTS_FILE);
    let mut results = ResultsWriter::create(&results_path)?;
    info!(path = %results_path.display(), "results file initialized");

    for solver in Solver::ALL {
        info!(solver = solver.name(), "benchmarking");
        let sizes = solver.sizes();
        for (k, &n) in sizes.iter().enumerate() {
            let run = run_single(solver, n, n)?;
            info!(
                solver = solver.name(),
                n,
                time_ms = run.record.time_ms,
                error = run.record.error_l_inf,
                "grid done"
            );
            results.push(&run.record)?;
            if k + 1 == sizes.len() {
                let path = out_dir.join(grid_file_name(solver.name(), n, n));
                save_grid(&path, &run.grid, &run.solution)?;
                info!(path = %path.display(), "solution grid saved");
            }
        }
    }
    results.finish()?;
    info!(path = %results_path.display(), "benchmark done");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));
    run_all(&out_dir)
}
