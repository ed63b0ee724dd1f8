//! CSV output of the benchmark.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use poisson_cds::Grid;

pub const RESULTS_HEADER: &str =
    "solver_name,n,m,size,h,error_L_inf,time_ms,memory_mb";

/// One line of the results file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub solver_name: &'static str,
    pub n: usize,
    pub m: usize,
    pub size: usize,
    pub h: f64,
    pub error_l_inf: f64,
    pub time_ms: f64,
    pub memory_mb: f64,
}

/// Results file, truncated and given its header on creation.
pub struct ResultsWriter {
    out: BufWriter<File>,
}

impl ResultsWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{}", RESULTS_HEADER)?;
        Ok(Self { out })
    }

    pub fn push(&mut self, rec: &Record) -> io::Result<()> {
        writeln!(
            self.out,
            "{},{},{},{},{:.6},{},{:.4},{:.4}",
            rec.solver_name,
            rec.n,
            rec.m,
            rec.size,
            rec.h,
            sci10(rec.error_l_inf),
            rec.time_ms,
            rec.memory_mb,
        )
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Scientific notation with ten decimals and a signed exponent of at least
/// two digits, e.g. `5.0000000000e-01`.
fn sci10(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_owned();
    }
    if v.is_infinite() {
        let sign = if v < 0. { "-" } else { "" };
        return format!("{}Infinity", sign);
    }
    let s = format!("{:.10e}", v);
    match s.split_once('e').map(|(m, e)| (m, e.parse::<i32>())) {
        Some((mantissa, Ok(exp))) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        _ => s,
    }
}

/// File name of a solution grid, with every non alphanumeric character of
/// the solver name replaced by `_`.
pub fn grid_file_name(solver_name: &str, nx: usize, ny: usize) -> String {
    let solver: String = solver_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("solution_grid_{}_{}x{}.csv", solver, nx, ny)
}

/// Write a solution as `ny` lines of `nx` comma separated values, bottom
/// grid row first.
pub fn save_grid<P: AsRef<Path>>(
    path: P,
    grid: &Grid,
    solution: &[f64],
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for j in 0..grid.ny() {
        for i in 0..grid.nx() {
            if i > 0 {
                write!(out, ",")?;
            }
            write!(out, "{}", solution[grid.index(i, j)])?;
        }
        writeln!(out)?;
    }
    out.flush()
}
