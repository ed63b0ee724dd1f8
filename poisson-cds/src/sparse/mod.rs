//! Structured sparse matrices and their solvers
pub mod cds;
pub mod linalg;
pub mod prod;

pub use self::cds::{CdsMat, Diagonal};
