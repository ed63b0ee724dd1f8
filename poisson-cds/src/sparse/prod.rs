//! Matrix-vector products and residuals on compressed diagonal storage
use num_traits::{Float, Num};

use super::CdsMat;
use crate::errors::SolveError;

pub(crate) fn check_dim(
    expected: usize,
    found: usize,
) -> Result<(), SolveError> {
    if expected == found {
        Ok(())
    } else {
        Err(SolveError::IncompatibleDimensions { expected, found })
    }
}

/// Compute `res_vec = mat * in_vec`.
pub fn mul_vec<N>(
    mat: &CdsMat<N>,
    in_vec: &[N],
    res_vec: &mut [N],
) -> Result<(), SolveError>
where
    N: Num + Copy,
{
    check_dim(mat.size(), in_vec.len())?;
    check_dim(mat.size(), res_vec.len())?;
    for (row, res) in res_vec.iter_mut().enumerate() {
        *res = mat.row_dot(row, in_vec);
    }
    Ok(())
}

/// Compute the residual `res_vec = rhs - mat * x`.
pub fn residual<N>(
    mat: &CdsMat<N>,
    rhs: &[N],
    x: &[N],
    res_vec: &mut [N],
) -> Result<(), SolveError>
where
    N: Num + Copy,
{
    check_dim(mat.size(), rhs.len())?;
    check_dim(mat.size(), x.len())?;
    check_dim(mat.size(), res_vec.len())?;
    for (row, res) in res_vec.iter_mut().enumerate() {
        *res = rhs[row] - mat.row_dot(row, x);
    }
    Ok(())
}

/// Euclidean norm of `rhs - mat * x`, without allocating the residual.
pub fn residual_norm<N>(
    mat: &CdsMat<N>,
    rhs: &[N],
    x: &[N],
) -> Result<N, SolveError>
where
    N: Float,
{
    check_dim(mat.size(), rhs.len())?;
    check_dim(mat.size(), x.len())?;
    Ok(unchecked_residual_norm(mat, rhs, x))
}

pub(crate) fn unchecked_residual_norm<N: Float>(
    mat: &CdsMat<N>,
    rhs: &[N],
    x: &[N],
) -> N {
    let mut sum = N::zero();
    for row in 0..mat.size() {
        let r = rhs[row] - mat.row_dot(row, x);
        sum = sum + r * r;
    }
    sum.sqrt()
}

/// `max_i |(rhs - mat * x)_i / mat[i, i]|`, the largest correction a Jacobi
/// sweep would apply to `x`.
pub fn scaled_residual_max<N>(
    mat: &CdsMat<N>,
    rhs: &[N],
    x: &[N],
) -> Result<N, SolveError>
where
    N: Float,
{
    check_dim(mat.size(), rhs.len())?;
    check_dim(mat.size(), x.len())?;
    Ok(unchecked_scaled_residual_max(mat, rhs, x))
}

pub(crate) fn unchecked_scaled_residual_max<N: Float>(
    mat: &CdsMat<N>,
    rhs: &[N],
    x: &[N],
) -> N {
    (0..mat.size()).fold(N::zero(), |acc, row| {
        let r = rhs[row] - mat.row_dot(row, x);
        nan_max(acc, (r / mat.diag(row)).abs())
    })
}

/// Maximum of two values that propagates NaN from either side.
///
/// `Float::max` returns the other operand when one is NaN, which would hide
/// a NaN entry from a max reduction.
#[inline(always)]
pub(crate) fn nan_max<N: Float>(acc: N, val: N) -> N {
    if acc.is_nan() || val.is_nan() {
        N::nan()
    } else if val > acc {
        val
    } else {
        acc
    }
}
