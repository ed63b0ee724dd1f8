use num_traits::Zero;
use serde::Deserialize;
use std::convert::TryFrom;

use crate::errors::StructureError;
use crate::grid::Grid;
use crate::sparse::CdsMat;

#[derive(Deserialize)]
pub(crate) struct CdsMatShadow<N> {
    size: usize,
    span: usize,
    main: Vec<N>,
    upper: Vec<N>,
    lower: Vec<N>,
    far_upper: Vec<N>,
    far_lower: Vec<N>,
}

impl<N: Copy + Zero> TryFrom<CdsMatShadow<N>> for CdsMat<N> {
    type Error = StructureError;
    fn try_from(val: CdsMatShadow<N>) -> Result<Self, Self::Error> {
        let CdsMatShadow {
            size,
            span,
            main,
            upper,
            lower,
            far_upper,
            far_lower,
        } = val;
        Self::from_diagonals(
            size, span, main, upper, lower, far_upper, far_lower,
        )
    }
}

#[derive(Deserialize)]
pub(crate) struct GridShadow {
    nx: usize,
    ny: usize,
    step_x: f64,
    step_y: f64,
}

impl TryFrom<GridShadow> for Grid {
    type Error = StructureError;
    fn try_from(val: GridShadow) -> Result<Self, Self::Error> {
        Self::new(val.nx, val.ny, val.step_x, val.step_y)
    }
}
