//! LINPACK-style direct solvers on top of nalgebra storage
/// LU with partial pivoting restricted to the band of the matrix
pub mod lu_band_nalg;
