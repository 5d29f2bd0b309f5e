//! Numerical building blocks.
//!
//! - [`solvers`]: Newton-Raphson, bisection and bracket scanning
//! - [`statistics`]: moments, percentiles, Pearson correlation
//! - [`correlation`]: validated correlation matrices and Cholesky factors
//! - [`distributions`]: standard normal CDF/PDF

pub mod correlation;
pub mod distributions;
pub mod solvers;
pub mod statistics;
