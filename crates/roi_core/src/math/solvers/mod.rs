//! Root-finding solvers.
//!
//! - [`NewtonRaphsonSolver`]: quadratic convergence using derivatives
//! - [`BisectionSolver`]: guaranteed convergence inside a sign-change bracket
//! - [`scan_for_bracket`]: locate the left-most sign change on a grid
//!
//! All solvers share [`SolverConfig`] (tolerance 1e-10, 100 iterations by
//! default) and report failures as [`SolverError`](crate::types::SolverError).
//!
//! ```
//! use roi_core::math::solvers::{scan_for_bracket, BisectionSolver, SolverConfig};
//!
//! let f = |x: f64| x * x - 2.0;
//! let (a, b) = scan_for_bracket(f, 0.0, 4.0, 40).unwrap();
//! let root = BisectionSolver::new(SolverConfig::default()).find_root(f, a, b).unwrap();
//! assert!((root - std::f64::consts::SQRT_2).abs() < 1e-9);
//! ```

mod bisection;
mod config;
mod newton_raphson;

pub use bisection::{scan_for_bracket, BisectionSolver};
pub use config::SolverConfig;
pub use newton_raphson::NewtonRaphsonSolver;
