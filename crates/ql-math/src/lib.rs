//! # ql-math
//!
//! Numerical building blocks: 1D interpolation, 1D root finding, the
//! standard normal distribution (via statrs), a seeded Mersenne Twister and
//! a running statistics accumulator.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Probability distributions.
pub mod distributions;

/// 1D interpolation schemes.
pub mod interpolations;

/// Random number generators.
pub mod random_numbers;

/// 1D root-finding solvers.
pub mod solvers1d;

/// Statistics accumulators.
pub mod statistics;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf};
pub use interpolations::{
    interpolate, interpolate_with, CubicNaturalSpline, Extrapolation, Interpolation,
    Interpolation1D, InterpolationMethod, LinearInterpolation, LogLinearInterpolation,
};
pub use random_numbers::{GaussianRng, MersenneTwisterUniformRng};
pub use solvers1d::{
    bisection, brent, find_root, find_root_with_derivative, newton, newton_safe,
    newton_safe_from, RootSearch, Solver1DConfig,
};
pub use statistics::Statistics;
