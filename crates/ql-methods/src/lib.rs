//! # ql-methods
//!
//! Numerical methods behind the option pricing engines: recombining binomial
//! trees with backward induction, and seeded Monte Carlo simulation.
//!
//! # Modules
//!
//! * [`process`]: constant-coefficient Black-Scholes dynamics
//! * [`lattice`]: binomial trees and backward induction
//! * [`monte_carlo`]: path generation, path pricing, MC model

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Risk-neutral GBM driving both lattices and simulation.
pub mod process;

/// Lattice methods: binomial trees, backward induction.
pub mod lattice;

/// Monte Carlo simulation: path generation, pricing, statistics.
pub mod monte_carlo;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use lattice::{
    backward_induction, BinomialTree, BinomialTreeType, LatticeValues, MAX_LATTICE_STEPS,
};
pub use monte_carlo::{
    EuropeanPathPricer, MonteCarloConfig, MonteCarloModel, Path, PathGenerator, PathPricer,
};
pub use process::BlackScholesProcess;
