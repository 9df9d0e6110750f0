//! # quantlib-api
//!
//! Curve construction, option pricing and implied volatility for the
//! exchange pricing service.
//!
//! This crate is a **façade** over the `ql-*` workspace crates.  The five
//! entry points below cover the service's contracts; the crates themselves
//! are re-exported as modules for everything else.
//!
//! | Entry point | Errors |
//! |---|---|
//! | [`build_curve`] | `CurveBuild`, `DuplicateMaturity`, `Configuration` |
//! | [`price_option`] | `InvalidParameter`, `UnsupportedExerciseStyle` |
//! | [`implied_volatility`] | `Convergence`, `ArbitrageViolation` |
//! | [`interpolate`] | `Configuration`, `OutOfRange` |
//! | [`find_root`] | `Convergence`, `InvalidBracket` |
//!
//! ## Quick start
//!
//! ```rust
//! use quantlib_api::{
//!     build_curve, implied_volatility, price_option, CurveBuildConfig, Date,
//!     ImpliedVolConfig, InterpolationMethod, ModelParameters, OptionSpec, OptionType,
//!     PricingModel, Quote,
//! };
//!
//! let today = Date::from_ymd_opt(2025, 1, 2).unwrap();
//! let quotes = [
//!     Quote::deposit("DEP6M", 0.5, 0.05),
//!     Quote::swap("SWP2Y", 2.0, 0.05),
//! ];
//! let curve = build_curve(today, &quotes, InterpolationMethod::Linear, &CurveBuildConfig::default())
//!     .unwrap();
//!
//! let spec = OptionSpec::european(100.0, 100.0, 1.0, OptionType::Call).unwrap();
//! let res = price_option(&spec, ModelParameters::new(0.2), &curve, &PricingModel::ClosedForm).unwrap();
//! let vol = implied_volatility(&spec, &curve, res.price, &ImpliedVolConfig::default()).unwrap();
//! assert!((vol - 0.2).abs() < 1e-8);
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Type aliases, compounding, day counters and the error type.
pub use ql_core as core;

/// Interpolation, root finding, distributions, random numbers.
pub use ql_math as math;

/// Market quotes.
pub use ql_quotes as quotes;

/// Option specifications and bonds.
pub use ql_instruments as instruments;

/// Discount curves, the bootstrapper and forward price curves.
pub use ql_termstructures as termstructures;

/// Binomial lattices and Monte Carlo simulation.
pub use ql_methods as methods;

/// Option models, implied volatility and bond discounting.
pub use ql_pricingengines as pricingengines;

// ── Entry points ──────────────────────────────────────────────────────────────

pub use ql_math::{find_root, interpolate};
pub use ql_pricingengines::{implied_volatility, price_option};
pub use ql_termstructures::build_curve;

// ── Common types ──────────────────────────────────────────────────────────────

pub use ql_core::{
    Compounding, Date, DayCounter, Error, Frequency, Price, Rate, Real, Result, Time,
    Volatility,
};
pub use ql_instruments::{ExerciseStyle, FixedRateBond, OptionSpec, OptionType};
pub use ql_math::{Extrapolation, InterpolationMethod, RootSearch, Solver1DConfig};
pub use ql_methods::{BinomialTreeType, MonteCarloConfig};
pub use ql_pricingengines::{
    BondPrice, Greeks, ImpliedVolConfig, ImpliedVolSurface, LatticeConfig, ModelParameters,
    PricingModel, PricingResult,
};
pub use ql_quotes::{InstrumentType, OptionQuote, Quote};
pub use ql_termstructures::{Curve, CurveBuildConfig, CurveWarning, ForwardPriceCurve};
