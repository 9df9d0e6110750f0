//! # ql-termstructures
//!
//! Discount curves, the yield-curve bootstrapper and forward price curves.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `Curve`: immutable interpolated discount curve.
pub mod yield_curve;

/// Rate helpers: deposits, futures and swaps valued off a `Curve`.
pub mod rate_helpers;

/// `build_curve`: iterative bootstrap from market quotes.
pub mod piecewise_yield_curve;

/// `ForwardPriceCurve`: forwards implied by put-call parity.
pub mod forward_price_curve;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use forward_price_curve::ForwardPriceCurve;
pub use piecewise_yield_curve::{build_curve, CurveBuildConfig};
pub use rate_helpers::{
    rate_helper, DepositRateHelper, FuturesRateHelper, RateHelper, SwapRateHelper,
};
pub use yield_curve::{Curve, CurveRecord, CurveWarning, CURVE_RECORD_VERSION};
