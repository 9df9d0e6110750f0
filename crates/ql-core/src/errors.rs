//! Error types for quantlib-api.
//!
//! Every failure the numerical core can report is a distinct variant of a
//! single `thiserror`-derived enum, so callers can match on the kind of
//! failure instead of parsing messages.  The `ensure!` and `fail!` macros
//! build the message-carrying variants.

use crate::{Real, Time};
use thiserror::Error;

/// The top-level error type used throughout quantlib-api.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Malformed static input: unsorted or insufficient points, mismatched
    /// lengths, unusable quotes.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A query fell outside the sample range under a strict extrapolation
    /// policy.
    #[error("x = {x} is outside the interpolation range [{x_min}, {x_max}]")]
    OutOfRange {
        /// The query point.
        x: Real,
        /// Lower end of the sample range.
        x_min: Real,
        /// Upper end of the sample range.
        x_max: Real,
    },

    /// The supplied bracket does not enclose a sign change.
    #[error("invalid bracket [{lo}, {hi}]: f(lo) = {f_lo}, f(hi) = {f_hi}")]
    InvalidBracket {
        /// Lower end of the bracket.
        lo: Real,
        /// Upper end of the bracket.
        hi: Real,
        /// Function value at `lo`.
        f_lo: Real,
        /// Function value at `hi`.
        f_hi: Real,
    },

    /// A solver did not reach its tolerance within the iteration budget.
    #[error("no convergence after {iterations} iterations: {reason}")]
    Convergence {
        /// Iterations spent before giving up.
        iterations: usize,
        /// What went wrong.
        reason: String,
    },

    /// An out-of-domain model input (zero volatility, negative maturity, …).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Two quotes share the same maturity.
    #[error("quotes '{first}' and '{second}' share maturity {maturity}")]
    DuplicateMaturity {
        /// The shared maturity in years.
        maturity: Time,
        /// Identifier of the first quote.
        first: String,
        /// Identifier of the second quote.
        second: String,
    },

    /// Bootstrapping failed at a pivot; no curve is produced.
    #[error("curve bootstrap failed at maturity {maturity}: {source}")]
    CurveBuild {
        /// Maturity of the offending pivot in years.
        maturity: Time,
        /// The underlying solver failure.
        #[source]
        source: Box<Error>,
    },

    /// The selected model cannot price the requested exercise style.
    #[error("unsupported exercise style: {0}")]
    UnsupportedExerciseStyle(String),

    /// A market input outside the range any model could reproduce.
    #[error("arbitrage violation: {0}")]
    ArbitrageViolation(String),
}

/// Shorthand `Result` type used throughout quantlib-api.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::$kind(message))` if `$cond` is false.
///
/// Only usable with the variants that carry a single message string.
///
/// # Example
/// ```
/// use ql_core::{ensure, errors::Error};
/// fn positive(x: f64) -> ql_core::errors::Result<f64> {
///     ensure!(x > 0.0, InvalidParameter, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::InvalidParameter(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $kind:ident, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::$kind(format!($($msg)*)));
        }
    };
}

/// Returns `Err(Error::$kind(message))` immediately.
///
/// # Example
/// ```
/// use ql_core::{fail, errors::Error};
/// fn always_err() -> ql_core::errors::Result<()> {
///     fail!(Configuration, "something went wrong");
/// }
/// assert_eq!(
///     always_err(),
///     Err(Error::Configuration("something went wrong".into()))
/// );
/// ```
#[macro_export]
macro_rules! fail {
    ($kind:ident, $($msg:tt)*) => {
        return Err($crate::errors::Error::$kind(format!($($msg)*)))
    };
}
