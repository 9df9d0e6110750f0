//! # ql-core
//!
//! Scalar aliases, the shared error type, compounding and day counting.
//!
//! Every other crate in the workspace reports failures through
//! [`Error`] and measures time in year fractions ([`Time`]) obtained
//! from a [`DayCounter`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Compounding conventions and payment frequencies.
pub mod compounding;

/// Day-count conventions.
pub mod day_counter;

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A discount factor, strictly positive.
pub type DiscountFactor = Real;

/// A price or value.
pub type Price = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use chrono::NaiveDate as Date;
pub use compounding::{Compounding, Frequency};
pub use day_counter::DayCounter;
pub use errors::{Error, Result};
