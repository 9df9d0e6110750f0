//! # ql-quotes
//!
//! Immutable market observations: instrument quotes that drive curve
//! bootstrapping, and option premium quotes that drive forward curves and
//! volatility surfaces.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// `Quote`, `InstrumentType` and `OptionQuote`.
pub mod quote;

pub use quote::{InstrumentType, OptionQuote, Quote};
