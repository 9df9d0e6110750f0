//! # ql-instruments
//!
//! What gets priced: vanilla option specifications with their payoff and
//! exercise style, and fixed-rate bonds.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bond;
pub mod exercise;
pub mod option;
pub mod payoff;

pub use bond::FixedRateBond;
pub use exercise::ExerciseStyle;
pub use option::OptionSpec;
pub use payoff::{OptionType, Payoff, PlainVanillaPayoff};
