//! Vanilla option specification.

use crate::exercise::ExerciseStyle;
use crate::payoff::{OptionType, PlainVanillaPayoff};
use ql_core::{errors::Result, Price, Real, Time};

/// A vanilla option on a single underlying: what is being priced, with
/// no model or market assumptions attached.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionSpec {
    /// Underlying spot (or futures price for Black-76).
    pub spot: Price,
    /// Strike price.
    pub strike: Price,
    /// Time to expiry in years.
    pub maturity: Time,
    /// Call or put.
    pub option_type: OptionType,
    /// European or American.
    pub exercise: ExerciseStyle,
}

impl OptionSpec {
    /// Build a validated spec.
    pub fn new(
        spot: Price,
        strike: Price,
        maturity: Time,
        option_type: OptionType,
        exercise: ExerciseStyle,
    ) -> Result<Self> {
        let spec = Self {
            spot,
            strike,
            maturity,
            option_type,
            exercise,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// European option shorthand.
    pub fn european(spot: Price, strike: Price, maturity: Time, option_type: OptionType) -> Result<Self> {
        Self::new(spot, strike, maturity, option_type, ExerciseStyle::European)
    }

    /// American option shorthand.
    pub fn american(spot: Price, strike: Price, maturity: Time, option_type: OptionType) -> Result<Self> {
        Self::new(spot, strike, maturity, option_type, ExerciseStyle::American)
    }

    /// Spot, strike and maturity must be finite and strictly positive.
    ///
    /// # Errors
    /// `InvalidParameter` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        check_positive("spot", self.spot)?;
        check_positive("strike", self.strike)?;
        check_positive("maturity", self.maturity)?;
        Ok(())
    }

    /// The exercise payoff.
    pub fn payoff(&self) -> PlainVanillaPayoff {
        PlainVanillaPayoff::new(self.option_type, self.strike)
    }

    /// Intrinsic value at the current spot.
    pub fn intrinsic(&self) -> Real {
        self.option_type.intrinsic(self.spot, self.strike)
    }

    /// The same option with the other type.
    pub fn flipped(&self) -> Self {
        let option_type = match self.option_type {
            OptionType::Call => OptionType::Put,
            OptionType::Put => OptionType::Call,
        };
        Self {
            option_type,
            ..*self
        }
    }
}

fn check_positive(name: &str, value: Real) -> Result<()> {
    ql_core::ensure!(
        value.is_finite() && value > 0.0,
        InvalidParameter,
        "{name} must be positive and finite, got {value}"
    );
    Ok(())
}
