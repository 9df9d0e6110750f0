//! Market quotes.
//!
//! Quote values are in market units: deposit and swap quotes are decimal
//! rates, futures are prices quoted as `100 × (1 − rate)`, option quotes are
//! premiums.

use ql_core::{errors::Result, Price, Rate, Real, Time};
use ql_instruments::OptionType;
use std::fmt;

/// What kind of instrument a [`Quote`] observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstrumentType {
    /// Money-market deposit, simple rate.
    Deposit,
    /// Fixed-for-floating par swap rate.
    Swap,
    /// Short-rate future, price `100 × (1 − rate)`.
    Future,
    /// Option premium.
    Option,
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrumentType::Deposit => "deposit",
            InstrumentType::Swap => "swap",
            InstrumentType::Future => "future",
            InstrumentType::Option => "option",
        };
        f.write_str(name)
    }
}

/// A single market observation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quote {
    id: String,
    maturity: Time,
    value: Real,
    instrument: InstrumentType,
}

impl Quote {
    /// Create a quote.  Values are checked when the quote is used, see
    /// [`Quote::validate`].
    pub fn new(id: impl Into<String>, maturity: Time, value: Real, instrument: InstrumentType) -> Self {
        Self {
            id: id.into(),
            maturity,
            value,
            instrument,
        }
    }

    /// A deposit quoted as a simple rate.
    pub fn deposit(id: impl Into<String>, maturity: Time, rate: Rate) -> Self {
        Self::new(id, maturity, rate, InstrumentType::Deposit)
    }

    /// A par swap rate.
    pub fn swap(id: impl Into<String>, maturity: Time, rate: Rate) -> Self {
        Self::new(id, maturity, rate, InstrumentType::Swap)
    }

    /// A future quoted as a price.
    pub fn future(id: impl Into<String>, maturity: Time, price: Price) -> Self {
        Self::new(id, maturity, price, InstrumentType::Future)
    }

    /// Instrument identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Years from the valuation date.
    pub fn maturity(&self) -> Time {
        self.maturity
    }

    /// Quoted value in market units.
    pub fn value(&self) -> Real {
        self.value
    }

    /// Instrument kind.
    pub fn instrument(&self) -> InstrumentType {
        self.instrument
    }

    /// Maturity must be finite and positive, value finite.
    ///
    /// # Errors
    /// `Configuration` naming the quote.
    pub fn validate(&self) -> Result<()> {
        ql_core::ensure!(
            self.maturity.is_finite() && self.maturity > 0.0,
            Configuration,
            "quote '{}' has invalid maturity {}",
            self.id,
            self.maturity
        );
        ql_core::ensure!(
            self.value.is_finite(),
            Configuration,
            "quote '{}' has non-finite value {}",
            self.id,
            self.value
        );
        Ok(())
    }
}

/// A quoted option premium.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionQuote {
    /// Instrument identifier.
    pub id: String,
    /// Years to expiry.
    pub maturity: Time,
    /// Strike price.
    pub strike: Price,
    /// Call or put.
    pub option_type: OptionType,
    /// Quoted premium.
    pub price: Price,
}

impl OptionQuote {
    /// Create an option quote.
    pub fn new(
        id: impl Into<String>,
        maturity: Time,
        strike: Price,
        option_type: OptionType,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            maturity,
            strike,
            option_type,
            price,
        }
    }

    /// Maturity and strike positive, price non-negative, all finite.
    pub fn validate(&self) -> Result<()> {
        ql_core::ensure!(
            self.maturity.is_finite() && self.maturity > 0.0,
            Configuration,
            "option quote '{}' has invalid maturity {}",
            self.id,
            self.maturity
        );
        ql_core::ensure!(
            self.strike.is_finite() && self.strike > 0.0,
            Configuration,
            "option quote '{}' has invalid strike {}",
            self.id,
            self.strike
        );
        ql_core::ensure!(
            self.price.is_finite() && self.price >= 0.0,
            Configuration,
            "option quote '{}' has invalid price {}",
            self.id,
            self.price
        );
        Ok(())
    }
}
