//! Compounding conventions and payment frequencies.
//!
//! Curves store continuously-compounded rates internally; these helpers
//! convert to and from the conventions quoted on the exchange.

use crate::errors::{Error, Result};
use crate::{Rate, Real, Size, Time};

/// How interest is compounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compounding {
    /// Simple interest: `1 + r·t`
    Simple,
    /// Compounded interest: `(1 + r/f)^(f·t)`
    Compounded,
    /// Continuously compounded: `e^(r·t)`
    Continuous,
}

/// Most periods a payment schedule may hold: a century of monthly payments.
pub const MAX_SCHEDULE_PERIODS: Size = 1200;

/// Number of regular payments per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Frequency {
    /// Once a year.
    #[default]
    Annual,
    /// Twice a year.
    Semiannual,
    /// Four times a year.
    Quarterly,
    /// Twelve times a year.
    Monthly,
}

impl Frequency {
    /// Payments per year.
    pub fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::Semiannual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
        }
    }

    /// Length of one period in years.
    pub fn period(self) -> Time {
        1.0 / self.periods_per_year() as Real
    }

    /// Periods in a schedule running to `t`, a short front stub included.
    ///
    /// # Errors
    /// `InvalidParameter` for a non-finite or negative `t`, or one needing
    /// more than [`MAX_SCHEDULE_PERIODS`] periods.
    pub fn schedule_periods(self, t: Time) -> Result<Size> {
        crate::ensure!(t.is_finite() && t >= 0.0, InvalidParameter, "schedule end must be finite and non-negative, got {t}");
        let periods = (t * self.periods_per_year() as Real - 1e-9).ceil().max(0.0);
        crate::ensure!(
            periods <= MAX_SCHEDULE_PERIODS as Real,
            InvalidParameter,
            "{t} years at {} payments a year exceeds {MAX_SCHEDULE_PERIODS} periods",
            self.periods_per_year()
        );
        Ok(periods as Size)
    }
}

/// Growth factor of one unit invested at `rate` for `t` years.
///
/// # Errors
/// `InvalidParameter` for negative `t` or a non-positive simple factor.
pub fn compound_factor(rate: Rate, t: Time, compounding: Compounding, freq: Frequency) -> Result<Real> {
    crate::ensure!(t >= 0.0, InvalidParameter, "negative time ({t}) not allowed");
    if t == 0.0 {
        return Ok(1.0);
    }
    let factor = match compounding {
        Compounding::Simple => 1.0 + rate * t,
        Compounding::Compounded => {
            let f = freq.periods_per_year() as Real;
            (1.0 + rate / f).powf(f * t)
        }
        Compounding::Continuous => (rate * t).exp(),
    };
    if !(factor > 0.0 && factor.is_finite()) {
        return Err(Error::InvalidParameter(format!(
            "rate {rate} over {t} years gives compound factor {factor}"
        )));
    }
    Ok(factor)
}

/// Discount factor `1 / compound_factor`.
pub fn discount_factor(rate: Rate, t: Time, compounding: Compounding, freq: Frequency) -> Result<Real> {
    Ok(1.0 / compound_factor(rate, t, compounding, freq)?)
}

/// The rate under `compounding` that produces growth factor `compound`
/// over `t` years.  Returns 0 for `t == 0`.
pub fn implied_rate(compound: Real, t: Time, compounding: Compounding, freq: Frequency) -> Result<Rate> {
    crate::ensure!(
        compound > 0.0,
        InvalidParameter,
        "compound factor must be positive, got {compound}"
    );
    crate::ensure!(t >= 0.0, InvalidParameter, "negative time ({t}) not allowed");
    if t == 0.0 {
        return Ok(0.0);
    }
    Ok(match compounding {
        Compounding::Simple => (compound - 1.0) / t,
        Compounding::Compounded => {
            let f = freq.periods_per_year() as Real;
            (compound.powf(1.0 / (f * t)) - 1.0) * f
        }
        Compounding::Continuous => compound.ln() / t,
    })
}
