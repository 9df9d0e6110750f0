//! Rate helpers for yield-curve bootstrapping.
//!
//! A *rate helper* wraps one market quote together with the conventions
//! needed to value it off a discount curve.  The bootstrapper adjusts the
//! zero rate at the helper's maturity until
//! `implied_quote(curve) == quote()`.

use ql_core::{
    errors::{Error, Result},
    Frequency, Real, Time,
};
use ql_quotes::{InstrumentType, Quote};

use crate::{piecewise_yield_curve::CurveBuildConfig, yield_curve::Curve};

// ── RateHelper trait ──────────────────────────────────────────────────────────

/// A single market quote that constrains the yield curve at its maturity.
pub trait RateHelper: std::fmt::Debug + Send + Sync {
    /// The pivot maturity this helper constrains.
    fn maturity(&self) -> Time;

    /// The quoted value (rate or price, depending on the instrument).
    fn quote(&self) -> Real;

    /// The value the instrument would be quoted at under `curve`.
    fn implied_quote(&self, curve: &Curve) -> Result<Real>;
}

/// Build the helper matching the quote's instrument type.
///
/// # Errors
/// `Configuration` for option quotes, which do not constrain a discount
/// curve, and for swaps whose fixed leg would exceed
/// [`MAX_SCHEDULE_PERIODS`](ql_core::compounding::MAX_SCHEDULE_PERIODS).
pub fn rate_helper(quote: &Quote, config: &CurveBuildConfig) -> Result<Box<dyn RateHelper>> {
    let maturity = quote.maturity();
    let value = quote.value();
    Ok(match quote.instrument() {
        InstrumentType::Deposit => Box::new(DepositRateHelper::new(value, maturity)),
        InstrumentType::Future => Box::new(FuturesRateHelper::new(
            value,
            maturity,
            config.futures_accrual,
        )),
        InstrumentType::Swap => Box::new(
            SwapRateHelper::new(value, maturity, config.swap_fixed_frequency)
                .map_err(|e| Error::Configuration(format!("swap quote '{}': {e}", quote.id())))?,
        ),
        InstrumentType::Option => ql_core::fail!(
            Configuration,
            "option quote '{}' cannot be used to build a discount curve",
            quote.id()
        ),
    })
}

// ── DepositRateHelper ─────────────────────────────────────────────────────────

/// A money-market deposit starting today.
///
/// The implied quote is the simple rate `(1/P(T) − 1) / T`.
#[derive(Debug, Clone, Copy)]
pub struct DepositRateHelper {
    rate: Real,
    maturity: Time,
}

impl DepositRateHelper {
    /// Deposit quoted at simple `rate` to `maturity`.
    pub fn new(rate: Real, maturity: Time) -> Self {
        Self { rate, maturity }
    }
}

impl RateHelper for DepositRateHelper {
    fn maturity(&self) -> Time {
        self.maturity
    }

    fn quote(&self) -> Real {
        self.rate
    }

    fn implied_quote(&self, curve: &Curve) -> Result<Real> {
        let df = curve.discount(self.maturity)?;
        Ok((1.0 / df - 1.0) / self.maturity)
    }
}

// ── FuturesRateHelper ─────────────────────────────────────────────────────────

/// An interest-rate future settling at `maturity`.
///
/// The contract covers `[max(T − accrual, 0), T]` and is quoted as
/// `100 × (1 − F)`, `F` being the simple forward over that period.
#[derive(Debug, Clone, Copy)]
pub struct FuturesRateHelper {
    price: Real,
    maturity: Time,
    accrual: Time,
}

impl FuturesRateHelper {
    /// Future quoted at `price` ending at `maturity`.
    pub fn new(price: Real, maturity: Time, accrual: Time) -> Self {
        Self {
            price,
            maturity,
            accrual,
        }
    }

    /// Start of the accrual period.
    pub fn start(&self) -> Time {
        (self.maturity - self.accrual).max(0.0)
    }
}

impl RateHelper for FuturesRateHelper {
    fn maturity(&self) -> Time {
        self.maturity
    }

    fn quote(&self) -> Real {
        self.price
    }

    fn implied_quote(&self, curve: &Curve) -> Result<Real> {
        let forward = curve.simple_forward_rate(self.start(), self.maturity)?;
        Ok(100.0 * (1.0 - forward))
    }
}

// ── SwapRateHelper ────────────────────────────────────────────────────────────

/// A spot-starting vanilla swap quoted at its par fixed rate.
///
/// Fixed payments fall at `T, T − Δ, T − 2Δ, …` (`Δ` the fixed-leg period);
/// a leftover first period shorter than `Δ` becomes a short front stub.
#[derive(Debug, Clone)]
pub struct SwapRateHelper {
    rate: Real,
    maturity: Time,
    /// `(payment_time, accrual_fraction)`, ascending.
    schedule: Vec<(Time, Time)>,
}

/// Payment times closer than this to the previous one are merged into it.
const STUB_TOLERANCE: Time = 1e-10;

impl SwapRateHelper {
    /// Swap quoted at par `rate` to `maturity`, fixed leg at `frequency`.
    ///
    /// # Errors
    /// `InvalidParameter` for a maturity that is not finite and
    /// non-negative or needs more fixed payments than
    /// [`MAX_SCHEDULE_PERIODS`](ql_core::compounding::MAX_SCHEDULE_PERIODS).
    pub fn new(rate: Real, maturity: Time, frequency: Frequency) -> Result<Self> {
        let period = frequency.period();
        let payments = frequency.schedule_periods(maturity)?;
        let mut times: Vec<Time> = (0..payments)
            .map(|k| maturity - k as Real * period)
            .filter(|&t| t > STUB_TOLERANCE)
            .collect();
        times.reverse();

        let mut prev = 0.0;
        let schedule = times
            .into_iter()
            .map(|t| {
                let tau = t - prev;
                prev = t;
                (t, tau)
            })
            .collect();
        Ok(Self {
            rate,
            maturity,
            schedule,
        })
    }

    /// Fixed-leg `(payment_time, accrual_fraction)` pairs.
    pub fn schedule(&self) -> &[(Time, Time)] {
        &self.schedule
    }
}

impl RateHelper for SwapRateHelper {
    fn maturity(&self) -> Time {
        self.maturity
    }

    fn quote(&self) -> Real {
        self.rate
    }

    fn implied_quote(&self, curve: &Curve) -> Result<Real> {
        let mut annuity = 0.0;
        for &(t, tau) in &self.schedule {
            annuity += tau * curve.discount(t)?;
        }
        Ok((1.0 - curve.discount(self.maturity)?) / annuity)
    }
}
