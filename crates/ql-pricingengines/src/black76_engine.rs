//! Black-76 engine for options on futures and forwards.
//!
//! The option's `spot` is read as the futures price `F`:
//!
//! $$C = P(T)\,[F N(d_1) - K N(d_2)], \quad P = P(T)\,[K N(-d_2) - F N(-d_1)]$$
//!
//! with $d_{1,2} = (\ln(F/K) \pm \sigma^2 T/2) / (\sigma\sqrt{T})$.  Delta
//! and gamma are with respect to `F`; rho moves the discount factor only.

use crate::pricing_model::{Greeks, PricingResult};
use ql_core::{errors::Result, Compounding, Frequency, Rate, Real, Time, Volatility};
use ql_instruments::{OptionSpec, OptionType};
use ql_math::distributions::{normal_cdf, normal_pdf};
use ql_termstructures::Curve;

/// Price a European futures option with Black-76 off `curve`.
pub fn black76_option(spec: &OptionSpec, volatility: Volatility, curve: &Curve) -> Result<PricingResult> {
    let r = curve.zero_rate(spec.maturity, Compounding::Continuous, Frequency::Annual)?;
    let (price, greeks) = black76(
        spec.option_type,
        spec.spot,
        spec.strike,
        r,
        volatility,
        spec.maturity,
    );
    Ok(PricingResult::with_greeks(price, greeks))
}

/// Black-76 price and Greeks.
///
/// Expects `volatility > 0` and `time_to_expiry > 0`; callers validate.
pub fn black76(
    option_type: OptionType,
    forward: Real,
    strike: Real,
    risk_free_rate: Rate,
    volatility: Volatility,
    time_to_expiry: Time,
) -> (Real, Greeks) {
    let phi = option_type.sign();
    let t = time_to_expiry;
    let sqrt_t = t.sqrt();
    let std_dev = volatility * sqrt_t;
    let df = (-risk_free_rate * t).exp();

    let d1 = ((forward / strike).ln() + 0.5 * std_dev * std_dev) / std_dev;
    let d2 = d1 - std_dev;
    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let price = phi * df * (forward * nd1 - strike * nd2);
    let greeks = Greeks {
        delta: phi * df * nd1,
        gamma: df * npd1 / (forward * std_dev),
        vega: df * forward * npd1 * sqrt_t,
        theta: -df * forward * npd1 * volatility / (2.0 * sqrt_t) + risk_free_rate * price,
        rho: -t * price,
    };
    (price, greeks)
}
