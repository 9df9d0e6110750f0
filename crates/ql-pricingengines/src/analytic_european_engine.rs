//! Analytic European option engine (Black-Scholes-Merton).
//!
//! $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
//! $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
//!
//! where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$
//! and $r$ is the curve's continuously-compounded zero rate to $T$.

use crate::pricing_model::{Greeks, ModelParameters, PricingResult};
use ql_core::{errors::Result, Compounding, Frequency, Rate, Real, Time, Volatility};
use ql_instruments::{OptionSpec, OptionType};
use ql_math::distributions::{normal_cdf, normal_pdf};
use ql_termstructures::Curve;

/// Price a European option in closed form off `curve`.
pub fn analytic_european(spec: &OptionSpec, params: ModelParameters, curve: &Curve) -> Result<PricingResult> {
    let r = curve.zero_rate(spec.maturity, Compounding::Continuous, Frequency::Annual)?;
    let (price, greeks) = black_scholes_merton(
        spec.option_type,
        spec.spot,
        spec.strike,
        r,
        params.dividend_yield,
        params.volatility,
        spec.maturity,
    );
    Ok(PricingResult::with_greeks(price, greeks))
}

/// Black-Scholes-Merton price and Greeks.
///
/// Expects `volatility > 0` and `time_to_expiry > 0`; callers validate.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    time_to_expiry: Time,
) -> (Real, Greeks) {
    let phi = option_type.sign();
    let t = time_to_expiry;
    let r = risk_free_rate;
    let q = dividend_yield;
    let sigma = volatility;
    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();

    let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
    let d2 = d1 - std_dev;

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let price = phi * (spot * df_q * nd1 - strike * df_r * nd2);
    let greeks = Greeks {
        delta: phi * df_q * nd1,
        gamma: df_q * npd1 / (spot * std_dev),
        vega: spot * df_q * npd1 * sqrt_t,
        theta: -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t) - phi * r * strike * df_r * nd2
            + phi * q * spot * df_q * nd1,
        rho: phi * strike * t * df_r * nd2,
    };
    (price, greeks)
}
