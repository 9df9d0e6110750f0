//! Monte Carlo engine for European vanilla options.

use crate::pricing_model::{ModelParameters, PricingResult};
use ql_core::{errors::Result, Compounding, Frequency};
use ql_instruments::{OptionSpec, Payoff};
use ql_methods::{BlackScholesProcess, EuropeanPathPricer, MonteCarloConfig, MonteCarloModel};
use ql_termstructures::Curve;
use tracing::debug;

/// Price a European option by simulation.
///
/// The result carries the standard error of the estimate and no Greeks.
/// Fully determined by `cfg.seed`.
pub fn monte_carlo(
    spec: &OptionSpec,
    params: ModelParameters,
    curve: &Curve,
    cfg: &MonteCarloConfig,
) -> Result<PricingResult> {
    let r = curve.zero_rate(spec.maturity, Compounding::Continuous, Frequency::Annual)?;
    let process = BlackScholesProcess::new(spec.spot, r, params.dividend_yield, params.volatility)?;
    let model = MonteCarloModel::new(&process, spec.maturity, *cfg)?;

    let payoff = spec.payoff();
    let pricer = EuropeanPathPricer::new(|s| payoff.value(s), curve.discount(spec.maturity)?);
    let stats = model.simulate(&pricer)?;

    debug!(
        paths = cfg.paths,
        time_steps = cfg.time_steps,
        seed = cfg.seed,
        antithetic = cfg.antithetic,
        mean = stats.mean(),
        std_error = stats.error_estimate(),
        "Monte Carlo run complete"
    );
    Ok(PricingResult {
        price: stats.mean(),
        greeks: None,
        std_error: Some(stats.error_estimate()),
    })
}
