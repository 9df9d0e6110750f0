//! Binomial lattice engine for European and American vanilla options.
//!
//! The rate is the curve's continuously-compounded zero rate to maturity,
//! held constant over the tree.  Delta, gamma and theta are read off the
//! first two layers of the rolled-back tree; vega and rho come from
//! re-pricing with bumped inputs.  A bump whose tree has branch
//! probabilities outside `[0, 1]` falls back to a one-sided difference,
//! then to a smaller bump, and never fails the base price.

use crate::pricing_model::{Greeks, LatticeConfig, ModelParameters, PricingResult};
use ql_core::{errors::Result, Compounding, Frequency, Rate, Real, Volatility};
use ql_instruments::{OptionSpec, Payoff};
use ql_methods::{backward_induction, BinomialTree, BlackScholesProcess, LatticeValues};
use ql_termstructures::Curve;
use tracing::debug;

/// Volatility bump for lattice vega.
const VOL_BUMP: Volatility = 1.0e-2;
/// Rate bump for lattice rho.
const RATE_BUMP: Rate = 1.0e-3;
/// How often a bump is halved before vega or rho is given up.
const MAX_BUMP_HALVINGS: usize = 8;

/// Price `spec` on a binomial lattice.
///
/// # Errors
/// `InvalidParameter` for a step count outside `2..=MAX_LATTICE_STEPS` or
/// an unbumped tree whose branch probabilities leave `[0, 1]`.
pub fn binomial(
    spec: &OptionSpec,
    params: ModelParameters,
    curve: &Curve,
    cfg: &LatticeConfig,
) -> Result<PricingResult> {
    cfg.validate()?;
    let r = curve.zero_rate(spec.maturity, Compounding::Continuous, Frequency::Annual)?;
    let process = BlackScholesProcess::new(spec.spot, r, params.dividend_yield, params.volatility)?;

    let (tree, lattice) = roll_back(spec, &process, cfg)?;
    let reprice = |p: Result<BlackScholesProcess>| -> Result<Real> { Ok(roll_back(spec, &p?, cfg)?.1.value) };
    let sigma = process.volatility();
    let vega = bumped_sensitivity(lattice.value, VOL_BUMP.min(0.5 * sigma), |h| {
        reprice(process.with_volatility(sigma + h))
    });
    let rho = bumped_sensitivity(lattice.value, RATE_BUMP, |h| reprice(process.with_rate(r + h)));

    let greeks = match (vega, rho) {
        (Some(vega), Some(rho)) => Some(tree_greeks(&tree, &lattice, vega, rho)),
        _ => {
            debug!(
                volatility = sigma,
                rate = r,
                steps = cfg.steps,
                "no valid bumped tree for vega or rho, returning the price alone"
            );
            None
        }
    };
    Ok(PricingResult {
        price: lattice.value,
        greeks,
        std_error: None,
    })
}

/// Lattice price only, at the given constant rate and volatility.
pub(crate) fn binomial_value(
    spec: &OptionSpec,
    rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    cfg: &LatticeConfig,
) -> Result<Real> {
    let process = BlackScholesProcess::new(spec.spot, rate, dividend_yield, volatility)?;
    Ok(roll_back(spec, &process, cfg)?.1.value)
}

fn roll_back(
    spec: &OptionSpec,
    process: &BlackScholesProcess,
    cfg: &LatticeConfig,
) -> Result<(BinomialTree, LatticeValues)> {
    let tree = BinomialTree::new(cfg.tree, process, spec.maturity, cfg.steps, spec.strike)?;
    let discount = (-process.rate() * tree.dt()).exp();
    let payoff = spec.payoff();
    let values = backward_induction(
        &tree,
        &|s| payoff.value(s),
        discount,
        spec.exercise.allows_early_exercise(),
    );
    Ok((tree, values))
}

/// Finite difference of `reprice(h) − base` around `h = 0`.
///
/// Central when both bumped trees are valid, one-sided when only one is,
/// halving `h` while neither is. `None` once the halvings run out.
fn bumped_sensitivity<F>(base: Real, mut h: Real, reprice: F) -> Option<Real>
where
    F: Fn(Real) -> Result<Real>,
{
    for _ in 0..MAX_BUMP_HALVINGS {
        match (reprice(h), reprice(-h)) {
            (Ok(up), Ok(down)) => return Some((up - down) / (2.0 * h)),
            (Ok(up), Err(_)) => return Some((up - base) / h),
            (Err(_), Ok(down)) => return Some((base - down) / h),
            (Err(_), Err(_)) => h *= 0.5,
        }
    }
    None
}

fn tree_greeks(tree: &BinomialTree, lattice: &LatticeValues, vega: Real, rho: Real) -> Greeks {
    let [(s_d, v_d), (s_u, v_u)] = lattice.layer1;
    let delta = (v_u - v_d) / (s_u - s_d);

    // Steps are at least two, so the second layer is always recorded.
    let (gamma, theta) = match lattice.layer2 {
        Some([(s0, v0), (s1, v1), (s2, v2)]) => {
            let delta_up = (v2 - v1) / (s2 - s1);
            let delta_down = (v1 - v0) / (s1 - s0);
            let gamma = (delta_up - delta_down) / (0.5 * (s2 - s0));
            let theta = (v1 - lattice.value) / (2.0 * tree.dt());
            (gamma, theta)
        }
        None => (0.0, 0.0),
    };
    Greeks {
        delta,
        gamma,
        vega,
        theta,
        rho,
    }
}
