//! Implied volatility: the volatility at which a model reproduces an
//! observed option price.
//!
//! The price is first checked against the model-free bounds of the
//! option; outside them no volatility exists and no solve is attempted.
//! A price on the lower bound is the σ → 0 limit and yields `0.0`; a
//! price on the upper bound has no finite volatility and is rejected.
//! European options are inverted with a safeguarded Newton iteration on
//! the closed-form price and vega, American options with Brent on the
//! binomial lattice.

use crate::{
    analytic_european_engine::black_scholes_merton, binomial_engine::binomial_value,
    black76_engine::black76, pricing_model::LatticeConfig,
};
use ql_core::{
    errors::{Error, Result},
    Compounding, Frequency, Price, Rate, Real, Volatility,
};
use ql_instruments::{ExerciseStyle, OptionSpec, OptionType};
use ql_math::solvers1d::{brent, newton_safe_from, Solver1DConfig};
use ql_termstructures::Curve;
use std::f64::consts::PI;
use tracing::{debug, trace};

/// Relative distance from the lower bound treated as lying on it.
const BOUND_TOLERANCE: Real = 1.0e-12;

/// Settings of the implied-volatility search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImpliedVolConfig {
    /// Continuous dividend yield of the underlying.
    pub dividend_yield: Rate,
    /// Starting point; Brenner-Subrahmanyam when `None`.
    pub initial_guess: Option<Volatility>,
    /// Lower end of the search bracket.
    pub min_vol: Volatility,
    /// Upper end of the search bracket.
    pub max_vol: Volatility,
    /// Root-finder tolerances and budget.
    pub solver: Solver1DConfig,
    /// Lattice used for American options.
    pub lattice: LatticeConfig,
}

impl Default for ImpliedVolConfig {
    fn default() -> Self {
        Self {
            dividend_yield: 0.0,
            initial_guess: None,
            min_vol: 1.0e-6,
            max_vol: 5.0,
            solver: Solver1DConfig::default(),
            lattice: LatticeConfig::default(),
        }
    }
}

impl ImpliedVolConfig {
    /// # Errors
    /// `Configuration` for a malformed bracket, guess or solver setting;
    /// `InvalidParameter` for a bad lattice.
    pub fn validate(&self) -> Result<()> {
        ql_core::ensure!(
            self.min_vol.is_finite() && self.min_vol > 0.0 && self.max_vol.is_finite() && self.max_vol > self.min_vol,
            Configuration,
            "volatility bracket must satisfy 0 < min_vol < max_vol, got [{}, {}]",
            self.min_vol,
            self.max_vol
        );
        if let Some(guess) = self.initial_guess {
            ql_core::ensure!(
                guess.is_finite() && guess > 0.0,
                Configuration,
                "initial volatility guess must be positive, got {guess}"
            );
        }
        ql_core::ensure!(
            self.dividend_yield.is_finite(),
            Configuration,
            "dividend yield must be finite, got {}",
            self.dividend_yield
        );
        self.solver.validate()?;
        self.lattice.validate()
    }
}

/// Black-Scholes-Merton implied volatility of `observed_price`.
///
/// Returns `0.0` for a price on the lower no-arbitrage bound (intrinsic
/// value for American exercise).
///
/// # Errors
/// - `ArbitrageViolation` when the price is outside the attainable range.
/// - `Convergence` when the solver fails inside `[min_vol, max_vol]`.
/// - `InvalidParameter` / `Configuration` for malformed inputs.
pub fn implied_volatility(
    spec: &OptionSpec,
    curve: &Curve,
    observed_price: Price,
    cfg: &ImpliedVolConfig,
) -> Result<Volatility> {
    spec.validate()?;
    cfg.validate()?;
    let t = spec.maturity;
    let r = curve.zero_rate(t, Compounding::Continuous, Frequency::Annual)?;
    let q = cfg.dividend_yield;
    let spot_pv = spec.spot * (-q * t).exp();
    let strike_pv = spec.strike * (-r * t).exp();

    let (mut lower, mut upper) = match spec.option_type {
        OptionType::Call => ((spot_pv - strike_pv).max(0.0), spot_pv),
        OptionType::Put => ((strike_pv - spot_pv).max(0.0), strike_pv),
    };
    if spec.exercise == ExerciseStyle::American {
        lower = lower.max(spec.intrinsic());
        upper = match spec.option_type {
            OptionType::Call => spec.spot,
            OptionType::Put => spec.strike,
        };
    }
    if at_lower_bound(observed_price, lower, upper)? {
        debug!(price = observed_price, lower, "price on the lower bound, zero volatility");
        return Ok(0.0);
    }

    let vol = match spec.exercise {
        ExerciseStyle::European => {
            let guess = cfg
                .initial_guess
                .unwrap_or_else(|| brenner_subrahmanyam(observed_price, spot_pv, t));
            solve_european(
                |sigma| {
                    let (price, greeks) =
                        black_scholes_merton(spec.option_type, spec.spot, spec.strike, r, q, sigma, t);
                    (price - observed_price, greeks.vega)
                },
                guess,
                cfg,
            )?
        }
        ExerciseStyle::American => {
            // Below this floor the CRR branch probabilities leave [0, 1].
            let dt = t / cfg.lattice.steps as Real;
            let lo = cfg.min_vol.max(2.0 * (r - q).abs() * dt.sqrt());
            trace!(lo, hi = cfg.max_vol, "American implied vol bracket");
            brent(
                |sigma| match binomial_value(spec, r, q, sigma, &cfg.lattice) {
                    Ok(price) => price - observed_price,
                    Err(_) => Real::NAN,
                },
                lo,
                cfg.max_vol,
                &cfg.solver,
            )
            .map_err(bracket_to_convergence)?
        }
    };
    debug!(
        option_type = %spec.option_type,
        exercise = %spec.exercise,
        strike = spec.strike,
        maturity = t,
        price = observed_price,
        vol,
        "implied volatility solved"
    );
    Ok(vol)
}

/// Black-76 implied volatility of a European futures option; `spec.spot`
/// is the futures or forward price.
///
/// # Errors
/// As [`implied_volatility`], plus `UnsupportedExerciseStyle` for
/// American exercise.
pub fn implied_volatility_black76(
    spec: &OptionSpec,
    curve: &Curve,
    observed_price: Price,
    cfg: &ImpliedVolConfig,
) -> Result<Volatility> {
    spec.validate()?;
    cfg.validate()?;
    if spec.exercise != ExerciseStyle::European {
        ql_core::fail!(
            UnsupportedExerciseStyle,
            "Black-76 implied volatility needs European exercise, got {}",
            spec.exercise
        );
    }
    let t = spec.maturity;
    let r = curve.zero_rate(t, Compounding::Continuous, Frequency::Annual)?;
    let df = (-r * t).exp();
    let (lower, upper) = match spec.option_type {
        OptionType::Call => (df * (spec.spot - spec.strike).max(0.0), df * spec.spot),
        OptionType::Put => (df * (spec.strike - spec.spot).max(0.0), df * spec.strike),
    };
    if at_lower_bound(observed_price, lower, upper)? {
        debug!(price = observed_price, lower, "price on the lower bound, zero volatility");
        return Ok(0.0);
    }

    let guess = cfg
        .initial_guess
        .unwrap_or_else(|| brenner_subrahmanyam(observed_price, df * spec.spot, t));
    let vol = solve_european(
        |sigma| {
            let (price, greeks) = black76(spec.option_type, spec.spot, spec.strike, r, sigma, t);
            (price - observed_price, greeks.vega)
        },
        guess,
        cfg,
    )?;
    debug!(
        option_type = %spec.option_type,
        strike = spec.strike,
        forward = spec.spot,
        maturity = t,
        price = observed_price,
        vol,
        "Black-76 implied volatility solved"
    );
    Ok(vol)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// ATM approximation `σ ≈ √(2π/T) · C / (S e^{−qT})`.
fn brenner_subrahmanyam(price: Price, spot_pv: Real, t: Real) -> Volatility {
    (2.0 * PI / t).sqrt() * price / spot_pv
}

/// Check `price` against `[lower, upper)`; `true` when it sits on `lower`.
fn at_lower_bound(price: Price, lower: Real, upper: Real) -> Result<bool> {
    let tolerance = BOUND_TOLERANCE * lower.max(1.0);
    ql_core::ensure!(
        price.is_finite() && price >= lower - tolerance && price < upper,
        ArbitrageViolation,
        "price {price} outside the attainable range [{lower}, {upper})"
    );
    Ok(price <= lower + tolerance)
}

fn solve_european<F>(f_df: F, guess: Volatility, cfg: &ImpliedVolConfig) -> Result<Volatility>
where
    F: Fn(Real) -> (Real, Real),
{
    let x0 = if guess.is_finite() {
        guess.clamp(cfg.min_vol, cfg.max_vol)
    } else {
        0.5 * (cfg.min_vol + cfg.max_vol)
    };
    trace!(x0, lo = cfg.min_vol, hi = cfg.max_vol, "Newton implied vol search");
    newton_safe_from(f_df, cfg.min_vol, cfg.max_vol, x0, &cfg.solver).map_err(bracket_to_convergence)
}

/// A price inside the no-arbitrage bounds whose root is outside the vol
/// bracket is a solver failure, not a caller error.
fn bracket_to_convergence(err: Error) -> Error {
    match err {
        Error::InvalidBracket { lo, hi, f_lo, f_hi } => Error::Convergence {
            iterations: 0,
            reason: format!(
                "no implied volatility in [{lo}, {hi}]: price residuals {f_lo} and {f_hi}"
            ),
        },
        other => other,
    }
}
