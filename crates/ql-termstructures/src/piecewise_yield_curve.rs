//! Iterative bootstrap of a [`Curve`] from market quotes.
//!
//! Quotes are sorted by maturity and turned into [`RateHelper`]s.  For each
//! pivot in turn, Brent's method solves for the continuously-compounded zero
//! rate at that pivot such that the helper's implied quote matches the market
//! quote.  Earlier pivots stay fixed, and points between pivots come from the
//! curve's interpolation.
//!
//! With a non-local interpolation (cubic spline) moving a later pivot also
//! moves the curve before earlier pivots, so the sequential pass is followed
//! by global passes that re-solve every pivot against the full curve until
//! no rate moves by more than the solver tolerance.
//!
//! # Example
//!
//! ```
//! use ql_core::Date;
//! use ql_math::interpolations::InterpolationMethod;
//! use ql_quotes::Quote;
//! use ql_termstructures::piecewise_yield_curve::{build_curve, CurveBuildConfig};
//!
//! let today = Date::from_ymd_opt(2025, 1, 2).unwrap();
//! let quotes = [Quote::deposit("D6M", 0.5, 0.040), Quote::swap("S2Y", 2.0, 0.042)];
//! let curve = build_curve(today, &quotes, InterpolationMethod::Linear, &CurveBuildConfig::default())
//!     .unwrap();
//! assert!(curve.discount(1.0).unwrap() < 1.0);
//! ```

use crate::rate_helpers::{rate_helper, RateHelper};
use crate::yield_curve::Curve;
use ql_core::errors::{Error, Result};
use ql_core::{Date, DayCounter, DiscountFactor, Frequency, Rate, Real, Size, Time};
use ql_math::interpolations::InterpolationMethod;
use ql_math::solvers1d::{brent, Solver1DConfig};
use ql_quotes::Quote;
use tracing::{debug, info};

/// Bootstrap settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CurveBuildConfig {
    /// Tolerances and iteration budget of the per-pivot solve.
    pub solver: Solver1DConfig,
    /// Lower end of the zero-rate search bracket.
    pub min_rate: Rate,
    /// Upper end of the zero-rate search bracket.
    pub max_rate: Rate,
    /// Fixed-leg payment frequency of swap quotes.
    pub swap_fixed_frequency: Frequency,
    /// Accrual period of futures quotes, in years.
    pub futures_accrual: Time,
    /// Day counter stored on the built curve.
    pub day_counter: DayCounter,
    /// Upper bound on global passes for non-local interpolation.
    pub max_global_passes: Size,
}

impl Default for CurveBuildConfig {
    fn default() -> Self {
        Self {
            solver: Solver1DConfig::default(),
            min_rate: -0.5,
            max_rate: 1.0,
            swap_fixed_frequency: Frequency::Annual,
            futures_accrual: 0.25,
            day_counter: DayCounter::Actual365Fixed,
            max_global_passes: 50,
        }
    }
}

impl CurveBuildConfig {
    /// Check the settings are usable.
    pub fn validate(&self) -> Result<()> {
        self.solver.validate()?;
        ql_core::ensure!(
            self.min_rate.is_finite() && self.max_rate.is_finite() && self.min_rate < self.max_rate,
            Configuration,
            "rate search bracket [{}, {}] is malformed",
            self.min_rate,
            self.max_rate
        );
        ql_core::ensure!(
            self.futures_accrual.is_finite() && self.futures_accrual > 0.0,
            Configuration,
            "futures accrual must be positive, got {}",
            self.futures_accrual
        );
        ql_core::ensure!(
            self.max_global_passes > 0,
            Configuration,
            "at least one global pass is required"
        );
        Ok(())
    }
}

/// Bootstrap a discount curve from quotes of mixed instrument type.
///
/// # Errors
/// - `Configuration` for an empty quote set, an invalid quote or an option
///   quote.
/// - `DuplicateMaturity` if two quotes share a maturity.
/// - `CurveBuild` if the solve fails at any pivot; no partial curve is
///   returned.
pub fn build_curve(
    valuation_date: Date,
    quotes: &[Quote],
    method: InterpolationMethod,
    config: &CurveBuildConfig,
) -> Result<Curve> {
    config.validate()?;
    ql_core::ensure!(!quotes.is_empty(), Configuration, "at least one quote is required");
    for q in quotes {
        q.validate()?;
    }

    let mut sorted: Vec<&Quote> = quotes.iter().collect();
    sorted.sort_by(|a, b| a.maturity().total_cmp(&b.maturity()));
    if let Some(w) = sorted.windows(2).find(|w| w[0].maturity() == w[1].maturity()) {
        return Err(Error::DuplicateMaturity {
            maturity: w[0].maturity(),
            first: w[0].id().to_owned(),
            second: w[1].id().to_owned(),
        });
    }

    let helpers = sorted
        .iter()
        .map(|q| rate_helper(q, config))
        .collect::<Result<Vec<_>>>()?;

    let mut bootstrap = Bootstrap::new(valuation_date, method, config, &helpers);
    for k in 1..=helpers.len() {
        let r = bootstrap.solve_pivot(k, k)?;
        debug!(
            pivot = k,
            maturity = bootstrap.times[k],
            zero_rate = r,
            "solved pivot"
        );
        bootstrap.rates[k] = r;
    }

    let mut passes = 0;
    if method.is_global() && helpers.len() >= 2 {
        passes = bootstrap.global_passes()?;
    }

    let curve = Curve::from_pivots(valuation_date, &bootstrap.pivots(), method, config.day_counter)?;
    info!(
        valuation_date = %valuation_date,
        pivots = helpers.len(),
        method = ?method,
        global_passes = passes,
        arbitrage_free = curve.is_arbitrage_free(),
        "curve built"
    );
    Ok(curve)
}

// ── Bootstrap state ───────────────────────────────────────────────────────────

struct Bootstrap<'a> {
    valuation_date: Date,
    method: InterpolationMethod,
    config: &'a CurveBuildConfig,
    helpers: &'a [Box<dyn RateHelper>],
    /// Pivot maturities, `times[0] == 0`.
    times: Vec<Time>,
    /// Zero rates at each pivot; `rates[0]` is unused.
    rates: Vec<Rate>,
}

impl<'a> Bootstrap<'a> {
    fn new(
        valuation_date: Date,
        method: InterpolationMethod,
        config: &'a CurveBuildConfig,
        helpers: &'a [Box<dyn RateHelper>],
    ) -> Self {
        let mut times = Vec::with_capacity(helpers.len() + 1);
        times.push(0.0);
        times.extend(helpers.iter().map(|h| h.maturity()));
        Self {
            valuation_date,
            method,
            config,
            helpers,
            times,
            rates: vec![0.0; helpers.len() + 1],
        }
    }

    /// Solved `(maturity, discount_factor)` pivots, excluding maturity 0.
    fn pivots(&self) -> Vec<(Time, DiscountFactor)> {
        self.times[1..]
            .iter()
            .zip(&self.rates[1..])
            .map(|(&t, &r)| (t, (-r * t).exp()))
            .collect()
    }

    /// Solve the rate at pivot `k` on a curve through pivots `1..=last`,
    /// holding all other rates fixed.
    fn solve_pivot(&self, k: usize, last: usize) -> Result<Rate> {
        let helper = &self.helpers[k - 1];
        let target = helper.quote();
        let objective = |r: Real| {
            let mut rates = self.rates[..=last].to_vec();
            rates[k] = r;
            trial_curve(self, last, &rates)
                .and_then(|c| helper.implied_quote(&c))
                .map(|q| q - target)
                .unwrap_or(Real::NAN)
        };
        brent(objective, self.config.min_rate, self.config.max_rate, &self.config.solver).map_err(
            |source| Error::CurveBuild {
                maturity: helper.maturity(),
                source: Box::new(source),
            },
        )
    }

    /// Re-solve every pivot against the full curve until rates settle.
    /// Returns the number of passes taken.
    fn global_passes(&mut self) -> Result<usize> {
        let n = self.helpers.len();
        let tolerance = 10.0 * self.config.solver.accuracy.max(self.config.solver.x_accuracy);
        for pass in 1..=self.config.max_global_passes {
            let mut max_change: Real = 0.0;
            for k in 1..=n {
                let r = self.solve_pivot(k, n)?;
                max_change = max_change.max((r - self.rates[k]).abs());
                self.rates[k] = r;
            }
            debug!(pass, max_change, "global bootstrap pass");
            if max_change <= tolerance {
                return Ok(pass);
            }
        }
        Err(Error::CurveBuild {
            maturity: self.times[n],
            source: Box::new(Error::Convergence {
                iterations: self.config.max_global_passes,
                reason: format!("pivot rates still moving above {tolerance} after global passes"),
            }),
        })
    }
}

fn trial_curve(b: &Bootstrap<'_>, last: usize, rates: &[Rate]) -> Result<Curve> {
    let times = b.times[..=last].to_vec();
    let discounts: Vec<DiscountFactor> = times
        .iter()
        .zip(rates)
        .map(|(&t, &r)| (-r * t).exp())
        .collect();
    Curve::assemble(b.valuation_date, b.config.day_counter, b.method, times, discounts)
}
