//! Model selection and results for vanilla option pricing.
//!
//! [`price_option`] validates the inputs once and dispatches to the engine
//! selected by [`PricingModel`].  The risk-free curve is borrowed; every
//! engine reads the discount factor to the option's maturity from it.

use crate::{
    analytic_european_engine::analytic_european, binomial_engine::binomial,
    black76_engine::black76_option, monte_carlo_engine::monte_carlo,
};
use ql_core::{errors::Result, Rate, Real, Size, Volatility};
use ql_instruments::{ExerciseStyle, OptionSpec};
use ql_methods::{BinomialTreeType, MonteCarloConfig, MAX_LATTICE_STEPS};
use ql_termstructures::Curve;

/// Volatility and dividend yield of the underlying.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelParameters {
    /// Black volatility, decimal.
    pub volatility: Volatility,
    /// Continuous dividend yield, decimal.
    pub dividend_yield: Rate,
}

impl ModelParameters {
    /// Parameters with the given volatility and no dividends.
    pub fn new(volatility: Volatility) -> Self {
        Self {
            volatility,
            dividend_yield: 0.0,
        }
    }

    /// Same parameters with a dividend yield.
    pub fn with_dividend_yield(self, dividend_yield: Rate) -> Self {
        Self {
            dividend_yield,
            ..self
        }
    }

    /// Volatility positive, both finite.
    ///
    /// # Errors
    /// `InvalidParameter`.
    pub fn validate(&self) -> Result<()> {
        ql_core::ensure!(
            self.volatility.is_finite() && self.volatility > 0.0,
            InvalidParameter,
            "volatility must be positive, got {}",
            self.volatility
        );
        ql_core::ensure!(
            self.dividend_yield.is_finite(),
            InvalidParameter,
            "dividend yield must be finite, got {}",
            self.dividend_yield
        );
        Ok(())
    }
}

/// Binomial lattice settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LatticeConfig {
    /// Number of time steps, at most [`MAX_LATTICE_STEPS`].
    pub steps: Size,
    /// Tree parameterisation.
    pub tree: BinomialTreeType,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            steps: 500,
            tree: BinomialTreeType::CoxRossRubinstein,
        }
    }
}

impl LatticeConfig {
    /// # Errors
    /// `InvalidParameter` unless `2 <= steps <= MAX_LATTICE_STEPS`.
    pub fn validate(&self) -> Result<()> {
        ql_core::ensure!(
            (2..=MAX_LATTICE_STEPS).contains(&self.steps),
            InvalidParameter,
            "lattice steps must be in 2..={MAX_LATTICE_STEPS}, got {}",
            self.steps
        );
        Ok(())
    }
}

/// Which model prices the option.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PricingModel {
    /// Black-Scholes-Merton closed form (European only).
    #[default]
    ClosedForm,
    /// Black-76 on a futures or forward price (European only).
    Black76,
    /// Binomial lattice (European or American).
    Binomial(LatticeConfig),
    /// Monte Carlo simulation (European only).
    MonteCarlo(MonteCarloConfig),
}

impl PricingModel {
    /// `true` if the model can value early exercise.
    pub fn supports(&self, exercise: ExerciseStyle) -> bool {
        match exercise {
            ExerciseStyle::European => true,
            ExerciseStyle::American => matches!(self, PricingModel::Binomial(_)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PricingModel::ClosedForm => "closed-form",
            PricingModel::Black76 => "Black-76",
            PricingModel::Binomial(_) => "binomial",
            PricingModel::MonteCarlo(_) => "Monte Carlo",
        }
    }
}

/// First-order sensitivities plus gamma.
///
/// Vega and rho are per unit (1.0 = 100 %) change; theta is per year.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeks {
    /// ∂V/∂S
    pub delta: Real,
    /// ∂²V/∂S²
    pub gamma: Real,
    /// ∂V/∂σ
    pub vega: Real,
    /// ∂V/∂t (calendar time)
    pub theta: Real,
    /// ∂V/∂r (parallel zero-rate shift)
    pub rho: Real,
}

/// The outcome of [`price_option`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Present value.
    pub price: Real,
    /// Sensitivities, when the model provides them.
    pub greeks: Option<Greeks>,
    /// Standard error of a simulated price.
    pub std_error: Option<Real>,
}

impl PricingResult {
    /// A price with Greeks.
    pub fn with_greeks(price: Real, greeks: Greeks) -> Self {
        Self {
            price,
            greeks: Some(greeks),
            std_error: None,
        }
    }
}

/// Price a vanilla option.
///
/// # Errors
/// - `InvalidParameter` for non-positive spot, strike, maturity or
///   volatility, or invalid step or path counts.
/// - `UnsupportedExerciseStyle` for American exercise under a model that
///   cannot value it.
pub fn price_option(
    spec: &OptionSpec,
    params: ModelParameters,
    curve: &Curve,
    model: &PricingModel,
) -> Result<PricingResult> {
    spec.validate()?;
    params.validate()?;
    if !model.supports(spec.exercise) {
        ql_core::fail!(
            UnsupportedExerciseStyle,
            "{} exercise cannot be priced with the {} model",
            spec.exercise,
            model.name()
        );
    }
    match model {
        PricingModel::ClosedForm => analytic_european(spec, params, curve),
        PricingModel::Black76 => black76_option(spec, params.volatility, curve),
        PricingModel::Binomial(cfg) => binomial(spec, params, curve, cfg),
        PricingModel::MonteCarlo(cfg) => monte_carlo(spec, params, curve, cfg),
    }
}
