//! Risk-neutral geometric Brownian motion with constant coefficients.
//!
//! `dS = (r − q)·S·dt + σ·S·dW`, with `r` the continuously-compounded rate
//! to the option's maturity and `q` a continuous dividend yield.

use ql_core::{errors::Result, Rate, Real, Time, Volatility};

/// Constant-coefficient Black-Scholes dynamics of a single underlying.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesProcess {
    spot: Real,
    rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
}

impl BlackScholesProcess {
    /// # Errors
    /// `InvalidParameter` unless `spot` and `volatility` are positive and
    /// the rates are finite.
    pub fn new(spot: Real, rate: Rate, dividend_yield: Rate, volatility: Volatility) -> Result<Self> {
        ql_core::ensure!(
            spot.is_finite() && spot > 0.0,
            InvalidParameter,
            "spot must be positive, got {spot}"
        );
        ql_core::ensure!(
            volatility.is_finite() && volatility > 0.0,
            InvalidParameter,
            "volatility must be positive, got {volatility}"
        );
        ql_core::ensure!(
            rate.is_finite() && dividend_yield.is_finite(),
            InvalidParameter,
            "rates must be finite, got r = {rate}, q = {dividend_yield}"
        );
        Ok(Self {
            spot,
            rate,
            dividend_yield,
            volatility,
        })
    }

    /// Initial value `S₀`.
    pub fn x0(&self) -> Real {
        self.spot
    }

    /// Risk-free rate `r`.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Dividend yield `q`.
    pub fn dividend_yield(&self) -> Rate {
        self.dividend_yield
    }

    /// Volatility `σ`.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    /// Drift of `ln S`: `r − q − σ²/2`.
    pub fn log_drift(&self) -> Real {
        self.rate - self.dividend_yield - 0.5 * self.volatility * self.volatility
    }

    /// Variance of `ln S` over `dt`: `σ²·dt`.
    pub fn log_variance(&self, dt: Time) -> Real {
        self.volatility * self.volatility * dt
    }

    /// Exact evolution of `x` over `dt` driven by a standard normal `dw`.
    pub fn evolve(&self, x: Real, dt: Time, dw: Real) -> Real {
        x * (self.log_drift() * dt + self.volatility * dt.sqrt() * dw).exp()
    }

    /// Same dynamics with a different volatility.
    pub fn with_volatility(&self, volatility: Volatility) -> Result<Self> {
        Self::new(self.spot, self.rate, self.dividend_yield, volatility)
    }

    /// Same dynamics with a different rate.
    pub fn with_rate(&self, rate: Rate) -> Result<Self> {
        Self::new(self.spot, rate, self.dividend_yield, self.volatility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::Error;

    #[test]
    fn evolve_with_zero_shock_follows_drift() {
        let p = BlackScholesProcess::new(100.0, 0.05, 0.01, 0.2).unwrap();
        let x = p.evolve(100.0, 1.0, 0.0);
        assert_abs_diff_eq!(x, 100.0 * (0.05_f64 - 0.01 - 0.02).exp(), epsilon = 1e-12);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            BlackScholesProcess::new(100.0, 0.05, 0.0, 0.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            BlackScholesProcess::new(-1.0, 0.05, 0.0, 0.2),
            Err(Error::InvalidParameter(_))
        ));
    }
}
